//! Thing Model documents
//!
//! Only the parts of a Thing Model that drive type generation are modelled:
//! title, properties, actions and links. Everything else in the document is
//! ignored.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CodegenError, Result};
use crate::schema::SchemaNode;

/// Link relation of a base model
pub const REL_EXTENDS: &str = "tm:extends";

/// Link relation of a sub-feature model
pub const REL_SUBMODEL: &str = "tm:submodel";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThingModel {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Property name -> raw schema
    #[serde(default)]
    pub properties: IndexMap<String, Value>,

    #[serde(default)]
    pub actions: IndexMap<String, ActionDefinition>,

    #[serde(default)]
    pub links: Vec<Link>,

    /// JSON pointers of affordances that are optional (`/properties/<name>`)
    #[serde(default, rename = "tm:optional")]
    pub optional: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionDefinition {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub input: Option<Value>,

    #[serde(default)]
    pub output: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub rel: Option<String>,

    pub href: String,

    #[serde(default, rename = "instanceName")]
    pub instance_name: Option<String>,

    #[serde(default, rename = "type")]
    pub media_type: Option<String>,

    /// Location of the document that declared this link; relative hrefs
    /// resolve against it.
    #[serde(skip)]
    pub origin: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Extends,
    Submodel,
    Other,
}

impl Link {
    pub fn kind(&self) -> LinkKind {
        match self.rel.as_deref() {
            Some(REL_EXTENDS) => LinkKind::Extends,
            Some(REL_SUBMODEL) => LinkKind::Submodel,
            _ => LinkKind::Other,
        }
    }
}

impl ThingModel {
    /// Parse a model loaded from `location`
    pub fn from_value(value: Value, location: &str) -> Result<Self> {
        let mut model: ThingModel =
            serde_json::from_value(value).map_err(|e| CodegenError::InvalidModel {
                location: location.to_string(),
                reason: e.to_string(),
            })?;
        for link in &mut model.links {
            link.origin.get_or_insert_with(|| location.to_string());
        }
        Ok(model)
    }

    /// The model title, or `fallback`
    pub fn name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(fallback)
    }

    /// The single `tm:extends` link, if any
    pub fn extends_link(&self, location: &str) -> Result<Option<&Link>> {
        let mut extends = self.links.iter().filter(|l| l.kind() == LinkKind::Extends);
        let first = extends.next();
        let rest = extends.count();
        if rest > 0 {
            return Err(CodegenError::MultipleExtends {
                model: location.to_string(),
                count: rest + 1,
            });
        }
        Ok(first)
    }

    /// `tm:submodel` links in document order
    pub fn submodels(&self) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(|l| l.kind() == LinkKind::Submodel)
    }

    /// Merge `base` underneath this model: base definitions come first and
    /// this model's definitions override them. This model's own extends
    /// link is consumed; the base's links are kept.
    pub fn merge_base(&mut self, base: ThingModel) {
        let mut properties = base.properties;
        for (name, schema) in self.properties.drain(..) {
            properties.insert(name, schema);
        }
        self.properties = properties;

        let mut actions = base.actions;
        for (name, action) in self.actions.drain(..) {
            actions.insert(name, action);
        }
        self.actions = actions;

        let mut links = base.links;
        links.extend(
            self.links
                .drain(..)
                .filter(|l| l.kind() != LinkKind::Extends),
        );
        self.links = links;

        for pointer in base.optional {
            if !self.optional.contains(&pointer) {
                self.optional.push(pointer);
            }
        }

        if self.title.is_none() {
            self.title = base.title;
        }
        if self.description.is_none() {
            self.description = base.description;
        }
    }

    pub fn is_optional_property(&self, name: &str) -> bool {
        let pointer = format!("/properties/{name}");
        self.optional.iter().any(|p| *p == pointer)
    }

    /// Properties that are not listed as optional
    pub fn required_properties(&self) -> Vec<String> {
        self.properties
            .keys()
            .filter(|name| !self.is_optional_property(name))
            .cloned()
            .collect()
    }

    /// Parse every property schema
    pub fn property_nodes(&self) -> Result<IndexMap<String, SchemaNode>> {
        self.properties
            .iter()
            .map(|(name, schema)| {
                SchemaNode::from_json(schema, &format!("#/properties/{name}"))
                    .map(|node| (name.clone(), node))
            })
            .collect()
    }
}
