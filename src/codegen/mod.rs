//! Code Generation
//!
//! Drives one generation run for a Thing Model:
//!
//! 1. load the model, inline its references and merge its `tm:extends` chain
//! 2. resolve the Thing attributes
//! 3. resolve the Thing actions
//! 4. resolve every sub-feature, one at a time in link order
//! 5. assemble the Thing class
//!
//! Every run gets its own [`TypeRegistries`]; nothing is shared between runs.
//! Loading is the only suspension point. All loads are awaited before type
//! resolution starts, so registration order only depends on the documents.
//!
//! Emitters never see raw JSON, only the resolved [`GeneratedModel`].

pub mod emit;
pub mod kotlin;
pub mod profile;

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

pub use emit::{write_sources, Emitter, SourceFile};
pub use kotlin::KotlinEmitter;
pub use profile::RenderProfile;

use crate::config::validate_package;
use crate::error::{CodegenError, Result};
use crate::fingerprint::Fingerprint;
use crate::grouping::group_by_category;
use crate::loader::ModelLoader;
use crate::model::{ActionDefinition, Link, ThingModel};
use crate::naming::{
    conflict_candidates, to_class_name, to_enum_constant, to_package_segment, to_property_name,
    ClassNamingPolicy,
};
use crate::references::{ReferenceResolver, DEFAULT_MAX_REFERENCE_DEPTH};
use crate::registry::{EnumPlacement, TypeRegistries};
use crate::resolver::{
    ClassDescriptor, ClassKind, EnumWrapperPolicy, FieldDescriptor, NamingContext, ResolverOptions,
    Role, TypeName, TypeRef, TypeResolver, WrapperPolicy, DEFAULT_MAX_SCHEMA_DEPTH,
};
use crate::schema::{SchemaKind, SchemaNode};

/// Class name used when a Thing Model has no title
pub const DEFAULT_THING_NAME: &str = "Thing";

/// Class holding the Thing-level properties
pub const ATTRIBUTES_CLASS: &str = "Attributes";

/// Enum listing the actions of a Thing or feature
pub const ACTION_NAME_ENUM: &str = "ActionName";

// =============================================================================
// Options
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub enum_placement: EnumPlacement,
    pub class_naming: ClassNamingPolicy,
    /// Emit fluent builders next to data classes
    pub dsl_builders: bool,
    /// Builders take suspending blocks
    pub suspend_builders: bool,
    /// References that resolve to nothing are errors instead of warnings
    pub strict_references: bool,
    /// Limit on reference inlining passes and on `tm:extends` chains
    pub max_reference_depth: usize,
    /// Limit on schema nesting
    pub max_schema_depth: usize,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            enum_placement: EnumPlacement::default(),
            class_naming: ClassNamingPolicy::default(),
            dsl_builders: false,
            suspend_builders: false,
            strict_references: false,
            max_reference_depth: DEFAULT_MAX_REFERENCE_DEPTH,
            max_schema_depth: DEFAULT_MAX_SCHEMA_DEPTH,
        }
    }
}

impl GenerationOptions {
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            class_naming: self.class_naming,
            enum_placement: self.enum_placement,
            max_depth: self.max_schema_depth,
        }
    }
}

// =============================================================================
// Generated Output
// =============================================================================

/// One action of an action interface
#[derive(Debug, Clone, PartialEq)]
pub struct ActionMethod {
    /// Action key in the model
    pub json_name: String,
    /// Method name
    pub name: String,
    /// Constant of the action enum naming this action
    pub constant: String,
    pub description: Option<String>,
    pub input: Option<TypeRef>,
    pub output: Option<TypeRef>,
}

/// The actions of a Thing or feature, emitted as one interface
#[derive(Debug, Clone, PartialEq)]
pub struct ActionInterface {
    pub package: String,
    pub name: String,
    /// Enum listing every action
    pub action_enum: TypeName,
    pub methods: Vec<ActionMethod>,
}

impl ActionInterface {
    pub fn type_name(&self) -> TypeName {
        TypeName::new(&self.package, &self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureModel {
    /// Field name of the feature on the Thing
    pub name: String,
    pub class: TypeName,
    pub actions: Option<ActionInterface>,
    /// Location the feature model was loaded from
    pub location: String,
}

/// Everything one run resolved. Owns the run's registries.
#[derive(Debug)]
pub struct GeneratedModel {
    pub package: String,
    pub thing: TypeName,
    pub attributes: Option<TypeName>,
    pub actions: Option<ActionInterface>,
    pub features: Vec<FeatureModel>,
    pub registries: TypeRegistries,
}

impl GeneratedModel {
    pub fn thing_class(&self) -> Option<&ClassDescriptor> {
        self.registries
            .classes
            .class(&self.thing.package, &self.thing.name)
    }

    /// Action interfaces of the Thing and of every feature
    pub fn action_interfaces(&self) -> impl Iterator<Item = &ActionInterface> {
        self.actions
            .iter()
            .chain(self.features.iter().filter_map(|f| f.actions.as_ref()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub thing: String,
    pub files: Vec<PathBuf>,
    pub classes: usize,
    pub enums: usize,
    pub aliases: usize,
}

// =============================================================================
// Generator
// =============================================================================

pub struct Generator<L: ModelLoader> {
    loader: L,
    options: GenerationOptions,
    wrapper: Box<dyn WrapperPolicy>,
}

impl<L: ModelLoader> Generator<L> {
    pub fn new(loader: L, options: GenerationOptions) -> Self {
        Self {
            loader,
            options,
            wrapper: Box::new(EnumWrapperPolicy),
        }
    }

    /// Replace the policy deciding which primitives become enums
    pub fn with_wrapper_policy(mut self, wrapper: impl WrapperPolicy + 'static) -> Self {
        self.wrapper = Box::new(wrapper);
        self
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Resolve the model at `model_url` without writing anything
    pub async fn build(&self, model_url: &str, package: &str) -> Result<GeneratedModel> {
        validate_package(package)?;

        let mut references = ReferenceResolver::new(
            &self.loader,
            self.options.strict_references,
            self.options.max_reference_depth,
        );
        let model = self.load_model(&mut references, model_url).await?;

        let mut submodels = Vec::new();
        for link in model.submodels() {
            let base = link.origin.as_deref().unwrap_or(model_url);
            let location = self.loader.resolve_location(base, &link.href);
            let feature = self.load_model(&mut references, &location).await?;
            submodels.push((link.clone(), location, feature));
        }

        self.assemble(&model, submodels, package)
    }

    /// Resolve the model, emit it and write the sources under `output_dir`
    pub async fn generate(
        &self,
        model_url: &str,
        package: &str,
        output_dir: &Path,
        emitter: &dyn Emitter,
    ) -> Result<GenerationReport> {
        let model = self.build(model_url, package).await?;
        let sources = emitter.emit(&model)?;
        let files = write_sources(output_dir, &sources).await?;

        let report = GenerationReport {
            thing: model.thing.to_string(),
            files,
            classes: model.registries.classes.len(),
            enums: model.registries.enums.len(),
            aliases: model.registries.classes.aliases().count(),
        };
        info!(
            thing = %report.thing,
            files = report.files.len(),
            classes = report.classes,
            enums = report.enums,
            aliases = report.aliases,
            "generation finished"
        );
        Ok(report)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load a model with its references inlined and its base models merged
    async fn load_model(
        &self,
        references: &mut ReferenceResolver<'_, L>,
        location: &str,
    ) -> Result<ThingModel> {
        let mut model = self.load_document(references, location).await?;
        let mut current = location.to_string();
        let mut depth = 0;

        while let Some(link) = model.extends_link(&current)?.cloned() {
            depth += 1;
            if depth > self.options.max_reference_depth {
                return Err(CodegenError::ReferenceDepthExceeded {
                    path: format!("{location} (tm:extends)"),
                    limit: self.options.max_reference_depth,
                });
            }
            let base_location = self
                .loader
                .resolve_location(link.origin.as_deref().unwrap_or(&current), &link.href);
            debug!(model = location, base = %base_location, "merging base model");

            let base = self.load_document(references, &base_location).await?;
            model.merge_base(base);
            current = base_location;
        }
        Ok(model)
    }

    async fn load_document(
        &self,
        references: &mut ReferenceResolver<'_, L>,
        location: &str,
    ) -> Result<ThingModel> {
        let raw = self.loader.load(location).await?;
        let inlined = references.inline(location, raw).await?;
        ThingModel::from_value(inlined, location)
    }

    // =========================================================================
    // Resolution
    // =========================================================================

    fn resolver<'a>(&'a self, registries: &'a mut TypeRegistries) -> TypeResolver<'a> {
        TypeResolver::new(registries, self.options.resolver_options(), self.wrapper.as_ref())
    }

    fn assemble(
        &self,
        model: &ThingModel,
        submodels: Vec<(Link, String, ThingModel)>,
        package: &str,
    ) -> Result<GeneratedModel> {
        let mut registries = TypeRegistries::new();
        let thing_name = match to_class_name(model.name_or(DEFAULT_THING_NAME)) {
            name if name.is_empty() => DEFAULT_THING_NAME.to_string(),
            name => name,
        };

        let attributes = self.attributes(&mut registries, model, package)?;
        let actions = self.actions(
            &mut registries,
            &model.actions,
            &thing_name,
            &format!("{package}.actions"),
            None,
        )?;

        let mut features = Vec::with_capacity(submodels.len());
        for (link, location, feature) in submodels {
            features.push(self.feature(&mut registries, &link, location, &feature, package)?);
        }

        let thing = self.thing_class(&mut registries, model, &thing_name, attributes.as_ref(), &features, package)?;
        info!(
            thing = %thing,
            features = features.len(),
            classes = registries.classes.len(),
            enums = registries.enums.len(),
            "resolved thing model"
        );

        Ok(GeneratedModel {
            package: package.to_string(),
            thing,
            attributes,
            actions,
            features,
            registries,
        })
    }

    fn attributes(
        &self,
        registries: &mut TypeRegistries,
        model: &ThingModel,
        package: &str,
    ) -> Result<Option<TypeName>> {
        if model.properties.is_empty() {
            return Ok(None);
        }
        let node = SchemaNode::object(model.property_nodes()?, model.required_properties())
            .with_title(ATTRIBUTES_CLASS);
        let ctx = NamingContext::new(Role::Attribute, None);

        self.resolver(registries)
            .resolve_class(ATTRIBUTES_CLASS, &node, &format!("{package}.attributes"), &ctx)
            .map(Some)
    }

    fn actions(
        &self,
        registries: &mut TypeRegistries,
        actions: &IndexMap<String, ActionDefinition>,
        owner: &str,
        package: &str,
        feature: Option<&str>,
    ) -> Result<Option<ActionInterface>> {
        if actions.is_empty() {
            return Ok(None);
        }
        let ctx = NamingContext::new(Role::Other, feature.map(str::to_string));
        let mut resolver = self.resolver(registries);

        let names: Vec<Value> = actions.keys().map(|name| Value::String(name.clone())).collect();
        let enum_node = SchemaNode::new(SchemaKind::String)
            .with_title(ACTION_NAME_ENUM)
            .with_enumeration(names);
        let action_enum = resolver.resolve_separate_enum(ACTION_NAME_ENUM, &enum_node, package, &ctx)?;

        let mut methods = Vec::with_capacity(actions.len());
        for (name, action) in actions {
            let class_name = to_class_name(name);
            let input = action_payload(
                &mut resolver,
                action.input.as_ref(),
                &format!("{class_name}Input"),
                &format!("#/actions/{name}/input"),
                package,
                &ctx,
            )?;
            let output = action_payload(
                &mut resolver,
                action.output.as_ref(),
                &format!("{class_name}Output"),
                &format!("#/actions/{name}/output"),
                package,
                &ctx,
            )?;
            methods.push(ActionMethod {
                json_name: name.clone(),
                name: to_property_name(name),
                constant: to_enum_constant(name),
                description: action.description.clone().or_else(|| action.title.clone()),
                input,
                output,
            });
        }

        let fingerprint = Fingerprint::from_members(methods.iter().map(|m| {
            let signature = |ty: &Option<TypeRef>| ty.as_ref().map_or("unit".to_string(), TypeRef::signature);
            (m.json_name.clone(), format!("{}->{}", signature(&m.input), signature(&m.output)))
        }));
        let interface_name = format!("{owner}Actions");
        let claim = registries
            .claim_class_name(package, conflict_candidates(&interface_name, None, feature), &fingerprint)
            .ok_or_else(|| CodegenError::malformed(package, format!("no free name for {interface_name}")))?;

        Ok(Some(ActionInterface {
            package: package.to_string(),
            name: claim.name,
            action_enum,
            methods,
        }))
    }

    fn feature(
        &self,
        registries: &mut TypeRegistries,
        link: &Link,
        location: String,
        model: &ThingModel,
        package: &str,
    ) -> Result<FeatureModel> {
        let name = link
            .instance_name
            .clone()
            .or_else(|| model.title.clone())
            .filter(|name| !to_class_name(name).is_empty())
            .ok_or_else(|| CodegenError::InvalidModel {
                location: location.clone(),
                reason: "sub-feature needs an instanceName or a title".to_string(),
            })?;
        let class_name = to_class_name(&name);
        let feature_package = format!("{package}.features.{}", to_package_segment(&name));
        debug!(feature = %name, package = %feature_package, "resolving feature");

        let node = feature_schema(model, &location)?.with_title(&name);
        let ctx = NamingContext::new(Role::Feature, Some(class_name.clone()));
        let class = self
            .resolver(registries)
            .resolve_class(&class_name, &node, &feature_package, &ctx)?;

        let actions = self.actions(
            registries,
            &model.actions,
            &class.name,
            &format!("{feature_package}.actions"),
            Some(&class_name),
        )?;

        Ok(FeatureModel {
            name: to_property_name(&name),
            class,
            actions,
            location,
        })
    }

    fn thing_class(
        &self,
        registries: &mut TypeRegistries,
        model: &ThingModel,
        name: &str,
        attributes: Option<&TypeName>,
        features: &[FeatureModel],
        package: &str,
    ) -> Result<TypeName> {
        let mut fields = Vec::with_capacity(features.len() + 1);
        if let Some(attributes) = attributes {
            fields.push(FieldDescriptor::new("attributes", TypeRef::Class(attributes.clone()), true));
        }
        for feature in features {
            fields.push(FieldDescriptor::new(&feature.name, TypeRef::Class(feature.class.clone()), true));
        }

        let fingerprint = Fingerprint::from_members(fields.iter().map(|f| (f.json_name.clone(), f.ty.signature())));
        let claim = registries
            .claim_class_name(package, conflict_candidates(name, None, None), &fingerprint)
            .ok_or_else(|| CodegenError::malformed(package, format!("no free name for {name}")))?;
        let thing = TypeName::new(package, &claim.name);
        if claim.existing {
            return Ok(thing);
        }

        let kind = if fields.is_empty() { ClassKind::Plain } else { ClassKind::Data };
        let mut descriptor = ClassDescriptor::new(&thing, fingerprint, kind, Role::Other);
        descriptor.title = model.title.clone();
        descriptor.description = model.description.clone();
        descriptor.fields = fields;
        registries.classes.insert_class(descriptor);
        Ok(thing)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Resolve an action input or output. Named by its title, else `fallback`.
fn action_payload(
    resolver: &mut TypeResolver<'_>,
    schema: Option<&Value>,
    fallback: &str,
    path: &str,
    package: &str,
    ctx: &NamingContext,
) -> Result<Option<TypeRef>> {
    let Some(schema) = schema else {
        return Ok(None);
    };
    let node = SchemaNode::from_json(schema, path)?;
    let hint = node
        .title
        .clone()
        .filter(|title| !to_class_name(title).is_empty())
        .unwrap_or_else(|| fallback.to_string());
    resolver.resolve_field(&hint, &node, package, ctx).map(Some)
}

/// The object schema of a feature: one nested object per property
/// category, followed by the uncategorised properties.
fn feature_schema(model: &ThingModel, location: &str) -> Result<SchemaNode> {
    let nodes = model.property_nodes()?;
    let required = model.required_properties();
    let groups = group_by_category(nodes, |(_, node)| node.category.clone());

    let mut properties = IndexMap::new();
    let mut required_fields = Vec::new();

    for (category, entries) in groups.grouped {
        let members: Vec<String> = entries
            .iter()
            .map(|(name, _)| name.clone())
            .filter(|name| required.contains(name))
            .collect();
        let group = SchemaNode::object(entries.into_iter().collect(), members)
            .with_title(to_class_name(&category));
        required_fields.push(category.clone());
        properties.insert(category, group);
    }

    for (name, node) in groups.ungrouped {
        if properties.contains_key(&name) {
            return Err(CodegenError::InvalidModel {
                location: location.to_string(),
                reason: format!("property '{name}' collides with a category of the same name"),
            });
        }
        if required.contains(&name) {
            required_fields.push(name.clone());
        }
        properties.insert(name, node);
    }

    Ok(SchemaNode::object(properties, required_fields))
}
