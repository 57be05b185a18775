//! Reference Resolver
//!
//! Inlines embedded model references before any naming or typing decision is
//! made. A reference is an object member
//!
//! ```json
//! { "tm:ref": "common.tm.json#/properties/temperature" }
//! ```
//!
//! whose value names a document and a JSON pointer separated by exactly one
//! `#`. The object carrying the marker is replaced by the referenced
//! fragment. Fragments may carry references of their own; inlining repeats
//! until none are left or the pass limit is hit.

use std::collections::HashMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{CodegenError, Result};
use crate::loader::ModelLoader;
use crate::schema::MODEL_REF_KEY;

/// Separator between document and pointer
pub const REFERENCE_DELIMITER: char = '#';

/// Default limit on inlining passes
pub const DEFAULT_MAX_REFERENCE_DEPTH: usize = 16;

/// A parsed `tm:ref` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelReference {
    /// Referenced document; `None` refers to the document being resolved
    pub document: Option<String>,
    /// JSON pointer into the document
    pub pointer: String,
}

impl ModelReference {
    pub fn parse(value: &str) -> Result<Self> {
        if value.matches(REFERENCE_DELIMITER).count() != 1 {
            return Err(CodegenError::MalformedReference {
                value: value.to_string(),
            });
        }
        let (document, pointer) =
            value
                .split_once(REFERENCE_DELIMITER)
                .ok_or_else(|| CodegenError::MalformedReference {
                    value: value.to_string(),
                })?;

        Ok(Self {
            document: (!document.is_empty()).then(|| document.to_string()),
            pointer: pointer.to_string(),
        })
    }
}

/// Where a reference marker was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceSite {
    /// JSON pointer of the object that carries the marker
    pub parent_path: String,
    /// Raw marker value
    pub reference: String,
}

/// Find every reference marker, depth-first in document order. Objects
/// carrying a marker are not descended into, since they are replaced
/// wholesale.
pub fn find_references(value: &Value) -> Vec<ReferenceSite> {
    let mut sites = Vec::new();
    collect_references(value, String::new(), &mut sites);
    sites
}

fn collect_references(value: &Value, path: String, sites: &mut Vec<ReferenceSite>) {
    match value {
        Value::Object(map) => {
            if let Some(marker) = map.get(MODEL_REF_KEY) {
                let reference = match marker {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                sites.push(ReferenceSite {
                    parent_path: path,
                    reference,
                });
                return;
            }
            for (key, child) in map {
                collect_references(child, format!("{path}/{}", escape_pointer(key)), sites);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                collect_references(child, format!("{path}/{index}"), sites);
            }
        }
        _ => {}
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

// =============================================================================
// Resolver
// =============================================================================

/// Inlines references, fetching each external document at most once per run
pub struct ReferenceResolver<'a, L: ModelLoader + ?Sized> {
    loader: &'a L,
    strict: bool,
    max_passes: usize,
    documents: HashMap<String, Value>,
}

impl<'a, L: ModelLoader + ?Sized> ReferenceResolver<'a, L> {
    /// `strict` turns references that resolve to nothing into errors; by
    /// default they are dropped with a warning.
    pub fn new(loader: &'a L, strict: bool, max_passes: usize) -> Self {
        Self {
            loader,
            strict,
            max_passes,
            documents: HashMap::new(),
        }
    }

    /// Return `document` (loaded from `location`) with every reference inlined
    pub async fn inline(&mut self, location: &str, mut document: Value) -> Result<Value> {
        let mut passes = 0;
        loop {
            let sites = find_references(&document);
            let Some(first) = sites.first() else {
                return Ok(document);
            };
            if passes >= self.max_passes {
                return Err(CodegenError::ReferenceDepthExceeded {
                    path: format!("{location}#{}", first.parent_path),
                    limit: self.max_passes,
                });
            }
            passes += 1;
            debug!(location, pass = passes, references = sites.len(), "inlining model references");

            // fetch against the state at the start of the pass, then splice
            let mut fragments = Vec::with_capacity(sites.len());
            for site in &sites {
                let reference = ModelReference::parse(&site.reference)?;
                let fragment = self.fetch(location, &reference, &document).await?;
                fragments.push(fragment);
            }

            for (site, fragment) in sites.into_iter().zip(fragments) {
                self.splice(location, &mut document, site, fragment)?;
            }
        }
    }

    fn splice(
        &self,
        location: &str,
        document: &mut Value,
        site: ReferenceSite,
        fragment: Option<Value>,
    ) -> Result<()> {
        let target = document
            .pointer_mut(&site.parent_path)
            .ok_or_else(|| CodegenError::UnresolvedReference {
                reference: site.reference.clone(),
                document: location.to_string(),
            })?;

        match fragment {
            Some(fragment) => *target = fragment,
            None if self.strict => {
                return Err(CodegenError::UnresolvedReference {
                    reference: site.reference,
                    document: location.to_string(),
                })
            }
            None => {
                warn!(
                    location,
                    reference = %site.reference,
                    at = %site.parent_path,
                    "model reference resolves to nothing, dropping it"
                );
                if let Value::Object(map) = target {
                    map.remove(MODEL_REF_KEY);
                }
            }
        }
        Ok(())
    }

    async fn fetch(
        &mut self,
        base: &str,
        reference: &ModelReference,
        current: &Value,
    ) -> Result<Option<Value>> {
        let Some(document) = &reference.document else {
            return Ok(current.pointer(&reference.pointer).cloned());
        };

        let location = self.loader.resolve_location(base, document);
        if !self.documents.contains_key(&location) {
            debug!(%location, "fetching referenced document");
            let loaded = self.loader.load(&location).await?;
            self.documents.insert(location.clone(), loaded);
        }

        let mut fragment = match self
            .documents
            .get(&location)
            .and_then(|doc| doc.pointer(&reference.pointer))
        {
            Some(fragment) => fragment.clone(),
            None => return Ok(None),
        };
        if location != base {
            rebase_references(&mut fragment, &location, base, self.loader);
        }
        Ok(Some(fragment))
    }
}

/// Rewrite the references inside a fragment taken from `origin` so they
/// keep pointing at the same place once the fragment is spliced into the
/// document at `base`. Rewritten hrefs are relative to `base`, which is what
/// the next inlining pass resolves them against.
fn rebase_references<L: ModelLoader + ?Sized>(value: &mut Value, origin: &str, base: &str, loader: &L) {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(raw)) = map.get_mut(MODEL_REF_KEY) {
                if let Ok(reference) = ModelReference::parse(raw) {
                    let target = match &reference.document {
                        Some(document) => loader.resolve_location(origin, document),
                        None => origin.to_string(),
                    };
                    let document = loader.relative_location(base, &target);
                    *raw = format!("{document}{REFERENCE_DELIMITER}{}", reference.pointer);
                }
                return;
            }
            for child in map.values_mut() {
                rebase_references(child, origin, base, loader);
            }
        }
        Value::Array(items) => {
            for child in items {
                rebase_references(child, origin, base, loader);
            }
        }
        _ => {}
    }
}
