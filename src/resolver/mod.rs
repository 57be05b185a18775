//! Type Resolver
//!
//! Maps a schema node plus a [`NamingContext`] to a [`TypeRef`], generating
//! classes, enums and aliases into the run's [`TypeRegistries`] as a side
//! effect.
//!
//! ## Resolution rules
//!
//! | Schema                              | Result                                  |
//! |-------------------------------------|-----------------------------------------|
//! | boolean / integer / number / string | primitive, or enum per [`WrapperPolicy`] |
//! | object with `enum`                  | object-valued enum                      |
//! | object with `oneOf`                 | sealed class                            |
//! | object with a map value schema      | `Map(item)`                             |
//! | other object                        | data class (or plain class if empty)    |
//! | array                               | `List(item)`                            |
//! | null                                | `Unit`                                  |
//!
//! Generated names come from the field name when a schema is resolved as a
//! field, and from the schema title otherwise.

pub mod context;
pub mod types;
pub mod wrapper;

use std::collections::HashSet;

use serde_json::{json, Value};
use tracing::{debug, warn};

pub use context::{NamingContext, Role};
pub use types::{
    AliasDescriptor, ClassDescriptor, ClassKind, EnumBacking, EnumConstant, EnumDescriptor,
    EnumField, FieldDescriptor, TypeName, TypeRef,
};
pub use wrapper::{EnumWrapperPolicy, WrapperDecision, WrapperPolicy};

use crate::error::{CodegenError, Result};
use crate::fingerprint::Fingerprint;
use crate::naming::{
    conflict_candidates, derive_class_name, to_class_name, to_enum_constant, to_property_name,
    ClassNamingPolicy, ENUM_CONSTANT_MARKER,
};
use crate::registry::{EnumPlacement, TypeRegistries};
use crate::schema::{MapValues, ObjectSchema, ScalarKind, SchemaKind, SchemaNode};

/// Default limit on schema nesting
pub const DEFAULT_MAX_SCHEMA_DEPTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    pub class_naming: ClassNamingPolicy,
    pub enum_placement: EnumPlacement,
    /// Nesting deeper than this is rejected with [`CodegenError::SchemaTooDeep`]
    pub max_depth: usize,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            class_naming: ClassNamingPolicy::default(),
            enum_placement: EnumPlacement::default(),
            max_depth: DEFAULT_MAX_SCHEMA_DEPTH,
        }
    }
}

/// Outcome of claiming a class name
enum ClassSlot {
    /// Newly registered; the caller must build the descriptor
    Fresh(TypeName),
    /// A structurally identical class already exists
    Existing(TypeName),
}

/// Enum contents before placement
struct EnumBody {
    backing: EnumBacking,
    fields: Vec<EnumField>,
    constants: Vec<EnumConstant>,
    fingerprint: Fingerprint,
}

pub struct TypeResolver<'a> {
    registries: &'a mut TypeRegistries,
    options: ResolverOptions,
    wrapper: &'a dyn WrapperPolicy,
    depth: usize,
}

impl<'a> TypeResolver<'a> {
    pub fn new(
        registries: &'a mut TypeRegistries,
        options: ResolverOptions,
        wrapper: &'a dyn WrapperPolicy,
    ) -> Self {
        Self {
            registries,
            options,
            wrapper,
            depth: 0,
        }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    pub fn registries(&self) -> &TypeRegistries {
        &*self.registries
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Resolve a schema that is not attached to a named field
    pub fn resolve(&mut self, node: &SchemaNode, package: &str, ctx: &NamingContext) -> Result<TypeRef> {
        let path = node.title.clone().unwrap_or_else(|| "#".to_string());
        self.resolve_node(node.title.as_deref(), node, package, ctx, &path)
    }

    /// Resolve the schema of the field `field`
    pub fn resolve_field(
        &mut self,
        field: &str,
        node: &SchemaNode,
        package: &str,
        ctx: &NamingContext,
    ) -> Result<TypeRef> {
        self.resolve_node(Some(field), node, package, ctx, field)
    }

    /// Resolve an object schema as a class named `name`.
    ///
    /// Map-shaped objects become map wrappers and oneOf objects sealed
    /// classes; anything that is not an object is rejected.
    pub fn resolve_class(
        &mut self,
        name: &str,
        node: &SchemaNode,
        package: &str,
        ctx: &NamingContext,
    ) -> Result<TypeName> {
        self.class_at(name, node, package, ctx, name)
    }

    /// Resolve an enum schema as a top-level enum, whatever the placement policy
    pub fn resolve_separate_enum(
        &mut self,
        name: &str,
        node: &SchemaNode,
        package: &str,
        ctx: &NamingContext,
    ) -> Result<TypeName> {
        let values = node
            .enum_values()
            .ok_or_else(|| CodegenError::malformed(name, "enum schema without values"))?;
        let body = match (&node.kind, node.scalar_kind()) {
            (SchemaKind::Object(object), _) => object_enum_body(object, values, name)?,
            (_, Some(kind)) => scalar_enum_body(kind, values, name)?,
            _ => {
                return Err(CodegenError::unsupported(
                    name,
                    format!("enum values on a '{}' schema", node.type_name()),
                ))
            }
        };
        self.place_enum(Some(name), node, body, package, ctx, name, true)
    }

    // =========================================================================
    // Recursion
    // =========================================================================

    fn enter(&mut self, path: &str) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(CodegenError::SchemaTooDeep {
                path: path.to_string(),
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn resolve_node(
        &mut self,
        hint: Option<&str>,
        node: &SchemaNode,
        package: &str,
        ctx: &NamingContext,
        path: &str,
    ) -> Result<TypeRef> {
        self.enter(path)?;
        let result = self.resolve_kind(hint, node, package, ctx, path);
        self.leave();
        result
    }

    fn class_at(
        &mut self,
        name: &str,
        node: &SchemaNode,
        package: &str,
        ctx: &NamingContext,
        path: &str,
    ) -> Result<TypeName> {
        self.enter(path)?;
        let result = self.class_for(name, node, package, ctx, path);
        self.leave();
        result
    }

    fn resolve_kind(
        &mut self,
        hint: Option<&str>,
        node: &SchemaNode,
        package: &str,
        ctx: &NamingContext,
        path: &str,
    ) -> Result<TypeRef> {
        match &node.kind {
            SchemaKind::Boolean => self.scalar(ScalarKind::Boolean, hint, node, package, ctx, path),
            SchemaKind::Integer => self.scalar(ScalarKind::Integer, hint, node, package, ctx, path),
            SchemaKind::Number => self.scalar(ScalarKind::Number, hint, node, package, ctx, path),
            SchemaKind::String => self.scalar(ScalarKind::String, hint, node, package, ctx, path),
            SchemaKind::Null => Ok(TypeRef::Unit),
            SchemaKind::Array(array) => {
                let item_hint = hint
                    .map(|h| format!("{}Item", to_class_name(h)))
                    .or_else(|| array.items.title.clone());
                let item = self.resolve_node(
                    item_hint.as_deref(),
                    &array.items,
                    package,
                    ctx,
                    &format!("{path}/items"),
                )?;
                Ok(TypeRef::List(Box::new(item)))
            }
            SchemaKind::Object(object) => {
                if let Some(reference) = &object.model_ref {
                    warn!(path, reference = %reference, "model reference was not inlined");
                }
                if let Some(values) = node.enum_values() {
                    let body = object_enum_body(object, values, path)?;
                    return self
                        .place_enum(hint, node, body, package, ctx, path, false)
                        .map(TypeRef::Enum);
                }
                if let (None, Some(values)) = (&object.one_of, &object.map_values) {
                    return self.map_type(hint, values, package, ctx, path);
                }
                let name = class_hint(hint, node, path)?;
                self.class_for(&name, node, package, ctx, path)
                    .map(TypeRef::Class)
            }
        }
    }

    fn scalar(
        &mut self,
        kind: ScalarKind,
        hint: Option<&str>,
        node: &SchemaNode,
        package: &str,
        ctx: &NamingContext,
        path: &str,
    ) -> Result<TypeRef> {
        match (self.wrapper.decide(node, kind), node.enum_values()) {
            (WrapperDecision::Enum, Some(values)) => {
                let body = scalar_enum_body(kind, values, path)?;
                self.place_enum(hint, node, body, package, ctx, path, false)
                    .map(TypeRef::Enum)
            }
            _ => Ok(TypeRef::Primitive(kind)),
        }
    }

    /// A map-shaped object used as a field type. Only non-primitive values
    /// produce a generated item type.
    fn map_type(
        &mut self,
        hint: Option<&str>,
        values: &MapValues,
        package: &str,
        ctx: &NamingContext,
        path: &str,
    ) -> Result<TypeRef> {
        let schema = values.schema();
        let item_hint = hint
            .map(|h| format!("{}Item", to_class_name(h)))
            .or_else(|| schema.title.clone());
        let item = self.resolve_node(
            item_hint.as_deref(),
            schema,
            package,
            ctx,
            &format!("{path}/{}", values.keyword()),
        )?;
        Ok(TypeRef::Map(Box::new(item)))
    }

    // =========================================================================
    // Classes
    // =========================================================================

    fn class_for(
        &mut self,
        name: &str,
        node: &SchemaNode,
        package: &str,
        ctx: &NamingContext,
        path: &str,
    ) -> Result<TypeName> {
        let object = node.as_object().ok_or_else(|| {
            CodegenError::unsupported(
                path,
                format!("a '{}' schema where a class is required", node.type_name()),
            )
        })?;
        if node.enum_values().is_some() {
            return Err(CodegenError::unsupported(
                path,
                "an enum schema where a class is required",
            ));
        }

        if let Some(alternatives) = &object.one_of {
            return self.sealed_class(name, node, alternatives, package, ctx, path);
        }
        if let Some(values) = &object.map_values {
            return self.map_wrapper(name, node, values, package, ctx, path);
        }
        self.data_class(name, node, object, package, ctx, path)
    }

    /// Pick a name for a class with `fingerprint`, registering it.
    fn claim_class(
        &mut self,
        original: &str,
        fingerprint: &Fingerprint,
        package: &str,
        ctx: &NamingContext,
        path: &str,
    ) -> Result<ClassSlot> {
        let original = to_class_name(original);
        if original.is_empty() {
            return Err(CodegenError::malformed(path, "name produces an empty class name"));
        }

        let candidate = {
            let registries = &*self.registries;
            derive_class_name(self.options.class_naming, &original, ctx.parent_name(), |name| {
                registries.classes.has_conflict(package, name, fingerprint)
                    || registries.enums.separate(package, name).is_some()
            })
        };

        let claim = self
            .registries
            .claim_class_name(
                package,
                conflict_candidates(&candidate, ctx.parent_name(), ctx.feature_name()),
                fingerprint,
            )
            .ok_or_else(|| CodegenError::malformed(path, format!("no free class name for {candidate}")))?;

        let type_name = TypeName::new(package, &claim.name);
        if claim.existing {
            debug!(class = %type_name, "reusing structurally identical class");
            return Ok(ClassSlot::Existing(type_name));
        }
        if claim.renamed {
            debug!(from = %candidate, to = %type_name, "renamed structurally conflicting class");
        }
        Ok(ClassSlot::Fresh(type_name))
    }

    fn data_class(
        &mut self,
        name: &str,
        node: &SchemaNode,
        object: &ObjectSchema,
        package: &str,
        ctx: &NamingContext,
        path: &str,
    ) -> Result<TypeName> {
        let fingerprint = node.fingerprint();
        let type_name = match self.claim_class(name, &fingerprint, package, ctx, path)? {
            ClassSlot::Existing(existing) => return Ok(existing),
            ClassSlot::Fresh(fresh) => fresh,
        };

        // registered before the fields so nested schemas can attach to it
        self.registries.classes.insert_class(
            ClassDescriptor::new(&type_name, fingerprint, ClassKind::Plain, ctx.role)
                .with_schema_metadata(node),
        );

        let child_package = child_package(package, ctx.role);
        let child_ctx = ctx.descend(Some(type_name.clone()));
        let mut fields = Vec::with_capacity(object.properties.len());
        for (property, schema) in &object.properties {
            let ty = self.resolve_node(
                Some(property),
                schema,
                &child_package,
                &child_ctx,
                &format!("{path}/{property}"),
            )?;
            fields.push(FieldDescriptor::from_schema(
                property,
                ty,
                object.is_required(property),
                schema,
            ));
        }

        if let Some(class) = self
            .registries
            .classes
            .class_mut(&type_name.package, &type_name.name)
        {
            class.kind = if fields.is_empty() {
                ClassKind::Plain
            } else {
                ClassKind::Data
            };
            class.fields = fields;
        }
        Ok(type_name)
    }

    fn map_wrapper(
        &mut self,
        name: &str,
        node: &SchemaNode,
        values: &MapValues,
        package: &str,
        ctx: &NamingContext,
        path: &str,
    ) -> Result<TypeName> {
        let fingerprint = node.fingerprint();
        let wrapper = match self.claim_class(name, &fingerprint, package, ctx, path)? {
            ClassSlot::Existing(existing) => return Ok(existing),
            ClassSlot::Fresh(fresh) => fresh,
        };
        self.registries.classes.insert_class(
            ClassDescriptor::new(&wrapper, fingerprint, ClassKind::MapWrapper, ctx.role)
                .with_schema_metadata(node),
        );

        let value_ctx = ctx.descend(Some(wrapper.clone()));
        let item_hint = format!("{}Item", wrapper.name);
        let value = self.resolve_node(
            Some(&item_hint),
            values.schema(),
            &child_package(package, ctx.role),
            &value_ctx,
            &format!("{path}/{}", values.keyword()),
        )?;

        if let Some(class) = self.registries.classes.class_mut(&wrapper.package, &wrapper.name) {
            class.map_value = Some(value);
        }
        Ok(wrapper)
    }

    fn sealed_class(
        &mut self,
        name: &str,
        node: &SchemaNode,
        alternatives: &[SchemaNode],
        package: &str,
        ctx: &NamingContext,
        path: &str,
    ) -> Result<TypeName> {
        let fingerprint = node.fingerprint();
        let sealed = match self.claim_class(name, &fingerprint, package, ctx, path)? {
            ClassSlot::Existing(existing) => return Ok(existing),
            ClassSlot::Fresh(fresh) => fresh,
        };
        self.registries.classes.insert_class(
            ClassDescriptor::new(&sealed, fingerprint, ClassKind::Sealed, ctx.role)
                .with_schema_metadata(node),
        );

        let variant_package = child_package(package, ctx.role);
        let variant_ctx = ctx.descend(Some(sealed.clone()));
        let alias_shaped = !alternatives.is_empty()
            && alternatives
                .iter()
                .all(|alt| single_primitive_property(alt).is_some());

        let mut variants = Vec::with_capacity(alternatives.len());
        for (index, alternative) in alternatives.iter().enumerate() {
            let alt_path = format!("{path}/oneOf/{index}");
            let variant = match single_primitive_property(alternative).filter(|_| alias_shaped) {
                Some((property, kind)) => TypeRef::Alias(self.alias(
                    property,
                    TypeRef::Primitive(kind),
                    Some(&sealed),
                    &variant_package,
                    &variant_ctx,
                    &alt_path,
                )?),
                None => self.sealed_variant(
                    &sealed,
                    index,
                    alternative,
                    &variant_package,
                    &variant_ctx,
                    &alt_path,
                )?,
            };
            variants.push(variant);
        }

        if let Some(class) = self.registries.classes.class_mut(&sealed.package, &sealed.name) {
            class.variants = variants;
        }
        Ok(sealed)
    }

    /// One alternative of a sealed class that is not alias-shaped
    fn sealed_variant(
        &mut self,
        sealed: &TypeName,
        index: usize,
        alternative: &SchemaNode,
        package: &str,
        ctx: &NamingContext,
        path: &str,
    ) -> Result<TypeRef> {
        let name = alternative
            .title
            .clone()
            .or_else(|| {
                alternative
                    .as_object()
                    .and_then(ObjectSchema::sole_property)
                    .map(|(property, _)| property.clone())
            })
            .unwrap_or_else(|| format!("{}Option{}", sealed.name, index + 1));

        let resolved = if alternative.as_object().is_some() && alternative.enum_values().is_none() {
            TypeRef::Class(self.class_at(&name, alternative, package, ctx, path)?)
        } else {
            self.resolve_node(Some(&name), alternative, package, ctx, path)?
        };

        match resolved {
            TypeRef::Class(class_name) => {
                if let Some(class) = self
                    .registries
                    .classes
                    .class_mut(&class_name.package, &class_name.name)
                {
                    if !class.sealed_parents.contains(sealed) {
                        class.sealed_parents.push(sealed.clone());
                    }
                }
                Ok(TypeRef::Class(class_name))
            }
            other => self
                .alias(&name, other, Some(sealed), package, ctx, path)
                .map(TypeRef::Alias),
        }
    }

    fn alias(
        &mut self,
        name: &str,
        target: TypeRef,
        sealed_parent: Option<&TypeName>,
        package: &str,
        ctx: &NamingContext,
        path: &str,
    ) -> Result<TypeName> {
        let fingerprint = Fingerprint::from_members([("alias", target.signature())]);
        match self.claim_class(name, &fingerprint, package, ctx, path)? {
            ClassSlot::Existing(existing) => Ok(existing),
            ClassSlot::Fresh(alias) => {
                self.registries.classes.insert_alias(AliasDescriptor {
                    package: alias.package.clone(),
                    name: alias.name.clone(),
                    target,
                    sealed_parent: sealed_parent.cloned(),
                    fingerprint,
                });
                Ok(alias)
            }
        }
    }

    // =========================================================================
    // Enums
    // =========================================================================

    #[allow(clippy::too_many_arguments)]
    fn place_enum(
        &mut self,
        hint: Option<&str>,
        node: &SchemaNode,
        body: EnumBody,
        package: &str,
        ctx: &NamingContext,
        path: &str,
        force_separate: bool,
    ) -> Result<TypeName> {
        let original = hint
            .or(node.title.as_deref())
            .map(to_class_name)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| CodegenError::malformed(path, "enum schema needs a field name or title"))?;

        let owner = match (self.options.enum_placement, &ctx.parent) {
            (EnumPlacement::Inline, Some(owner)) if !force_separate => Some(owner.clone()),
            _ => None,
        };

        let mut descriptor = EnumDescriptor {
            package: package.to_string(),
            name: original,
            owner: None,
            constants: body.constants,
            backing: body.backing,
            fields: body.fields,
            fingerprint: body.fingerprint,
            description: node.description.clone(),
        };

        match owner {
            Some(owner) => {
                descriptor.package = owner.package.clone();
                descriptor.owner = Some(owner.name.clone());
                let type_name = descriptor.type_name();

                self.registries.enums.register_inline(descriptor.clone());
                if let Some(class) = self.registries.classes.class_mut(&owner.package, &owner.name) {
                    match class.nested_enums.iter_mut().find(|e| e.name == descriptor.name) {
                        Some(existing) => *existing = descriptor,
                        None => class.nested_enums.push(descriptor),
                    }
                }
                Ok(type_name)
            }
            None => {
                descriptor.name = self.separate_enum_name(&descriptor, ctx, path)?;
                let type_name = descriptor.type_name();
                self.registries.enums.register_separate(descriptor)?;
                Ok(type_name)
            }
        }
    }

    /// Name of a top-level enum. Names held by classes or aliases are never
    /// shared; a name held by an enum with other values is only avoided when
    /// the naming policy offers a compound name, otherwise registration
    /// reports the conflict.
    fn separate_enum_name(&self, descriptor: &EnumDescriptor, ctx: &NamingContext, path: &str) -> Result<String> {
        let registries = &*self.registries;
        let package = descriptor.package.as_str();
        let other_enum = |name: &str| {
            registries
                .enums
                .separate(package, name)
                .is_some_and(|existing| existing.fingerprint != descriptor.fingerprint)
        };

        let derived = derive_class_name(
            self.options.class_naming,
            &descriptor.name,
            ctx.parent_name(),
            |name| registries.classes.is_registered(package, name) || other_enum(name),
        );
        if !registries.classes.is_registered(package, &derived) {
            return Ok(derived);
        }

        let renamed = conflict_candidates(&derived, ctx.parent_name(), ctx.feature_name())
            .find(|name| !registries.classes.is_registered(package, name) && !other_enum(name))
            .ok_or_else(|| CodegenError::malformed(path, format!("no free enum name for {derived}")))?;
        debug!(package, from = %derived, to = %renamed, "renamed enum clashing with a class");
        Ok(renamed)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Feature classes keep their nested types in a `properties` sub-package
fn child_package(package: &str, role: Role) -> String {
    match role {
        Role::Feature => format!("{package}.properties"),
        Role::FeatureProperty | Role::Attribute | Role::Other => package.to_string(),
    }
}

fn class_hint(hint: Option<&str>, node: &SchemaNode, path: &str) -> Result<String> {
    hint.or(node.title.as_deref())
        .map(to_class_name)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| CodegenError::malformed(path, "object schema needs a field name or title"))
}

/// `(property, kind)` of an object whose only property is a plain primitive
fn single_primitive_property(node: &SchemaNode) -> Option<(&str, ScalarKind)> {
    let object = node.as_object()?;
    if node.enum_values().is_some() || object.one_of.is_some() || object.map_values.is_some() {
        return None;
    }
    let (name, schema) = object.sole_property()?;
    if schema.enum_values().is_some() {
        return None;
    }
    schema.scalar_kind().map(|kind| (name.as_str(), kind))
}

fn unique_constant(name: String, seen: &mut HashSet<String>) -> String {
    if seen.insert(name.clone()) {
        return name;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{name}_{n}");
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn enum_fingerprint(backing: EnumBacking, fields: &[EnumField], values: &[Value]) -> Fingerprint {
    let fields: Vec<Value> = fields
        .iter()
        .map(|f| json!([f.json_name, f.kind.json_type()]))
        .collect();
    Fingerprint::from_json(&json!({
        "backing": backing.as_str(),
        "fields": fields,
        "values": values,
    }))
}

fn scalar_enum_body(kind: ScalarKind, values: &[Value], path: &str) -> Result<EnumBody> {
    let mut seen = HashSet::new();
    let mut constants = Vec::with_capacity(values.len());

    for value in values.iter().filter(|v| !v.is_null()) {
        let matches = match (kind, ScalarKind::of_value(value)) {
            (ScalarKind::Number, Some(ScalarKind::Integer)) => true,
            (expected, Some(actual)) => expected == actual,
            (_, None) => false,
        };
        if !matches {
            return Err(CodegenError::malformed(
                path,
                format!("enum value {value} is not of type {}", kind.json_type()),
            ));
        }
        let label = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        constants.push(EnumConstant {
            name: unique_constant(to_enum_constant(&label), &mut seen),
            value: value.clone(),
        });
    }

    let backing = EnumBacking::from(kind);
    Ok(EnumBody {
        fingerprint: enum_fingerprint(backing, &[], values),
        backing,
        fields: Vec::new(),
        constants,
    })
}

/// An enum whose values are records. Fields come from the declared
/// properties, or are inferred from the values when none are declared.
fn object_enum_body(object: &ObjectSchema, values: &[Value], path: &str) -> Result<EnumBody> {
    let mut fields: Vec<EnumField> = Vec::new();
    for (name, schema) in &object.properties {
        let kind = schema.scalar_kind().ok_or_else(|| {
            CodegenError::unsupported(path, format!("non-primitive field '{name}' in an object enum"))
        })?;
        fields.push(EnumField {
            json_name: name.clone(),
            name: to_property_name(name),
            kind,
        });
    }

    let records = values
        .iter()
        .map(|value| {
            value
                .as_object()
                .ok_or_else(|| CodegenError::malformed(path, "object enum values must be objects"))
        })
        .collect::<Result<Vec<_>>>()?;

    if fields.is_empty() {
        for record in &records {
            for (key, value) in record.iter() {
                if value.is_null() || fields.iter().any(|f| &f.json_name == key) {
                    continue;
                }
                let kind = ScalarKind::of_value(value).ok_or_else(|| {
                    CodegenError::unsupported(path, format!("non-primitive value of '{key}' in an object enum"))
                })?;
                fields.push(EnumField {
                    json_name: key.clone(),
                    name: to_property_name(key),
                    kind,
                });
            }
        }
    }

    let mut seen = HashSet::new();
    let constants = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let label = ["name", "title"]
                .iter()
                .find_map(|key| record.get(*key).and_then(Value::as_str))
                .or_else(|| record.values().find_map(Value::as_str));
            let name = match label {
                Some(label) => to_enum_constant(label),
                None => format!("{ENUM_CONSTANT_MARKER}{index}"),
            };
            EnumConstant {
                name: unique_constant(name, &mut seen),
                value: Value::Object((*record).clone()),
            }
        })
        .collect();

    Ok(EnumBody {
        fingerprint: enum_fingerprint(EnumBacking::Object, &fields, values),
        backing: EnumBacking::Object,
        fields,
        constants,
    })
}
