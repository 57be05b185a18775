//! Kotlin Emitter
//!
//! Renders a [`GeneratedModel`] as Kotlin sources annotated for
//! kotlinx-serialization. One file per top-level type:
//!
//! - data and plain classes as `@Serializable` classes, with inline enums
//!   nested in their owner
//! - map wrappers as inline value classes over `Map<String, V>`
//! - sealed classes as sealed interfaces; alias variants become inline
//!   value classes implementing them
//! - other aliases as `typealias`
//! - action interfaces with one suspending function per action
//!
//! Optional DSL builders are appended to the file of each data class.

use std::collections::BTreeSet;

use serde_json::Value;

use super::emit::{Emitter, SourceFile};
use super::profile::RenderProfile;
use super::{ActionInterface, GeneratedModel, GenerationOptions};
use crate::error::Result;
use crate::naming::to_property_name;
use crate::resolver::{
    AliasDescriptor, ClassDescriptor, ClassKind, EnumBacking, EnumDescriptor, EnumField, TypeName,
    TypeRef,
};
use crate::schema::ScalarKind;

const SERIALIZABLE: &str = "kotlinx.serialization.Serializable";
const SERIAL_NAME: &str = "kotlinx.serialization.SerialName";
const JVM_INLINE: &str = "kotlin.jvm.JvmInline";

const HEADER: &str = "// Generated by thingmodel-codegen. Do not edit.";

/// Members every Kotlin enum already declares
const ENUM_MEMBERS: &[&str] = &["name", "ordinal"];

#[derive(Debug, Clone, Default)]
pub struct KotlinEmitter {
    profile: RenderProfile,
    dsl_builders: bool,
    suspend_builders: bool,
}

impl KotlinEmitter {
    pub fn new(profile: RenderProfile) -> Self {
        Self {
            profile,
            dsl_builders: false,
            suspend_builders: false,
        }
    }

    pub fn from_options(options: &GenerationOptions) -> Self {
        Self::new(RenderProfile::kotlin()).with_builders(options.dsl_builders, options.suspend_builders)
    }

    /// Emit DSL builders; `suspending` makes the builder blocks suspend
    pub fn with_builders(mut self, enabled: bool, suspending: bool) -> Self {
        self.dsl_builders = enabled;
        self.suspend_builders = suspending;
        self
    }
}

impl Emitter for KotlinEmitter {
    fn emit(&self, model: &GeneratedModel) -> Result<Vec<SourceFile>> {
        let registries = &model.registries;
        let mut files = Vec::new();

        for class in registries.classes.classes() {
            files.push(self.class_file(class));
        }
        for alias in registries.classes.aliases() {
            files.push(self.alias_file(alias));
        }
        for descriptor in registries.enums.separate_enums() {
            let mut file = KotlinFile::new(&self.profile, &descriptor.package);
            self.enum_decl(&mut file, descriptor, 0);
            files.push(file.finish(&descriptor.name));
        }
        for interface in model.action_interfaces() {
            files.push(self.action_file(interface));
        }
        Ok(files)
    }
}

// =============================================================================
// Source Buffer
// =============================================================================

struct KotlinFile<'p> {
    profile: &'p RenderProfile,
    package: String,
    imports: BTreeSet<String>,
    body: String,
}

impl<'p> KotlinFile<'p> {
    fn new(profile: &'p RenderProfile, package: &str) -> Self {
        Self {
            profile,
            package: package.to_string(),
            imports: BTreeSet::new(),
            body: String::new(),
        }
    }

    fn import(&mut self, path: &str) {
        self.imports.insert(path.to_string());
    }

    fn import_type(&mut self, name: &TypeName) {
        if name.package != self.package {
            self.imports
                .insert(format!("{}.{}", name.package, name.top_level()));
        }
    }

    fn line(&mut self, level: usize, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            self.body.push_str(&self.profile.indent(level));
            self.body.push_str(text);
        }
        self.body.push('\n');
    }

    fn doc(&mut self, level: usize, text: Option<&str>) {
        let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) else {
            return;
        };
        let text = text.replace("*/", "*&#47;");
        let lines: Vec<&str> = text.lines().collect();
        if lines.len() == 1 {
            self.line(level, format!("/** {} */", lines[0]));
            return;
        }
        self.line(level, "/**");
        for line in lines {
            self.line(level, format!(" * {line}").trim_end());
        }
        self.line(level, " */");
    }

    fn type_ref(&mut self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Primitive(kind) => self.profile.scalar_type(*kind).to_string(),
            TypeRef::Class(name) | TypeRef::Enum(name) | TypeRef::Alias(name) => {
                self.import_type(name);
                name.local_name()
            }
            TypeRef::List(item) => {
                let item = self.type_ref(item);
                self.profile.wrap_list(&item)
            }
            TypeRef::Map(item) => {
                let item = self.type_ref(item);
                self.profile.wrap_map(&item)
            }
            TypeRef::Unit => self.profile.wrap_nullable(&self.profile.types.any),
        }
    }

    /// ` : A, B` for the given supertypes
    fn supertypes(&mut self, parents: &[TypeName]) -> String {
        if parents.is_empty() {
            return String::new();
        }
        let names: Vec<String> = parents
            .iter()
            .map(|parent| {
                self.import_type(parent);
                parent.local_name()
            })
            .collect();
        format!(" : {}", names.join(", "))
    }

    fn finish(self, name: &str) -> SourceFile {
        let mut contents = format!("{HEADER}\n");
        if !self.package.is_empty() {
            contents.push_str(&format!("package {}\n", self.package));
        }
        contents.push('\n');
        if !self.imports.is_empty() {
            for import in &self.imports {
                contents.push_str(&format!("import {import}\n"));
            }
            contents.push('\n');
        }
        contents.push_str(self.body.trim_end());
        contents.push('\n');

        SourceFile {
            package: self.package,
            name: name.to_string(),
            extension: self.profile.extension.clone(),
            contents,
        }
    }
}

// =============================================================================
// Declarations
// =============================================================================

impl KotlinEmitter {
    fn class_file(&self, class: &ClassDescriptor) -> SourceFile {
        let mut file = KotlinFile::new(&self.profile, &class.package);
        file.import(SERIALIZABLE);
        file.doc(0, class.description.as_deref().or(class.title.as_deref()));
        if class.deprecated {
            file.line(0, "@Deprecated(\"Deprecated in the Thing Model\")");
        }
        let supertypes = file.supertypes(&class.sealed_parents);

        match class.kind {
            ClassKind::Sealed => {
                file.line(0, "@Serializable");
                let header = format!("sealed interface {}{supertypes}", class.name);
                self.body(&mut file, &header, &class.nested_enums);
            }
            ClassKind::Plain => {
                file.line(0, "@Serializable");
                let header = format!("class {}{supertypes}", class.name);
                self.body(&mut file, &header, &class.nested_enums);
            }
            ClassKind::MapWrapper => {
                file.import(JVM_INLINE);
                let value = class
                    .map_value
                    .as_ref()
                    .map(|ty| file.type_ref(ty))
                    .unwrap_or_else(|| self.profile.types.any.clone());
                file.line(0, "@Serializable");
                file.line(0, "@JvmInline");
                let header = format!(
                    "value class {}(val values: {}){supertypes}",
                    class.name,
                    self.profile.wrap_map(&value)
                );
                self.body(&mut file, &header, &class.nested_enums);
            }
            ClassKind::Data => {
                file.import(SERIAL_NAME);
                file.line(0, "@Serializable");
                file.line(0, format!("data class {}(", class.name));
                for field in &class.fields {
                    file.doc(1, field.description.as_deref());
                    if field.deprecated {
                        file.line(1, "@Deprecated(\"Deprecated in the Thing Model\")");
                    }
                    let ty = file.type_ref(&field.ty);
                    let declaration = if field.nullable {
                        format!("val {}: {} = null", field.name, self.profile.wrap_nullable(&ty))
                    } else {
                        format!("val {}: {ty}", field.name)
                    };
                    file.line(
                        1,
                        format!(
                            "@SerialName({}) {declaration},",
                            self.profile.string_literal(&field.json_name)
                        ),
                    );
                }
                let header = format!("){supertypes}");
                self.body(&mut file, &header, &class.nested_enums);

                if self.dsl_builders {
                    file.line(0, "");
                    self.builder(&mut file, class);
                }
            }
        }
        file.finish(&class.name)
    }

    /// Close a declaration, nesting `enums` in a body when there are any
    fn body(&self, file: &mut KotlinFile<'_>, header: &str, enums: &[EnumDescriptor]) {
        if enums.is_empty() {
            file.line(0, header);
            return;
        }
        file.line(0, format!("{header} {{"));
        for (index, descriptor) in enums.iter().enumerate() {
            if index > 0 {
                file.line(0, "");
            }
            self.enum_decl(file, descriptor, 1);
        }
        file.line(0, "}");
    }

    fn builder(&self, file: &mut KotlinFile<'_>, class: &ClassDescriptor) {
        let builder = format!("{}Builder", class.name);
        file.line(0, format!("class {builder} {{"));
        for field in &class.fields {
            let ty = file.type_ref(&field.ty);
            file.line(1, format!("var {}: {} = null", field.name, self.profile.wrap_nullable(&ty)));
        }
        file.line(0, "");
        file.line(1, format!("fun build(): {} = {}(", class.name, class.name));
        for field in &class.fields {
            if field.nullable {
                file.line(2, format!("{name} = {name},", name = field.name));
            } else {
                file.line(
                    2,
                    format!(
                        "{name} = requireNotNull({name}) {{ {} }},",
                        self.profile.string_literal(&format!("{} is required", field.json_name)),
                        name = field.name
                    ),
                );
            }
        }
        file.line(1, ")");
        file.line(0, "}");
        file.line(0, "");

        let function = to_property_name(&class.name);
        if self.suspend_builders {
            file.line(
                0,
                format!("suspend fun {function}(block: suspend {builder}.() -> Unit): {} {{", class.name),
            );
            file.line(1, format!("val builder = {builder}()"));
            file.line(1, "builder.block()");
            file.line(1, "return builder.build()");
            file.line(0, "}");
        } else {
            file.line(
                0,
                format!(
                    "fun {function}(block: {builder}.() -> Unit): {} = {builder}().apply(block).build()",
                    class.name
                ),
            );
        }
    }

    fn alias_file(&self, alias: &AliasDescriptor) -> SourceFile {
        let mut file = KotlinFile::new(&self.profile, &alias.package);
        let target = file.type_ref(&alias.target);

        match &alias.sealed_parent {
            Some(parent) => {
                file.import(SERIALIZABLE);
                file.import(JVM_INLINE);
                let supertypes = file.supertypes(std::slice::from_ref(parent));
                file.line(0, "@Serializable");
                file.line(0, "@JvmInline");
                file.line(0, format!("value class {}(val value: {target}){supertypes}", alias.name));
            }
            None => file.line(0, format!("typealias {} = {target}", alias.name)),
        }
        file.finish(&alias.name)
    }

    fn action_file(&self, interface: &ActionInterface) -> SourceFile {
        let mut file = KotlinFile::new(&self.profile, &interface.package);
        file.import_type(&interface.action_enum);
        file.line(0, format!("interface {} {{", interface.name));

        for method in &interface.methods {
            file.doc(1, method.description.as_deref());
            let input = method
                .input
                .as_ref()
                .map(|ty| format!("input: {}", file.type_ref(ty)))
                .unwrap_or_default();
            let output = method
                .output
                .as_ref()
                .map(|ty| format!(": {}", file.type_ref(ty)))
                .unwrap_or_default();
            file.line(1, format!("suspend fun {}({input}){output}", method.name));
        }

        let action_enum = interface.action_enum.local_name();
        file.line(0, "");
        file.line(1, format!("val supportedActions: Set<{action_enum}>"));
        file.line(2, format!("get() = {action_enum}.entries.toSet()"));
        file.line(0, "}");
        file.finish(&interface.name)
    }

    fn enum_decl(&self, file: &mut KotlinFile<'_>, descriptor: &EnumDescriptor, level: usize) {
        file.import(SERIALIZABLE);
        file.import(SERIAL_NAME);
        file.doc(level, descriptor.description.as_deref());
        file.line(level, "@Serializable");

        let scalar = backing_kind(descriptor.backing);
        let parameters = match scalar {
            Some(kind) => format!("val value: {}", self.profile.scalar_type(kind)),
            None => descriptor
                .fields
                .iter()
                .map(|field| {
                    format!(
                        "val {}: {}",
                        enum_field_name(field),
                        self.profile.wrap_nullable(self.profile.scalar_type(field.kind))
                    )
                })
                .collect::<Vec<_>>()
                .join(", "),
        };
        file.line(level, format!("enum class {}({parameters}) {{", descriptor.name));

        let last = descriptor.constants.len().saturating_sub(1);
        for (index, constant) in descriptor.constants.iter().enumerate() {
            let (serial, arguments) = match scalar {
                Some(kind) => (serial_name(&constant.value), self.literal(&constant.value, kind)),
                None => (
                    constant.name.clone(),
                    descriptor
                        .fields
                        .iter()
                        .map(|field| match constant.value.get(&field.json_name) {
                            Some(value) => self.literal(value, field.kind),
                            None => "null".to_string(),
                        })
                        .collect::<Vec<_>>()
                        .join(", "),
                ),
            };
            let separator = if index == last { ";" } else { "," };
            file.line(
                level + 1,
                format!(
                    "@SerialName({}) {}({arguments}){separator}",
                    self.profile.string_literal(&serial),
                    constant.name
                ),
            );
        }
        file.line(level, "}");
    }

    fn literal(&self, value: &Value, kind: ScalarKind) -> String {
        match (kind, value) {
            (_, Value::Null) => "null".to_string(),
            (ScalarKind::String, Value::String(s)) => self.profile.string_literal(s),
            (ScalarKind::Integer, Value::Number(n)) => format!("{n}L"),
            (ScalarKind::Number, Value::Number(n)) => {
                let n = n.to_string();
                if n.contains(['.', 'e', 'E']) {
                    n
                } else {
                    format!("{n}.0")
                }
            }
            (ScalarKind::Boolean, Value::Bool(b)) => b.to_string(),
            (_, Value::String(s)) => self.profile.string_literal(s),
            (_, other) => self.profile.string_literal(&other.to_string()),
        }
    }
}

fn backing_kind(backing: EnumBacking) -> Option<ScalarKind> {
    match backing {
        EnumBacking::String => Some(ScalarKind::String),
        EnumBacking::Integer => Some(ScalarKind::Integer),
        EnumBacking::Number => Some(ScalarKind::Number),
        EnumBacking::Boolean => Some(ScalarKind::Boolean),
        EnumBacking::Object => None,
    }
}

fn serial_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn enum_field_name(field: &EnumField) -> String {
    if ENUM_MEMBERS.contains(&field.name.as_str()) {
        format!("{}Value", field.name)
    } else {
        field.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Fingerprint;
    use crate::registry::TypeRegistries;
    use crate::resolver::{EnumConstant, FieldDescriptor, Role};
    use serde_json::json;

    fn model(registries: TypeRegistries) -> GeneratedModel {
        GeneratedModel {
            package: "org.example".to_string(),
            thing: TypeName::new("org.example", "Lamp"),
            attributes: None,
            actions: None,
            features: Vec::new(),
            registries,
        }
    }

    fn mode_enum(owner: Option<&str>) -> EnumDescriptor {
        EnumDescriptor {
            package: "org.example".to_string(),
            name: "Mode".to_string(),
            owner: owner.map(str::to_string),
            constants: vec![
                EnumConstant {
                    name: "ECO".to_string(),
                    value: json!("eco"),
                },
                EnumConstant {
                    name: "AWAY_MODE".to_string(),
                    value: json!("away-mode"),
                },
            ],
            backing: EnumBacking::String,
            fields: Vec::new(),
            fingerprint: Fingerprint::from_canonical("mode"),
            description: None,
        }
    }

    fn heater() -> ClassDescriptor {
        let name = TypeName::new("org.example", "Heater");
        let mut class = ClassDescriptor::new(&name, Fingerprint::from_canonical("heater"), ClassKind::Data, Role::Other);
        class.description = Some("A heater".to_string());
        class.fields = vec![
            FieldDescriptor::new(
                "mode",
                TypeRef::Enum(TypeName::nested("org.example", "Heater", "Mode")),
                true,
            ),
            FieldDescriptor::new(
                "target-temperature",
                TypeRef::Primitive(ScalarKind::Number),
                false,
            ),
            FieldDescriptor::new(
                "zone",
                TypeRef::Class(TypeName::new("org.example.zones", "Zone")),
                true,
            ),
        ];
        class.nested_enums = vec![mode_enum(Some("Heater"))];
        class
    }

    fn source<'a>(files: &'a [SourceFile], name: &str) -> &'a SourceFile {
        files
            .iter()
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("no file for {name}"))
    }

    #[test]
    fn test_data_class_with_nested_enum() {
        let mut registries = TypeRegistries::new();
        registries.classes.insert_class(heater());

        let files = KotlinEmitter::default().emit(&model(registries)).unwrap();
        let file = source(&files, "Heater");
        let text = &file.contents;

        assert!(text.starts_with(HEADER));
        assert!(text.contains("package org.example\n"));
        assert!(text.contains("import org.example.zones.Zone\n"));
        assert!(text.contains("/** A heater */"));
        assert!(text.contains("data class Heater("));
        assert!(text.contains("@SerialName(\"mode\") val mode: Heater.Mode,"));
        assert!(text.contains("@SerialName(\"target-temperature\") val targetTemperature: Double? = null,"));
        assert!(text.contains(") {\n    @Serializable\n    enum class Mode(val value: String) {"));
        assert!(text.contains("@SerialName(\"away-mode\") AWAY_MODE(\"away-mode\");"));
        assert!(!text.contains("HeaterBuilder"));
        assert_eq!(file.relative_path(), std::path::PathBuf::from("org/example/Heater.kt"));
    }

    #[test]
    fn test_dsl_builder() {
        let mut registries = TypeRegistries::new();
        registries.classes.insert_class(heater());

        let plain = KotlinEmitter::default().with_builders(true, false);
        let files = plain.emit(&model(registries)).unwrap();
        let text = &source(&files, "Heater").contents;
        assert!(text.contains("class HeaterBuilder {"));
        assert!(text.contains("mode = requireNotNull(mode) { \"mode is required\" },"));
        assert!(text.contains("targetTemperature = targetTemperature,"));
        assert!(text.contains("fun heater(block: HeaterBuilder.() -> Unit): Heater = HeaterBuilder().apply(block).build()"));

        let mut registries = TypeRegistries::new();
        registries.classes.insert_class(heater());
        let suspending = KotlinEmitter::default().with_builders(true, true);
        let files = suspending.emit(&model(registries)).unwrap();
        let text = &source(&files, "Heater").contents;
        assert!(text.contains("suspend fun heater(block: suspend HeaterBuilder.() -> Unit): Heater {"));
    }

    #[test]
    fn test_sealed_interface_with_alias_variants() {
        let mut registries = TypeRegistries::new();
        let color = TypeName::new("org.example", "Color");
        registries.classes.insert_class(ClassDescriptor::new(
            &color,
            Fingerprint::from_canonical("color"),
            ClassKind::Sealed,
            Role::Other,
        ));
        registries.classes.insert_alias(AliasDescriptor {
            package: "org.example".to_string(),
            name: "ColorHex".to_string(),
            target: TypeRef::Primitive(ScalarKind::String),
            sealed_parent: Some(color.clone()),
            fingerprint: Fingerprint::from_canonical("hex"),
        });
        registries.classes.insert_alias(AliasDescriptor {
            package: "org.example".to_string(),
            name: "Levels".to_string(),
            target: TypeRef::List(Box::new(TypeRef::Primitive(ScalarKind::Integer))),
            sealed_parent: None,
            fingerprint: Fingerprint::from_canonical("levels"),
        });

        let files = KotlinEmitter::default().emit(&model(registries)).unwrap();
        assert!(source(&files, "Color").contents.contains("sealed interface Color\n"));
        assert!(source(&files, "ColorHex")
            .contents
            .contains("@JvmInline\nvalue class ColorHex(val value: String) : Color"));
        assert!(source(&files, "Levels").contents.contains("typealias Levels = List<Long>"));
    }

    #[test]
    fn test_separate_object_enum() {
        let mut registries = TypeRegistries::new();
        registries
            .enums
            .register_separate(EnumDescriptor {
                package: "org.example".to_string(),
                name: "Preset".to_string(),
                owner: None,
                constants: vec![
                    EnumConstant {
                        name: "WARM_WHITE".to_string(),
                        value: json!({"name": "warm white", "kelvin": 2700}),
                    },
                    EnumConstant {
                        name: "VALUE_1".to_string(),
                        value: json!({"kelvin": 9000}),
                    },
                ],
                backing: EnumBacking::Object,
                fields: vec![
                    EnumField {
                        json_name: "name".to_string(),
                        name: "name".to_string(),
                        kind: ScalarKind::String,
                    },
                    EnumField {
                        json_name: "kelvin".to_string(),
                        name: "kelvin".to_string(),
                        kind: ScalarKind::Integer,
                    },
                ],
                fingerprint: Fingerprint::from_canonical("preset"),
                description: None,
            })
            .unwrap();

        let files = KotlinEmitter::default().emit(&model(registries)).unwrap();
        let text = &source(&files, "Preset").contents;
        assert!(text.contains("enum class Preset(val nameValue: String?, val kelvin: Long?) {"));
        assert!(text.contains("@SerialName(\"WARM_WHITE\") WARM_WHITE(\"warm white\", 2700L),"));
        assert!(text.contains("@SerialName(\"VALUE_1\") VALUE_1(null, 9000L);"));
    }

    #[test]
    fn test_literals() {
        let emitter = KotlinEmitter::default();
        assert_eq!(emitter.literal(&json!(2), ScalarKind::Number), "2.0");
        assert_eq!(emitter.literal(&json!(2.5), ScalarKind::Number), "2.5");
        assert_eq!(emitter.literal(&json!(7), ScalarKind::Integer), "7L");
        assert_eq!(emitter.literal(&json!(true), ScalarKind::Boolean), "true");
        assert_eq!(emitter.literal(&Value::Null, ScalarKind::String), "null");
    }
}
