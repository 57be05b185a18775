//! Naming Engine
//!
//! Deterministic, side-effect-free derivation of class names, property
//! names, enum constants and package segments from schema identifiers.
//!
//! Word splitting happens on separators and on case boundaries:
//! - `battery-level` -> `battery`, `level`
//! - `batteryLevel`  -> `battery`, `Level`
//! - `HTTPServer`    -> `HTTP`, `Server`
//!
//! Every word is re-cased as a whole, so all-uppercase tokens such as `ID`
//! become `Id` instead of leaking acronym artifacts into compound names.

use serde::{Deserialize, Serialize};

/// Last-resort prefix for structurally conflicting class names
pub const SHARED_PREFIX: &str = "Shared";

/// Prefix for enum constants that would otherwise be empty or start with a digit
pub const ENUM_CONSTANT_MARKER: &str = "VALUE_";

/// Hard keywords of the target language; these cannot be used as identifiers.
pub const RESERVED_IDENTIFIERS: &[&str] = &[
    "as", "break", "class", "continue", "do", "else", "false", "for", "fun",
    "if", "in", "interface", "is", "null", "object", "package", "return",
    "super", "this", "throw", "true", "try", "typealias", "typeof", "val",
    "var", "when", "while",
];

// =============================================================================
// Class Naming Policy
// =============================================================================

/// How a nested class is named relative to its parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ClassNamingPolicy {
    /// Always `Parent + Original`, unless the original already contains the parent
    #[default]
    AlwaysCompound,
    /// `Original` while it is free, `Parent + Original` once taken
    OriginalThenCompound,
}

/// Derive a class name for `original` nested under `parent`.
///
/// `is_taken` answers whether a name is already used by a different type in
/// the naming scope. It is only consulted by
/// [`ClassNamingPolicy::OriginalThenCompound`].
pub fn derive_class_name<F>(
    policy: ClassNamingPolicy,
    original: &str,
    parent: Option<&str>,
    is_taken: F,
) -> String
where
    F: Fn(&str) -> bool,
{
    match policy {
        ClassNamingPolicy::AlwaysCompound => compound_name(parent, original),
        ClassNamingPolicy::OriginalThenCompound => {
            if !is_taken(original) {
                return original.to_string();
            }
            let compound = compound_name(parent, original);
            if compound != original {
                return compound;
            }
            (2..)
                .map(|n| format!("{original}{n}"))
                .find(|candidate| !is_taken(candidate))
                .unwrap_or_else(|| original.to_string())
        }
    }
}

/// `parent + original`, unless `original` already contains `parent`
/// (case-insensitive), which avoids names like `RoomRoomType`.
pub fn compound_name(parent: Option<&str>, original: &str) -> String {
    match parent {
        Some(parent)
            if !parent.is_empty()
                && !original.to_lowercase().contains(&parent.to_lowercase()) =>
        {
            format!("{parent}{original}")
        }
        _ => original.to_string(),
    }
}

/// Candidate names for a class whose preferred name is held by a
/// structurally different type, in the order they should be tried: the
/// candidate itself, prefixed by the parent, prefixed by the feature,
/// prefixed by [`SHARED_PREFIX`], then numbered shared names.
///
/// The sequence is infinite; callers stop at the first free name.
pub fn conflict_candidates(
    candidate: &str,
    parent: Option<&str>,
    feature: Option<&str>,
) -> impl Iterator<Item = String> {
    let mut fixed: Vec<String> = Vec::with_capacity(4);
    for name in [
        candidate.to_string(),
        compound_name(parent, candidate),
        compound_name(feature, candidate),
        compound_name(Some(SHARED_PREFIX), candidate),
    ] {
        if !fixed.contains(&name) {
            fixed.push(name);
        }
    }
    let shared = compound_name(Some(SHARED_PREFIX), candidate);
    fixed
        .into_iter()
        .chain((2..).map(move |n| format!("{shared}{n}")))
}

// =============================================================================
// Case Conversion
// =============================================================================

/// Split an identifier into words on separators and case boundaries
pub fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();

    for chunk in input.split(|c: char| !c.is_alphanumeric()) {
        let chars: Vec<char> = chunk.chars().collect();
        let mut current = String::new();

        for (i, &c) in chars.iter().enumerate() {
            if i > 0 && !current.is_empty() && c.is_uppercase() {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                let lower_to_upper = prev.is_lowercase() || prev.is_ascii_digit();
                let acronym_end = prev.is_uppercase() && next_is_lower;
                if lower_to_upper || acronym_end {
                    words.push(std::mem::take(&mut current));
                }
            }
            current.push(c);
        }

        if !current.is_empty() {
            words.push(current);
        }
    }

    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Convert an identifier to a class name (`battery-level` -> `BatteryLevel`, `ID` -> `Id`)
pub fn to_class_name(input: &str) -> String {
    split_words(input).iter().map(|w| capitalize(w)).collect()
}

/// Convert an identifier to a property name.
///
/// Reserved identifiers and names starting with a digit get a leading
/// underscore (`class` -> `_class`).
pub fn to_property_name(input: &str) -> String {
    let class_name = to_class_name(input);
    let mut chars = class_name.chars();
    let name: String = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => return "_value".to_string(),
    };

    if is_reserved(&name) || name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name
    }
}

/// Convert a raw enum value to a constant name (`heating-mode` -> `HEATING_MODE`)
pub fn to_enum_constant(input: &str) -> String {
    let name = split_words(input)
        .iter()
        .map(|w| w.to_uppercase())
        .collect::<Vec<_>>()
        .join("_");

    if name.is_empty() {
        ENUM_CONSTANT_MARKER.trim_end_matches('_').to_string()
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("{ENUM_CONSTANT_MARKER}{name}")
    } else {
        name
    }
}

/// Convert a feature or model name into one package segment
pub fn to_package_segment(input: &str) -> String {
    let segment: String = input
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .flat_map(|c| c.to_lowercase())
        .collect();

    if segment.is_empty() {
        "feature".to_string()
    } else if is_reserved(&segment) || segment.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{segment}")
    } else {
        segment
    }
}

pub fn is_reserved(name: &str) -> bool {
    RESERVED_IDENTIFIERS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("battery-level"), vec!["battery", "level"]);
        assert_eq!(split_words("batteryLevel"), vec!["battery", "Level"]);
        assert_eq!(split_words("HTTPServer"), vec!["HTTP", "Server"]);
        assert_eq!(split_words("  __a__b "), vec!["a", "b"]);
        assert_eq!(split_words("level2Max"), vec!["level2", "Max"]);
        assert!(split_words("--").is_empty());
    }

    #[test]
    fn test_to_class_name() {
        assert_eq!(to_class_name("battery-level"), "BatteryLevel");
        assert_eq!(to_class_name("ID"), "Id");
        assert_eq!(to_class_name("deviceID"), "DeviceId");
        assert_eq!(to_class_name("ActionName"), "ActionName");
        assert_eq!(to_class_name("smart_plug"), "SmartPlug");
    }

    #[test]
    fn test_to_property_name() {
        assert_eq!(to_property_name("battery-level"), "batteryLevel");
        assert_eq!(to_property_name("class"), "_class");
        assert_eq!(to_property_name("Temperature"), "temperature");
        assert_eq!(to_property_name("2fa"), "_2fa");
        assert_eq!(to_property_name("%%"), "_value");
    }

    #[test]
    fn test_to_enum_constant() {
        assert_eq!(to_enum_constant("heating-mode"), "HEATING_MODE");
        assert_eq!(to_enum_constant("  on / off  "), "ON_OFF");
        assert_eq!(to_enum_constant("42"), "VALUE_42");
        assert_eq!(to_enum_constant("2.5"), "VALUE_2_5");
        assert_eq!(to_enum_constant("***"), "VALUE");
    }

    #[test]
    fn test_always_compound() {
        let never = |_: &str| false;
        assert_eq!(
            derive_class_name(ClassNamingPolicy::AlwaysCompound, "Type", Some("Room"), never),
            "RoomType"
        );
        assert_eq!(
            derive_class_name(ClassNamingPolicy::AlwaysCompound, "RoomType", Some("Room"), never),
            "RoomType"
        );
        assert_eq!(
            derive_class_name(ClassNamingPolicy::AlwaysCompound, "Type", None, never),
            "Type"
        );
    }

    #[test]
    fn test_original_then_compound() {
        let policy = ClassNamingPolicy::OriginalThenCompound;
        assert_eq!(derive_class_name(policy, "Location", Some("Room"), |_| false), "Location");
        assert_eq!(
            derive_class_name(policy, "Location", Some("Room"), |n| n == "Location"),
            "RoomLocation"
        );
        assert_eq!(
            derive_class_name(policy, "Location", None, |n| n == "Location" || n == "Location2"),
            "Location3"
        );
    }

    #[test]
    fn test_conflict_candidates_order() {
        let names: Vec<String> = conflict_candidates("Status", Some("Lamp"), Some("Light"))
            .take(6)
            .collect();
        assert_eq!(
            names,
            vec![
                "Status",
                "LampStatus",
                "LightStatus",
                "SharedStatus",
                "SharedStatus2",
                "SharedStatus3"
            ]
        );
    }

    #[test]
    fn test_conflict_candidates_skip_duplicates() {
        let names: Vec<String> = conflict_candidates("LampStatus", Some("Lamp"), None)
            .take(3)
            .collect();
        assert_eq!(names, vec!["LampStatus", "SharedLampStatus", "SharedLampStatus2"]);
    }

    #[test]
    fn test_package_segment() {
        assert_eq!(to_package_segment("Smart-Plug"), "smartplug");
        assert_eq!(to_package_segment("object"), "_object");
        assert_eq!(to_package_segment("1st"), "_1st");
    }
}
