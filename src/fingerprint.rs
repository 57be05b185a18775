//! Structural fingerprints for generated types
//!
//! Two same-named entities are the same type exactly when their fingerprints
//! are equal. Fingerprints are computed from a canonical form so that key
//! order in the source document never matters.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// SHA256 digest of a canonical structural description
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Hash a string that is already in canonical form
    pub fn from_canonical(content: &str) -> Self {
        Self(hex_digest(Sha256::digest(content.as_bytes()).as_slice()))
    }

    /// Compute a fingerprint from a JSON value with object keys sorted
    pub fn from_json(value: &Value) -> Self {
        Self::from_canonical(&canonical_json(value))
    }

    /// Compute a fingerprint from `(member name, member type)` pairs.
    ///
    /// Member order is irrelevant: the pairs are sorted before hashing.
    pub fn from_members<I, N, T>(members: I) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: AsRef<str>,
        T: AsRef<str>,
    {
        let mut entries: Vec<String> = members
            .into_iter()
            .map(|(name, ty)| format!("{}:{}", name.as_ref(), ty.as_ref()))
            .collect();
        entries.sort();
        Self::from_canonical(&entries.join(";"))
    }

    /// Abbreviated form for log output
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn hex_digest(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Serialize a JSON value with all object keys in sorted order.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        scalar => out.push_str(&scalar.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fingerprint_consistency() {
        let value = json!({"type": "object", "properties": {"a": {"type": "string"}}});
        assert_eq!(Fingerprint::from_json(&value), Fingerprint::from_json(&value));
    }

    #[test]
    fn test_key_order_is_irrelevant() {
        let a: Value = serde_json::from_str(r#"{"b": 1, "a": {"y": true, "x": null}}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"a": {"x": null, "y": true}, "b": 1}"#).unwrap();
        assert_eq!(Fingerprint::from_json(&a), Fingerprint::from_json(&b));
        assert_eq!(canonical_json(&a), r#"{"a":{"x":null,"y":true},"b":1}"#);
    }

    #[test]
    fn test_array_order_matters() {
        let a = json!(["ON", "OFF"]);
        let b = json!(["OFF", "ON"]);
        assert_ne!(Fingerprint::from_json(&a), Fingerprint::from_json(&b));
    }

    #[test]
    fn test_digest_is_lowercase_hex() {
        let fingerprint = Fingerprint::from_canonical("abc");
        assert_eq!(
            fingerprint.to_string(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(fingerprint.short(), "ba7816bf8f01");
    }

    #[test]
    fn test_members_are_sorted() {
        let a = Fingerprint::from_members([("level", "Long"), ("name", "String")]);
        let b = Fingerprint::from_members([("name", "String"), ("level", "Long")]);
        let c = Fingerprint::from_members([("name", "String")]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
