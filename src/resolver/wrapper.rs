//! Wrapper-type policy
//!
//! Decides, for every primitive-typed schema, whether it is emitted as a
//! bare primitive or wrapped in a generated enum.

use crate::schema::{ScalarKind, SchemaNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapperDecision {
    Primitive,
    Enum,
}

pub trait WrapperPolicy: Send + Sync {
    fn decide(&self, node: &SchemaNode, kind: ScalarKind) -> WrapperDecision;
}

/// Wraps a primitive in an enum exactly when it declares enum values
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumWrapperPolicy;

impl WrapperPolicy for EnumWrapperPolicy {
    fn decide(&self, node: &SchemaNode, _kind: ScalarKind) -> WrapperDecision {
        if node.enum_values().is_some() {
            WrapperDecision::Enum
        } else {
            WrapperDecision::Primitive
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaKind;
    use serde_json::json;

    #[test]
    fn test_enum_wrapper_policy() {
        let policy = EnumWrapperPolicy;
        let plain = SchemaNode::new(SchemaKind::String);
        let with_values = SchemaNode::new(SchemaKind::String).with_enumeration(vec![json!("on")]);
        let empty = SchemaNode::new(SchemaKind::String).with_enumeration(Vec::new());

        assert_eq!(policy.decide(&plain, ScalarKind::String), WrapperDecision::Primitive);
        assert_eq!(policy.decide(&with_values, ScalarKind::String), WrapperDecision::Enum);
        assert_eq!(policy.decide(&empty, ScalarKind::String), WrapperDecision::Primitive);
    }
}
