//! The tracked tree node sum type and the recursive coercion rule.

use serde_json::Value;

use crate::container::TrackedContainer;
use crate::mapping::TrackedMapping;
use crate::sequence::TrackedSequence;
use crate::signal::RootHandle;

/// One node of a tracked tree.
///
/// The `Value` arm only ever holds scalars (null, bool, number, string);
/// [`coerce`](Self::coerce) routes plain objects and arrays into the
/// container arms, so a plain mapping or sequence never survives as a direct
/// child of a tracked container.
#[derive(Debug)]
pub enum TrackedNode {
    Value(Value),
    Mapping(TrackedMapping),
    Sequence(TrackedSequence),
}

/// Short shape name of a plain value, used in mismatch errors.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

impl TrackedNode {
    /// Recursively converts a plain value into a tracked node parented at
    /// `root`. Objects become [`TrackedMapping`]s, arrays become
    /// [`TrackedSequence`]s, scalars are stored as-is. Consumes the source
    /// value, so the resulting tree never aliases the caller's containers.
    pub fn coerce(value: Value, root: &RootHandle) -> TrackedNode {
        match value {
            Value::Object(map) => {
                TrackedNode::Mapping(TrackedMapping::from_entries(map, root))
            }
            Value::Array(items) => {
                TrackedNode::Sequence(TrackedSequence::from_items(items, root))
            }
            scalar => TrackedNode::Value(scalar),
        }
    }

    /// Reparents an already-tracked node (and all of its descendants) to
    /// `root` and returns it. Used when a tracked subtree moves into an
    /// existing tree.
    pub fn adopt(mut node: TrackedNode, root: &RootHandle) -> TrackedNode {
        node.set_root(root);
        node
    }

    /// Reparents this node in place. A no-op for scalars, which carry no
    /// root reference.
    pub fn set_root(&mut self, root: &RootHandle) {
        match self {
            TrackedNode::Value(_) => {}
            TrackedNode::Mapping(map) => map.set_root(root),
            TrackedNode::Sequence(seq) => seq.set_root(root),
        }
    }

    /// Plain-value projection of this subtree. Tracked wrappers never reach
    /// the storage boundary; this is what gets encoded.
    pub fn to_value(&self) -> Value {
        match self {
            TrackedNode::Value(scalar) => scalar.clone(),
            TrackedNode::Mapping(map) => map.to_value(),
            TrackedNode::Sequence(seq) => seq.to_value(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            TrackedNode::Value(scalar) => value_kind(scalar),
            TrackedNode::Mapping(_) => "mapping",
            TrackedNode::Sequence(_) => "sequence",
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, TrackedNode::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, TrackedNode::Sequence(_))
    }

    pub fn as_mapping(&self) -> Option<&TrackedMapping> {
        match self {
            TrackedNode::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut TrackedMapping> {
        match self {
            TrackedNode::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&TrackedSequence> {
        match self {
            TrackedNode::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut TrackedSequence> {
        match self {
            TrackedNode::Sequence(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            TrackedNode::Value(scalar) => Some(scalar),
            _ => None,
        }
    }
}

impl PartialEq for TrackedNode {
    /// Value equality over the plain projection; root identity is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.to_value() == other.to_value()
    }
}
