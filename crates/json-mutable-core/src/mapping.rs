//! String-keyed tracked mapping with nested coercion on write.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::container::TrackedContainer;
use crate::error::TrackError;
use crate::node::{value_kind, TrackedNode};
use crate::signal::{ChangeSignal, RootHandle};

/// Key-unique string-keyed mapping over [`TrackedNode`].
///
/// Every write coerces incoming plain values into tracked nodes parented at
/// this mapping's root, reparents incoming tracked nodes, and fires exactly
/// one change notification per public call. Reads never notify.
#[derive(Debug)]
pub struct TrackedMapping {
    root: RootHandle,
    entries: IndexMap<String, TrackedNode>,
}

impl TrackedMapping {
    /// Empty, self-rooted mapping with a fresh change signal.
    pub fn new() -> Self {
        TrackedMapping {
            root: ChangeSignal::new_root(),
            entries: IndexMap::new(),
        }
    }

    /// Construction coercion: builds a self-rooted tree from a plain JSON
    /// object, recursively coercing every child. A freshly built tree is
    /// clean — construction does not notify.
    pub fn from_value(value: Value) -> Result<Self, TrackError> {
        match value {
            Value::Object(map) => {
                let root = ChangeSignal::new_root();
                Ok(TrackedMapping::from_entries(map, &root))
            }
            other => Err(TrackError::ShapeMismatch {
                expected: "mapping",
                found: value_kind(&other),
            }),
        }
    }

    pub(crate) fn from_entries(map: Map<String, Value>, root: &RootHandle) -> Self {
        let mut entries = IndexMap::with_capacity(map.len());
        for (key, value) in map {
            entries.insert(key, TrackedNode::coerce(value, root));
        }
        TrackedMapping {
            root: RootHandle::clone(root),
            entries,
        }
    }

    /// Idempotent normalization: a node that already is a tracked mapping is
    /// returned unchanged, anything else is a shape mismatch.
    pub fn coerce(node: TrackedNode) -> Result<Self, TrackError> {
        match node {
            TrackedNode::Mapping(map) => Ok(map),
            other => Err(TrackError::ShapeMismatch {
                expected: "mapping",
                found: other.kind_name(),
            }),
        }
    }

    /// Coerces `value` and stores it under `key`, returning the previous
    /// node, if any. One notification.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<TrackedNode> {
        let node = TrackedNode::coerce(value, &self.root);
        let previous = self.entries.insert(key.into(), node);
        self.notify_changed();
        previous
    }

    /// Stores an already-tracked node under `key`, reparenting it (and its
    /// descendants) to this mapping's root first.
    pub fn insert_node(&mut self, key: impl Into<String>, node: TrackedNode) -> Option<TrackedNode> {
        let node = TrackedNode::adopt(node, &self.root);
        let previous = self.entries.insert(key.into(), node);
        self.notify_changed();
        previous
    }

    /// Removes `key`, notifying only when an entry was actually removed.
    /// Preserves the insertion order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<TrackedNode> {
        let removed = self.entries.shift_remove(key);
        if removed.is_some() {
            self.notify_changed();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.notify_changed();
    }

    /// Bulk update from a plain JSON object: every value is coerced, existing
    /// keys are overwritten, and a single notification fires for the whole
    /// call regardless of entry count.
    pub fn merge(&mut self, value: Value) -> Result<(), TrackError> {
        match value {
            Value::Object(map) => {
                for (key, value) in map {
                    let node = TrackedNode::coerce(value, &self.root);
                    self.entries.insert(key, node);
                }
                self.notify_changed();
                Ok(())
            }
            other => Err(TrackError::ShapeMismatch {
                expected: "mapping",
                found: value_kind(&other),
            }),
        }
    }

    pub fn get(&self, key: &str) -> Option<&TrackedNode> {
        self.entries.get(key)
    }

    /// Mutable access to a child. Mutating the child through its own tracked
    /// interface notifies this tree's root, since the child shares it.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut TrackedNode> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrackedNode)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Plain JSON object projection, preserving entry insertion order.
    pub fn to_value(&self) -> Value {
        let mut map = Map::with_capacity(self.entries.len());
        for (key, node) in &self.entries {
            map.insert(key.clone(), node.to_value());
        }
        Value::Object(map)
    }
}

impl Default for TrackedMapping {
    fn default() -> Self {
        TrackedMapping::new()
    }
}

impl TrackedContainer for TrackedMapping {
    fn root(&self) -> &RootHandle {
        &self.root
    }

    fn set_root(&mut self, root: &RootHandle) {
        self.root = RootHandle::clone(root);
        for node in self.entries.values_mut() {
            node.set_root(root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_coerces_and_notifies_once() {
        let mut map = TrackedMapping::new();
        map.insert("a", json!({"b": [1, 2, 3]}));
        assert_eq!(map.root().generation(), 1);
        let child = map.get("a").unwrap();
        assert!(child.is_mapping());
        assert!(child.as_mapping().unwrap().get("b").unwrap().is_sequence());
    }

    #[test]
    fn from_value_rejects_non_mapping() {
        let err = TrackedMapping::from_value(json!([1, 2])).unwrap_err();
        assert_eq!(
            err,
            TrackError::ShapeMismatch {
                expected: "mapping",
                found: "sequence"
            }
        );
    }

    #[test]
    fn construction_does_not_notify() {
        let map = TrackedMapping::from_value(json!({"a": {"b": 1}})).unwrap();
        assert_eq!(map.root().generation(), 0);
    }

    #[test]
    fn remove_notifies_only_on_hit() {
        let mut map = TrackedMapping::from_value(json!({"a": 1})).unwrap();
        assert!(map.remove("missing").is_none());
        assert_eq!(map.root().generation(), 0);
        assert!(map.remove("a").is_some());
        assert_eq!(map.root().generation(), 1);
    }

    #[test]
    fn merge_is_one_notification() {
        let mut map = TrackedMapping::from_value(json!({"a": 1})).unwrap();
        map.merge(json!({"b": {"c": 2}, "d": [3], "a": 0})).unwrap();
        assert_eq!(map.root().generation(), 1);
        assert_eq!(map.to_value(), json!({"a": 0, "b": {"c": 2}, "d": [3]}));
    }

    #[test]
    fn merge_rejects_scalar() {
        let mut map = TrackedMapping::new();
        assert!(map.merge(json!("nope")).is_err());
        assert_eq!(map.root().generation(), 0);
    }

    #[test]
    fn insert_node_adopts_foreign_subtree() {
        let mut map = TrackedMapping::new();
        let detached = TrackedMapping::from_value(json!({"x": [1]})).unwrap();
        map.insert_node("sub", TrackedNode::Mapping(detached));
        let sub = map.get("sub").unwrap().as_mapping().unwrap();
        assert!(ChangeSignal::same_root(sub.root(), map.root()));
        let inner = sub.get("x").unwrap().as_sequence().unwrap();
        assert!(ChangeSignal::same_root(inner.root(), map.root()));
    }

    #[test]
    fn clear_notifies() {
        let mut map = TrackedMapping::from_value(json!({"a": 1})).unwrap();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.root().generation(), 1);
    }
}
