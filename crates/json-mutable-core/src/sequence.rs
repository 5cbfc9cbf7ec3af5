//! Index-addressed tracked sequence with nested coercion on write.

use std::cmp::Ordering;
use std::ops::Range;

use serde_json::Value;

use crate::container::TrackedContainer;
use crate::error::TrackError;
use crate::node::{value_kind, TrackedNode};
use crate::signal::{ChangeSignal, RootHandle};

/// Ordered sequence of [`TrackedNode`].
///
/// Same discipline as [`TrackedMapping`](crate::TrackedMapping): writes
/// coerce plain values, adopt tracked nodes, and fire exactly one change
/// notification per public call. Bulk operations ([`extend`](Self::extend),
/// [`splice`](Self::splice)) coerce every element and still notify once.
#[derive(Debug)]
pub struct TrackedSequence {
    root: RootHandle,
    items: Vec<TrackedNode>,
}

impl TrackedSequence {
    /// Empty, self-rooted sequence with a fresh change signal.
    pub fn new() -> Self {
        TrackedSequence {
            root: ChangeSignal::new_root(),
            items: Vec::new(),
        }
    }

    /// Construction coercion from a plain JSON array. Does not notify.
    pub fn from_value(value: Value) -> Result<Self, TrackError> {
        match value {
            Value::Array(items) => {
                let root = ChangeSignal::new_root();
                Ok(TrackedSequence::from_items(items, &root))
            }
            other => Err(TrackError::ShapeMismatch {
                expected: "sequence",
                found: value_kind(&other),
            }),
        }
    }

    pub(crate) fn from_items(items: Vec<Value>, root: &RootHandle) -> Self {
        TrackedSequence {
            root: RootHandle::clone(root),
            items: items
                .into_iter()
                .map(|value| TrackedNode::coerce(value, root))
                .collect(),
        }
    }

    /// Idempotent normalization: already a tracked sequence → unchanged,
    /// anything else → shape mismatch.
    pub fn coerce(node: TrackedNode) -> Result<Self, TrackError> {
        match node {
            TrackedNode::Sequence(seq) => Ok(seq),
            other => Err(TrackError::ShapeMismatch {
                expected: "sequence",
                found: other.kind_name(),
            }),
        }
    }

    /// Replaces the element at `index` with the coerced `value`, returning
    /// the old node.
    pub fn set(&mut self, index: usize, value: Value) -> Result<TrackedNode, TrackError> {
        if index >= self.items.len() {
            return Err(TrackError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        let node = TrackedNode::coerce(value, &self.root);
        let previous = std::mem::replace(&mut self.items[index], node);
        self.notify_changed();
        Ok(previous)
    }

    /// Replaces the element at `index` with an already-tracked node,
    /// reparenting it to this sequence's root first.
    pub fn set_node(&mut self, index: usize, node: TrackedNode) -> Result<TrackedNode, TrackError> {
        if index >= self.items.len() {
            return Err(TrackError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        let node = TrackedNode::adopt(node, &self.root);
        let previous = std::mem::replace(&mut self.items[index], node);
        self.notify_changed();
        Ok(previous)
    }

    pub fn push(&mut self, value: Value) {
        let node = TrackedNode::coerce(value, &self.root);
        self.items.push(node);
        self.notify_changed();
    }

    /// Inserts before `index`; `index == len` appends.
    pub fn insert(&mut self, index: usize, value: Value) -> Result<(), TrackError> {
        if index > self.items.len() {
            return Err(TrackError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        let node = TrackedNode::coerce(value, &self.root);
        self.items.insert(index, node);
        self.notify_changed();
        Ok(())
    }

    /// Appends every value, coercing each; one notification for the whole
    /// call regardless of element count.
    pub fn extend<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = Value>,
    {
        for value in values {
            let node = TrackedNode::coerce(value, &self.root);
            self.items.push(node);
        }
        self.notify_changed();
    }

    /// Replaces `range` with the coerced `values`, returning the removed
    /// nodes. Bulk coercion, one notification.
    pub fn splice(
        &mut self,
        range: Range<usize>,
        values: Vec<Value>,
    ) -> Result<Vec<TrackedNode>, TrackError> {
        let len = self.items.len();
        if range.start > range.end || range.end > len {
            return Err(TrackError::IndexOutOfBounds {
                index: range.end,
                len,
            });
        }
        let root = RootHandle::clone(&self.root);
        let replacement: Vec<TrackedNode> = values
            .into_iter()
            .map(|value| TrackedNode::coerce(value, &root))
            .collect();
        let removed: Vec<TrackedNode> = self.items.splice(range, replacement).collect();
        self.notify_changed();
        Ok(removed)
    }

    pub fn remove(&mut self, index: usize) -> Result<TrackedNode, TrackError> {
        if index >= self.items.len() {
            return Err(TrackError::IndexOutOfBounds {
                index,
                len: self.items.len(),
            });
        }
        let removed = self.items.remove(index);
        self.notify_changed();
        Ok(removed)
    }

    /// Removes and returns the last element; a pop from an empty sequence is
    /// a no-op and does not notify.
    pub fn pop(&mut self) -> Option<TrackedNode> {
        let popped = self.items.pop();
        if popped.is_some() {
            self.notify_changed();
        }
        popped
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.notify_changed();
    }

    pub fn reverse(&mut self) {
        self.items.reverse();
        self.notify_changed();
    }

    /// In-place sort by the caller's comparator; one notification.
    pub fn sort_by<F>(&mut self, cmp: F)
    where
        F: FnMut(&TrackedNode, &TrackedNode) -> Ordering,
    {
        self.items.sort_by(cmp);
        self.notify_changed();
    }

    pub fn get(&self, index: usize) -> Option<&TrackedNode> {
        self.items.get(index)
    }

    /// Mutable access to an element. Mutating it through its own tracked
    /// interface notifies this tree's root, since the element shares it.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut TrackedNode> {
        self.items.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedNode> {
        self.items.iter()
    }

    /// Plain JSON array projection.
    pub fn to_value(&self) -> Value {
        Value::Array(self.items.iter().map(TrackedNode::to_value).collect())
    }
}

impl Default for TrackedSequence {
    fn default() -> Self {
        TrackedSequence::new()
    }
}

impl TrackedContainer for TrackedSequence {
    fn root(&self) -> &RootHandle {
        &self.root
    }

    fn set_root(&mut self, root: &RootHandle) {
        self.root = RootHandle::clone(root);
        for node in &mut self.items {
            node.set_root(root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn push_coerces_nested_values() {
        let mut seq = TrackedSequence::new();
        seq.push(json!({"a": [1]}));
        assert_eq!(seq.root().generation(), 1);
        let child = seq.get(0).unwrap().as_mapping().unwrap();
        assert!(ChangeSignal::same_root(child.root(), seq.root()));
    }

    #[test]
    fn from_value_rejects_non_sequence() {
        let err = TrackedSequence::from_value(json!({"a": 1})).unwrap_err();
        assert_eq!(
            err,
            TrackError::ShapeMismatch {
                expected: "sequence",
                found: "mapping"
            }
        );
    }

    #[test]
    fn set_out_of_bounds() {
        let mut seq = TrackedSequence::from_value(json!([1])).unwrap();
        let err = seq.set(3, json!(0)).unwrap_err();
        assert_eq!(err, TrackError::IndexOutOfBounds { index: 3, len: 1 });
        assert_eq!(seq.root().generation(), 0);
    }

    #[test]
    fn extend_notifies_once() {
        let mut seq = TrackedSequence::new();
        seq.extend([json!(1), json!({"a": 2}), json!([3])]);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.root().generation(), 1);
    }

    #[test]
    fn splice_replaces_range_with_one_notification() {
        let mut seq = TrackedSequence::from_value(json!([1, 2, 3, 4])).unwrap();
        let removed = seq.splice(1..3, vec![json!("x"), json!({"y": 0})]).unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(seq.to_value(), json!([1, "x", {"y": 0}, 4]));
        assert_eq!(seq.root().generation(), 1);
    }

    #[test]
    fn splice_rejects_bad_range() {
        let mut seq = TrackedSequence::from_value(json!([1])).unwrap();
        assert!(seq.splice(0..5, vec![]).is_err());
        assert_eq!(seq.root().generation(), 0);
    }

    #[test]
    fn pop_on_empty_does_not_notify() {
        let mut seq = TrackedSequence::new();
        assert!(seq.pop().is_none());
        assert_eq!(seq.root().generation(), 0);
    }

    #[test]
    fn reverse_and_sort_each_notify_once() {
        let mut seq = TrackedSequence::from_value(json!([3, 1, 2])).unwrap();
        seq.reverse();
        assert_eq!(seq.to_value(), json!([2, 1, 3]));
        seq.sort_by(|a, b| {
            let (a, b) = (a.to_value(), b.to_value());
            a.as_i64().cmp(&b.as_i64())
        });
        assert_eq!(seq.to_value(), json!([1, 2, 3]));
        assert_eq!(seq.root().generation(), 2);
    }

    #[test]
    fn set_node_adopts_foreign_subtree() {
        let mut seq = TrackedSequence::from_value(json!([null])).unwrap();
        let detached = TrackedSequence::from_value(json!([{"a": 1}])).unwrap();
        seq.set_node(0, TrackedNode::Sequence(detached)).unwrap();
        let inner = seq.get(0).unwrap().as_sequence().unwrap();
        assert!(ChangeSignal::same_root(inner.root(), seq.root()));
    }
}
