//! Per-record binding of a tracked JSON column value.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use json_mutable_core::{
    RootHandle, TrackedContainer, TrackedMapping, TrackedNode, TrackedSequence,
};

use crate::codec;
use crate::column::{ColumnKind, ColumnSpec};
use crate::error::RecordError;

type ChangeHook = Rc<RefCell<Box<dyn FnMut()>>>;

fn invoke(hook: &ChangeHook) {
    let mut hook = hook.borrow_mut();
    (&mut **hook)();
}

/// One record instance's attribute slot for a nested-tracked JSON column.
///
/// Owns the root tree exclusively. Any notification reaching the root's
/// signal is forwarded, untransformed, to the record's change hook; wholesale
/// reassignment discards the old tree (its signal is unsubscribed, so a
/// detached old tree can no longer dirty this record).
pub struct JsonAttribute {
    spec: ColumnSpec,
    root: Option<TrackedNode>,
    hook: Option<ChangeHook>,
    hook_subscription: Option<u64>,
    clean_generation: u64,
    assigned_dirty: bool,
}

impl JsonAttribute {
    pub fn new(spec: ColumnSpec) -> Self {
        JsonAttribute {
            spec,
            root: None,
            hook: None,
            hook_subscription: None,
            clean_generation: 0,
            assigned_dirty: false,
        }
    }

    pub fn spec(&self) -> &ColumnSpec {
        &self.spec
    }

    /// Registers the record's "this attribute changed" hook. Fires once per
    /// change notification reaching the current root, and survives wholesale
    /// root replacement.
    pub fn set_change_hook<F>(&mut self, hook: F)
    where
        F: FnMut() + 'static,
    {
        self.detach_hook();
        self.hook = Some(Rc::new(RefCell::new(Box::new(hook))));
        self.attach_hook();
    }

    /// Wholesale assignment: the old tree is discarded and returned, the new
    /// value is coerced per the column's declared shape (`ShapeMismatch`
    /// surfaces immediately), and the record is notified once. `null` clears
    /// the attribute.
    pub fn assign(&mut self, value: Value) -> Result<Option<TrackedNode>, RecordError> {
        let incoming = self.coerce_for_kind(value)?;
        let previous = self.take();
        self.root = incoming;
        self.attach_hook();
        self.assigned_dirty = true;
        if let Some(signal) = self.signal().map(RootHandle::clone) {
            self.clean_generation = signal.generation();
            signal.notify();
        } else if let Some(hook) = &self.hook {
            invoke(hook);
        }
        Ok(previous)
    }

    /// Hydration from storage: decode, coerce, install. A freshly loaded
    /// value is clean — no notification, no dirty flag.
    pub fn load(&mut self, stored: codec::StoredValue) -> Result<(), RecordError> {
        let value = codec::decode(stored).map_err(RecordError::Codec)?;
        let incoming = self.coerce_for_kind(value)?;
        self.take();
        self.root = incoming;
        self.attach_hook();
        self.mark_clean();
        Ok(())
    }

    /// Projects the tree to its plain value and encodes it for the column's
    /// dialect; an unset attribute flushes as `null`. Marks the attribute
    /// clean.
    pub fn flush(&mut self) -> codec::StoredValue {
        let value = match &self.root {
            Some(node) => node.to_value(),
            None => Value::Null,
        };
        let stored = codec::encode(&value, self.spec.dialect);
        self.mark_clean();
        stored
    }

    /// `true` when the in-memory value has changed since the last load or
    /// flush (wholesale assignment included).
    pub fn is_dirty(&self) -> bool {
        if self.assigned_dirty {
            return true;
        }
        match self.signal() {
            Some(signal) => signal.generation() != self.clean_generation,
            None => false,
        }
    }

    /// Detaches and returns the current tree, unsubscribing the change hook
    /// from its signal. Mutations of the returned tree no longer reach this
    /// record.
    pub fn take(&mut self) -> Option<TrackedNode> {
        self.detach_hook();
        self.root.take()
    }

    pub fn node(&self) -> Option<&TrackedNode> {
        self.root.as_ref()
    }

    pub fn node_mut(&mut self) -> Option<&mut TrackedNode> {
        self.root.as_mut()
    }

    /// Shape-checked mutable access for columns declared as mappings.
    pub fn mapping_mut(&mut self) -> Result<&mut TrackedMapping, RecordError> {
        match self.root.as_mut() {
            Some(node) => {
                let found = node.kind_name();
                node.as_mapping_mut()
                    .ok_or(RecordError::Track(json_mutable_core::TrackError::ShapeMismatch {
                        expected: "mapping",
                        found,
                    }))
            }
            None => Err(RecordError::Unset),
        }
    }

    /// Shape-checked mutable access for columns declared as sequences.
    pub fn sequence_mut(&mut self) -> Result<&mut TrackedSequence, RecordError> {
        match self.root.as_mut() {
            Some(node) => {
                let found = node.kind_name();
                node.as_sequence_mut()
                    .ok_or(RecordError::Track(json_mutable_core::TrackError::ShapeMismatch {
                        expected: "sequence",
                        found,
                    }))
            }
            None => Err(RecordError::Unset),
        }
    }

    fn coerce_for_kind(&self, value: Value) -> Result<Option<TrackedNode>, RecordError> {
        if value.is_null() {
            return Ok(None);
        }
        let node = match self.spec.kind {
            ColumnKind::Mapping => TrackedNode::Mapping(TrackedMapping::from_value(value)?),
            ColumnKind::Sequence => TrackedNode::Sequence(TrackedSequence::from_value(value)?),
        };
        Ok(Some(node))
    }

    fn signal(&self) -> Option<&RootHandle> {
        match self.root.as_ref()? {
            TrackedNode::Mapping(map) => Some(map.root()),
            TrackedNode::Sequence(seq) => Some(seq.root()),
            // coerce_for_kind never installs a scalar root; a scalar here is
            // a defect, and a silent wrong dirty flag would be worse than a
            // panic.
            TrackedNode::Value(_) => unreachable!("attribute root is always a container"),
        }
    }

    fn mark_clean(&mut self) {
        let generation = self.signal().map_or(0, |signal| signal.generation());
        self.assigned_dirty = false;
        self.clean_generation = generation;
    }

    fn attach_hook(&mut self) {
        let Some(hook) = self.hook.as_ref().map(Rc::clone) else {
            return;
        };
        let Some(signal) = self.signal().map(RootHandle::clone) else {
            return;
        };
        let id = signal.subscribe(move || invoke(&hook));
        self.hook_subscription = Some(id);
    }

    fn detach_hook(&mut self) {
        if let Some(id) = self.hook_subscription.take() {
            if let Some(signal) = self.signal() {
                signal.unsubscribe(id);
            }
        }
    }
}

impl std::fmt::Debug for JsonAttribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonAttribute")
            .field("spec", &self.spec)
            .field("root", &self.root)
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Dialect, StoredValue};
    use serde_json::json;
    use std::cell::Cell;

    fn mapping_attr(dialect: Dialect) -> JsonAttribute {
        JsonAttribute::new(ColumnSpec {
            kind: ColumnKind::Mapping,
            dialect,
        })
    }

    #[test]
    fn assign_rejects_wrong_shape() {
        let mut attr = mapping_attr(Dialect::Native);
        assert!(attr.assign(json!([1, 2])).is_err());
        assert!(attr.node().is_none());
        assert!(!attr.is_dirty());
    }

    #[test]
    fn assign_marks_dirty_and_fires_hook_once() {
        let mut attr = mapping_attr(Dialect::Native);
        let calls = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&calls);
        attr.set_change_hook(move || seen.set(seen.get() + 1));
        attr.assign(json!({"a": 1})).unwrap();
        assert!(attr.is_dirty());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn null_assignment_clears_and_dirties() {
        let mut attr = mapping_attr(Dialect::TextOnly);
        attr.load(StoredValue::Text("{\"a\":1}".to_owned())).unwrap();
        let previous = attr.assign(json!(null)).unwrap();
        assert!(previous.is_some());
        assert!(attr.node().is_none());
        assert!(attr.is_dirty());
        assert_eq!(attr.flush(), StoredValue::Text("null".to_owned()));
    }

    #[test]
    fn load_is_clean_until_mutated() {
        let mut attr = mapping_attr(Dialect::Native);
        attr.load(StoredValue::Native(json!({"meta": {"n": 1}})))
            .unwrap();
        assert!(!attr.is_dirty());
        let meta = attr.mapping_mut().unwrap();
        meta.get_mut("meta")
            .unwrap()
            .as_mapping_mut()
            .unwrap()
            .insert("n", json!(2));
        assert!(attr.is_dirty());
    }

    #[test]
    fn flush_clears_dirty() {
        let mut attr = mapping_attr(Dialect::Native);
        attr.assign(json!({"a": 1})).unwrap();
        assert!(attr.is_dirty());
        attr.flush();
        assert!(!attr.is_dirty());
    }

    #[test]
    fn old_tree_no_longer_reaches_the_record() {
        let mut attr = mapping_attr(Dialect::Native);
        let calls = Rc::new(Cell::new(0u32));
        let seen = Rc::clone(&calls);
        attr.set_change_hook(move || seen.set(seen.get() + 1));

        attr.assign(json!({"a": 1})).unwrap();
        let old = attr.assign(json!({"b": 2})).unwrap().unwrap();
        let calls_after_assigns = calls.get();

        let mut old = TrackedMapping::coerce(old).unwrap();
        old.insert("c", json!(3));
        assert_eq!(calls.get(), calls_after_assigns);

        attr.mapping_mut().unwrap().insert("d", json!(4));
        assert_eq!(calls.get(), calls_after_assigns + 1);
    }

    #[test]
    fn sequence_column_shape_check() {
        let mut attr = JsonAttribute::new(ColumnSpec {
            kind: ColumnKind::Sequence,
            dialect: Dialect::Native,
        });
        attr.assign(json!(["x"])).unwrap();
        assert!(attr.mapping_mut().is_err());
        assert!(attr.sequence_mut().is_ok());
    }

    #[test]
    fn unset_access_errors() {
        let mut attr = mapping_attr(Dialect::Native);
        assert!(matches!(attr.mapping_mut(), Err(RecordError::Unset)));
    }
}
