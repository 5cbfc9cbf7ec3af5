//! Storage boundary for tracked JSON columns.
//!
//! Connects a [`json_mutable_core`] tracked tree to a persistent record:
//! - [`codec`] turns the tree's plain-value projection into the wire shape a
//!   storage dialect expects (native structured value, or canonical JSON
//!   text) and back,
//! - [`column`] is the explicit registration table built once at schema
//!   setup, declaring each column's tracked shape and dialect,
//! - [`attribute`] is the per-record binding that owns the root tree,
//!   forwards its change signal to the record's dirty hook, and performs
//!   load/flush at the storage boundary.

pub mod attribute;
pub mod codec;
pub mod column;
pub mod error;
pub mod stable;

pub use attribute::JsonAttribute;
pub use codec::{decode, encode, Dialect, StoredValue};
pub use column::{ColumnKind, ColumnSpec, SchemaRegistry};
pub use error::{CodecError, RecordError};
