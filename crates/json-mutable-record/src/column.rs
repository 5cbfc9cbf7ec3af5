//! Schema-time column registry.
//!
//! The association between a column and its tracked shape/dialect is an
//! explicit table built once during schema setup and consulted when record
//! instances bind their attributes — not a hidden process-wide registry.

use std::collections::BTreeMap;

use crate::attribute::JsonAttribute;
use crate::codec::Dialect;
use crate::error::RecordError;

/// The tracked container shape a column is declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Mapping,
    Sequence,
}

/// Declaration of one nested-tracked JSON column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub kind: ColumnKind,
    pub dialect: Dialect,
}

/// Registration table: column name → [`ColumnSpec`]. Built once at schema
/// setup, then shared read-only by every record instance.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    columns: BTreeMap<String, ColumnSpec>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        SchemaRegistry {
            columns: BTreeMap::new(),
        }
    }

    /// Registers a column; a second registration under the same name is a
    /// schema defect and errors.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        spec: ColumnSpec,
    ) -> Result<(), RecordError> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(RecordError::DuplicateColumn(name));
        }
        self.columns.insert(name, spec);
        Ok(())
    }

    pub fn spec(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.get(name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Creates the per-record-instance binding for a registered column.
    pub fn bind(&self, name: &str) -> Result<JsonAttribute, RecordError> {
        let spec = self
            .spec(name)
            .ok_or_else(|| RecordError::UnknownColumn(name.to_owned()))?;
        Ok(JsonAttribute::new(*spec))
    }
}
