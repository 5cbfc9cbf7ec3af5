//! Wire codec between the tree's plain-value projection and storage.
//!
//! Stateless, used only at the storage boundary. Which profile applies is
//! configuration supplied by the environment: a backend either accepts
//! structured JSON natively or requires text.

use serde_json::Value;

use crate::error::CodecError;
use crate::stable;

/// Storage backend JSON capability profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Backend stores structured JSON values directly; no transcoding.
    Native,
    /// Backend stores text; values cross the boundary as canonical JSON.
    TextOnly,
}

/// The shape a column value takes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    Native(Value),
    Text(String),
}

/// Encodes a plain value for storage under the given dialect.
pub fn encode(value: &Value, dialect: Dialect) -> StoredValue {
    match dialect {
        Dialect::Native => StoredValue::Native(value.clone()),
        Dialect::TextOnly => StoredValue::Text(stable::stringify(value)),
    }
}

/// Decodes a stored value back to a plain JSON value. Malformed text
/// surfaces as [`CodecError::Decode`]; no repair is attempted.
pub fn decode(stored: StoredValue) -> Result<Value, CodecError> {
    match stored {
        StoredValue::Native(value) => Ok(value),
        StoredValue::Text(text) => Ok(serde_json::from_str(&text)?),
    }
}
