use json_mutable_core::TrackError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed JSON text: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Track(#[from] TrackError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("attribute has no value")]
    Unset,
    #[error("unknown column: {0}")]
    UnknownColumn(String),
    #[error("column already registered: {0}")]
    DuplicateColumn(String),
}
