//! Error types for tiergrid.

use thiserror::Error;

/// Errors raised by the proximity index and its store.
#[derive(Error, Debug)]
pub enum TierGridError {
    /// A caller-supplied value was rejected (radius, configuration, storage path).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A stored payload could not be decoded back into an entity.
    #[error("Malformed payload for document '{id}': {source}")]
    MalformedPayload {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// The entity could not be encoded into a payload.
    #[error("Failed to serialize entity '{id}': {source}")]
    PayloadEncoding {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    /// An on-disk snapshot or commit log is not one we wrote.
    #[error("Invalid index file: {0}")]
    InvalidFormat(String),

    /// The segment body could not be encoded or decoded.
    #[error("Segment encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// Filesystem failure while opening, reading or committing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store was closed; reopen it to continue.
    #[error("Index store is closed")]
    StoreClosed,
}

/// Result type for tiergrid operations.
pub type Result<T> = std::result::Result<T, TierGridError>;
