use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while describing or reading transfer items.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// An item's content could not be inspected or opened
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path of the item content
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// Item metadata or a header could not be encoded
    #[error("failed to serialize {content_type}: {details}")]
    SerializationError {
        /// What was being serialized (e.g. "item meta", "transfer header")
        content_type: String,
        /// Serialization error details
        details: String,
    },
}
