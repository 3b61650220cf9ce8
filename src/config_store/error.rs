use std::path::PathBuf;

/// Errors that can occur while loading or persisting the configuration store.
///
/// Only construction surfaces these to callers. Failures inside the
/// background persistence task are logged and counted instead, since the
/// in-memory state stays authoritative.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The durable file could not be opened or read.
    #[error("I/O error on '{path}': {details}")]
    IoError {
        /// Path where the I/O error occurred
        path: PathBuf,
        /// I/O error details
        details: String,
    },

    /// The durable file is not a JSON object of string values.
    #[error("failed to parse JSON from {location}: {details}")]
    ParseError {
        /// Location of the document (file path, "string", etc.)
        location: String,
        /// Parse error details
        details: String,
    },

    /// Error occurred while serializing the mapping
    #[error("failed to serialize {content_type}: {details}")]
    SerializationError {
        /// Type of content being serialized
        content_type: String,
        /// Serialization error details
        details: String,
    },

    /// Error occurred while persisting the mapping to disk
    #[error("failed to persist config to '{path}': {details}")]
    PersistenceError {
        /// Path where persistence failed
        path: PathBuf,
        /// Error details from the persistence operation
        details: String,
    },

    /// A required service is unavailable
    #[error("{service} service unavailable: {details}")]
    ServiceUnavailable {
        /// Name of the service that is unavailable
        service: String,
        /// Details about why the service is unavailable
        details: String,
    },
}
