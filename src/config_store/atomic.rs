use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::Path,
};

use tempfile::NamedTempFile;

use super::ConfigError;

/// Reads the durable file into a key/value mapping.
///
/// # Errors
/// * `ConfigError::IoError` - If the file is missing or unreadable
/// * `ConfigError::ParseError` - If the content is not a JSON object of strings
pub(super) fn read_mapping(path: &Path) -> Result<BTreeMap<String, String>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_path_buf(),
        details: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
        location: path.display().to_string(),
        details: e.to_string(),
    })
}

/// Replaces the durable file with the serialized mapping.
///
/// The document is written to a temporary file in the destination directory,
/// synced, then renamed over the destination so readers never observe a
/// partially written file.
///
/// # Errors
/// * `ConfigError::SerializationError` - If the mapping cannot be encoded
/// * `ConfigError::PersistenceError` - If any file system step fails
pub(super) fn write_mapping(
    path: &Path,
    mapping: &BTreeMap<String, String>,
) -> Result<(), ConfigError> {
    let mut json =
        serde_json::to_string_pretty(mapping).map_err(|e| ConfigError::SerializationError {
            content_type: "config".to_string(),
            details: e.to_string(),
        })?;
    json.push('\n');

    let persistence_error = |e: std::io::Error| ConfigError::PersistenceError {
        path: path.to_path_buf(),
        details: e.to_string(),
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(persistence_error)?;
    tmp.write_all(json.as_bytes()).map_err(persistence_error)?;
    tmp.flush().map_err(persistence_error)?;
    tmp.as_file().sync_all().map_err(persistence_error)?;
    tmp.persist(path).map_err(|e| persistence_error(e.error))?;

    Ok(())
}
