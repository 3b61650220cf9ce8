use std::{
    fs::{self, OpenOptions},
    io::{ErrorKind, Write},
    path::Path,
};

use tracing::info;

use crate::config_store::ConfigError;

/// Creates an empty store file (`{}`) if none exists at `path`.
///
/// Parent directories are created as needed. An existing file is left
/// untouched, whatever its content. Returns whether a file was created.
///
/// # Errors
/// Returns `ConfigError::IoError` if the directory or file cannot be created.
pub fn create_default_store_file(path: &Path) -> Result<bool, ConfigError> {
    let io_error = |e: std::io::Error, path: &Path| ConfigError::IoError {
        path: path.to_path_buf(),
        details: e.to_string(),
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(e, parent))?;
    }

    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(io_error(e, path)),
    };

    file.write_all(b"{}\n").map_err(|e| io_error(e, path))?;
    info!("Created empty config store at {}", path.display());

    Ok(true)
}
