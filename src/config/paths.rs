use std::{
    env,
    io::{Error, ErrorKind},
    path::{Path, PathBuf},
};

/// Name of the durable key/value file inside the config directory.
pub const STORE_FILE_NAME: &str = "config.json";

/// Utility struct for managing configuration file paths
///
/// Provides methods to locate configuration directories and files following
/// the XDG Base Directory specification
pub struct ConfigPaths;

impl ConfigPaths {
    /// Returns the configuration directory path for the application
    ///
    /// Follows the XDG Base Directory specification:
    /// - First checks `XDG_CONFIG_HOME`
    /// - Falls back to `$HOME/.config`
    /// - Appends "nitroshare" to the base config directory
    ///
    /// # Errors
    /// Returns an error if neither `XDG_CONFIG_HOME` nor `HOME` environment variables are set
    pub fn config_dir() -> Result<PathBuf, Error> {
        let config_home = env::var("XDG_CONFIG_HOME")
            .or_else(|_| env::var("HOME").map(|home| format!("{home}/.config")))
            .map_err(|_| {
                Error::new(
                    ErrorKind::NotFound,
                    "Neither XDG_CONFIG_HOME nor HOME environment variable found",
                )
            })?;

        Ok(PathBuf::from(config_home).join("nitroshare"))
    }

    /// Returns the path of the durable store file inside `config_dir`
    pub fn store_file(config_dir: &Path) -> PathBuf {
        config_dir.join(STORE_FILE_NAME)
    }

    /// Returns the application data directory path
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    /// Returns an error if HOME environment variable is not set or directory cannot be created
    pub fn app_data_dir() -> Result<PathBuf, Error> {
        let data_dir = env::var("HOME")
            .map(|home| format!("{home}/.nitroshare"))
            .map_err(|_| Error::new(ErrorKind::NotFound, "HOME environment variable not found"))?;

        let app_dir = PathBuf::from(data_dir);

        if !app_dir.exists() {
            std::fs::create_dir_all(&app_dir)?;
        }

        Ok(app_dir)
    }

    /// Get the application log directory
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    /// Returns error if directory cannot be created
    pub fn log_dir() -> Result<PathBuf, Error> {
        let log_dir = Self::app_data_dir()?.join("logs");

        if !log_dir.exists() {
            std::fs::create_dir_all(&log_dir)?;
        }

        Ok(log_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_file_is_inside_config_dir() {
        let dir = Path::new("/etc/nitroshare");

        assert_eq!(
            ConfigPaths::store_file(dir),
            PathBuf::from("/etc/nitroshare/config.json")
        );
    }
}
