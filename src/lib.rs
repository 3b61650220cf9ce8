//! NitroShare - cross-platform file transfer daemon.
//!
//! The heart of the crate is a persistent, thread-safe settings store whose
//! changes can be watched live:
//!
//! - In-memory key/value map shared by any number of readers and writers
//! - Per-key watch streams that see every assigned value, in order
//! - Debounced, atomic persistence to a JSON file
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use nitroshare::config::{KEY_DEVICE_NAME, create_default_store_file};
//! use nitroshare::config_store::ConfigStore;
//!
//! # async fn example() -> nitroshare::Result<()> {
//! let path = std::path::Path::new("/tmp/nitroshare/config.json");
//! create_default_store_file(path)?;
//!
//! let store = ConfigStore::load(path)?;
//! let name = store.get(KEY_DEVICE_NAME, "my-laptop");
//! println!("Device name: {name}");
//!
//! store.close().await;
//! # Ok(())
//! # }
//! ```

/// Configuration paths, well-known keys and store provisioning.
pub mod config;

/// Persistent key/value store with change notification.
pub mod config_store;

/// Core error types and result aliases.
pub mod core;

/// Service lifecycle around the settings store.
pub mod daemon;

/// File transfer items.
pub mod file;

/// Transfer items and their wire headers.
pub mod protocol;

/// Logging setup.
pub mod tracing_config;

/// Re-exported core types for convenience.
pub use crate::core::{NitroshareError, Result};
