//! Persistent key/value configuration store with live change notification.
//!
//! Values live in memory behind a single lock. Changes are fanned out to
//! per-key watch streams and written to a JSON file by a background task that
//! debounces bursts of mutations into one atomic write.

mod atomic;
mod broadcast;
mod error;
mod options;
mod persistence;
mod store;

#[cfg(test)]
mod tests;

pub use broadcast::WatchStream;
pub use error::ConfigError;
pub use options::{DEFAULT_DEBOUNCE_WINDOW, DEFAULT_RETRY_DELAY, StoreOptions};
pub use persistence::PersistStats;
pub use store::ConfigStore;
