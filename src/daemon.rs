use std::{future::Future, path::Path};

use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::{
    NitroshareError, Result,
    config::{ConfigPaths, DeviceIdentity, KEY_DEVICE_NAME, create_default_store_file},
    config_store::{ConfigStore, StoreOptions},
};

/// Provisions the store file in `config_dir` if needed and loads it.
///
/// # Errors
/// Returns `NitroshareError::Config` if the file cannot be created, read or
/// parsed.
#[instrument(skip_all, fields(config_dir = %config_dir.display()))]
pub fn open_store(config_dir: &Path, options: StoreOptions) -> Result<ConfigStore> {
    let path = ConfigPaths::store_file(config_dir);
    create_default_store_file(&path)?;

    Ok(ConfigStore::load_with_options(&path, options)?)
}

/// Reads `key` for display without changing the store.
///
/// With a `default`, the key is read through [`ConfigStore::get`], so an
/// absent key takes the default and keeps it. Without one, an absent key
/// yields `None` and nothing is assigned.
pub fn read_value(store: &ConfigStore, key: &str, default: Option<&str>) -> Option<String> {
    match default {
        Some(default) => Some(store.get(key, default)),
        None => store.snapshot().remove(key),
    }
}

/// The running service: its settings store and the identity it announces.
pub struct Daemon {
    store: ConfigStore,
    identity: DeviceIdentity,
    name_logger: JoinHandle<()>,
}

impl Daemon {
    /// Opens the store and bootstraps the device identity.
    ///
    /// # Errors
    /// Returns an error if the store cannot be provisioned or loaded.
    pub fn start(config_dir: &Path, options: StoreOptions) -> Result<Self> {
        let store = open_store(config_dir, options)?;
        let identity = DeviceIdentity::ensure(&store);

        info!(uuid = %identity.uuid, name = %identity.name, "Device identity ready");

        let mut names = store.watch(KEY_DEVICE_NAME);
        let name_logger = tokio::spawn(async move {
            while let Some(name) = names.recv().await {
                info!(%name, "Device name changed");
            }
        });

        Ok(Self {
            store,
            identity,
            name_logger,
        })
    }

    /// The settings store.
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// The identity read or generated at start.
    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Waits for SIGINT or SIGTERM, then shuts down.
    ///
    /// # Errors
    /// Returns `NitroshareError::Daemon` if signal handlers cannot be installed.
    pub async fn run_until_signal(self) -> Result<()> {
        self.run_until(wait_for_signal()).await
    }

    /// Runs until `stop` resolves, then shuts down.
    ///
    /// The store is closed even when `stop` fails, so pending changes such as
    /// a freshly generated identity still reach the disk.
    ///
    /// # Errors
    /// Returns the error `stop` resolved with.
    pub async fn run_until<F>(self, stop: F) -> Result<()>
    where
        F: Future<Output = Result<()>>,
    {
        let outcome = stop.await;
        match &outcome {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!(error = %e, "Waiting for shutdown failed"),
        }

        self.shutdown().await;
        outcome
    }

    /// Closes the store, flushing pending changes and ending every watcher.
    #[instrument(skip(self))]
    pub async fn shutdown(self) {
        self.store.close().await;
        let _ = self.name_logger.await;
    }
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let signal_error = |e: std::io::Error| NitroshareError::Daemon(format!("signal handler: {e}"));

    let mut terminate = signal(SignalKind::terminate()).map_err(signal_error)?;
    let mut interrupt = signal(SignalKind::interrupt()).map_err(signal_error)?;

    tokio::select! {
        _ = terminate.recv() => {}
        _ = interrupt.recv() => {}
    }

    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| NitroshareError::Daemon(format!("signal handler: {e}")))
}
