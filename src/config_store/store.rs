use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::{
    runtime::Handle,
    sync::mpsc::{self, UnboundedSender},
    task::JoinHandle,
};
use tracing::{debug, error, info, instrument};

use super::{
    ConfigError, PersistStats, StoreOptions, WatchStream, atomic,
    broadcast::Entry,
    persistence::{self, Counters, PersistCommand, Persister},
};

/// Key/value map shared between the store handle and its persistence task
pub(super) type Entries = Arc<Mutex<HashMap<String, Entry>>>;

/// Locks the map, recovering the guard if a previous holder panicked.
///
/// Every critical section leaves the map consistent, so a poisoned lock
/// still guards valid data.
pub(super) fn lock(entries: &Entries) -> MutexGuard<'_, HashMap<String, Entry>> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A thread-safe, persistent string key/value store with live change
/// notification.
///
/// Reads and writes happen in memory under a single lock. Every change is
/// fanned out to the [`WatchStream`]s registered for its key and schedules a
/// debounced write of the whole mapping, performed by a background task that
/// atomically replaces the durable JSON file.
///
/// One store is created per process from a pre-provisioned file and handed to
/// the subsystems that need it by reference. [`close`](ConfigStore::close)
/// consumes the store, ending every watch stream.
///
/// ```rust,no_run
/// use nitroshare::config_store::ConfigStore;
///
/// # async fn example() -> Result<(), nitroshare::config_store::ConfigError> {
/// let store = ConfigStore::load("/var/lib/nitroshare/config.json")?;
///
/// let mut names = store.watch("net.nitroshare.device_name");
/// store.set("net.nitroshare.device_name", "workstation");
/// assert_eq!(names.recv().await.as_deref(), Some("workstation"));
///
/// store.close().await;
/// # Ok(())
/// # }
/// ```
pub struct ConfigStore {
    path: PathBuf,
    entries: Entries,
    command_tx: UnboundedSender<PersistCommand>,
    counters: Arc<Counters>,
    handle: JoinHandle<()>,
}

impl ConfigStore {
    /// Loads a store from the JSON file at `path` with default options.
    ///
    /// # Errors
    /// * `ConfigError::IoError` - If the file is missing or unreadable
    /// * `ConfigError::ParseError` - If the file is not a JSON object of strings
    /// * `ConfigError::ServiceUnavailable` - If called outside a Tokio runtime
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with_options(path, StoreOptions::default())
    }

    /// Loads a store from the JSON file at `path`.
    ///
    /// The file must already exist; an empty mapping `{}` is a valid start.
    /// The persistence task is spawned on the current Tokio runtime.
    ///
    /// # Errors
    /// * `ConfigError::IoError` - If the file is missing or unreadable
    /// * `ConfigError::ParseError` - If the file is not a JSON object of strings
    /// * `ConfigError::ServiceUnavailable` - If called outside a Tokio runtime
    #[instrument(skip(path, options), fields(path = %path.as_ref().display()))]
    pub fn load_with_options(
        path: impl AsRef<Path>,
        options: StoreOptions,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();

        let runtime = Handle::try_current().map_err(|e| ConfigError::ServiceUnavailable {
            service: "persistence".to_string(),
            details: e.to_string(),
        })?;

        let values = atomic::read_mapping(&path)?;
        info!("Loaded {} config values", values.len());

        let entries: HashMap<String, Entry> = values
            .into_iter()
            .map(|(key, value)| (key, Entry::with_value(value)))
            .collect();
        let entries = Arc::new(Mutex::new(entries));

        let counters = Arc::new(Counters::default());
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let persister = Persister {
            path: path.clone(),
            entries: Arc::clone(&entries),
            options,
            counters: Arc::clone(&counters),
        };
        let handle = persister.spawn(&runtime, command_rx);

        Ok(Self {
            path,
            entries,
            command_tx,
            counters,
            handle,
        })
    }

    /// Returns the value for `key`, assigning `default` if it has none.
    ///
    /// An assigned default behaves like a [`set`](ConfigStore::set): watchers
    /// of the key receive it and it is persisted, so later calls return it
    /// whatever default they pass.
    pub fn get(&self, key: &str, default: &str) -> String {
        let mut entries = lock(&self.entries);
        let entry = entries.entry(key.to_string()).or_default();

        if let Some(value) = &entry.value {
            return value.clone();
        }

        entry.assign(key, default);
        drop(entries);

        debug!(key, "Assigned default value");
        self.schedule_persist();

        default.to_string()
    }

    /// Assigns `value` to `key`.
    ///
    /// Assigning the value the key already holds does nothing. Otherwise the
    /// value is delivered to every watcher of the key before this returns and
    /// a debounced write is scheduled.
    ///
    /// A key that is only watched holds no value yet, not `""`, so assigning
    /// `""` to it counts as a change and notifies its watchers.
    pub fn set(&self, key: &str, value: impl AsRef<str>) {
        let value = value.as_ref();

        let changed = lock(&self.entries)
            .entry(key.to_string())
            .or_default()
            .assign(key, value);

        if changed {
            debug!(key, "Config value changed");
            self.schedule_persist();
        }
    }

    /// Subscribes to every value assigned to `key` from now on.
    ///
    /// Watching a key that does not exist yet is allowed; the stream receives
    /// its first value once something assigns one.
    pub fn watch(&self, key: &str) -> WatchStream {
        lock(&self.entries)
            .entry(key.to_string())
            .or_default()
            .subscribe(key)
    }

    /// Returns the assigned values, as they would be written to disk.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        persistence::snapshot(&self.entries)
    }

    /// Returns how many writes have succeeded and failed so far.
    pub fn stats(&self) -> PersistStats {
        self.counters.stats()
    }

    /// Path of the durable file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stops the persistence task and ends every watch stream.
    ///
    /// A write still waiting out its debounce window is performed first when
    /// [`StoreOptions::flush_on_close`] is set. Returns once the task has
    /// exited.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn close(self) {
        let _ = self.command_tx.send(PersistCommand::Shutdown);

        if let Err(e) = self.handle.await {
            error!(error = %e, "Persistence task did not stop cleanly");
        }

        info!("Config store closed");
    }

    #[cfg(test)]
    pub(super) fn watcher_count(&self, key: &str) -> usize {
        lock(&self.entries)
            .get(key)
            .map_or(0, |entry| entry.watcher_count())
    }

    fn schedule_persist(&self) {
        if self.command_tx.send(PersistCommand::Schedule).is_err() {
            error!(path = %self.path.display(), "Persistence task is not running");
        }
    }
}
