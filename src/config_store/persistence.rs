use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use tokio::{
    runtime::Handle,
    sync::mpsc::UnboundedReceiver,
    task::{self, JoinHandle},
    time::{self, Instant},
};
use tracing::{debug, error, info, trace};

use super::{ConfigError, StoreOptions, atomic, store::Entries};

/// Commands sent from the store to its persistence task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum PersistCommand {
    /// A mutation happened; (re)start the debounce timer
    Schedule,
    /// Stop the task and close every watcher
    Shutdown,
}

/// Where the persistence task is in its debounce cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DebounceState {
    /// Nothing pending
    Idle,
    /// Timer running; a write follows unless another mutation resets it
    Armed,
    /// Snapshot being written to disk
    Writing,
    /// Task has stopped
    Closed,
}

/// Write counters shared between the task and the store handle.
#[derive(Debug, Default)]
pub(super) struct Counters {
    writes: AtomicU64,
    failures: AtomicU64,
}

/// Outcome counts of the persistence task so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistStats {
    /// Writes that reached disk.
    pub writes: u64,
    /// Writes that failed.
    pub failures: u64,
}

impl Counters {
    pub(super) fn stats(&self) -> PersistStats {
        PersistStats {
            writes: self.writes.load(Ordering::Acquire),
            failures: self.failures.load(Ordering::Acquire),
        }
    }
}

/// Owns every write of the mapping to the durable file.
pub(super) struct Persister {
    pub(super) path: PathBuf,
    pub(super) entries: Entries,
    pub(super) options: StoreOptions,
    pub(super) counters: Arc<Counters>,
}

impl Persister {
    pub(super) fn spawn(
        self,
        runtime: &Handle,
        command_rx: UnboundedReceiver<PersistCommand>,
    ) -> JoinHandle<()> {
        runtime.spawn(async move {
            self.run(command_rx).await;
        })
    }

    /// The debounce loop.
    ///
    /// Each `Schedule` pushes the deadline out by one window, so a burst of
    /// mutations produces a single write once the burst ends.
    async fn run(self, mut command_rx: UnboundedReceiver<PersistCommand>) {
        let window = self.options.debounce_window;
        let debounce_sleep = time::sleep(window);
        tokio::pin!(debounce_sleep);

        let mut state = DebounceState::Idle;

        loop {
            tokio::select! {
                command = command_rx.recv() => match command {
                    Some(PersistCommand::Schedule) => {
                        debounce_sleep.as_mut().reset(Instant::now() + window);
                        if state == DebounceState::Idle {
                            trace!("Debounce timer armed");
                        }
                        state = DebounceState::Armed;
                    }
                    Some(PersistCommand::Shutdown) | None => break,
                },

                _ = &mut debounce_sleep, if state == DebounceState::Armed => {
                    state = DebounceState::Writing;
                    trace!(?state, "Debounce window elapsed");

                    let written = self.write_snapshot().await.is_ok();

                    state = match (written, self.options.retry_delay) {
                        (false, Some(delay)) => {
                            debug!("Retrying write in {:?}", delay);
                            debounce_sleep.as_mut().reset(Instant::now() + delay);
                            DebounceState::Armed
                        }
                        _ => DebounceState::Idle,
                    };
                }
            }
        }

        if state == DebounceState::Armed && self.options.flush_on_close {
            debug!("Flushing pending write before close");
            let _ = self.write_snapshot().await;
        }

        self.close_watchers();
        state = DebounceState::Closed;
        info!(path = %self.path.display(), ?state, "Persistence task stopped");
    }

    /// Copies the mapping under the lock, then writes it with the lock released.
    async fn write_snapshot(&self) -> Result<(), ConfigError> {
        let mapping = snapshot(&self.entries);
        let path = self.path.clone();
        let count = mapping.len();

        let result = task::spawn_blocking(move || atomic::write_mapping(&path, &mapping))
            .await
            .unwrap_or_else(|e| {
                Err(ConfigError::PersistenceError {
                    path: self.path.clone(),
                    details: format!("write task failed: {e}"),
                })
            });

        match &result {
            Ok(()) => {
                self.counters.writes.fetch_add(1, Ordering::AcqRel);
                debug!(path = %self.path.display(), keys = count, "Config persisted");
            }
            Err(e) => {
                self.counters.failures.fetch_add(1, Ordering::AcqRel);
                error!(path = %self.path.display(), error = %e, "Failed to persist config");
            }
        }

        result
    }

    fn close_watchers(&self) {
        let mut entries = super::store::lock(&self.entries);
        let closed: usize = entries.values_mut().map(|entry| entry.close_watchers()).sum();
        debug!(closed, "Closed watch streams");
    }
}

/// The mapping exactly as it is persisted: assigned keys only.
pub(super) fn snapshot(entries: &Entries) -> BTreeMap<String, String> {
    super::store::lock(entries)
        .iter()
        .filter_map(|(key, entry)| entry.value.clone().map(|value| (key.clone(), value)))
        .collect()
}
