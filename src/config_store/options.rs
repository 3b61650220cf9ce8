use std::time::Duration;

/// Quiescence period after the last mutation before the mapping is written.
pub const DEFAULT_DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Delay before a failed write is attempted again.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Tuning knobs for a [`ConfigStore`](super::ConfigStore).
///
/// ```rust
/// use std::time::Duration;
/// use nitroshare::config_store::StoreOptions;
///
/// let options = StoreOptions::default()
///     .with_debounce_window(Duration::from_millis(100))
///     .with_retry_delay(None);
/// assert!(options.flush_on_close);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// How long the store must stay quiet before the mapping is written.
    pub debounce_window: Duration,

    /// Re-arm delay after a failed write. `None` waits for the next mutation.
    pub retry_delay: Option<Duration>,

    /// Whether closing the store performs the write of an armed timer.
    pub flush_on_close: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            debounce_window: DEFAULT_DEBOUNCE_WINDOW,
            retry_delay: Some(DEFAULT_RETRY_DELAY),
            flush_on_close: true,
        }
    }
}

impl StoreOptions {
    /// Sets the debounce window.
    pub fn with_debounce_window(mut self, window: Duration) -> Self {
        self.debounce_window = window;
        self
    }

    /// Sets the retry delay used after a failed write.
    pub fn with_retry_delay(mut self, delay: Option<Duration>) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets whether an armed timer is flushed on close.
    pub fn with_flush_on_close(mut self, flush: bool) -> Self {
        self.flush_on_close = flush;
        self
    }
}
