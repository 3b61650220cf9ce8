use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures::Stream;
use tokio::sync::mpsc::{
    self, UnboundedSender,
    error::TryRecvError,
};
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::trace;

/// The value of one key plus the streams watching it.
///
/// `value` is `None` for a placeholder created by a watch on a key that has
/// never been assigned.
#[derive(Debug, Default)]
pub(super) struct Entry {
    pub(super) value: Option<String>,
    watchers: Vec<UnboundedSender<String>>,
}

impl Entry {
    pub(super) fn with_value(value: String) -> Self {
        Self {
            value: Some(value),
            watchers: Vec::new(),
        }
    }

    /// Stores `value` and fans it out to every live watcher.
    ///
    /// Returns false when the entry already held exactly this value.
    pub(super) fn assign(&mut self, key: &str, value: &str) -> bool {
        if self.value.as_deref() == Some(value) {
            return false;
        }

        self.value = Some(value.to_string());

        let before = self.watchers.len();
        self.watchers.retain(|tx| tx.send(value.to_string()).is_ok());

        let pruned = before - self.watchers.len();
        if pruned > 0 {
            trace!(key, pruned, "Dropped watchers pruned");
        }

        true
    }

    pub(super) fn subscribe(&mut self, key: &str) -> WatchStream {
        let (tx, rx) = mpsc::unbounded_channel();
        self.watchers.push(tx);

        WatchStream {
            key: key.to_string(),
            inner: UnboundedReceiverStream::new(rx),
        }
    }

    /// Drops every sender so each stream ends once drained.
    pub(super) fn close_watchers(&mut self) -> usize {
        let closed = self.watchers.len();
        self.watchers.clear();
        closed
    }

    #[cfg(test)]
    pub(super) fn watcher_count(&self) -> usize {
        self.watchers.len()
    }
}

/// An ordered stream of the values assigned to one key.
///
/// Every value assigned after the stream was created is delivered, in
/// assignment order. Delivery never blocks the writer: values queue in an
/// unbounded per-stream buffer until read, so a stream must be drained or
/// dropped. The stream ends (`None`) once the store is closed and the
/// buffered values have been read.
///
/// ```rust,no_run
/// use futures::StreamExt;
/// use nitroshare::config_store::ConfigStore;
///
/// # async fn example(store: &ConfigStore) {
/// let mut names = store.watch("net.nitroshare.device_name");
/// while let Some(name) = names.next().await {
///     println!("device renamed to {name}");
/// }
/// # }
/// ```
#[derive(Debug)]
pub struct WatchStream {
    key: String,
    inner: UnboundedReceiverStream<String>,
}

impl WatchStream {
    /// The key this stream follows.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Waits for the next value, or `None` once the store has closed.
    pub async fn recv(&mut self) -> Option<String> {
        self.inner.as_mut().recv().await
    }

    /// Returns a buffered value without waiting.
    ///
    /// # Errors
    /// Returns `TryRecvError::Empty` when nothing is buffered and
    /// `TryRecvError::Disconnected` once the store has closed.
    pub fn try_recv(&mut self) -> Result<String, TryRecvError> {
        self.inner.as_mut().try_recv()
    }
}

impl Stream for WatchStream {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
