//! Unit tests for config_store module

#![allow(clippy::panic, clippy::unwrap_used)]


use std::{fs, path::PathBuf, time::Duration};

use futures::StreamExt;
use tempfile::TempDir;
use tokio::{sync::mpsc::error::TryRecvError, time::timeout};

use crate::config_store::{ConfigError, ConfigStore, StoreOptions};

const WAIT: Duration = Duration::from_secs(2);

fn store_file(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.json");
    fs::write(&path, content).unwrap();
    path
}

fn quick_options() -> StoreOptions {
    StoreOptions::default().with_debounce_window(Duration::from_millis(50))
}

#[tokio::test]
async fn get_returns_loaded_value() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir, r#"{"net.nitroshare.device_name": "laptop"}"#);

    let store = ConfigStore::load(&path).unwrap();

    assert_eq!(store.get("net.nitroshare.device_name", "other"), "laptop");
    store.close().await;
}

#[tokio::test]
async fn get_default_is_sticky() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load(store_file(&dir, "{}")).unwrap();

    assert_eq!(store.get("a", "x"), "x");
    assert_eq!(store.get("a", "y"), "x");
    assert_eq!(store.snapshot().get("a").map(String::as_str), Some("x"));

    store.close().await;
}

#[tokio::test]
async fn set_then_get_returns_new_value() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load(store_file(&dir, r#"{"a": "old"}"#)).unwrap();

    store.set("a", "new");
    store.set("b", String::from("fresh"));

    assert_eq!(store.get("a", "unused"), "new");
    assert_eq!(store.get("b", "unused"), "fresh");
    store.close().await;
}

#[tokio::test]
async fn watcher_receives_values_in_order() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load(store_file(&dir, "{}")).unwrap();

    let mut stream = store.watch("a");
    assert_eq!(stream.key(), "a");

    for value in ["1", "2", "3", "4"] {
        store.set("a", value);
    }

    for expected in ["1", "2", "3", "4"] {
        let received = timeout(WAIT, stream.recv()).await.unwrap();
        assert_eq!(received.as_deref(), Some(expected));
    }
    assert!(matches!(stream.try_recv(), Err(TryRecvError::Empty)));

    store.close().await;
}

#[tokio::test]
async fn repeated_value_notifies_once() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load(store_file(&dir, "{}")).unwrap();
    let mut stream = store.watch("a");

    store.set("a", "same");
    store.set("a", "same");

    assert_eq!(stream.try_recv().unwrap(), "same");
    assert!(matches!(stream.try_recv(), Err(TryRecvError::Empty)));

    store.close().await;
}

#[tokio::test]
async fn two_watchers_see_the_same_sequence() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load(store_file(&dir, "{}")).unwrap();

    let first = store.watch("a");
    let second = store.watch("a");

    store.set("a", "x");
    store.set("a", "y");
    store.set("a", "x");
    store.close().await;

    let first: Vec<String> = timeout(WAIT, first.collect()).await.unwrap();
    let second: Vec<String> = timeout(WAIT, second.collect()).await.unwrap();

    assert_eq!(first, vec!["x", "y", "x"]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn watchers_only_see_their_key() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load(store_file(&dir, "{}")).unwrap();
    let mut stream = store.watch("a");

    store.set("b", "other");

    assert!(matches!(stream.try_recv(), Err(TryRecvError::Empty)));
    store.close().await;
}

#[tokio::test]
async fn get_default_notifies_watcher_of_placeholder() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load(store_file(&dir, "{}")).unwrap();

    let mut stream = store.watch("a");
    assert!(store.snapshot().is_empty());

    assert_eq!(store.get("a", "default"), "default");
    assert_eq!(stream.try_recv().unwrap(), "default");

    store.close().await;
}

#[tokio::test]
async fn empty_string_assigns_placeholder() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load(store_file(&dir, "{}")).unwrap();

    let mut stream = store.watch("a");
    store.set("a", "");

    assert_eq!(stream.try_recv().unwrap(), "");
    assert_eq!(store.get("a", "ignored"), "");
    store.close().await;
}

#[tokio::test]
async fn dropped_watchers_are_pruned() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load(store_file(&dir, "{}")).unwrap();

    let kept = store.watch("a");
    drop(store.watch("a"));
    assert_eq!(store.watcher_count("a"), 2);

    store.set("a", "x");
    assert_eq!(store.watcher_count("a"), 1);

    drop(kept);
    store.close().await;
}

#[tokio::test]
async fn close_ends_every_stream() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load(store_file(&dir, r#"{"b": "1"}"#)).unwrap();

    let mut a = store.watch("a");
    let mut b = store.watch("b");
    store.set("b", "2");

    store.close().await;

    assert_eq!(timeout(WAIT, a.recv()).await.unwrap(), None);
    assert_eq!(timeout(WAIT, b.recv()).await.unwrap().as_deref(), Some("2"));
    assert_eq!(timeout(WAIT, b.recv()).await.unwrap(), None);
    assert!(matches!(b.try_recv(), Err(TryRecvError::Disconnected)));
}

#[tokio::test]
async fn dropping_store_ends_streams() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load_with_options(store_file(&dir, "{}"), quick_options()).unwrap();

    let mut stream = store.watch("a");
    drop(store);

    assert_eq!(timeout(WAIT, stream.recv()).await.unwrap(), None);
}

#[tokio::test]
async fn snapshot_skips_placeholders() {
    let dir = TempDir::new().unwrap();
    let store = ConfigStore::load(store_file(&dir, r#"{"a": "1"}"#)).unwrap();

    let _stream = store.watch("b");
    store.set("c", "3");

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot["a"], "1");
    assert_eq!(snapshot["c"], "3");

    store.close().await;
}

#[tokio::test]
async fn load_missing_file_fails() {
    let dir = TempDir::new().unwrap();

    let result = ConfigStore::load(dir.path().join("missing.json"));

    assert!(matches!(result, Err(ConfigError::IoError { .. })));
}

#[tokio::test]
async fn load_rejects_malformed_documents() {
    let dir = TempDir::new().unwrap();

    for content in ["", "not json", "[]", r#"{"a": 1}"#, r#"{"a": {"b": "c"}}"#] {
        let result = ConfigStore::load(store_file(&dir, content));
        assert!(
            matches!(result, Err(ConfigError::ParseError { .. })),
            "expected parse error for {content:?}"
        );
    }
}

#[test]
fn load_outside_runtime_is_unavailable() {
    let dir = TempDir::new().unwrap();

    let result = ConfigStore::load(store_file(&dir, "{}"));

    assert!(matches!(
        result,
        Err(ConfigError::ServiceUnavailable { .. })
    ));
}

#[tokio::test]
async fn store_reports_its_path() {
    let dir = TempDir::new().unwrap();
    let path = store_file(&dir, "{}");

    let store = ConfigStore::load(&path).unwrap();

    assert_eq!(store.path(), path.as_path());
    store.close().await;
}
