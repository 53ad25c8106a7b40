//! Controller run-loop tests: bursts of notifications collapse into one
//! synthesis using the last rule list.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::sleep;

use ttlgram::error::SynthResult;
use ttlgram::regen::{ArtifactStore, RegenController};

#[derive(Default)]
struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn list(&self) -> SynthResult<Vec<String>> {
        Ok(self.entries.lock().unwrap().keys().cloned().collect())
    }

    async fn exists(&self, name: &str) -> SynthResult<bool> {
        Ok(self.entries.lock().unwrap().contains_key(name))
    }

    async fn write(&self, name: &str, text: &str) -> SynthResult<PathBuf> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(name.to_string(), text.to_string());
        Ok(PathBuf::from(name))
    }

    async fn delete(&self, name: &str) -> SynthResult<()> {
        self.entries.lock().unwrap().remove(name);
        Ok(())
    }
}

fn controller_with(store: Arc<MemoryStore>, debounce_ms: u64) -> RegenController {
    RegenController::builder()
        .store(store)
        .debounce_ms(debounce_ms)
        .build()
        .unwrap()
}

#[tokio::test]
async fn burst_collapses_into_one_synthesis_with_last_list() {
    let store = Arc::new(MemoryStore::default());
    let controller = controller_with(store.clone(), 300);
    let (tx, rx) = mpsc::channel(100);

    let handle = tokio::spawn(controller.run(rx));

    // One notification per "keystroke", far faster than the debounce.
    for i in 0..8 {
        tx.send(vec![format!("tag{i}:source.js")]).await.unwrap();
        sleep(Duration::from_millis(10)).await;
    }

    // Let the debounce elapse and the tick pick it up.
    sleep(Duration::from_millis(800)).await;

    drop(tx);
    handle.await.unwrap();

    assert_eq!(store.writes.load(Ordering::SeqCst), 1);

    let entries = store.entries.lock().unwrap();
    let text = entries.values().next().unwrap();
    assert!(text.contains("tag7"), "last notification wins");
    assert!(!text.contains("tag0"));
}

#[tokio::test]
async fn spaced_notifications_each_synthesize() {
    let store = Arc::new(MemoryStore::default());
    let controller = controller_with(store.clone(), 50);
    let (tx, rx) = mpsc::channel(100);

    let handle = tokio::spawn(controller.run(rx));

    tx.send(vec!["html:text.html.basic".to_string()])
        .await
        .unwrap();
    sleep(Duration::from_millis(400)).await;

    tx.send(vec!["sql:source.sql".to_string()]).await.unwrap();
    sleep(Duration::from_millis(400)).await;

    drop(tx);
    handle.await.unwrap();

    assert_eq!(store.writes.load(Ordering::SeqCst), 2);
    // The second cycle replaced the first artifact.
    assert_eq!(store.entries.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn pending_change_is_discarded_on_shutdown() {
    let store = Arc::new(MemoryStore::default());
    let controller = controller_with(store.clone(), 5_000);
    let (tx, rx) = mpsc::channel(100);

    let handle = tokio::spawn(controller.run(rx));

    tx.send(vec!["html:text.html.basic".to_string()])
        .await
        .unwrap();
    sleep(Duration::from_millis(100)).await;

    // Channel closes long before the debounce elapses.
    drop(tx);
    handle.await.unwrap();

    assert_eq!(store.writes.load(Ordering::SeqCst), 0);
}
