//! Full synthesis-cycle tests against in-memory collaborators.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use ttlgram::error::{SynthError, SynthResult};
use ttlgram::grammar::{GRAMMAR_SCOPE, artifact_filename, synthesize_text};
use ttlgram::regen::{ArtifactStore, GrammarRegistry, Notifier, RegenController, SynthesisResult};

/// Artifact store held in memory, with injectable delete failures.
#[derive(Default)]
struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    fail_delete: AtomicBool,
}

impl MemoryStore {
    fn seed(&self, name: &str, text: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(name.to_string(), text.to_string());
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
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
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(SynthError::artifact_io(
                format!("delete {name}"),
                "injected failure",
            ));
        }
        self.entries
            .lock()
            .unwrap()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| SynthError::artifact_io(format!("delete {name}"), "not found"))
    }
}

/// Registry that counts simultaneously active registrations for the
/// generated scope.
#[derive(Default)]
struct RecordingRegistry {
    active: AtomicUsize,
    max_active: AtomicUsize,
    events: Mutex<Vec<String>>,
}

impl RecordingRegistry {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl GrammarRegistry for RecordingRegistry {
    async fn register(&self, location: &Path) -> SynthResult<()> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        self.events
            .lock()
            .unwrap()
            .push(format!("register {}", location.display()));
        Ok(())
    }

    async fn unregister(&self, scope: &str) -> SynthResult<()> {
        self.active.store(0, Ordering::SeqCst);
        self.events.lock().unwrap().push(format!("unregister {scope}"));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    infos: Mutex<Vec<String>>,
    warns: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn info(&self, _title: &str, detail: &str) {
        self.infos.lock().unwrap().push(detail.to_string());
    }

    async fn warn(&self, _title: &str, detail: &str) {
        self.warns.lock().unwrap().push(detail.to_string());
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    registry: Arc<RecordingRegistry>,
    notifier: Arc<RecordingNotifier>,
    controller: RegenController,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::default());
    let registry = Arc::new(RecordingRegistry::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let controller = RegenController::builder()
        .store(store.clone())
        .registry(registry.clone())
        .notifier(notifier.clone())
        .debounce_ms(10)
        .build()
        .unwrap();
    Harness {
        store,
        registry,
        notifier,
        controller,
    }
}

fn rules(specs: &[&str]) -> Vec<String> {
    specs.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn unchanged_rules_write_exactly_once() {
    let mut h = harness();
    let list = rules(&["html:text.html.basic", "sql:source.sql"]);

    let first = h.controller.synthesize_once(&list).await.unwrap();
    assert!(matches!(first, SynthesisResult::Generated(_)));

    let second = h.controller.synthesize_once(&list).await.unwrap();
    assert_eq!(second, SynthesisResult::Cached);

    assert_eq!(h.store.writes(), 1);
    assert_eq!(h.notifier.infos.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn changed_rules_replace_the_stale_artifact() {
    let mut h = harness();

    h.controller
        .synthesize_once(&rules(&["html:text.html.basic"]))
        .await
        .unwrap();
    let old_names = h.store.names();

    h.controller
        .synthesize_once(&rules(&["sql:source.sql"]))
        .await
        .unwrap();

    let names = h.store.names();
    assert_eq!(names.len(), 1, "exactly one artifact is ever active");
    assert_ne!(names, old_names);
    assert_eq!(h.registry.max_active.load(Ordering::SeqCst), 1);

    // Cleanup ran before the write: unregister, then register the new one.
    let events = h.registry.events();
    assert_eq!(events.len(), 4);
    assert!(events[2].starts_with("unregister"));
    assert!(events[3].starts_with("register"));
}

#[tokio::test]
async fn foreign_store_entries_survive_cleanup() {
    let mut h = harness();
    h.store.seed("README.md", "not a grammar");
    h.store.seed("ttl-deadbeef.json", "{}");

    h.controller
        .synthesize_once(&rules(&["html:text.html.basic"]))
        .await
        .unwrap();

    let names = h.store.names();
    assert!(names.contains(&"README.md".to_string()));
    assert!(!names.contains(&"ttl-deadbeef.json".to_string()));
    assert_eq!(names.len(), 2);
}

#[tokio::test]
async fn parser_failure_leaves_prior_state_untouched() {
    let mut h = harness();
    let good = rules(&["html:text.html.basic"]);
    h.controller.synthesize_once(&good).await.unwrap();
    let names_before = h.store.names();
    let events_before = h.registry.events();

    let bad = rules(&["html:text.html.basic", r#"fo"o:source.js"#]);
    let err = h.controller.synthesize_once(&bad).await.unwrap_err();
    assert!(matches!(err, SynthError::BadLiteral { .. }));

    assert_eq!(h.store.names(), names_before);
    assert_eq!(h.registry.events(), events_before);

    // The warning names the offending rule.
    let warns = h.notifier.warns.lock().unwrap();
    assert_eq!(warns.len(), 1);
    assert!(warns[0].contains(r#"fo"o"#));
}

#[tokio::test]
async fn failed_delete_never_leaves_two_registrations() {
    let mut h = harness();

    h.controller
        .synthesize_once(&rules(&["html:text.html.basic"]))
        .await
        .unwrap();
    assert_eq!(h.registry.active.load(Ordering::SeqCst), 1);

    h.store.fail_delete.store(true, Ordering::SeqCst);
    let err = h
        .controller
        .synthesize_once(&rules(&["sql:source.sql"]))
        .await
        .unwrap_err();
    assert!(matches!(err, SynthError::ArtifactIo { .. }));

    // The cycle aborted between unregister and write: nothing new was
    // registered, and at no point were two grammars active.
    assert_eq!(h.registry.active.load(Ordering::SeqCst), 0);
    assert_eq!(h.registry.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(h.store.writes(), 1);
    assert_eq!(h.notifier.warns.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn artifact_name_is_digest_derived() {
    let mut h = harness();
    let list = rules(&["html:text.html.basic"]);

    let text = synthesize_text(&list, &ttlgram::grammar::FancyRegexValidator).unwrap();
    let expected = artifact_filename(&ttlgram::grammar::digest::digest(&text));

    let result = h.controller.synthesize_once(&list).await.unwrap();
    assert_eq!(result, SynthesisResult::Generated(PathBuf::from(&expected)));
    assert_eq!(h.store.names(), vec![expected]);
}

#[tokio::test]
async fn empty_rule_list_still_produces_a_grammar() {
    let mut h = harness();
    let result = h.controller.synthesize_once(&[]).await.unwrap();
    assert!(matches!(result, SynthesisResult::Generated(_)));

    let names = h.store.names();
    let text = h.store.entries.lock().unwrap()[&names[0]].clone();
    assert!(text.contains(GRAMMAR_SCOPE));
    assert!(text.contains("\"patterns\": []"));
}
