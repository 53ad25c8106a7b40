//! Regeneration controller: debounced synthesis of the grammar artifact.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{Duration, sleep};

use crate::error::{SynthError, SynthResult};
use crate::grammar::rule::{FancyRegexValidator, RegexValidator};
use crate::grammar::{self, GRAMMAR_SCOPE};
use crate::regen::debounce::Debounce;
use crate::regen::notifier::{LogNotifier, Notifier};
use crate::regen::registry::{GrammarRegistry, NullRegistry};
use crate::regen::store::ArtifactStore;

/// Title used for user-visible notifications.
const NOTIFY_TITLE: &str = "ttlgram";

/// Interval at which the run loop polls the debouncer.
const TICK_MS: u64 = 100;

/// Where the controller is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegenState {
    Idle,
    Debouncing,
    Synthesizing,
}

/// Outcome of one synthesis cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisResult {
    /// A new artifact was written and registered.
    Generated(PathBuf),
    /// An artifact with the same digest already exists; nothing to do.
    Cached,
}

/// Owns the debounce snapshot and drives the synthesis cycle.
///
/// All mutation happens on the controller's own task; collaborators are
/// only reached through `await`ed calls, so one cycle's delete sequence
/// always completes before its write begins.
pub struct RegenController {
    store: Arc<dyn ArtifactStore>,
    registry: Arc<dyn GrammarRegistry>,
    notifier: Arc<dyn Notifier>,
    validator: Arc<dyn RegexValidator>,
    debounce: Debounce,
    state: RegenState,
}

impl RegenController {
    /// Create a builder for configuring the controller.
    pub fn builder() -> RegenControllerBuilder {
        RegenControllerBuilder::new()
    }

    pub fn state(&self) -> RegenState {
        self.state
    }

    /// React to rule-list notifications until the channel closes.
    ///
    /// Notifications restamp the debounce snapshot; once the list has been
    /// stable for the configured interval, one synthesis cycle runs. A
    /// pending snapshot that never stabilizes before the channel closes is
    /// discarded.
    pub async fn run(mut self, mut changes: mpsc::Receiver<Vec<String>>) {
        crate::log_event!("regen", "started");

        loop {
            let tick = sleep(Duration::from_millis(TICK_MS));
            tokio::pin!(tick);

            tokio::select! {
                maybe = changes.recv() => match maybe {
                    Some(rules) => {
                        crate::debug_event!("regen", "rules notification", "{} rule(s)", rules.len());
                        self.debounce.record(rules);
                        self.state = RegenState::Debouncing;
                    }
                    None => break,
                },

                _ = &mut tick => {
                    if let Some(rules) = self.debounce.take_ready() {
                        let _ = self.synthesize_once(&rules).await;
                    }
                }
            }
        }

        crate::log_event!("regen", "stopped");
    }

    /// Run one full synthesis cycle and report its outcome.
    ///
    /// Failures are warned to the notifier; a freshly generated artifact is
    /// announced with its location. The controller is back in `Idle` when
    /// this returns, success or not.
    pub async fn synthesize_once(&mut self, rules: &[String]) -> SynthResult<SynthesisResult> {
        self.state = RegenState::Synthesizing;
        let result = self.synthesize(rules).await;
        match &result {
            Ok(SynthesisResult::Generated(location)) => {
                self.notifier
                    .info(
                        NOTIFY_TITLE,
                        &format!("Grammar created at\n{}", location.display()),
                    )
                    .await;
            }
            Ok(SynthesisResult::Cached) => {}
            Err(e) => {
                self.notifier.warn(NOTIFY_TITLE, &e.to_string()).await;
            }
        }
        self.state = RegenState::Idle;
        result
    }

    async fn synthesize(&self, rules: &[String]) -> SynthResult<SynthesisResult> {
        // Parser or assembler failures abort before any stored state is
        // touched.
        let text = grammar::synthesize_text(rules, self.validator.as_ref())?;
        let digest = grammar::digest::digest(&text);
        let candidate = grammar::artifact_filename(&digest);

        if self.store.exists(&candidate).await? {
            // Already up to date. Registry state is trusted to match the
            // artifact; see DESIGN.md.
            crate::debug_event!("regen", "unchanged (digest match)", "{candidate}");
            return Ok(SynthesisResult::Cached);
        }

        // Stale state goes away before the new artifact appears, so two
        // generated grammars are never registered at once.
        self.registry.unregister(GRAMMAR_SCOPE).await?;
        for stale in self
            .store
            .list()
            .await?
            .iter()
            .filter(|name| grammar::is_artifact_filename(name))
        {
            crate::debug_event!("regen", "removing stale artifact", "{stale}");
            self.store.delete(stale).await?;
        }

        let location = self.store.write(&candidate, &text).await?;
        self.registry.register(&location).await?;

        crate::log_event!("regen", "generated", "{}", location.display());
        Ok(SynthesisResult::Generated(location))
    }
}

/// Builder for constructing a [`RegenController`].
pub struct RegenControllerBuilder {
    store: Option<Arc<dyn ArtifactStore>>,
    registry: Arc<dyn GrammarRegistry>,
    notifier: Arc<dyn Notifier>,
    validator: Arc<dyn RegexValidator>,
    debounce_ms: u64,
}

impl RegenControllerBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            store: None,
            registry: Arc::new(NullRegistry),
            notifier: Arc::new(LogNotifier),
            validator: Arc::new(FancyRegexValidator),
            debounce_ms: 10_000,
        }
    }

    /// Set the artifact store (required).
    pub fn store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the grammar registry.
    pub fn registry(mut self, registry: Arc<dyn GrammarRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Set the notifier.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Set the regex syntax validator.
    pub fn validator(mut self, validator: Arc<dyn RegexValidator>) -> Self {
        self.validator = validator;
        self
    }

    /// Set the debounce interval in milliseconds.
    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Build the controller.
    pub fn build(self) -> SynthResult<RegenController> {
        let store = self
            .store
            .ok_or_else(|| SynthError::artifact_io("initialize controller", "store is required"))?;

        Ok(RegenController {
            store,
            registry: self.registry,
            notifier: self.notifier,
            validator: self.validator,
            debounce: Debounce::new(self.debounce_ms),
            state: RegenState::Idle,
        })
    }
}

impl Default for RegenControllerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
