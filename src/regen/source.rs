//! Settings-file watcher feeding the regeneration controller.
//!
//! Watches the settings file for changes, reloads it, and forwards the rule
//! list whenever it actually changed. Debouncing is the controller's job;
//! this source just reports every effective change.

use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecursiveMode, Watcher};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::Settings;

/// Errors from settings watching.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("Failed to initialize watcher: {reason}")]
    InitFailed { reason: String },

    #[error("Cannot watch path {path}: {reason}")]
    PathWatchFailed { path: PathBuf, reason: String },

    #[error("Failed to load config: {reason}")]
    ConfigError { reason: String },
}

impl From<notify::Error> for WatchError {
    fn from(e: notify::Error) -> Self {
        WatchError::InitFailed {
            reason: e.to_string(),
        }
    }
}

/// Watches one settings file and emits its rule list on change.
///
/// The parent directory is watched rather than the file itself so editors
/// that replace the file on save (rename-over) are still observed.
pub struct SettingsWatcher {
    settings_path: PathBuf,
    last_rules: Vec<String>,
    changes: mpsc::Sender<Vec<String>>,
    event_rx: mpsc::Receiver<notify::Result<Event>>,
    _watcher: notify::RecommendedWatcher,
}

impl SettingsWatcher {
    /// Create a watcher for `settings_path`, forwarding changed rule lists
    /// into `changes`.
    pub fn new(
        settings_path: PathBuf,
        changes: mpsc::Sender<Vec<String>>,
    ) -> Result<Self, WatchError> {
        let settings =
            Settings::load_from(&settings_path).map_err(|e| WatchError::ConfigError {
                reason: e.to_string(),
            })?;

        let settings_path = settings_path
            .canonicalize()
            .unwrap_or(settings_path);

        let (tx, event_rx) = mpsc::channel(100);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let _ = tx.blocking_send(res);
        })?;

        let watch_dir = settings_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        watcher
            .watch(&watch_dir, RecursiveMode::NonRecursive)
            .map_err(|e| WatchError::PathWatchFailed {
                path: watch_dir.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            settings_path,
            last_rules: settings.rules,
            changes,
            event_rx,
            _watcher: watcher,
        })
    }

    /// Forward rule-list changes until the event stream ends.
    pub async fn run(mut self) {
        crate::log_event!("settings", "watching", "{}", self.settings_path.display());

        while let Some(res) = self.event_rx.recv().await {
            match res {
                Ok(event) => {
                    if self.handle_event(event).await.is_err() {
                        // Controller went away; no reason to keep watching.
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!("[settings] watch error: {e}");
                }
            }
        }

        crate::debug_event!("settings", "stopped");
    }

    async fn handle_event(&mut self, event: Event) -> Result<(), ()> {
        if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
            return Ok(());
        }
        if !event.paths.iter().any(|p| p == &self.settings_path) {
            return Ok(());
        }

        match Settings::load_from(&self.settings_path) {
            Ok(settings) => {
                if settings.rules == self.last_rules {
                    crate::debug_event!("settings", "rules unchanged");
                    return Ok(());
                }
                crate::log_event!("settings", "rules changed", "{} rule(s)", settings.rules.len());
                self.last_rules = settings.rules.clone();
                self.changes.send(settings.rules).await.map_err(|_| ())
            }
            Err(e) => {
                tracing::warn!(
                    "[settings] failed to reload {}: {e}",
                    self.settings_path.display()
                );
                Ok(())
            }
        }
    }
}
