//! Debouncing for rule-list change notifications.
//!
//! The configuration source may emit one notification per keystroke while a
//! user edits the rule list; bursts must collapse into a single regeneration
//! using the list as of the last notification.

use std::time::{Duration, Instant};

/// Collapses bursts of rule-list notifications into one pending snapshot.
///
/// Each `record` replaces the snapshot and restamps the timer; the snapshot
/// is released once it has been stable for the configured duration.
#[derive(Debug)]
pub struct Debounce {
    /// Pending snapshot: rule list -> last change timestamp.
    pending: Option<(Vec<String>, Instant)>,
    /// How long the list must be stable before processing.
    duration: Duration,
}

impl Debounce {
    /// Create a new debouncer with the given duration in milliseconds.
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            pending: None,
            duration: Duration::from_millis(debounce_ms),
        }
    }

    /// Record a rule-list change.
    ///
    /// Replaces any pending snapshot and resets the timer, discarding the
    /// prior pending trigger.
    pub fn record(&mut self, rules: Vec<String>) {
        self.pending = Some((rules, Instant::now()));
    }

    /// Take the snapshot if it has been stable for the debounce duration.
    pub fn take_ready(&mut self) -> Option<Vec<String>> {
        let ready = matches!(
            &self.pending,
            Some((_, stamped)) if stamped.elapsed() >= self.duration
        );
        if ready {
            self.pending.take().map(|(rules, _)| rules)
        } else {
            None
        }
    }

    /// Check if a change is pending.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}
