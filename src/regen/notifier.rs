//! User-visible notification capability.

use async_trait::async_trait;

/// Accepts informational and warning-level messages with a title and
/// free-text detail.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn info(&self, title: &str, detail: &str);
    async fn warn(&self, title: &str, detail: &str);
}

/// Notifier that routes messages to the tracing pipeline.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn info(&self, title: &str, detail: &str) {
        crate::log_event!(title, "info", "{detail}");
    }

    async fn warn(&self, title: &str, detail: &str) {
        tracing::warn!("[{title}] {detail}");
    }
}
