//! User-facing notification channel (toasts in a UI, log lines in the CLI).

use std::sync::{Mutex, PoisonError};

/// Fire-and-forget sink for action outcomes.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Forwards notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(target: "clinicsys::notify", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::warn!(target: "clinicsys::notify", "{message}");
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Keeps notifications in order until someone drains them.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    queue: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn push(&self, kind: NotificationKind, message: &str) {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notification {
                kind,
                message: message.to_string(),
            });
    }
}

impl Notifier for MemoryNotifier {
    fn success(&self, message: &str) {
        self.push(NotificationKind::Success, message);
    }

    fn error(&self, message: &str) {
        self.push(NotificationKind::Error, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_notifier_drains_in_order() {
        let n = MemoryNotifier::new();
        n.success("saved");
        n.error("boom");

        let got = n.take();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].kind, NotificationKind::Success);
        assert_eq!(got[1].message, "boom");
        assert!(n.take().is_empty());
    }
}
