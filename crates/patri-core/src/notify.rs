//! Notification collaborator: fire-and-forget user-visible messages.

use std::cell::RefCell;
use tracing::info;

/// Receives level-up and challenge notifications. No return value, no retry.
pub trait Notifier {
    fn notify(&self, title: &str, message: &str);
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, title: &str, message: &str) {
        (**self).notify(title, message)
    }
}

/// Emits each notification as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, message: &str) {
        info!(title, message, "notification");
    }
}

/// A delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

/// Keeps every notification in memory; useful for tests and batch output.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: RefCell<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far, oldest first.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.borrow().clone()
    }

    /// Drain and return everything received so far.
    pub fn take(&self) -> Vec<Notification> {
        self.sent.borrow_mut().drain(..).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.sent.borrow_mut().push(Notification {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}
