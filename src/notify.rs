//! User-facing notifications.
//!
//! Errors stop at the page boundary: they are shown to the user once and
//! never propagated further.

use std::cell::RefCell;

/// Something that can show a blocking message to the user.
pub trait Notifier {
    /// Shows `message`.
    fn notify(&self, message: &str);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str) {
        tracing::warn!(target: "camera_capture::notice", "{}", message);
    }
}

/// Keeps notifications in memory, in order.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    messages: RefCell<Vec<String>>,
}

impl MemoryNotifier {
    /// Creates an empty notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages shown so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Number of messages shown so far.
    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    /// Returns true if nothing has been shown.
    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_string());
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, message: &str) {
        (**self).notify(message)
    }
}
