//! User-visible notifications raised by the transport.
//!
//! The transport never talks to a UI directly. It calls a `Notifier`, which a
//! host wires to whatever toast, status bar or log it has.

use std::sync::{Mutex, PoisonError};

/// Text of the error notification for every transport failure. The
/// underlying error detail is deliberately not shown.
pub const NETWORK_ERROR_MESSAGE: &str = "网络异常，请检查！";

/// Sink for the two kinds of notification the transport emits.
pub trait Notifier: Send + Sync {
    /// Soft failure: the body's message, shown non-blocking.
    fn warn(&self, message: &str);

    /// Transport failure: always `NETWORK_ERROR_MESSAGE`.
    fn error(&self, message: &str);
}

/// Default notifier: turns notifications into `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "gdp_api_core::notify", %message, "warning notification");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "gdp_api_core::notify", %message, "error notification");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Warning(String),
    Error(String),
}

/// Keeps every notification in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Warning(message) => Some(message),
                Notification::Error(_) => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Error(message) => Some(message),
                Notification::Warning(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    fn push(&self, notification: Notification) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}

impl Notifier for RecordingNotifier {
    fn warn(&self, message: &str) {
        self.push(Notification::Warning(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Notification::Error(message.to_string()));
    }
}
