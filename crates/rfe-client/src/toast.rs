//! Transient user-visible notifications.

use std::time::{Duration, Instant};

use strum::Display;

/// Severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

/// One notification.
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub level: ToastLevel,
    pub created: Instant,
}

/// Visible toasts, oldest first.
#[derive(Debug, Clone)]
pub struct Toasts {
    items: Vec<Toast>,
    next_id: u64,
    duration: Duration,
}

impl Toasts {
    /// Create an empty list whose toasts expire after `duration`.
    pub fn new(duration: Duration) -> Self {
        Self {
            items: Vec::new(),
            next_id: 1,
            duration,
        }
    }

    /// Show a toast. Returns its id.
    pub fn push(&mut self, message: impl Into<String>, level: ToastLevel) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push(Toast {
            id,
            message: message.into(),
            level,
            created: Instant::now(),
        });
        id
    }

    pub fn info(&mut self, message: impl Into<String>) -> u64 {
        self.push(message, ToastLevel::Info)
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(message, ToastLevel::Success)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(message, ToastLevel::Error)
    }

    /// Remove a toast. Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        self.items.len() != before
    }

    /// Drop toasts shown for longer than the display duration.
    pub fn expire(&mut self, now: Instant) {
        let duration = self.duration;
        self.items
            .retain(|t| now.saturating_duration_since(t.created) < duration);
    }

    /// Visible toasts, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.items.iter()
    }

    /// The newest toast.
    pub fn latest(&self) -> Option<&Toast> {
        self.items.last()
    }

    /// Drain every toast, oldest first.
    pub fn take_all(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
