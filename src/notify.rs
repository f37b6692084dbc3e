//! User-facing notifications.
//!
//! Replaces the browser toast: the executor and services emit
//! [`Notification`]s through a [`Notifier`], which decides how to present them.

use std::sync::Mutex;

use console::style;

use crate::errors::FieldError;
use crate::ui::icons::{CHECK, CROSS, INFO, WARN};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn success(&self, title: &str, message: &str) {
        self.notify(Notification::new(Severity::Success, title, message));
    }

    fn info(&self, title: &str, message: &str) {
        self.notify(Notification::new(Severity::Info, title, message));
    }

    fn warn(&self, title: &str, message: &str) {
        self.notify(Notification::new(Severity::Warn, title, message));
    }

    fn error(&self, title: &str, message: &str) {
        self.notify(Notification::new(Severity::Error, title, message));
    }

    /// One error notification per server-side field error.
    fn show_validation_errors(&self, errors: &[FieldError]) {
        for error in errors {
            self.error(&error.key, &error.message);
        }
    }
}

/// Prints notifications to stderr, styled by severity.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    quiet: bool,
}

impl ConsoleNotifier {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, n: Notification) {
        tracing::debug!(severity = ?n.severity, title = %n.title, message = %n.message, "notification");
        if self.quiet && n.severity != Severity::Error {
            return;
        }
        let line = match n.severity {
            Severity::Success => format!("{}{} {}", CHECK, style(&n.title).green().bold(), n.message),
            Severity::Info => format!("{}{} {}", INFO, style(&n.title).cyan().bold(), n.message),
            Severity::Warn => format!("{}{} {}", WARN, style(&n.title).yellow().bold(), n.message),
            Severity::Error => format!("{}{} {}", CROSS, style(&n.title).red().bold(), n.message),
        };
        eprintln!("{}", line);
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Notification> {
        match self.seen.lock() {
            Ok(mut seen) => std::mem::take(&mut *seen),
            Err(_) => Vec::new(),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_keeps_order() {
        let notifier = RecordingNotifier::new();
        notifier.success("Saved", "Client created");
        notifier.error("Error: ", "boom");
        let seen = notifier.take();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].severity, Severity::Success);
        assert_eq!(seen[1].message, "boom");
        assert!(notifier.take().is_empty());
    }

    #[test]
    fn field_errors_emit_one_notification_each() {
        let notifier = RecordingNotifier::new();
        notifier.show_validation_errors(&[
            FieldError {
                key: "Email".into(),
                message: "invalid".into(),
            },
            FieldError {
                key: "Phone".into(),
                message: "required".into(),
            },
        ]);
        let seen = notifier.take();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|n| n.severity == Severity::Error));
        assert_eq!(seen[1].title, "Phone");
    }
}
