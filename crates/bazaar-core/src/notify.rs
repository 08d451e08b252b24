//! Passive user notifications
//!
//! Failures that the streamer should know about (a rebuilt catalog, a disk
//! error) are surfaced as non-modal notices. The host decides how to show
//! them; bazaar only hands them over.

use std::fmt;
use std::sync::Mutex;

/// How serious a notice is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// A passive, user-visible notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub title: String,
    pub body: String,
}

impl Notice {
    /// Create a notice
    pub fn new(severity: Severity, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            body: body.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.severity, self.title, self.body)
    }
}

/// Receiver of passive notices
pub trait Notifier: Send + Sync {
    /// Whether the host is in a state where notices can be shown
    fn is_interactive(&self) -> bool {
        true
    }

    /// Hand a notice to the host
    fn notify(&self, notice: Notice);
}

/// Notifier that only writes notices to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn is_interactive(&self) -> bool {
        false
    }

    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => tracing::info!(title = %notice.title, "{}", notice.body),
            Severity::Warning => tracing::warn!(title = %notice.title, "{}", notice.body),
            Severity::Critical => tracing::error!(title = %notice.title, "{}", notice.body),
        }
    }
}

/// Notifier that keeps every notice, for hosts that display them later
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    /// Create an empty notifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Remove and return all notices
    pub fn drain(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.notices.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier() {
        let notifier = MemoryNotifier::new();
        assert!(notifier.is_interactive());
        notifier.notify(Notice::new(Severity::Warning, "Store", "rebuilt"));

        let notices = notifier.drain();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].to_string(), "[Warning] Store: rebuilt");
        assert!(notifier.notices().is_empty());
    }
}
