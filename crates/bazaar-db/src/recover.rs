//! Recovery helpers shared by everything that loads persisted state.
//!
//! A file that fails to parse is copied aside before fresh defaults
//! overwrite it; the streamer gets a passive notice that custom settings
//! may have been lost.

use crate::store::Persistence;
use bazaar_core::{Notice, Notifier, Severity};
use std::path::PathBuf;

/// Longest excerpt of a corrupt file written to the log.
pub const PREVIEW_CHARS: usize = 256;

/// Bounded, single-line excerpt of `raw` for log output.
pub fn preview(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .take(PREVIEW_CHARS)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if raw.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}

/// Back up an unparseable blob, log it and notify the user.
///
/// The backup is best-effort; its path is returned when it succeeded.
pub fn quarantine(
    store: &dyn Persistence,
    notifier: &dyn Notifier,
    name: &str,
    raw: &str,
    reason: &str,
) -> Option<PathBuf> {
    tracing::error!(
        file = name,
        preview = %preview(raw),
        "persisted data is corrupt: {reason}"
    );

    let backup = match store.backup_file(name, raw) {
        Ok(path) => {
            tracing::warn!(file = name, backup = %path.display(), "corrupt file backed up");
            Some(path)
        }
        Err(err) => {
            tracing::error!(file = name, "could not back up corrupt file: {err}");
            None
        }
    };

    if notifier.is_interactive() {
        let location = backup
            .as_ref()
            .map(|p| format!(" A copy of the old file was kept at {}.", p.display()))
            .unwrap_or_default();
        notifier.notify(Notice::new(
            Severity::Warning,
            format!("{name} was rebuilt"),
            format!(
                "The saved data could not be read and was replaced with defaults. \
                 Custom settings may have been lost.{location}"
            ),
        ));
    }
    backup
}

/// Log a disk failure at critical severity and tell the user about it.
pub fn report_io_failure(notifier: &dyn Notifier, name: &str, action: &str, err: &dyn std::fmt::Display) {
    tracing::error!(file = name, critical = true, "failed to {action}: {err}");
    if notifier.is_interactive() {
        notifier.notify(Notice::new(
            Severity::Critical,
            format!("Could not {action} {name}"),
            format!("{err}. Defaults are in use until the file can be read again."),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use bazaar_core::MemoryNotifier;

    #[test]
    fn test_preview_is_bounded() {
        let raw = "x".repeat(PREVIEW_CHARS * 2);
        let excerpt = preview(&raw);
        assert_eq!(excerpt.len(), PREVIEW_CHARS + 3);
        assert!(excerpt.ends_with("..."));
        assert_eq!(preview("a\nb"), "a b");
    }

    #[test]
    fn test_quarantine_backs_up_and_notifies() {
        let store = MemoryStore::new();
        let notifier = MemoryNotifier::new();

        let backup = quarantine(&store, &notifier, "StoreItems.json", "{not json", "expected value");

        assert!(backup.is_some());
        assert_eq!(store.backups()[0].1, "{not json");
        let notices = notifier.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].severity, Severity::Warning);
        assert!(notices[0].body.contains("Custom settings may have been lost"));
    }

    #[test]
    fn test_quarantine_survives_backup_failure() {
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let notifier = MemoryNotifier::new();

        assert!(quarantine(&store, &notifier, "Traits.json", "??", "eof").is_none());
        assert_eq!(notifier.notices().len(), 1);
    }
}
