//! In-memory store for tests and hosts without a writable disk.

use crate::error::{Error, Result};
use crate::store::Persistence;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Blob store held entirely in memory.
///
/// Counts successful saves and can be told to fail reads or writes, which
/// makes the degraded paths of catalogs and the ledger observable.
#[derive(Debug)]
pub struct MemoryStore {
    dir: PathBuf,
    files: Mutex<HashMap<String, String>>,
    backups: Mutex<Vec<(PathBuf, String)>>,
    saves: AtomicUsize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            dir: PathBuf::from("memory"),
            files: Mutex::new(HashMap::new()),
            backups: Mutex::new(Vec::new()),
            saves: AtomicUsize::new(0),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Create a store with one blob already present.
    pub fn with_file(name: &str, content: &str) -> Self {
        let store = Self::new();
        store.insert(name, content);
        store
    }

    /// Put a blob in place without counting it as a save.
    pub fn insert(&self, name: &str, content: &str) {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(name.to_string(), content.to_string());
    }

    /// Current content of a blob.
    pub fn contents(&self, name: &str) -> Option<String> {
        self.files
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Backups written so far, as `(path, content)`.
    pub fn backups(&self) -> Vec<(PathBuf, String)> {
        self.backups.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Make every read fail with an IO error.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Persistence for MemoryStore {
    fn load_file(&self, name: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("read of {name} refused"),
            )));
        }
        Ok(self.contents(name))
    }

    fn save_file(&self, name: &str, content: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::WriteRejected(name.to_string()));
        }
        self.insert(name, content);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn backup_path(&self, name: &str) -> PathBuf {
        let n = self.backups.lock().unwrap_or_else(|e| e.into_inner()).len();
        self.dir.join(format!("{name}.corrupt-{n}"))
    }

    fn backup_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::WriteRejected(name.to_string()));
        }
        let path = self.backup_path(name);
        self.backups
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((path.clone(), content.to_string()));
        Ok(path)
    }

    fn data_dir(&self) -> &Path {
        &self.dir
    }
}
