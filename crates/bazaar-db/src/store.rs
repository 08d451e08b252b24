//! Persistence adapter trait and the on-disk store.

use crate::error::{Error, Result};
use chrono::Utc;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Narrow storage contract used by catalogs and the cooldown ledger.
pub trait Persistence: Send + Sync {
    /// Read a blob. `Ok(None)` when it does not exist.
    fn load_file(&self, name: &str) -> Result<Option<String>>;

    /// Replace a blob with `content` in one atomic step.
    fn save_file(&self, name: &str, content: &str) -> Result<()>;

    /// Where a backup of `name` would be written right now.
    fn backup_path(&self, name: &str) -> PathBuf;

    /// Write a backup copy of `content` next to `name`.
    fn backup_file(&self, name: &str, content: &str) -> Result<PathBuf>;

    /// Directory holding the blobs.
    fn data_dir(&self) -> &Path;
}

/// Save a blob, logging instead of returning failures.
///
/// Returns whether the write succeeded.
pub fn save_logged(store: &dyn Persistence, name: &str, content: &str) -> bool {
    match store.save_file(name, content) {
        Ok(()) => {
            tracing::debug!(file = name, bytes = content.len(), "saved");
            true
        }
        Err(err) => {
            tracing::error!(file = name, critical = true, "failed to save: {err}");
            false
        }
    }
}

/// Blob store backed by a directory of files.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Resolve a blob name to a path inside the store.
    fn path(&self, name: &str) -> Result<PathBuf> {
        let invalid = name.trim().is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..");
        if invalid {
            return Err(Error::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(name))
    }

    /// Write via a `.tmp` sibling so readers never see a partial file.
    fn atomic_write(path: &Path, content: &str) -> Result<()> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, content)?;
        if let Err(err) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        Ok(())
    }
}

impl Persistence for FileStore {
    fn load_file(&self, name: &str) -> Result<Option<String>> {
        let path = self.path(name)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save_file(&self, name: &str, content: &str) -> Result<()> {
        let path = self.path(name)?;
        Self::atomic_write(&path, content)
    }

    fn backup_path(&self, name: &str) -> PathBuf {
        let file = Path::new(name);
        let stem = file
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("backup");
        let ext = file.extension().and_then(|s| s.to_str()).unwrap_or("json");
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");

        let mut candidate = self.dir.join(format!("{stem}.corrupt-{stamp}.{ext}"));
        let mut n = 1;
        while candidate.exists() {
            candidate = self.dir.join(format!("{stem}.corrupt-{stamp}-{n}.{ext}"));
            n += 1;
        }
        candidate
    }

    fn backup_file(&self, name: &str, content: &str) -> Result<PathBuf> {
        self.path(name)?;
        let path = self.backup_path(name);
        fs::write(&path, content)?;
        Ok(path)
    }

    fn data_dir(&self) -> &Path {
        &self.dir
    }
}
