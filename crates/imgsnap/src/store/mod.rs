use std::collections::BTreeSet;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

pub const SNAPSHOT_DIR: &str = "__img_snapshots__";
pub const BASELINE_SUFFIX: &str = ".snap.png";
pub const DIFF_SUFFIX: &str = ".diff.png";

const TEMP_PREFIX: &str = ".imgsnap-";

/// Result of trying to create a baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Established {
    Created,
    /// Another writer created it first; the existing file was not touched.
    AlreadyExists,
}

/// Reject ids that would escape the snapshot directory.
pub fn validate_id(id: &str) -> Result<&str> {
    let bad = id.is_empty()
        || id == "."
        || id == ".."
        || id.contains(['/', '\\', '\0']);
    if bad {
        return Err(Error::InvalidIdentifier(id.to_owned()));
    }
    Ok(id)
}

/// Baseline and diff PNGs for one base directory, stored flat under
/// `<dir>/__img_snapshots__/`.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    dir: PathBuf,
}

impl BaselineStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn snapshot_dir(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_DIR)
    }

    pub fn baseline_path(&self, id: &str) -> PathBuf {
        self.snapshot_dir().join(format!("{id}{BASELINE_SUFFIX}"))
    }

    pub fn diff_path(&self, id: &str) -> PathBuf {
        self.snapshot_dir().join(format!("{id}{DIFF_SUFFIX}"))
    }

    /// `Ok(None)` when no baseline exists yet. Any other read failure is an error.
    pub fn load_baseline(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let path = self.baseline_path(validate_id(id)?);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    /// Create the baseline for `id`. Never overwrites an existing one.
    pub fn save_baseline(&self, id: &str, png: &[u8]) -> Result<Established> {
        let path = self.baseline_path(validate_id(id)?);
        self.write_atomic(&path, png, false)
    }

    /// Write (or overwrite) the diff artifact for `id`.
    pub fn save_diff(&self, id: &str, png: &[u8]) -> Result<PathBuf> {
        let path = self.diff_path(validate_id(id)?);
        self.write_atomic(&path, png, true)?;
        Ok(path)
    }

    pub fn remove_baseline(&self, id: &str) -> Result<bool> {
        remove_if_exists(&self.baseline_path(validate_id(id)?))
    }

    pub fn remove_diff(&self, id: &str) -> Result<bool> {
        remove_if_exists(&self.diff_path(validate_id(id)?))
    }

    /// `false` for ids that [`validate_id`] rejects.
    pub fn has_baseline(&self, id: &str) -> bool {
        validate_id(id).is_ok_and(|id| self.baseline_path(id).is_file())
    }

    pub fn has_diff(&self, id: &str) -> bool {
        validate_id(id).is_ok_and(|id| self.diff_path(id).is_file())
    }

    pub fn list_baseline_ids(&self) -> BTreeSet<String> {
        self.collect_ids(BASELINE_SUFFIX)
    }

    pub fn list_diff_ids(&self) -> BTreeSet<String> {
        self.collect_ids(DIFF_SUFFIX)
    }

    fn collect_ids(&self, suffix: &str) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();
        let Ok(entries) = std::fs::read_dir(self.snapshot_dir()) else {
            return ids;
        };
        for entry in entries.flatten() {
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                continue;
            }
            let name = entry.file_name();
            if let Some(id) = name.to_str().and_then(|n| n.strip_suffix(suffix))
                && !id.is_empty()
                && !id.starts_with(TEMP_PREFIX)
            {
                ids.insert(id.to_owned());
            }
        }
        ids
    }

    /// Write through a temp file in the snapshot directory, then rename into
    /// place so readers never observe a partial PNG.
    fn write_atomic(&self, path: &Path, bytes: &[u8], clobber: bool) -> Result<Established> {
        let dir = self.snapshot_dir();
        std::fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

        let mut tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| Error::io(&dir, e))?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.flush())
            .map_err(|e| Error::io(tmp.path(), e))?;

        if clobber {
            tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
            debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
            return Ok(Established::Created);
        }

        match tmp.persist_noclobber(path) {
            Ok(_) => {
                debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
                Ok(Established::Created)
            }
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(Established::AlreadyExists),
            Err(e) => Err(Error::io(path, e.error)),
        }
    }
}

fn remove_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}
