//! File-backed storage scopes.
//!
//! # Design
//! - Each scope is one JSON object on disk; every operation re-reads the file
//!   so concurrent CLI invocations see each other's writes.
//! - Writes go to a sibling temp file first and are renamed into place.
//! - The durable scope lives in the state directory; the ephemeral scope lives
//!   in the OS temp directory, keyed by the parent shell so it ends with it.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use talentrack_auth::{StorageError, StorageScope};
use tracing::warn;

const SESSION_FILE: &str = "session.json";

/// Locations of the two scope files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StatePaths {
    pub(crate) durable: PathBuf,
    pub(crate) ephemeral: PathBuf,
}

impl StatePaths {
    /// Paths under `state_dir`, falling back to `$HOME/.talentrack`.
    pub(crate) fn resolve(state_dir: Option<PathBuf>) -> Self {
        let durable_dir = state_dir
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".talentrack")))
            .unwrap_or_else(|| std::env::temp_dir().join("talentrack-state"));
        Self {
            durable: durable_dir.join(SESSION_FILE),
            ephemeral: std::env::temp_dir()
                .join(format!("talentrack-{}", shell_id()))
                .join(SESSION_FILE),
        }
    }

    /// Both files inside `dir`.
    #[cfg(test)]
    pub(crate) fn within(dir: &Path) -> Self {
        Self {
            durable: dir.join("durable").join(SESSION_FILE),
            ephemeral: dir.join("ephemeral").join(SESSION_FILE),
        }
    }
}

#[cfg(unix)]
fn shell_id() -> u32 {
    std::os::unix::process::parent_id()
}

#[cfg(not(unix))]
fn shell_id() -> u32 {
    0
}

/// A storage scope persisted as a JSON object in one file.
#[derive(Debug)]
pub(crate) struct FileScope {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileScope {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(StorageError::Unavailable {
                    detail: format!("{}: {err}", self.path.display()),
                });
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|err| StorageError::Unavailable {
            detail: format!("{}: {err}", self.path.display()),
        })
    }

    fn store(&self, entries: &BTreeMap<String, String>) -> io::Result<()> {
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
                _ => Ok(()),
            };
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let encoded = serde_json::to_vec_pretty(entries).map_err(io::Error::other)?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, encoded)?;
        restrict_permissions(&staging)?;
        fs::rename(&staging, &self.path)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

impl StorageScope for FileScope {
    fn get(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        match self.load() {
            Ok(mut entries) => entries.remove(key),
            Err(err) => {
                warn!(error = %err, "session file unreadable");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.store(&entries)
            .map_err(|err| StorageError::WriteFailed {
                key: key.to_string(),
                detail: err.to_string(),
            })
    }

    fn remove(&self, key: &str) {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = match self.load() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "session file unreadable; discarding it");
                BTreeMap::new()
            }
        };
        entries.remove(key);
        if let Err(err) = self.store(&entries) {
            warn!(error = %err, path = %self.path.display(), "session file could not be updated");
        }
    }
}
