//! `localStorage` / `sessionStorage` scopes.
//!
//! # Design
//! - The scope holds only its kind and looks the `Storage` object up per call,
//!   so it stays `Send + Sync` without wrapping JS handles.
//! - Missing storage (private mode, sandboxed iframes) reads as empty.

use gloo::console;
use gloo::utils::window;
use talentrack_auth::{ScopeKind, StorageError, StorageScope};
use web_sys::Storage;

/// Storage scope over one of the window's web storages.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrowserScope {
    kind: ScopeKind,
}

impl BrowserScope {
    /// `localStorage`.
    #[must_use]
    pub const fn local() -> Self {
        Self {
            kind: ScopeKind::Durable,
        }
    }

    /// `sessionStorage`.
    #[must_use]
    pub const fn session() -> Self {
        Self {
            kind: ScopeKind::Ephemeral,
        }
    }

    fn storage(self) -> Result<Storage, StorageError> {
        let storage = match self.kind {
            ScopeKind::Durable => window().local_storage(),
            ScopeKind::Ephemeral => window().session_storage(),
        };
        match storage {
            Ok(Some(storage)) => Ok(storage),
            Ok(None) => Err(StorageError::Unavailable {
                detail: format!("{} storage is disabled", self.kind),
            }),
            Err(err) => Err(StorageError::Unavailable {
                detail: format!("{err:?}"),
            }),
        }
    }
}

impl StorageScope for BrowserScope {
    fn get(&self, key: &str) -> Option<String> {
        let storage = self.storage().ok()?;
        storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = self.storage()?;
        storage.set_item(key, value).map_err(|err| {
            console::error!(format!("failed to write {key} to {} storage", self.kind));
            StorageError::WriteFailed {
                key: key.to_string(),
                detail: format!("{err:?}"),
            }
        })
    }

    fn remove(&self, key: &str) {
        let Ok(storage) = self.storage() else {
            return;
        };
        if storage.remove_item(key).is_err() {
            console::error!(format!("failed to remove {key} from {} storage", self.kind));
        }
    }
}
