//! Credential pair and the store that reads and updates it.

use std::fmt;
use std::sync::Arc;

use crate::error::StorageError;
use crate::repository::SessionRepository;
use crate::storage::{ACCESS_KEY, REFRESH_KEY};

/// Access and refresh credentials; either may be absent.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CredentialPair {
    /// Short-lived credential attached to API calls.
    pub access: Option<String>,
    /// Long-lived credential used only to obtain a new access credential.
    pub refresh: Option<String>,
}

impl CredentialPair {
    /// Whether a refresh credential is available.
    #[must_use]
    pub const fn is_renewable(&self) -> bool {
        self.refresh.is_some()
    }

    /// Whether neither credential is present.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPair")
            .field("access", &self.access.as_ref().map(|_| "<redacted>"))
            .field("refresh", &self.refresh.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Reads the pair and rewrites the access credential in the active scope.
#[derive(Clone)]
pub struct CredentialStore {
    repository: Arc<SessionRepository>,
}

impl CredentialStore {
    /// Build a store over the shared repository.
    #[must_use]
    pub const fn new(repository: Arc<SessionRepository>) -> Self {
        Self { repository }
    }

    /// Current credential pair. Missing values are `None`, never an error.
    #[must_use]
    pub fn read(&self) -> CredentialPair {
        let scope = self.repository.active();
        CredentialPair {
            access: scope.get_non_empty(ACCESS_KEY),
            refresh: scope.get_non_empty(REFRESH_KEY),
        }
    }

    /// Overwrite the access credential; the refresh credential is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend rejects the write.
    pub fn write_access(&self, access: &str) -> Result<(), StorageError> {
        self.repository.active().set(ACCESS_KEY, access)
    }
}
