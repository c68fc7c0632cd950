//! Storage scope capability and the in-memory implementation.
//!
//! # Design
//! - A scope is a flat string key-value store; values are stored raw (no JSON quoting).
//! - Reads never fail: an unreadable value is reported as absent.
//! - Implementations own their interior mutability so scopes can be shared behind `Arc`.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Key holding the access credential.
pub const ACCESS_KEY: &str = "tt_access";
/// Key holding the refresh credential.
pub const REFRESH_KEY: &str = "tt_refresh";
/// Key holding the JSON-encoded session context.
pub const CONTEXT_KEY: &str = "tt_context";
/// Key holding the user's display name.
pub const FULL_NAME_KEY: &str = "tt_full_name";

/// Every key owned by a session; `clear` removes all of them.
pub const SESSION_KEYS: [&str; 4] = [ACCESS_KEY, REFRESH_KEY, CONTEXT_KEY, FULL_NAME_KEY];

/// Which of the two scopes holds the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// Survives restarts ("remember me").
    Durable,
    /// Cleared when the browsing session ends.
    Ephemeral,
}

impl ScopeKind {
    /// Scope chosen for a login with the given "remember me" flag.
    #[must_use]
    pub const fn for_remember(remember: bool) -> Self {
        if remember { Self::Durable } else { Self::Ephemeral }
    }

    /// The opposite scope.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Durable => Self::Ephemeral,
            Self::Ephemeral => Self::Durable,
        }
    }

    /// Stable lower-case label used in logs and CLI output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Durable => "durable",
            Self::Ephemeral => "ephemeral",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value capability backing one storage scope.
pub trait StorageScope: Send + Sync {
    /// Read a value; `None` when absent or unreadable.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend rejects the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a value. Removing an absent key is a no-op.
    fn remove(&self, key: &str);

    /// Read a value, treating empty and whitespace-only strings as absent.
    fn get_non_empty(&self, key: &str) -> Option<String> {
        self.get(key).filter(|value| !value.trim().is_empty())
    }
}

/// Process-local scope used by tests and short-lived clients.
#[derive(Default)]
pub struct MemoryScope {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryScope {
    /// Create an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scope pre-populated with the given entries.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the scope holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for MemoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values are credentials; only the count is printed.
        f.debug_struct("MemoryScope")
            .field("len", &self.len())
            .finish()
    }
}

impl StorageScope for MemoryScope {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
