//! Session repository: owns both storage scopes and the session lifecycle.
//!
//! # Design
//! - The active scope is decided once per session: by `init` at login, or by a
//!   presence check the first time an existing session is found.
//! - An anonymous detection is not cached, so a session created elsewhere is
//!   picked up on the next read.
//! - `clear` erases every session key from both scopes and forgets the decision.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info};

use crate::context::SessionContext;
use crate::error::StorageError;
use crate::storage::{
    ACCESS_KEY, CONTEXT_KEY, FULL_NAME_KEY, REFRESH_KEY, SESSION_KEYS, ScopeKind, StorageScope,
};

/// Values written at login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSeed {
    /// Access credential returned by the login endpoint.
    pub access: String,
    /// Refresh credential returned by the login endpoint.
    pub refresh: String,
    /// Session context returned by the login endpoint.
    pub context: SessionContext,
}

/// Shared owner of the durable and ephemeral scopes.
pub struct SessionRepository {
    durable: Arc<dyn StorageScope>,
    ephemeral: Arc<dyn StorageScope>,
    active: RwLock<Option<ScopeKind>>,
}

impl SessionRepository {
    /// Build a repository over the two scopes.
    #[must_use]
    pub fn new(durable: Arc<dyn StorageScope>, ephemeral: Arc<dyn StorageScope>) -> Self {
        Self {
            durable,
            ephemeral,
            active: RwLock::new(None),
        }
    }

    /// Borrow the scope of the given kind.
    #[must_use]
    pub fn scope(&self, kind: ScopeKind) -> &dyn StorageScope {
        match kind {
            ScopeKind::Durable => self.durable.as_ref(),
            ScopeKind::Ephemeral => self.ephemeral.as_ref(),
        }
    }

    /// Presence check: durable when the durable scope holds an access credential.
    #[must_use]
    pub fn detect(&self) -> ScopeKind {
        if self.durable.get_non_empty(ACCESS_KEY).is_some() {
            ScopeKind::Durable
        } else {
            ScopeKind::Ephemeral
        }
    }

    /// Kind of the scope currently holding the session.
    #[must_use]
    pub fn active_kind(&self) -> ScopeKind {
        let cached = *self.active.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(kind) = cached {
            return kind;
        }

        let detected = self.detect();
        if self.scope(detected).get_non_empty(ACCESS_KEY).is_some() {
            debug!(scope = %detected, "session scope resolved");
            *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(detected);
        }
        detected
    }

    /// Borrow the scope currently holding the session.
    #[must_use]
    pub fn active(&self) -> &dyn StorageScope {
        self.scope(self.active_kind())
    }

    /// Start a session in the given scope, erasing anything held by the other one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if any value cannot be written. Partially
    /// written keys are removed before returning.
    pub fn init(&self, kind: ScopeKind, seed: &SessionSeed) -> Result<(), StorageError> {
        remove_session_keys(self.scope(kind.other()));

        let scope = self.scope(kind);
        let context = seed.context.to_json();
        let written = scope
            .set(ACCESS_KEY, &seed.access)
            .and_then(|()| scope.set(REFRESH_KEY, &seed.refresh))
            .and_then(|()| scope.set(CONTEXT_KEY, &context));

        if let Err(err) = written {
            remove_session_keys(scope);
            *self.active.write().unwrap_or_else(PoisonError::into_inner) = None;
            return Err(err);
        }

        scope.remove(FULL_NAME_KEY);
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(kind);
        info!(scope = %kind, role = %seed.context.role, "session initialised");
        Ok(())
    }

    /// Persist the display name next to the active session.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend rejects the write.
    pub fn set_display_name(&self, name: &str) -> Result<(), StorageError> {
        self.active().set(FULL_NAME_KEY, name)
    }

    /// Display name of the active session, if one was recorded.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.active().get_non_empty(FULL_NAME_KEY)
    }

    /// Erase the session from both scopes.
    pub fn clear(&self) {
        remove_session_keys(self.durable.as_ref());
        remove_session_keys(self.ephemeral.as_ref());
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = None;
        info!("session cleared");
    }
}

fn remove_session_keys(scope: &dyn StorageScope) {
    for key in SESSION_KEYS {
        scope.remove(key);
    }
}
