//! Session context model and its reader.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::repository::SessionRepository;
use crate::storage::{ACCESS_KEY, CONTEXT_KEY};

/// Role and landing page persisted alongside the credential pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Role name as issued by the server (case preserved).
    #[serde(rename = "rol", alias = "role", default)]
    pub role: String,
    /// Home route for this role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    /// Any other fields the server attached to the context.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionContext {
    /// Build a context with no extra fields.
    #[must_use]
    pub fn new(role: impl Into<String>, redirect_to: Option<String>) -> Self {
        Self {
            role: role.into(),
            redirect_to,
            extra: Map::new(),
        }
    }

    /// Role folded to lower case for allow-list comparison.
    #[must_use]
    pub fn normalized_role(&self) -> String {
        self.role.trim().to_lowercase()
    }

    /// Home route for this role, ignoring blank values.
    #[must_use]
    pub fn fallback(&self) -> Option<&str> {
        self.redirect_to
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }

    /// Encode for storage.
    #[must_use]
    pub fn to_json(&self) -> String {
        // Strings and JSON values always serialise.
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Decode from storage; `None` when the payload is not a JSON object.
    #[must_use]
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }
}

/// Reads the session context from the repository's active scope.
#[derive(Clone)]
pub struct SessionContextReader {
    repository: Arc<SessionRepository>,
}

impl SessionContextReader {
    /// Build a reader over the shared repository.
    #[must_use]
    pub const fn new(repository: Arc<SessionRepository>) -> Self {
        Self { repository }
    }

    /// Current session context, or `None` for an anonymous visitor.
    ///
    /// Access credential and role are evaluated together: a role without an
    /// access credential is not a session.
    #[must_use]
    pub fn current(&self) -> Option<SessionContext> {
        let scope = self.repository.active();
        scope.get_non_empty(ACCESS_KEY)?;

        let raw = scope.get_non_empty(CONTEXT_KEY)?;
        let Some(context) = SessionContext::from_json(&raw) else {
            debug!("stored session context is not valid JSON");
            return None;
        };

        // Only an empty role means anonymous; a blank one still counts as a session.
        if context.role.is_empty() {
            return None;
        }
        Some(context)
    }
}
