//! Seeded repositories and canned payloads.

use std::sync::Arc;

use serde_json::json;
use talentrack_auth::storage::{ACCESS_KEY, CONTEXT_KEY, FULL_NAME_KEY, REFRESH_KEY};
use talentrack_auth::{MemoryScope, ScopeKind, SessionRepository, StorageScope};

/// Repository over two in-memory scopes, with handles to both.
pub struct Seeded {
    /// Durable scope.
    pub durable: Arc<MemoryScope>,
    /// Ephemeral scope.
    pub ephemeral: Arc<MemoryScope>,
    /// Repository over both scopes.
    pub repository: Arc<SessionRepository>,
}

impl Seeded {
    /// Scope handle of the given kind.
    #[must_use]
    pub fn scope(&self, kind: ScopeKind) -> &MemoryScope {
        match kind {
            ScopeKind::Durable => self.durable.as_ref(),
            ScopeKind::Ephemeral => self.ephemeral.as_ref(),
        }
    }
}

/// Values to pre-populate one scope with.
#[derive(Clone, Debug, Default)]
pub struct SessionFixture {
    /// Access credential.
    pub access: Option<&'static str>,
    /// Refresh credential.
    pub refresh: Option<&'static str>,
    /// Role written into the context.
    pub role: Option<&'static str>,
    /// Redirect written into the context.
    pub redirect_to: Option<&'static str>,
    /// Display name.
    pub full_name: Option<&'static str>,
}

impl SessionFixture {
    /// A fully logged-in session for `role` with its home as redirect.
    #[must_use]
    pub const fn logged_in(role: &'static str, redirect_to: &'static str) -> Self {
        Self {
            access: Some("access-1"),
            refresh: Some("refresh-1"),
            role: Some(role),
            redirect_to: Some(redirect_to),
            full_name: None,
        }
    }

    /// Only a credential pair, no context.
    #[must_use]
    pub const fn tokens(access: Option<&'static str>, refresh: Option<&'static str>) -> Self {
        Self {
            access,
            refresh,
            role: None,
            redirect_to: None,
            full_name: None,
        }
    }

    fn write(&self, scope: &MemoryScope) {
        let mut writes: Vec<(&str, String)> = Vec::new();
        if let Some(access) = self.access {
            writes.push((ACCESS_KEY, access.to_string()));
        }
        if let Some(refresh) = self.refresh {
            writes.push((REFRESH_KEY, refresh.to_string()));
        }
        if self.role.is_some() || self.redirect_to.is_some() {
            let mut context = serde_json::Map::new();
            if let Some(role) = self.role {
                context.insert("rol".into(), json!(role));
            }
            if let Some(redirect_to) = self.redirect_to {
                context.insert("redirect_to".into(), json!(redirect_to));
            }
            writes.push((CONTEXT_KEY, serde_json::Value::Object(context).to_string()));
        }
        if let Some(name) = self.full_name {
            writes.push((FULL_NAME_KEY, name.to_string()));
        }
        for (key, value) in writes {
            // In-memory writes cannot fail.
            let _ = scope.set(key, &value);
        }
    }
}

/// Repository with `fixture` written into the scope of `kind`.
#[must_use]
pub fn seeded(kind: ScopeKind, fixture: &SessionFixture) -> Seeded {
    let durable = Arc::new(MemoryScope::new());
    let ephemeral = Arc::new(MemoryScope::new());
    match kind {
        ScopeKind::Durable => fixture.write(&durable),
        ScopeKind::Ephemeral => fixture.write(&ephemeral),
    }
    let repository = Arc::new(SessionRepository::new(durable.clone(), ephemeral.clone()));
    Seeded {
        durable,
        ephemeral,
        repository,
    }
}

/// Repository with nothing stored.
#[must_use]
pub fn anonymous() -> Seeded {
    seeded(ScopeKind::Ephemeral, &SessionFixture::default())
}

/// Successful login response body.
#[must_use]
pub fn login_body(role: &str, redirect_to: &str) -> serde_json::Value {
    json!({
        "access": "login-access",
        "refresh": "login-refresh",
        "context": { "rol": role, "redirect_to": redirect_to, "empresa_id": 3 }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_writes_only_requested_keys() {
        let seeded = seeded(
            ScopeKind::Durable,
            &SessionFixture::tokens(None, Some("r")),
        );
        assert_eq!(seeded.durable.len(), 1);
        assert!(seeded.ephemeral.is_empty());
        assert_eq!(seeded.durable.get(REFRESH_KEY).as_deref(), Some("r"));
    }

    #[test]
    fn logged_in_fixture_has_context() {
        let seeded = seeded(
            ScopeKind::Ephemeral,
            &SessionFixture::logged_in("manager", "/manager/inicio"),
        );
        let raw = seeded.ephemeral.get(CONTEXT_KEY).unwrap_or_default();
        assert!(raw.contains("\"rol\":\"manager\""));
    }
}
