//! Session service: login, display name and logout.
//!
//! # Design
//! - Login talks to the auth endpoints directly; it never goes through the
//!   dispatcher because there is no credential to renew yet.
//! - The profile lookup after login is best effort; a missing name never
//!   fails the login.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::context::SessionContext;
use crate::error::LoginError;
use crate::repository::{SessionRepository, SessionSeed};
use crate::storage::ScopeKind;
use crate::transport::{ApiRequest, HttpMethod, HttpTransport};

/// Credentials typed by the user.
#[derive(Clone, PartialEq, Eq)]
pub struct LoginRequest {
    /// Account e-mail; surrounding whitespace is trimmed before sending.
    pub email: String,
    /// Account password, sent as typed.
    pub password: String,
    /// Keep the session across restarts (durable scope).
    pub remember: bool,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("remember", &self.remember)
            .finish()
    }
}

/// Result of a successful login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoginOutcome {
    /// Scope the session was written to.
    pub scope: ScopeKind,
    /// Context returned by the server.
    pub context: SessionContext,
    /// Where the UI should navigate next.
    pub redirect_to: String,
    /// Display name, when the profile endpoint supplied one.
    pub display_name: Option<String>,
}

#[derive(Serialize)]
struct LoginPayload<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access: Option<String>,
    #[serde(default)]
    refresh: Option<String>,
    #[serde(default)]
    context: Option<SessionContext>,
}

#[derive(Deserialize)]
struct ProblemBody {
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Deserialize)]
struct ProfileBody {
    #[serde(default)]
    full_name: Option<String>,
}

/// Creates and destroys sessions in the shared repository.
pub struct SessionService<T> {
    transport: Arc<T>,
    repository: Arc<SessionRepository>,
    login_url: String,
    me_url: String,
}

impl<T: HttpTransport> SessionService<T> {
    /// Build a service over the shared repository.
    #[must_use]
    pub fn new(transport: Arc<T>, repository: Arc<SessionRepository>, config: &ClientConfig) -> Self {
        Self {
            transport,
            repository,
            login_url: config.resolve(&config.login_path),
            me_url: config.resolve(&config.me_path),
        }
    }

    /// Authenticate and start a session in the scope picked by `remember`.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError`] when the server refuses the credentials, the
    /// response is incomplete, or the session cannot be persisted.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, LoginError> {
        let payload = LoginPayload {
            email: request.email.trim(),
            password: &request.password,
        };
        let response = self
            .transport
            .send(ApiRequest::post_json(self.login_url.as_str(), &payload)?)
            .await?;

        if !response.is_success() {
            let detail = response
                .json::<ProblemBody>()
                .ok()
                .and_then(|body| body.detail);
            warn!(status = response.status, "login rejected");
            return Err(LoginError::Rejected {
                status: response.status,
                detail,
            });
        }

        let body = response
            .json::<LoginResponse>()
            .map_err(|_| LoginError::MalformedBody)?;
        let (Some(access), Some(refresh), Some(context)) = (
            body.access.filter(|value| !value.trim().is_empty()),
            body.refresh.filter(|value| !value.trim().is_empty()),
            body.context,
        ) else {
            return Err(LoginError::IncompleteResponse);
        };
        let Some(redirect_to) = context.fallback().map(str::to_string) else {
            return Err(LoginError::IncompleteResponse);
        };

        let scope = ScopeKind::for_remember(request.remember);
        self.repository.init(
            scope,
            &SessionSeed {
                access: access.clone(),
                refresh,
                context: context.clone(),
            },
        )?;

        let display_name = self.fetch_display_name(&access).await;
        if let Some(name) = &display_name
            && let Err(err) = self.repository.set_display_name(name)
        {
            warn!(error = %err, "display name could not be persisted");
        }

        info!(scope = %scope, role = %context.role, "login succeeded");
        Ok(LoginOutcome {
            scope,
            context,
            redirect_to,
            display_name,
        })
    }

    /// Display name of the current session.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        self.repository.display_name()
    }

    /// Erase credentials, context and display name from both scopes.
    pub fn clear_session(&self) {
        self.repository.clear();
    }

    async fn fetch_display_name(&self, access: &str) -> Option<String> {
        let mut request = ApiRequest::new(HttpMethod::Get, self.me_url.as_str());
        request
            .headers
            .set("Authorization", format!("Bearer {access}"));

        match self.transport.send(request).await {
            Ok(response) if response.is_success() => response
                .json::<ProfileBody>()
                .ok()
                .and_then(|body| body.full_name)
                .filter(|name| !name.trim().is_empty()),
            Ok(response) => {
                warn!(status = response.status, "profile lookup failed");
                None
            }
            Err(err) => {
                warn!(error = %err, "profile lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_request_debug_hides_password() {
        let request = LoginRequest {
            email: "ana@example.com".into(),
            password: "hunter2".into(),
            remember: false,
        };
        let printed = format!("{request:?}");
        assert!(printed.contains("ana@example.com"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn login_response_fields_are_optional() {
        let body: Result<LoginResponse, _> = serde_json::from_str(r#"{"access":"a"}"#);
        assert!(body.is_ok_and(|body| body.refresh.is_none() && body.context.is_none()));
    }
}
