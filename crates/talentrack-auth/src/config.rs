//! Client configuration and defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

/// Default API origin of the dashboard backend.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
/// Default renewal endpoint path.
pub const DEFAULT_REFRESH_PATH: &str = "/api/auth/refresh/";
/// Default login endpoint path.
pub const DEFAULT_LOGIN_PATH: &str = "/api/auth/login/";
/// Default profile endpoint path.
pub const DEFAULT_ME_PATH: &str = "/api/auth/me/";
/// Default login entry point in the navigation tree.
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";
/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How concurrent renewals are handled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalMode {
    /// One renewal at a time; later waiters reuse a credential renewed meanwhile.
    #[default]
    Coalesced,
    /// Every rejected request renews on its own.
    PerRequest,
}

/// Endpoint and behaviour settings for the session core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API origin joined with relative request targets.
    pub base_url: String,
    /// Renewal endpoint path.
    pub refresh_path: String,
    /// Login endpoint path.
    pub login_path: String,
    /// Profile endpoint path.
    pub me_path: String,
    /// Navigation route of the login screen.
    pub login_route: String,
    /// Per-request timeout in seconds (native transport only).
    pub timeout_secs: u64,
    /// Renewal concurrency policy.
    pub renewal: RenewalMode,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            refresh_path: DEFAULT_REFRESH_PATH.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            me_path: DEFAULT_ME_PATH.to_string(),
            login_route: DEFAULT_LOGIN_ROUTE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            renewal: RenewalMode::default(),
        }
    }
}

impl ClientConfig {
    /// Default configuration pointed at another origin.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Per-request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check the base URL and every path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let parsed = Url::parse(&self.base_url).map_err(|_| ConfigError::InvalidBaseUrl {
            value: self.base_url.clone(),
            reason: "unparseable",
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                value: self.base_url.clone(),
                reason: "scheme must be http or https",
            });
        }

        for (field, value) in [
            ("refresh_path", &self.refresh_path),
            ("login_path", &self.login_path),
            ("me_path", &self.me_path),
            ("login_route", &self.login_route),
        ] {
            if !value.starts_with('/') {
                return Err(ConfigError::InvalidPath {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }

    /// Resolve a request target: absolute URLs pass through, anything else
    /// is joined to the base URL with exactly one separating slash.
    #[must_use]
    pub fn resolve(&self, target: &str) -> String {
        if is_absolute(target) {
            return target.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            target.trim_start_matches('/')
        )
    }
}

fn is_absolute(target: &str) -> bool {
    let lower = target.get(..8).unwrap_or(target).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_layout() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.resolve(&config.refresh_path),
            "http://127.0.0.1:8000/api/auth/refresh/"
        );
        assert_eq!(config.renewal, RenewalMode::Coalesced);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn resolve_passes_absolute_targets_through() {
        let config = ClientConfig::with_base_url("https://hr.example.com/");
        assert_eq!(
            config.resolve("http://other.example.com/x"),
            "http://other.example.com/x"
        );
        assert_eq!(config.resolve("HTTPS://A.example/b"), "HTTPS://A.example/b");
        assert_eq!(
            config.resolve("/api/empleados/"),
            "https://hr.example.com/api/empleados/"
        );
        assert_eq!(
            config.resolve("api/empleados/"),
            "https://hr.example.com/api/empleados/"
        );
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = ClientConfig::with_base_url("ftp://files.example.com");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));

        let config = ClientConfig {
            refresh_path: "api/auth/refresh/".into(),
            ..ClientConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidPath {
                field: "refresh_path",
                value: "api/auth/refresh/".into(),
            })
        );
    }

    #[test]
    fn config_deserialises_with_partial_fields() {
        let config: Result<ClientConfig, _> =
            serde_json::from_str(r#"{"base_url":"https://hr.example.com","renewal":"per_request"}"#);
        let config = config.unwrap_or_default();
        assert_eq!(config.base_url, "https://hr.example.com");
        assert_eq!(config.renewal, RenewalMode::PerRequest);
        assert_eq!(config.login_route, DEFAULT_LOGIN_ROUTE);
    }
}
