//! Access-credential renewal against the fixed refresh endpoint.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::error::TransportError;
use crate::transport::{ApiRequest, HttpTransport};

/// Why a renewal produced no credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenewalFailure {
    /// No refresh credential is stored; no request was sent.
    MissingRefreshToken,
    /// The endpoint answered with a non-2xx status.
    Rejected {
        /// Status returned by the renewal endpoint.
        status: u16,
    },
    /// The 2xx body was not JSON.
    MalformedBody,
    /// The 2xx body carried no usable `access` field.
    MissingAccessToken,
}

impl RenewalFailure {
    /// Stable label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingRefreshToken => "missing_refresh_token",
            Self::Rejected { .. } => "rejected",
            Self::MalformedBody => "malformed_body",
            Self::MissingAccessToken => "missing_access_token",
        }
    }
}

/// Result of one renewal attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenewalOutcome {
    /// A new access credential was issued (and persisted when storage allowed).
    Renewed {
        /// The new access credential.
        access: String,
    },
    /// No credential could be obtained.
    Failed(RenewalFailure),
}

impl RenewalOutcome {
    /// New access credential, collapsing every failure to `None`.
    #[must_use]
    pub fn into_access(self) -> Option<String> {
        match self {
            Self::Renewed { access } => Some(access),
            Self::Failed(_) => None,
        }
    }
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    #[serde(default)]
    access: Option<String>,
}

/// Exchanges the refresh credential for a new access credential.
pub struct TokenRenewer<T> {
    transport: Arc<T>,
    credentials: CredentialStore,
    endpoint: String,
}

impl<T: HttpTransport> TokenRenewer<T> {
    /// Build a renewer posting to the configured refresh endpoint.
    #[must_use]
    pub fn new(transport: Arc<T>, credentials: CredentialStore, config: &ClientConfig) -> Self {
        Self {
            transport,
            credentials,
            endpoint: config.resolve(&config.refresh_path),
        }
    }

    /// Attempt one renewal.
    ///
    /// # Errors
    ///
    /// Only a transport failure of the renewal call is an error; every
    /// server-side refusal is reported as [`RenewalOutcome::Failed`].
    pub async fn renew(&self) -> Result<RenewalOutcome, TransportError> {
        let Some(refresh) = self.credentials.read().refresh else {
            return Ok(self.failed(RenewalFailure::MissingRefreshToken));
        };

        let request = ApiRequest::post_json(
            self.endpoint.as_str(),
            &RefreshRequest {
                refresh: refresh.as_str(),
            },
        )?;
        let response = self.transport.send(request).await?;

        if !response.is_success() {
            return Ok(self.failed(RenewalFailure::Rejected {
                status: response.status,
            }));
        }

        let Ok(body) = response.json::<RefreshResponse>() else {
            return Ok(self.failed(RenewalFailure::MalformedBody));
        };
        let Some(access) = body.access.filter(|value| !value.trim().is_empty()) else {
            return Ok(self.failed(RenewalFailure::MissingAccessToken));
        };

        if let Err(err) = self.credentials.write_access(&access) {
            warn!(error = %err, "renewed access credential could not be persisted");
        }
        info!("access credential renewed");
        Ok(RenewalOutcome::Renewed { access })
    }

    fn failed(&self, reason: RenewalFailure) -> RenewalOutcome {
        warn!(
            endpoint = %self.endpoint,
            reason = reason.as_str(),
            "access credential renewal failed"
        );
        RenewalOutcome::Failed(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_access_collapses_failures() {
        let renewed = RenewalOutcome::Renewed {
            access: "n".into(),
        };
        assert_eq!(renewed.into_access().as_deref(), Some("n"));
        for reason in [
            RenewalFailure::MissingRefreshToken,
            RenewalFailure::Rejected { status: 400 },
            RenewalFailure::MalformedBody,
            RenewalFailure::MissingAccessToken,
        ] {
            assert!(RenewalOutcome::Failed(reason).into_access().is_none());
        }
    }

    #[test]
    fn refresh_response_tolerates_missing_field() {
        let parsed: Result<RefreshResponse, _> = serde_json::from_str(r#"{"detail":"ok"}"#);
        assert!(parsed.is_ok_and(|body| body.access.is_none()));
    }
}
