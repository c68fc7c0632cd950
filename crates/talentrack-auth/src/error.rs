//! Error types for the session core.
//!
//! Expected conditions (missing credentials, failed renewal, denied routes)
//! are values, not errors. The enums here cover what genuinely failed.

use thiserror::Error;

/// Failure raised by an [`HttpTransport`](crate::transport::HttpTransport).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, reset, CORS).
    #[error("network request failed")]
    Network {
        /// Transport-specific failure detail.
        detail: String,
    },
    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,
    /// The request could not be built (bad URL, bad header value).
    #[error("invalid request")]
    InvalidRequest {
        /// Description of the invalid component.
        detail: String,
    },
}

/// Failure raised by a [`StorageScope`](crate::storage::StorageScope).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backing storage is not reachable (no window, private mode, missing file root).
    #[error("storage unavailable")]
    Unavailable {
        /// Backend-specific failure detail.
        detail: String,
    },
    /// A value could not be written.
    #[error("storage write failed")]
    WriteFailed {
        /// Key being written.
        key: String,
        /// Backend-specific failure detail.
        detail: String,
    },
}

/// Failure raised while validating [`ClientConfig`](crate::config::ClientConfig).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL was not an absolute http(s) URL.
    #[error("invalid base URL")]
    InvalidBaseUrl {
        /// Offending value.
        value: String,
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
    /// An endpoint or route path did not start with `/`.
    #[error("invalid path")]
    InvalidPath {
        /// Configuration field holding the path.
        field: &'static str,
        /// Offending value.
        value: String,
    },
}

/// Failure raised by [`SessionService::login`](crate::session::SessionService::login).
#[derive(Debug, Error)]
pub enum LoginError {
    /// The server refused the credentials.
    #[error("login rejected")]
    Rejected {
        /// HTTP status returned by the login endpoint.
        status: u16,
        /// Server-provided detail, when the body carried one.
        detail: Option<String>,
    },
    /// The login response lacked access, refresh or redirect target.
    #[error("incomplete login response")]
    IncompleteResponse,
    /// The login response body was not valid JSON.
    #[error("malformed login response")]
    MalformedBody,
    /// Persisting the new session failed.
    #[error("failed to persist session")]
    Storage(#[from] StorageError),
    /// The login request itself failed.
    #[error("login request failed")]
    Transport(#[from] TransportError),
}
