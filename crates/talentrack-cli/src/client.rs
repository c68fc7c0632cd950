//! Application context and error types shared by command handlers.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use anyhow::anyhow;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use talentrack_auth::{ApiResponse, AuthClient, ClientConfig, ReqwestTransport};

use crate::output::OutputFormat;
use crate::storage::{FileScope, StatePaths};

pub(crate) const HEADER_REQUEST_ID: &str = "x-request-id";

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

/// Everything a command handler needs.
pub(crate) struct AppContext {
    pub(crate) auth: AuthClient<ReqwestTransport>,
    pub(crate) output: OutputFormat,
}

impl AppContext {
    /// Wire the session core over file-backed scopes and a tagged HTTP client.
    pub(crate) fn new(
        config: ClientConfig,
        paths: &StatePaths,
        request_id: &str,
        output: OutputFormat,
    ) -> CliResult<Self> {
        config
            .validate()
            .map_err(|err| CliError::validation(err.to_string()))?;

        let mut default_headers = HeaderMap::new();
        let request_id = HeaderValue::from_str(request_id).map_err(|_| {
            CliError::failure(anyhow!("request identifier contains invalid characters"))
        })?;
        default_headers.insert(HEADER_REQUEST_ID, request_id);

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(default_headers)
            .build()
            .map_err(|err| CliError::failure(anyhow!("failed to build HTTP client: {err}")))?;

        let auth = AuthClient::new(
            Arc::new(ReqwestTransport::from_client(client)),
            Arc::new(FileScope::new(&paths.durable)),
            Arc::new(FileScope::new(&paths.ephemeral)),
            config,
        );
        Ok(Self { auth, output })
    }
}

#[derive(Deserialize)]
struct Problem {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Classify a non-success API response into a CLI error.
pub(crate) fn classify_response(response: &ApiResponse) -> CliError {
    let body_text = response.text();
    let problem = response.json::<Problem>().ok();
    let message = problem
        .and_then(|problem| problem.detail.or(problem.title))
        .unwrap_or_else(|| body_text.trim().to_string());

    match response.status {
        400 | 409 | 422 => CliError::validation(if message.is_empty() {
            format!("request rejected with status {}", response.status)
        } else {
            message
        }),
        status if message.is_empty() => {
            CliError::failure(anyhow!("request failed with status {status}"))
        }
        status => CliError::failure(anyhow!("{message} (status {status})")),
    }
}

/// Context over `dir` pointed at `base_url`, tagged `test-request`.
#[cfg(test)]
pub(crate) fn test_context(base_url: &str, dir: &std::path::Path) -> AppContext {
    AppContext::new(
        ClientConfig::with_base_url(base_url),
        &StatePaths::within(dir),
        "test-request",
        OutputFormat::Json,
    )
    .unwrap_or_else(|err| panic!("test context: {}", err.display_message()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn exit_codes_separate_validation_from_failure() {
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(CliError::failure(anyhow!("boom")).exit_code(), 3);
        assert_eq!(CliError::validation("bad").display_message(), "bad");
    }

    #[test]
    fn classify_uses_detail_and_status_class() {
        let err = classify_response(&ApiResponse::json_body(
            400,
            &json!({ "detail": "RUC duplicado" }),
        ));
        assert!(matches!(err, CliError::Validation(message) if message == "RUC duplicado"));

        let err = classify_response(&ApiResponse::json_body(
            500,
            &json!({ "title": "server error" }),
        ));
        assert_eq!(err.display_message(), "server error (status 500)");

        let err = classify_response(&ApiResponse::new(503));
        assert_eq!(err.display_message(), "request failed with status 503");
    }

    #[test]
    fn invalid_base_url_is_a_validation_error() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let result = AppContext::new(
            ClientConfig::with_base_url("ftp://example.com"),
            &StatePaths::within(dir.path()),
            "req-1",
            OutputFormat::Table,
        );
        assert!(matches!(result, Err(CliError::Validation(_))));
        Ok(())
    }
}
