//! Resilient request dispatcher: attach credential, send, renew once, retry once.
//!
//! # Design
//! - Per call: original send, then at most one renewal, then at most one retry.
//! - A failed renewal hands back the original 401 untouched; redirecting and
//!   clearing the session are the caller's job.
//! - Renewals are serialised behind one async lock in coalesced mode; a waiter
//!   that finds the rejected credential already replaced reuses the new one.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::{ClientConfig, RenewalMode};
use crate::credentials::CredentialStore;
use crate::error::TransportError;
use crate::renewer::TokenRenewer;
use crate::repository::SessionRepository;
use crate::transport::{ApiRequest, ApiResponse, Headers, HttpMethod, HttpTransport};

const CONTENT_TYPE: &str = "Content-Type";
const AUTHORIZATION: &str = "Authorization";
const JSON: &str = "application/json";

/// Caller-supplied part of a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestOptions {
    /// Request method.
    pub method: HttpMethod,
    /// Caller headers; they win over computed defaults except `Authorization`.
    pub headers: Headers,
    /// Optional body.
    pub body: Option<Vec<u8>>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(HttpMethod::Get)
    }
}

impl RequestOptions {
    /// Options for the given method with no headers and no body.
    #[must_use]
    pub const fn new(method: HttpMethod) -> Self {
        Self {
            method,
            headers: Headers::new(),
            body: None,
        }
    }

    /// Add a caller header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Attach a raw body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach a JSON-encoded body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if the payload cannot be encoded.
    pub fn json<B: Serialize + ?Sized>(self, payload: &B) -> Result<Self, TransportError> {
        let body = serde_json::to_vec(payload).map_err(|err| TransportError::InvalidRequest {
            detail: err.to_string(),
        })?;
        Ok(self.body(body))
    }
}

/// Wraps every API call with the renew-once, retry-once policy.
pub struct Dispatcher<T> {
    transport: Arc<T>,
    credentials: CredentialStore,
    renewer: TokenRenewer<T>,
    config: ClientConfig,
    renewal_lock: Mutex<()>,
}

impl<T: HttpTransport> Dispatcher<T> {
    /// Build a dispatcher over the shared repository.
    #[must_use]
    pub fn new(transport: Arc<T>, repository: Arc<SessionRepository>, config: ClientConfig) -> Self {
        let credentials = CredentialStore::new(repository);
        let renewer = TokenRenewer::new(Arc::clone(&transport), credentials.clone(), &config);
        Self {
            transport,
            credentials,
            renewer,
            config,
            renewal_lock: Mutex::new(()),
        }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Credential store shared with the renewer.
    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Send a request, renewing the access credential once on 401.
    ///
    /// # Errors
    ///
    /// Only transport failures are errors (of the original send, the renewal
    /// call or the retry). HTTP error statuses come back as responses.
    pub async fn dispatch(
        &self,
        target: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, TransportError> {
        let url = self.config.resolve(target);
        let access = self.credentials.read().access;

        debug!(
            method = options.method.as_str(),
            url = %url,
            authenticated = access.is_some(),
            "dispatching request"
        );
        let response = self
            .transport
            .send(build_request(&url, &options, access.as_deref()))
            .await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        let Some(renewed) = self.renew_after_rejection(access.as_deref()).await? else {
            return Ok(response);
        };

        debug!(url = %url, "retrying with renewed credential");
        self.transport
            .send(build_request(&url, &options, Some(&renewed)))
            .await
    }

    /// `GET` helper.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::dispatch`].
    pub async fn get(&self, target: &str) -> Result<ApiResponse, TransportError> {
        self.dispatch(target, RequestOptions::new(HttpMethod::Get))
            .await
    }

    /// `DELETE` helper.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::dispatch`].
    pub async fn delete(&self, target: &str) -> Result<ApiResponse, TransportError> {
        self.dispatch(target, RequestOptions::new(HttpMethod::Delete))
            .await
    }

    /// `POST` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::dispatch`]; encoding failures are
    /// [`TransportError::InvalidRequest`].
    pub async fn post_json<B: Serialize + ?Sized + Sync>(
        &self,
        target: &str,
        payload: &B,
    ) -> Result<ApiResponse, TransportError> {
        let options = RequestOptions::new(HttpMethod::Post).json(payload)?;
        self.dispatch(target, options).await
    }

    /// `PUT` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::post_json`].
    pub async fn put_json<B: Serialize + ?Sized + Sync>(
        &self,
        target: &str,
        payload: &B,
    ) -> Result<ApiResponse, TransportError> {
        let options = RequestOptions::new(HttpMethod::Put).json(payload)?;
        self.dispatch(target, options).await
    }

    /// `PATCH` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Dispatcher::post_json`].
    pub async fn patch_json<B: Serialize + ?Sized + Sync>(
        &self,
        target: &str,
        payload: &B,
    ) -> Result<ApiResponse, TransportError> {
        let options = RequestOptions::new(HttpMethod::Patch).json(payload)?;
        self.dispatch(target, options).await
    }

    async fn renew_after_rejection(
        &self,
        rejected: Option<&str>,
    ) -> Result<Option<String>, TransportError> {
        match self.config.renewal {
            RenewalMode::PerRequest => Ok(self.renewer.renew().await?.into_access()),
            RenewalMode::Coalesced => {
                let _guard = self.renewal_lock.lock().await;
                let current = self.credentials.read().access;
                if let Some(current) = current.filter(|value| Some(value.as_str()) != rejected) {
                    debug!("reusing credential renewed by a concurrent request");
                    return Ok(Some(current));
                }
                Ok(self.renewer.renew().await?.into_access())
            }
        }
    }
}

fn build_headers(options: &RequestOptions, access: Option<&str>) -> Headers {
    let mut headers = Headers::new();
    if options.body.is_some() {
        headers.set(CONTENT_TYPE, JSON);
    }
    headers.extend_from(&options.headers);
    if let Some(access) = access {
        headers.set(AUTHORIZATION, format!("Bearer {access}"));
    }
    headers
}

fn build_request(url: &str, options: &RequestOptions, access: Option<&str>) -> ApiRequest {
    ApiRequest {
        method: options.method,
        url: url.to_string(),
        headers: build_headers(options, access),
        body: options.body.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_request_has_no_authorization() {
        let headers = build_headers(&RequestOptions::default(), None);
        assert!(!headers.contains(AUTHORIZATION));
        assert!(!headers.contains(CONTENT_TYPE));
    }

    #[test]
    fn content_type_only_with_body() {
        let options = RequestOptions::new(HttpMethod::Post).body(b"{}".to_vec());
        let headers = build_headers(&options, None);
        assert_eq!(headers.get("content-type"), Some(JSON));
    }

    #[test]
    fn caller_headers_win_except_authorization() {
        let options = RequestOptions::new(HttpMethod::Post)
            .body(b"a=1".to_vec())
            .header("content-type", "application/x-www-form-urlencoded")
            .header("authorization", "Basic Zm9vOmJhcg==")
            .header("Accept", "text/csv");
        let headers = build_headers(&options, Some("tok"));
        assert_eq!(
            headers.get(CONTENT_TYPE),
            Some("application/x-www-form-urlencoded")
        );
        assert_eq!(headers.get(AUTHORIZATION), Some("Bearer tok"));
        assert_eq!(headers.get("accept"), Some("text/csv"));
    }

    #[test]
    fn header_injection_is_idempotent() {
        let options = RequestOptions::new(HttpMethod::Get).header("X-Trace", "1");
        assert_eq!(
            build_headers(&options, Some("same")),
            build_headers(&options, Some("same"))
        );
    }

    #[test]
    fn retry_request_keeps_method_url_and_body() {
        let options = RequestOptions::new(HttpMethod::Put).body(b"{\"x\":1}".to_vec());
        let first = build_request("http://h/api/x/", &options, Some("old"));
        let second = build_request("http://h/api/x/", &options, Some("new"));
        assert_eq!(first.method, second.method);
        assert_eq!(first.url, second.url);
        assert_eq!(first.body, second.body);
        assert_eq!(second.headers.get(AUTHORIZATION), Some("Bearer new"));
    }
}
