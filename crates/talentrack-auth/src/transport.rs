//! Transport-neutral request/response types and the HTTP transport seam.
//!
//! # Design
//! - Responses are fully buffered so a rejected response can be handed back untouched.
//! - Header names compare case-insensitively; insertion order is kept.
//! - The reqwest transport is native-only; the browser adapter ships its own.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::TransportError;

/// Status that triggers the renew-and-retry path.
pub const UNAUTHORIZED: u16 = 401;

/// Request method.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl HttpMethod {
    /// Upper-case method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Parse a method token, ignoring case.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Ordered header list with case-insensitive names.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    /// Empty header list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set a header, replacing any existing value under the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(entry) = self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Builder-style [`Headers::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Value of a header, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Whether a header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Overlay `other` on top of `self`; `other` wins on conflicts.
    pub fn extend_from(&mut self, other: &Self) {
        for (name, value) in other.iter() {
            self.set(name, value);
        }
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Number of headers.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no headers are set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (name, value) in iter {
            headers.set(name, value);
        }
        headers
    }
}

/// Fully resolved outbound request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Absolute target URL.
    pub url: String,
    /// Headers to send.
    pub headers: Headers,
    /// Optional request body.
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Request with no headers and no body.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// JSON `POST` used by the auth endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] if the payload cannot be encoded.
    pub fn post_json<T: Serialize + ?Sized>(
        url: impl Into<String>,
        payload: &T,
    ) -> Result<Self, TransportError> {
        let body = serde_json::to_vec(payload).map_err(|err| TransportError::InvalidRequest {
            detail: err.to_string(),
        })?;
        Ok(Self {
            method: HttpMethod::Post,
            url: url.into(),
            headers: Headers::new().with("Content-Type", "application/json"),
            body: Some(body),
        })
    }
}

/// Fully buffered response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Headers,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Response with an empty body.
    #[must_use]
    pub const fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Response carrying a JSON body.
    #[must_use]
    pub fn json_body(status: u16, body: &serde_json::Value) -> Self {
        Self {
            status,
            headers: Headers::new().with("Content-Type", "application/json"),
            body: body.to_string().into_bytes(),
        }
    }

    /// 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// The unauthorized sentinel.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status == UNAUTHORIZED
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the decoder error when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends one request and buffers its response.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait HttpTransport: Send + Sync {
    /// Send the request once.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was received.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::ReqwestTransport;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::{Client, Method};

    use super::{ApiRequest, ApiResponse, Headers, HttpMethod, HttpTransport};
    use crate::error::TransportError;

    /// Native transport backed by a shared `reqwest` client.
    #[derive(Clone, Debug)]
    pub struct ReqwestTransport {
        client: Client,
    }

    impl ReqwestTransport {
        /// Build a client with the given per-request timeout.
        ///
        /// # Errors
        ///
        /// Returns [`TransportError::InvalidRequest`] if the client cannot be built.
        pub fn new(timeout: Duration) -> Result<Self, TransportError> {
            let client = Client::builder().timeout(timeout).build().map_err(|err| {
                TransportError::InvalidRequest {
                    detail: format!("failed to build HTTP client: {err}"),
                }
            })?;
            Ok(Self { client })
        }

        /// Wrap an already configured client (default headers, proxies).
        #[must_use]
        pub const fn from_client(client: Client) -> Self {
            Self { client }
        }
    }

    const fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn classify(err: &reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_builder() {
            TransportError::InvalidRequest {
                detail: err.to_string(),
            }
        } else {
            TransportError::Network {
                detail: err.to_string(),
            }
        }
    }

    #[async_trait]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
            let mut builder = self
                .client
                .request(method(request.method), request.url.as_str());
            for (name, value) in request.headers.iter() {
                builder = builder.header(name, value);
            }
            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await.map_err(|err| classify(&err))?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect::<Headers>();
            let body = response.bytes().await.map_err(|err| classify(&err))?;

            Ok(ApiResponse {
                status,
                headers,
                body: body.to_vec(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn headers_replace_case_insensitively() {
        let mut headers = Headers::new().with("content-type", "text/plain");
        headers.set("Content-Type", "application/json");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn extend_from_lets_overlay_win() {
        let mut base = Headers::new().with("Accept", "*/*").with("X-A", "1");
        base.extend_from(&Headers::new().with("x-a", "2"));
        assert_eq!(base.get("X-A"), Some("2"));
        assert_eq!(base.get("accept"), Some("*/*"));
    }

    #[test]
    fn method_parsing_ignores_case() {
        assert_eq!(HttpMethod::parse("patch"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::parse("TRACE"), None);
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }

    #[test]
    fn response_helpers_classify_status() {
        let response = ApiResponse::json_body(200, &json!({"access": "x"}));
        assert!(response.is_success());
        assert!(!response.is_unauthorized());
        let decoded: serde_json::Value = response.json().unwrap_or_default();
        assert_eq!(decoded["access"], json!("x"));
        assert!(ApiResponse::new(UNAUTHORIZED).is_unauthorized());
        assert!(!ApiResponse::new(403).is_unauthorized());
    }

    #[test]
    fn post_json_sets_content_type() {
        let request = ApiRequest::post_json("http://x/api", &json!({"refresh": "r"}));
        let request = request.unwrap_or_else(|_| ApiRequest::new(HttpMethod::Get, ""));
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.headers.get("content-type"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some(br#"{"refresh":"r"}"#.as_slice()));
    }
}
