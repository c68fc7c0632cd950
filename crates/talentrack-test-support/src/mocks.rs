//! Scripted in-memory transports.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::{Value, json};
use talentrack_auth::{ApiRequest, ApiResponse, HttpTransport, TransportError};

type Handler = dyn Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync;

/// Transport answering from a closure and recording every request.
pub struct ScriptedTransport {
    handler: Box<Handler>,
    sent: Mutex<Vec<ApiRequest>>,
    yield_before_reply: bool,
}

impl ScriptedTransport {
    /// Answer every request with `handler`.
    #[must_use]
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    {
        Self {
            handler: Box::new(handler),
            sent: Mutex::new(Vec::new()),
            yield_before_reply: false,
        }
    }

    /// Yield to the scheduler before each reply so concurrent callers interleave.
    #[must_use]
    pub const fn yielding(mut self) -> Self {
        self.yield_before_reply = true;
        self
    }

    /// Every request sent so far, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of requests whose URL ends with `suffix`.
    #[must_use]
    pub fn count_to(&self, suffix: &str) -> usize {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|request| request.url.ends_with(suffix))
            .count()
    }

    /// Total number of requests.
    #[must_use]
    pub fn total(&self) -> usize {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        if self.yield_before_reply {
            tokio::task::yield_now().await;
        }
        (self.handler)(&request)
    }
}

/// How the fake renewal endpoint answers.
#[derive(Clone, Debug)]
pub enum RefreshReply {
    /// 200 with `{"access": <token>}`.
    Issue(&'static str),
    /// Arbitrary status and JSON body.
    Status(u16, Value),
    /// 200 with a non-JSON body.
    Garbage,
    /// The renewal call fails at the transport level.
    Unreachable,
}

/// Fake backend: the renewal endpoint answers per `refresh`, every other
/// path returns 200 `{"ok": true}` only for `Bearer <valid_access>`, else 401.
#[must_use]
pub fn expiring_api(valid_access: &'static str, refresh: RefreshReply) -> ScriptedTransport {
    ScriptedTransport::new(move |request| {
        if request.url.ends_with("/api/auth/refresh/") {
            return match &refresh {
                RefreshReply::Issue(token) => Ok(ApiResponse::json_body(
                    200,
                    &json!({ "access": token }),
                )),
                RefreshReply::Status(status, body) => Ok(ApiResponse::json_body(*status, body)),
                RefreshReply::Garbage => Ok(ApiResponse {
                    body: b"<html>oops</html>".to_vec(),
                    ..ApiResponse::new(200)
                }),
                RefreshReply::Unreachable => Err(TransportError::Network {
                    detail: "connection refused".into(),
                }),
            };
        }

        let expected = format!("Bearer {valid_access}");
        if request.headers.get("authorization") == Some(expected.as_str()) {
            Ok(ApiResponse::json_body(200, &json!({ "ok": true })))
        } else {
            Ok(ApiResponse::json_body(
                401,
                &json!({ "detail": "token_not_valid" }),
            ))
        }
    })
}
