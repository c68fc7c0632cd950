//! Application and request spans.
//!
//! # Design
//! - The app span carries the command name and build SHA for the whole run.
//! - The request identifier lives in task-local storage; callers read it back
//!   to stamp outgoing `x-request-id` headers with the id the span carries.

use std::future::Future;
use std::sync::Arc;

use tracing::{Instrument, Span, span::Entered};

use crate::init::build_sha;

/// Keeps the application-level span entered for the lifetime of the guard.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the `app` span tagged with `command`.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        let command = command.into();
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "app",
            command = %command,
            build_sha = %build_sha()
        )));
        Self {
            _guard: span.enter(),
        }
    }
}

#[derive(Clone)]
struct RequestContext {
    request_id: Arc<str>,
}

tokio::task_local! {
    static ACTIVE_REQUEST: RequestContext;
}

/// Request identifier of the enclosing [`with_request_context`] scope.
#[must_use]
pub fn current_request_id() -> Option<String> {
    ACTIVE_REQUEST
        .try_with(|ctx| ctx.request_id.as_ref().to_string())
        .ok()
}

/// Run `fut` inside a `request` span with `request_id` available to callees.
pub async fn with_request_context<Fut, T>(request_id: impl Into<String>, fut: Fut) -> T
where
    Fut: Future<Output = T>,
{
    let request_id: Arc<str> = Arc::from(request_id.into());
    let span = tracing::info_span!("request", request_id = %request_id);
    ACTIVE_REQUEST
        .scope(RequestContext { request_id }, fut)
        .instrument(span)
        .await
}
