//! Fetch-backed transport.

use async_trait::async_trait;
use gloo_net::http::{Method, Request};
use talentrack_auth::{ApiRequest, ApiResponse, Headers, HttpMethod, HttpTransport, TransportError};

/// Transport over the browser's `fetch`.
///
/// Requests run without a client-side timeout; the browser's own network
/// limits apply.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchTransport;

const fn method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut outbound = Request::new(&request.url).method(method(request.method));
        for (name, value) in request.headers.iter() {
            outbound = outbound.header(name, value);
        }
        if let Some(body) = request.body {
            let body = String::from_utf8(body).map_err(|err| TransportError::InvalidRequest {
                detail: format!("request body is not UTF-8: {err}"),
            })?;
            outbound = outbound.body(body);
        }

        let response = outbound
            .send()
            .await
            .map_err(|err| TransportError::Network {
                detail: err.to_string(),
            })?;
        let headers: Headers = response.headers().entries().collect();
        let body = response
            .binary()
            .await
            .map_err(|err| TransportError::Network {
                detail: err.to_string(),
            })?;

        Ok(ApiResponse {
            status: response.status(),
            headers,
            body,
        })
    }
}
