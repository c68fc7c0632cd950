use std::fs;

use anyhow::anyhow;
use serde_json::Value;
use talentrack_auth::{HttpMethod, RequestOptions};
use tracing::info;

use crate::cli::RequestArgs;
use crate::client::{AppContext, CliError, CliResult, classify_response};
use crate::output::render_response;

pub(crate) async fn handle_request(ctx: &AppContext, args: &RequestArgs) -> CliResult<()> {
    let method = HttpMethod::parse(&args.method).ok_or_else(|| {
        CliError::validation(format!("unsupported HTTP method '{}'", args.method))
    })?;

    let mut options = RequestOptions::new(method);
    for raw in &args.headers {
        let (name, value) = parse_header(raw)?;
        options = options.header(name, value);
    }
    if let Some(data) = args.data.as_deref() {
        let body = load_body(data)?;
        if !options.headers.contains("Content-Type") {
            serde_json::from_slice::<Value>(&body).map_err(|err| {
                CliError::validation(format!("request body is not valid JSON: {err}"))
            })?;
        }
        options = options.body(body);
    }

    let response = ctx
        .auth
        .dispatcher()
        .dispatch(&args.target, options)
        .await
        .map_err(|err| CliError::failure(anyhow!("request to {} failed: {err}", args.target)))?;

    if response.is_unauthorized() {
        ctx.auth.session().clear_session();
        info!("session discarded after unrecoverable 401");
        return Err(CliError::failure(anyhow!(
            "not authenticated or session expired; run `talentrack login`"
        )));
    }
    if !response.is_success() {
        return Err(classify_response(&response));
    }
    render_response(&response, ctx.output)
}

pub(crate) fn parse_header(raw: &str) -> CliResult<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| CliError::validation(format!("header '{raw}' must be 'Name: value'")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::validation(format!("header '{raw}' has no name")));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn load_body(data: &str) -> CliResult<Vec<u8>> {
    match data.strip_prefix('@') {
        Some(path) => fs::read(path)
            .map_err(|err| CliError::validation(format!("failed to read body from '{path}': {err}"))),
        None => Ok(data.as_bytes().to_vec()),
    }
}
