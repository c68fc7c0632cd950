//! Renderers for command results.

use anyhow::anyhow;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::{Value, json};
use talentrack_auth::{ApiResponse, GuardDecision, LoginOutcome, RedirectReason, ScopeKind};

use crate::client::{CliError, CliResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// What `whoami` reports.
#[derive(Debug, Serialize)]
pub(crate) struct SessionSummary {
    pub(crate) role: String,
    pub(crate) redirect_to: Option<String>,
    pub(crate) display_name: Option<String>,
    pub(crate) scope: ScopeKind,
}

fn print_json(value: &impl Serialize) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

pub(crate) fn render_login(outcome: &LoginOutcome, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&json!({
            "role": outcome.context.role,
            "redirect_to": outcome.redirect_to,
            "display_name": outcome.display_name,
            "scope": outcome.scope,
        })),
        OutputFormat::Table => {
            match &outcome.display_name {
                Some(name) => println!("logged in as {name} ({})", outcome.context.role),
                None => println!("logged in as {}", outcome.context.role),
            }
            println!("scope: {}", outcome.scope);
            println!("home: {}", outcome.redirect_to);
            Ok(())
        }
    }
}

pub(crate) fn render_session(summary: &SessionSummary, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(summary),
        OutputFormat::Table => {
            println!("role: {}", summary.role);
            if let Some(name) = &summary.display_name {
                println!("name: {name}");
            }
            if let Some(home) = &summary.redirect_to {
                println!("home: {home}");
            }
            println!("scope: {}", summary.scope);
            Ok(())
        }
    }
}

pub(crate) fn render_decision(
    path: &str,
    decision: &GuardDecision,
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(&decision_document(path, decision)),
        OutputFormat::Table => {
            println!("{}", decision_line(path, decision));
            Ok(())
        }
    }
}

pub(crate) fn decision_document(path: &str, decision: &GuardDecision) -> Value {
    let (outcome, to, reason) = decision_parts(decision);
    json!({
        "path": path,
        "outcome": outcome,
        "to": to,
        "reason": reason,
    })
}

pub(crate) fn decision_line(path: &str, decision: &GuardDecision) -> String {
    match decision_parts(decision) {
        (_, Some(to), Some(reason)) => format!("{path}: redirect to {to} ({reason})"),
        (outcome, _, _) => format!("{path}: {outcome}"),
    }
}

fn decision_parts(decision: &GuardDecision) -> (&'static str, Option<&str>, Option<&'static str>) {
    match decision {
        GuardDecision::Render => ("render", None, None),
        GuardDecision::NotFound => ("not_found", None, None),
        GuardDecision::Redirect { to, reason } => {
            ("redirect", Some(to.as_str()), Some(reason_label(*reason)))
        }
    }
}

const fn reason_label(reason: RedirectReason) -> &'static str {
    match reason {
        RedirectReason::Unauthenticated => "unauthenticated",
        RedirectReason::Forbidden => "forbidden",
        RedirectReason::Alias => "alias",
    }
}

pub(crate) fn render_response(response: &ApiResponse, format: OutputFormat) -> CliResult<()> {
    let body = response.json::<Value>().ok();
    match (format, body) {
        (_, Some(body)) => print_json(&body),
        (OutputFormat::Json, None) => print_json(&json!({
            "status": response.status,
            "body": response.text(),
        })),
        (OutputFormat::Table, None) => {
            let text = response.text();
            if !text.is_empty() {
                println!("{text}");
            }
            Ok(())
        }
    }
}
