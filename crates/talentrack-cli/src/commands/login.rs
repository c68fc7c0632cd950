use std::io::{self, IsTerminal};

use anyhow::anyhow;
use talentrack_auth::{LoginError, LoginRequest};

use crate::cli::LoginArgs;
use crate::client::{AppContext, CliError, CliResult};
use crate::output::render_login;

pub(crate) async fn handle_login(ctx: &AppContext, args: LoginArgs) -> CliResult<()> {
    if args.email.trim().is_empty() {
        return Err(CliError::validation("email cannot be empty"));
    }
    let password = resolve_password(args.password)?;

    let request = LoginRequest {
        email: args.email,
        password,
        remember: args.remember,
    };
    let outcome = ctx
        .auth
        .session()
        .login(&request)
        .await
        .map_err(classify_login_error)?;
    render_login(&outcome, ctx.output)
}

/// Password from the flag or environment, else an interactive prompt.
pub(crate) fn resolve_password(flag: Option<String>) -> CliResult<String> {
    if let Some(value) = flag {
        if value.is_empty() {
            return Err(CliError::validation("password cannot be empty"));
        }
        return Ok(value);
    }

    if io::stdin().is_terminal() {
        let value = rpassword::prompt_password("Password: ")
            .map_err(|err| CliError::failure(anyhow!("failed to read password: {err}")))?;
        if value.is_empty() {
            return Err(CliError::validation("password cannot be empty"));
        }
        Ok(value)
    } else {
        Err(CliError::validation(
            "password required; supply via --password or TALENTRACK_PASSWORD when running non-interactively",
        ))
    }
}

fn classify_login_error(err: LoginError) -> CliError {
    match err {
        LoginError::Rejected { status, detail } => CliError::validation(
            detail.unwrap_or_else(|| format!("login rejected with status {status}")),
        ),
        other => CliError::failure(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_context;
    use crate::storage::{FileScope, StatePaths};
    use httpmock::prelude::*;
    use serde_json::json;
    use talentrack_auth::StorageScope;
    use tempfile::TempDir;

    fn args(remember: bool) -> LoginArgs {
        LoginArgs {
            email: " rh@empresa.com ".to_string(),
            password: Some("pw".to_string()),
            remember,
        }
    }

    #[tokio::test]
    async fn remembered_login_persists_to_state_dir() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let login = server.mock(|when, then| {
            when.method(POST)
                .path("/api/auth/login/")
                .header("x-request-id", "test-request")
                .json_body(json!({ "email": "rh@empresa.com", "password": "pw" }));
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "access": "a-1",
                    "refresh": "r-1",
                    "context": { "rol": "rrhh", "redirect_to": "/rrhh/inicio" }
                }));
        });
        let me = server.mock(|when, then| {
            when.method(GET)
                .path("/api/auth/me/")
                .header("authorization", "Bearer a-1");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({ "full_name": "Recursos Humanos" }));
        });

        let dir = TempDir::new()?;
        let ctx = test_context(&server.base_url(), dir.path());
        handle_login(&ctx, args(true))
            .await
            .map_err(|err| anyhow!(err.display_message()))?;

        let paths = StatePaths::within(dir.path());
        let durable = FileScope::new(&paths.durable);
        assert_eq!(durable.get("tt_access").as_deref(), Some("a-1"));
        assert_eq!(durable.get("tt_full_name").as_deref(), Some("Recursos Humanos"));
        assert!(!paths.ephemeral.exists());
        login.assert();
        me.assert();
        Ok(())
    }

    #[tokio::test]
    async fn rejected_login_is_a_validation_error() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/api/auth/login/");
            then.status(401)
                .header("content-type", "application/json")
                .json_body(json!({ "detail": "Credenciales inválidas" }));
        });

        let dir = TempDir::new()?;
        let ctx = test_context(&server.base_url(), dir.path());
        let err = handle_login(&ctx, args(false))
            .await
            .err()
            .ok_or_else(|| anyhow!("login should fail"))?;

        assert!(matches!(err, CliError::Validation(message) if message == "Credenciales inválidas"));
        assert!(!StatePaths::within(dir.path()).ephemeral.exists());
        Ok(())
    }

    #[test]
    fn empty_password_flag_is_rejected() {
        assert!(matches!(
            resolve_password(Some(String::new())),
            Err(CliError::Validation(_))
        ));
        assert!(matches!(
            resolve_password(Some(" spaced ".into())),
            Ok(value) if value == " spaced "
        ));
    }
}
