//! Argument parsing and command dispatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use talentrack_auth::ClientConfig;
use talentrack_auth::config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use talentrack_telemetry::{
    GlobalContextGuard, LogFormat, LoggingConfig, current_request_id, init_logging,
    with_request_context,
};
use url::Url;
use uuid::Uuid;

use crate::client::{AppContext, CliResult};
use crate::commands::{login, logout, request, route, whoami};
use crate::output::OutputFormat;
use crate::storage::StatePaths;

const DEFAULT_CLI_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments, executes the requested command and reports errors.
/// Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    install_logging(&cli);

    let request_id = Uuid::new_v4().to_string();
    let _app = GlobalContextGuard::new(command_label(&cli.command));
    let result = with_request_context(request_id, dispatch(cli)).await;

    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn install_logging(cli: &Cli) {
    let config = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
        build_sha: option_env!("TALENTRACK_BUILD_SHA").unwrap_or("dev"),
    };
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: {err:#}");
    }
}

/// Runs one command; outbound calls are tagged with the enclosing request id.
async fn dispatch(cli: Cli) -> CliResult<()> {
    let request_id = current_request_id().unwrap_or_else(|| Uuid::new_v4().to_string());
    let config = ClientConfig {
        base_url: cli.api_url.as_str().trim_end_matches('/').to_string(),
        timeout_secs: cli.timeout,
        ..ClientConfig::default()
    };
    let paths = StatePaths::resolve(cli.state_dir);
    let ctx = AppContext::new(config, &paths, &request_id, cli.output)?;

    match cli.command {
        Command::Login(args) => login::handle_login(&ctx, args).await,
        Command::Logout => {
            logout::handle_logout(&ctx);
            Ok(())
        }
        Command::Whoami => whoami::handle_whoami(&ctx),
        Command::Request(args) => request::handle_request(&ctx, &args).await,
        Command::Route(args) => route::handle_route(&ctx, &args),
    }
}

#[derive(Parser)]
#[command(name = "talentrack", about = "Command-line client for the TalenTrack API", version)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "TALENTRACK_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_BASE_URL
    )]
    api_url: Url,
    #[arg(
        long,
        global = true,
        env = "TALENTRACK_HTTP_TIMEOUT_SECS",
        default_value_t = DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,
    #[arg(
        long,
        global = true,
        env = "TALENTRACK_STATE_DIR",
        help = "Directory holding the remembered session (defaults to ~/.talentrack)"
    )]
    state_dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "TALENTRACK_LOG",
        default_value = DEFAULT_CLI_LOG_LEVEL
    )]
    log_level: String,
    #[arg(long, global = true, help = "Log format: json or pretty")]
    log_format: Option<LogFormat>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table
    )]
    output: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start a session.
    Login(LoginArgs),
    /// Erase the stored session.
    Logout,
    /// Show the current session.
    Whoami,
    /// Send an authenticated API request.
    Request(RequestArgs),
    /// Evaluate navigation to a dashboard path.
    Route(RouteArgs),
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long, short = 'e')]
    pub(crate) email: String,
    #[arg(long, env = "TALENTRACK_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
    #[arg(long, help = "Keep the session after the terminal closes")]
    pub(crate) remember: bool,
}

#[derive(Args)]
pub(crate) struct RequestArgs {
    #[arg(long, short = 'X', default_value = "GET")]
    pub(crate) method: String,
    #[arg(help = "API path (e.g. /api/empresas/) or absolute URL")]
    pub(crate) target: String,
    #[arg(long, short = 'd', help = "JSON body, or @path to read it from a file")]
    pub(crate) data: Option<String>,
    #[arg(long = "header", short = 'H', help = "Extra header as 'Name: value'")]
    pub(crate) headers: Vec<String>,
}

#[derive(Args)]
pub(crate) struct RouteArgs {
    #[arg(help = "Dashboard path, e.g. /admin/empresas")]
    pub(crate) path: String,
    #[arg(
        long,
        value_delimiter = ',',
        help = "Evaluate against these roles instead of the route declarations"
    )]
    pub(crate) allow: Vec<String>,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Login(_) => "login",
        Command::Logout => "logout",
        Command::Whoami => "whoami",
        Command::Request(_) => "request",
        Command::Route(_) => "route",
    }
}

fn parse_url(input: &str) -> Result<Url, String> {
    input
        .parse::<Url>()
        .map_err(|err| format!("invalid URL '{input}': {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn outbound_calls_carry_the_scoped_request_id() -> anyhow::Result<()> {
        let server = MockServer::start_async().await;
        let tagged = server.mock(|when, then| {
            when.method(GET)
                .path("/api/areas/")
                .header("x-request-id", "req-9");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!([]));
        });

        let dir = TempDir::new()?;
        let base_url = server.base_url();
        let state_dir = dir.path().to_string_lossy().into_owned();
        let cli = Cli::try_parse_from([
            "talentrack",
            "--api-url",
            base_url.as_str(),
            "--state-dir",
            state_dir.as_str(),
            "request",
            "/api/areas/",
        ])?;

        let result = with_request_context("req-9", dispatch(cli)).await;

        assert!(result.is_ok());
        tagged.assert();
        Ok(())
    }

    #[test]
    fn defaults_point_at_local_backend() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["talentrack", "whoami"])?;
        assert_eq!(cli.api_url.as_str(), "http://127.0.0.1:8000/");
        assert_eq!(cli.timeout, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cli.output, OutputFormat::Table);
        assert_eq!(command_label(&cli.command), "whoami");
        Ok(())
    }

    #[test]
    fn request_arguments_parse() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "talentrack",
            "--api-url",
            "https://rrhh.example.com",
            "--output",
            "json",
            "request",
            "-X",
            "post",
            "/api/empleados/",
            "-d",
            r#"{"nombre":"Ana"}"#,
            "-H",
            "Accept: application/json",
        ])?;
        let Command::Request(args) = cli.command else {
            panic!("expected request command");
        };
        assert_eq!(args.method, "post");
        assert_eq!(args.target, "/api/empleados/");
        assert_eq!(args.headers, vec!["Accept: application/json".to_string()]);
        assert_eq!(cli.output, OutputFormat::Json);
        Ok(())
    }

    #[test]
    fn login_requires_an_email() {
        assert!(Cli::try_parse_from(["talentrack", "login", "--remember"]).is_err());
    }

    #[test]
    fn invalid_api_url_is_rejected() {
        assert!(Cli::try_parse_from(["talentrack", "--api-url", "not a url", "logout"]).is_err());
    }

    #[test]
    fn route_accepts_comma_separated_roles() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "talentrack",
            "route",
            "/manager/inicio",
            "--allow",
            "manager,auditor",
        ])?;
        let Command::Route(args) = cli.command else {
            panic!("expected route command");
        };
        assert_eq!(args.allow, vec!["manager", "auditor"]);
        Ok(())
    }
}
