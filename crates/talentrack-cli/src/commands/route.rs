use talentrack_auth::{AllowList, GuardDecision};

use crate::cli::RouteArgs;
use crate::client::{AppContext, CliResult};
use crate::output::render_decision;

pub(crate) fn handle_route(ctx: &AppContext, args: &RouteArgs) -> CliResult<()> {
    render_decision(&args.path, &decide(ctx, args), ctx.output)
}

/// Route declarations decide unless `--allow` names the roles explicitly.
fn decide(ctx: &AppContext, args: &RouteArgs) -> GuardDecision {
    let guard = ctx.auth.guard();
    if args.allow.is_empty() {
        guard.navigate(&args.path)
    } else {
        guard.evaluate(&AllowList::of(&args.allow))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::test_context;
    use crate::output::decision_line;
    use crate::storage::{FileScope, StatePaths};
    use talentrack_auth::{RedirectReason, StorageScope};
    use tempfile::TempDir;

    fn args(path: &str, allow: &[&str]) -> RouteArgs {
        RouteArgs {
            path: path.into(),
            allow: allow.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn legacy_alias_redirects_with_the_id_substituted() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let ctx = test_context("http://127.0.0.1:9", dir.path());
        let route = args("/admin/empresas/editar-empresa/5", &[]);

        let decision = decide(&ctx, &route);

        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: "/admin/empresas/editar/5".into(),
                reason: RedirectReason::Alias,
            }
        );
        assert_eq!(
            decision_line(&route.path, &decision),
            "/admin/empresas/editar-empresa/5: redirect to /admin/empresas/editar/5 (alias)"
        );
        handle_route(&ctx, &route).map_err(|err| anyhow::anyhow!(err.display_message()))?;
        Ok(())
    }

    #[test]
    fn explicit_roles_send_other_roles_home() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let durable = FileScope::new(StatePaths::within(dir.path()).durable);
        durable.set("tt_access", "a")?;
        durable.set("tt_context", r#"{"rol":"empleado","redirect_to":"/empleado/inicio"}"#)?;
        let ctx = test_context("http://127.0.0.1:9", dir.path());

        assert_eq!(
            decide(&ctx, &args("/manager/inicio", &["manager", "auditor"])),
            GuardDecision::Redirect {
                to: "/empleado/inicio".into(),
                reason: RedirectReason::Forbidden,
            }
        );
        assert_eq!(
            decide(&ctx, &args("/empleado/inicio", &["Empleado"])),
            GuardDecision::Render
        );
        Ok(())
    }

    #[test]
    fn anonymous_visitor_is_sent_to_login() -> anyhow::Result<()> {
        let dir = TempDir::new()?;
        let ctx = test_context("http://127.0.0.1:9", dir.path());
        assert_eq!(
            decide(&ctx, &args("/rrhh/inicio", &[])).redirect_target(),
            Some("/login")
        );
        Ok(())
    }
}
