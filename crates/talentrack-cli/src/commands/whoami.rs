use crate::client::{AppContext, CliError, CliResult};
use crate::output::{SessionSummary, render_session};

pub(crate) fn handle_whoami(ctx: &AppContext) -> CliResult<()> {
    render_session(&session_summary(ctx)?, ctx.output)
}

fn session_summary(ctx: &AppContext) -> CliResult<SessionSummary> {
    let Some(context) = ctx.auth.context_reader().current() else {
        return Err(CliError::validation(
            "not logged in; run `talentrack login` first",
        ));
    };

    Ok(SessionSummary {
        redirect_to: context.fallback().map(str::to_string),
        role: context.role,
        display_name: ctx.auth.session().display_name(),
        scope: ctx.auth.repository().active_kind(),
    })
}
