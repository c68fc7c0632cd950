use crate::client::AppContext;

pub(crate) fn handle_logout(ctx: &AppContext) {
    ctx.auth.session().clear_session();
    println!("session cleared");
}
