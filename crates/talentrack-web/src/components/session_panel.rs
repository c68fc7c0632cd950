use talentrack_auth::AllowList;
use yew::prelude::*;
use yew_router::AnyRoute;
use yew_router::prelude::*;

use crate::app::AuthCtx;

/// Header showing who is signed in, with a logout action.
#[function_component(SessionPanel)]
pub(crate) fn session_panel() -> Html {
    let auth = use_context::<AuthCtx>();
    let navigator = use_navigator();
    let name = auth
        .as_ref()
        .and_then(|auth| auth.client.session().display_name())
        .unwrap_or_else(|| "Usuario".to_string());

    let logout = Callback::from(move |_: MouseEvent| {
        let Some(auth) = auth.as_ref() else {
            return;
        };
        auth.client.session().clear_session();
        let decision = auth.client.guard().evaluate(&AllowList::any());
        if let (Some(navigator), Some(to)) = (navigator.as_ref(), decision.redirect_target()) {
            navigator.replace(&AnyRoute::new(to));
        }
    });

    html! {
        <header class="session-panel">
            <span class="muted">{name}</span>
            <button class="ghost" onclick={logout}>{"Cerrar sesión"}</button>
        </header>
    }
}
