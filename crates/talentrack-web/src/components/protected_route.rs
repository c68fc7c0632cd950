//! Guarded view wrapper.

use talentrack_auth::AllowList;
use yew::prelude::*;
use yew_router::AnyRoute;
use yew_router::prelude::*;

use crate::app::AuthCtx;
use crate::nav::NavAction;

#[derive(Properties, PartialEq)]
pub(crate) struct ProtectedRouteProps {
    /// Roles that may view the children; empty admits any session.
    pub(crate) allow: AllowList,
    pub(crate) children: Children,
}

/// Render children only when the guard admits the current session.
#[function_component(ProtectedRoute)]
pub(crate) fn protected_route(props: &ProtectedRouteProps) -> Html {
    let action = use_context::<AuthCtx>().map_or_else(
        || NavAction::NotFound,
        |auth| NavAction::from(&auth.client.guard().evaluate(&props.allow)),
    );
    use_redirect(action.clone());

    match action {
        NavAction::Mount => html! { <>{ for props.children.iter() }</> },
        NavAction::Replace(_) | NavAction::NotFound => html! {},
    }
}

/// Replace the current history entry whenever `action` is a redirect.
#[hook]
pub(crate) fn use_redirect(action: NavAction) {
    let navigator = use_navigator();
    use_effect_with_deps(
        move |action| {
            if let (NavAction::Replace(to), Some(navigator)) = (action, navigator) {
                navigator.replace(&AnyRoute::new(to.as_str()));
            }
            || ()
        },
        action,
    );
}
