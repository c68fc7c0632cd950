//! App shell: one auth client per boot, a browser router and the route outlet.

use std::sync::Arc;

use talentrack_auth::config::DEFAULT_BASE_URL;
use talentrack_auth::{AuthClient, ClientConfig, RouteMatch};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::login_form::LoginForm;
use crate::components::protected_route::{ProtectedRoute, use_redirect};
use crate::components::session_panel::SessionPanel;
use crate::nav::{NavAction, view_title};
use crate::services::{BrowserScope, FetchTransport};

pub(crate) use auth::AuthCtx;

mod auth;

fn api_base_url() -> &'static str {
    option_env!("TALENTRACK_API_URL").unwrap_or(DEFAULT_BASE_URL)
}

#[function_component(App)]
fn app() -> Html {
    let ctx = use_memo(
        |_| {
            AuthCtx::new(AuthClient::new(
                Arc::new(FetchTransport),
                Arc::new(BrowserScope::local()),
                Arc::new(BrowserScope::session()),
                ClientConfig::with_base_url(api_base_url()),
            ))
        },
        (),
    );

    html! {
        <ContextProvider<AuthCtx> context={(*ctx).clone()}>
            <BrowserRouter>
                <RouteOutlet />
            </BrowserRouter>
        </ContextProvider<AuthCtx>>
    }
}

/// Resolves each location against the route table; protected views go
/// through [`ProtectedRoute`].
#[function_component(RouteOutlet)]
fn route_outlet() -> Html {
    let auth = use_context::<AuthCtx>();
    let path = use_location().map_or_else(|| "/".to_string(), |location| location.path().to_string());
    let (action, allow) = auth.map_or((NavAction::NotFound, None), |auth| {
        match auth.client.guard().routes().resolve(&path) {
            RouteMatch::Public => (NavAction::Mount, None),
            RouteMatch::Alias(to) => (NavAction::Replace(to), None),
            RouteMatch::Protected(allow) => (NavAction::Mount, Some(allow.clone())),
            RouteMatch::NotFound => (NavAction::NotFound, None),
        }
    });
    use_redirect(action.clone());

    match (action, allow) {
        (NavAction::Replace(_), _) => html! {},
        (NavAction::NotFound, _) => html! {
            <main class="not-found">
                <h1>{"404"}</h1>
                <p>{"La página solicitada no existe."}</p>
            </main>
        },
        (NavAction::Mount, Some(allow)) => html! {
            <ProtectedRoute {allow}>
                <SessionPanel />
                <main class="dashboard">
                    <h1>{view_title(&path)}</h1>
                </main>
            </ProtectedRoute>
        },
        (NavAction::Mount, None) => public_view(&path),
    }
}

fn public_view(path: &str) -> Html {
    match path.trim_end_matches('/') {
        "/reset-password" => html! {
            <main class="reset-password">
                <h1>{"Restablecer contraseña"}</h1>
            </main>
        },
        _ => html! { <LoginForm /> },
    }
}

/// Mount the dashboard shell.
pub fn run_app() {
    console_error_panic_hook::set_once();
    if let Some(root) = gloo::utils::document().get_element_by_id("root") {
        yew::Renderer::<App>::with_root(root).render();
    } else {
        yew::Renderer::<App>::new().render();
    }
}
