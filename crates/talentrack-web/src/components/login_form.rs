//! Login form.

use talentrack_auth::LoginRequest;
use web_sys::HtmlInputElement;
use yew::platform::spawn_local;
use yew::prelude::*;
use yew_router::AnyRoute;
use yew_router::prelude::*;

use crate::app::AuthCtx;
use crate::messages::login_error_message;

#[function_component(LoginForm)]
pub(crate) fn login_form() -> Html {
    let auth = use_context::<AuthCtx>();
    let navigator = use_navigator();
    let email = use_state(String::new);
    let password = use_state(String::new);
    let remember = use_state(|| false);
    let busy = use_state(|| false);
    let error = use_state(|| None as Option<String>);

    let on_email = {
        let email = email.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                email.set(input.value());
            }
        })
    };
    let on_password = {
        let password = password.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                password.set(input.value());
            }
        })
    };
    let on_remember = {
        let remember = remember.clone();
        Callback::from(move |e: Event| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                remember.set(input.checked());
            }
        })
    };

    let on_submit = {
        let email = email.clone();
        let password = password.clone();
        let remember = remember.clone();
        let busy = busy.clone();
        let error = error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            let (Some(auth), Some(navigator)) = (auth.clone(), navigator.clone()) else {
                return;
            };
            if *busy {
                return;
            }
            let request = LoginRequest {
                email: (*email).clone(),
                password: (*password).clone(),
                remember: *remember,
            };
            busy.set(true);
            error.set(None);
            let busy = busy.clone();
            let error = error.clone();
            spawn_local(async move {
                match auth.client.session().login(&request).await {
                    Ok(outcome) => navigator.replace(&AnyRoute::new(outcome.redirect_to)),
                    Err(err) => error.set(Some(login_error_message(&err))),
                }
                busy.set(false);
            });
        })
    };

    html! {
        <main class="login">
            <form class="card stack" onsubmit={on_submit}>
                <h1>{"Iniciar sesión"}</h1>
                <label class="stack">
                    <span>{"Correo"}</span>
                    <input type="email" autocomplete="username" value={(*email).clone()} oninput={on_email} />
                </label>
                <label class="stack">
                    <span>{"Contraseña"}</span>
                    <input type="password" autocomplete="current-password" value={(*password).clone()} oninput={on_password} />
                </label>
                <label class="row">
                    <input type="checkbox" checked={*remember} onchange={on_remember} />
                    <span>{"Recordarme"}</span>
                </label>
                {if let Some(err) = &*error {
                    html! { <p class="error-text" role="alert">{err}</p> }
                } else { html! {} }}
                <button class="solid" type="submit" disabled={*busy}>{"Ingresar"}</button>
            </form>
        </main>
    }
}
