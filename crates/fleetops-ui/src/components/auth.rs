//! Login and registration forms.

use std::rc::Rc;

use fleetops_api_models::{DEFAULT_REGISTER_ROLE, RegisterRequest};
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::app::{ApiCtx, AuthCtx, Route};
use crate::core::error::{LoginError, RegisterError};
use crate::core::role::Role;
use crate::core::session::Session;
use crate::services::api::ApiClient;

#[function_component(LoginPage)]
pub(crate) fn login_page() -> Html {
    let session = use_context::<Session>().unwrap_or_else(Session::bootstrapping);
    let auth = use_context::<AuthCtx>();
    let api = use_context::<ApiCtx>();
    let navigator = use_navigator();
    let email = use_state(String::new);
    let password = use_state(String::new);
    let error = use_state(|| None as Option<String>);
    let busy = use_state(|| false);

    let client = use_form_client(api);

    let onsubmit = {
        let email = email.clone();
        let password = password.clone();
        let error = error.clone();
        let busy = busy.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let Some(auth) = auth.clone() else {
                return;
            };
            if client.is_none() {
                return;
            }
            if *busy {
                return;
            }
            busy.set(true);
            error.set(None);
            let email = (*email).clone();
            let password = (*password).clone();
            let error = error.clone();
            let busy = busy.clone();
            let navigator = navigator.clone();
            let client = Rc::clone(&client);
            yew::platform::spawn_local(async move {
                let Some(backend) = &*client else {
                    return;
                };
                match auth.login(backend, &email, &password).await {
                    Ok(_) => {
                        busy.set(false);
                        if let Some(navigator) = navigator {
                            navigator.push(&Route::Home);
                        }
                    }
                    Err(LoginError::Cancelled | LoginError::Superseded) => busy.set(false),
                    Err(err) => {
                        busy.set(false);
                        error.set(Some(err.message()));
                    }
                }
            });
        })
    };

    if session.is_authenticated() {
        return html! { <Redirect<Route> to={Route::Home} /> };
    }

    html! {
        <div class="auth-page">
            <form class="card" onsubmit={onsubmit}>
                <header>
                    <h2>{"Sign in"}</h2>
                </header>
                <label class="stack">
                    <span>{"Email"}</span>
                    <input type="email" autocomplete="username" value={(*email).clone()} oninput={text_input(&email)} />
                </label>
                <label class="stack">
                    <span>{"Password"}</span>
                    <input type="password" autocomplete="current-password" value={(*password).clone()} oninput={text_input(&password)} />
                </label>
                {error_text(&error)}
                <div class="actions">
                    <Link<Route> to={Route::Register} classes={classes!("ghost")}>{"Create an account"}</Link<Route>>
                    <button class="solid" type="submit" disabled={*busy}>
                        {if *busy { "Signing in…" } else { "Sign in" }}
                    </button>
                </div>
            </form>
        </div>
    }
}

#[function_component(RegisterPage)]
pub(crate) fn register_page() -> Html {
    let auth = use_context::<AuthCtx>();
    let api = use_context::<ApiCtx>();
    let navigator = use_navigator();
    let name = use_state(String::new);
    let email = use_state(String::new);
    let password = use_state(String::new);
    let role = use_state(|| DEFAULT_REGISTER_ROLE.to_string());
    let error = use_state(|| None as Option<String>);
    let busy = use_state(|| false);

    let client = use_form_client(api);

    let onsubmit = {
        let name = name.clone();
        let email = email.clone();
        let password = password.clone();
        let role = role.clone();
        let error = error.clone();
        let busy = busy.clone();
        Callback::from(move |event: SubmitEvent| {
            event.prevent_default();
            let Some(auth) = auth.clone() else {
                return;
            };
            if client.is_none() {
                return;
            }
            if *busy {
                return;
            }
            busy.set(true);
            error.set(None);
            let request = RegisterRequest {
                name: name.trim().to_string(),
                email: email.trim().to_string(),
                password: (*password).clone(),
                role: (*role).clone(),
            };
            let error = error.clone();
            let busy = busy.clone();
            let navigator = navigator.clone();
            let client = Rc::clone(&client);
            yew::platform::spawn_local(async move {
                let Some(backend) = &*client else {
                    return;
                };
                match auth.register(backend, &request).await {
                    Ok(_) => {
                        busy.set(false);
                        if let Some(navigator) = navigator {
                            navigator.push(&Route::Login);
                        }
                    }
                    Err(RegisterError::Cancelled) => busy.set(false),
                    Err(err) => {
                        busy.set(false);
                        error.set(Some(err.message()));
                    }
                }
            });
        })
    };

    let on_role = {
        let role = role.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                role.set(select.value());
            }
        })
    };

    html! {
        <div class="auth-page">
            <form class="card" onsubmit={onsubmit}>
                <header>
                    <h2>{"Create an account"}</h2>
                </header>
                <label class="stack">
                    <span>{"Name"}</span>
                    <input type="text" autocomplete="name" value={(*name).clone()} oninput={text_input(&name)} />
                </label>
                <label class="stack">
                    <span>{"Email"}</span>
                    <input type="email" autocomplete="email" value={(*email).clone()} oninput={text_input(&email)} />
                </label>
                <label class="stack">
                    <span>{"Password"}</span>
                    <input type="password" autocomplete="new-password" value={(*password).clone()} oninput={text_input(&password)} />
                </label>
                <label class="stack">
                    <span>{"Role"}</span>
                    <select onchange={on_role}>
                        {for Role::staff().into_iter().map(|option| {
                            let slug = option.slug();
                            html! {
                                <option value={slug.clone()} selected={*role == slug}>{option.as_str().to_string()}</option>
                            }
                        })}
                    </select>
                </label>
                {error_text(&error)}
                <div class="actions">
                    <Link<Route> to={Route::Login} classes={classes!("ghost")}>{"Back to sign in"}</Link<Route>>
                    <button class="solid" type="submit" disabled={*busy}>{"Register"}</button>
                </div>
            </form>
        </div>
    }
}

/// Per-form API client whose requests are aborted when the form unmounts.
#[hook]
fn use_form_client(api: Option<ApiCtx>) -> Rc<Option<ApiClient>> {
    let client = use_memo(|api| api.as_ref().map(|ctx| ctx.client.scoped()), api);
    {
        let client = Rc::clone(&client);
        use_effect_with_deps(
            move |_| {
                move || {
                    if let Some(client) = &*client {
                        client.cancel_inflight();
                    }
                }
            },
            (),
        );
    }
    client
}

fn text_input(state: &UseStateHandle<String>) -> Callback<InputEvent> {
    let state = state.clone();
    Callback::from(move |e: InputEvent| {
        if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
            state.set(input.value());
        }
    })
}

fn error_text(error: &UseStateHandle<Option<String>>) -> Html {
    (**error).as_ref().map_or_else(
        || html! {},
        |message| html! { <p class="error-text" role="alert">{message.clone()}</p> },
    )
}
