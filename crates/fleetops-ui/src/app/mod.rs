//! Application root: context wiring, session bootstrap and the route switch.

use gloo::console;
use tracing::{Level, warn};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::app::api::new_auth_ctx;
use crate::app::preferences::{client_config, now_ms};
use crate::components::access_denied::AccessDeniedPage;
use crate::components::auth::{LoginPage, RegisterPage};
use crate::components::guard::{HomeRedirect, RoleGuard};
use crate::components::pages::PageView;
use crate::components::shell::AppShell;
use crate::core::routes::Page;
use crate::core::session::Session;
use crate::core::telemetry::{DEFAULT_LOG_LEVEL, init_logging};

pub(crate) use api::{ApiCtx, AuthCtx};
pub(crate) use routes::{Route, route_for_path};

mod api;
mod preferences;
mod routes;

#[function_component(FleetApp)]
pub(crate) fn fleet_app() -> Html {
    let api_ctx = use_memo(|_| ApiCtx::new(client_config()), ());
    let auth_ctx = use_memo(|_| new_auth_ctx(), ());
    let session = use_state(Session::bootstrapping);

    {
        let auth = (*auth_ctx).clone();
        let client = api_ctx.client.clone();
        let session = session.clone();
        use_effect_with_deps(
            move |_| {
                {
                    let session = session.clone();
                    auth.subscribe(move |next| session.set(next.clone()));
                }
                let restored = auth.restore(now_ms());
                if restored.is_authenticated() {
                    yew::platform::spawn_local(async move {
                        if let Err(err) = auth.refresh_profile(&*client).await {
                            warn!(error = %err, "profile refresh failed");
                        }
                    });
                }
                || ()
            },
            (),
        );
    }

    html! {
        <ContextProvider<ApiCtx> context={(*api_ctx).clone()}>
            <ContextProvider<AuthCtx> context={(*auth_ctx).clone()}>
                <ContextProvider<Session> context={(*session).clone()}>
                    <BrowserRouter>
                        <Switch<Route> render={switch} />
                    </BrowserRouter>
                </ContextProvider<Session>>
            </ContextProvider<AuthCtx>>
        </ContextProvider<ApiCtx>>
    }
}

#[allow(clippy::needless_pass_by_value)]
fn switch(route: Route) -> Html {
    match route {
        Route::Home => html! { <HomeRedirect /> },
        Route::Login => html! { <LoginPage /> },
        Route::Register => html! { <RegisterPage /> },
        Route::AccessDenied => html! { <AccessDeniedPage /> },
        protected => {
            let page = Page::from(protected);
            html! {
                <RoleGuard page={page}>
                    <AppShell active={protected}>
                        <PageView page={page} />
                    </AppShell>
                </RoleGuard>
            }
        }
    }
}

/// Entrypoint invoked by Trunk for wasm32 builds.
pub fn run_app() {
    console_error_panic_hook::set_once();
    if let Err(err) = init_logging(console_sink, DEFAULT_LOG_LEVEL) {
        console::warn!("logging disabled", err.to_string());
    }
    if let Some(root) = gloo::utils::document().get_element_by_id("root") {
        yew::Renderer::<FleetApp>::with_root(root).render();
    } else {
        yew::Renderer::<FleetApp>::new().render();
    }
}

fn console_sink(level: Level, line: &str) {
    if level == Level::ERROR {
        console::error!(line);
    } else if level == Level::WARN {
        console::warn!(line);
    } else if level == Level::INFO {
        console::info!(line);
    } else {
        console::debug!(line);
    }
}
