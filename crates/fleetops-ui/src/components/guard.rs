//! Route gating components.

use yew::prelude::*;
use yew_router::prelude::Redirect;

use crate::app::{Route, route_for_path};
use crate::core::guard::Authorization;
use crate::core::routes::{Page, resolve_home};
use crate::core::session::Session;

#[derive(Properties, PartialEq)]
pub(crate) struct RoleGuardProps {
    pub(crate) page: Page,
    pub(crate) children: Children,
}

/// Renders `children` only when the session may see `page`.
#[function_component(RoleGuard)]
pub(crate) fn role_guard(props: &RoleGuardProps) -> Html {
    let session = use_context::<Session>().unwrap_or_else(Session::bootstrapping);
    match props.page.authorize(&session) {
        Authorization::Render => html! { <>{for props.children.iter()}</> },
        Authorization::Pending => html! { <RouteLoading /> },
        Authorization::RedirectToLogin => html! { <Redirect<Route> to={Route::Login} /> },
        Authorization::RedirectToAccessDenied => {
            html! { <Redirect<Route> to={Route::AccessDenied} /> }
        }
    }
}

/// `/`: sends the visitor to their landing page once restore has settled.
#[function_component(HomeRedirect)]
pub(crate) fn home_redirect() -> Html {
    let session = use_context::<Session>().unwrap_or_else(Session::bootstrapping);
    if session.is_loading() {
        return html! { <RouteLoading /> };
    }
    html! { <Redirect<Route> to={route_for_path(&resolve_home(&session))} /> }
}

#[function_component(RouteLoading)]
fn route_loading() -> Html {
    html! { <div class="route-loading" aria-busy="true"></div> }
}
