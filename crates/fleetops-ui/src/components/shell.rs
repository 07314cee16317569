use yew::prelude::*;
use yew_router::prelude::*;

use crate::app::{AuthCtx, Route, route_for_path};
use crate::core::routes::{NavItem, navigation};
use crate::core::session::Session;

#[derive(Properties, PartialEq)]
pub(crate) struct ShellProps {
    pub(crate) children: Children,
    pub(crate) active: Route,
}

#[function_component(AppShell)]
pub(crate) fn app_shell(props: &ShellProps) -> Html {
    let session = use_context::<Session>().unwrap_or_else(Session::anonymous);
    let auth = use_context::<AuthCtx>();
    let navigator = use_navigator();
    let nav_open = use_state(|| false);
    let toggle_nav = {
        let nav_open = nav_open.clone();
        Callback::from(move |_: MouseEvent| nav_open.set(!*nav_open))
    };
    let on_logout = Callback::from(move |_: MouseEvent| {
        if let Some(auth) = &auth {
            auth.logout();
        }
        if let Some(navigator) = &navigator {
            navigator.push(&Route::Login);
        }
    });

    let (user_label, role_label) = session.identity().map_or_else(
        || (String::new(), String::new()),
        |identity| {
            (
                identity.display_name().to_string(),
                identity.role.to_string(),
            )
        },
    );

    html! {
        <div class="app-shell">
            <aside class={classes!("sidebar", if *nav_open { "open" } else { "closed" })}>
                <div class="brand">
                    <button class="ghost mobile-only" onclick={toggle_nav.clone()} aria-label="Close navigation">{"✕"}</button>
                    <strong>{"Fleetops"}</strong>
                </div>
                <nav>
                    {for navigation(&session).into_iter().map(|section| html! {
                        <div class="nav-section">
                            <small class="muted">{section.title}</small>
                            {for section.items.iter().map(|item| nav_item(item, props.active))}
                        </div>
                    })}
                </nav>
            </aside>
            <div class="main">
                <header class="topbar">
                    <button class="ghost mobile-only" aria-label="Open navigation" onclick={toggle_nav}>{"☰"}</button>
                    <div class="top-actions">
                        <span class="pill subtle">{user_label}</span>
                        <span class="pill subtle">{role_label}</span>
                        <button class="ghost" onclick={on_logout}>{"Log out"}</button>
                    </div>
                </header>
                <main>
                    {for props.children.iter()}
                </main>
            </div>
        </div>
    }
}

fn nav_item(item: &NavItem, active: Route) -> Html {
    let route = route_for_path(&item.url);
    let classes = classes!("nav-item", (active == route).then_some("active"));
    html! {
        <Link<Route> to={route} classes={classes}>{item.title}</Link<Route>>
    }
}
