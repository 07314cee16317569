//! Placeholder content for the protected pages.

use yew::prelude::*;

use crate::core::routes::Page;
use crate::core::session::Session;

#[derive(Properties, PartialEq)]
pub(crate) struct PageViewProps {
    pub(crate) page: Page,
}

#[function_component(PageView)]
pub(crate) fn page_view(props: &PageViewProps) -> Html {
    let session = use_context::<Session>().unwrap_or_else(Session::anonymous);
    let greeting = session
        .identity()
        .map(|identity| format!("Signed in as {}", identity.display_name()))
        .unwrap_or_default();
    let (title, body) = copy_for(props.page);
    html! {
        <div class="placeholder">
            <h2>{title}</h2>
            <p class="muted">{body}</p>
            <div class="pill subtle">{greeting}</div>
        </div>
    }
}

const fn copy_for(page: Page) -> (&'static str, &'static str) {
    match page {
        Page::AdminDashboard => ("Admin dashboard", "Fleet-wide overview"),
        Page::ManagerDashboard => ("Manager dashboard", "Team and vehicle status"),
        Page::DriverDashboard => ("Driver dashboard", "Your trips and assignments"),
        Page::Maintenance => ("Maintenance", "Service schedules and work orders"),
        Page::Projects => ("Projects", "Active projects"),
        Page::Suppliers => ("Suppliers", "Supplier directory"),
        Page::Finance => ("Finance", "Costs and budgets"),
        Page::AiConsole => ("AI Console", "Agent workspace"),
        Page::Analytics => ("Analytics", "Fleet metrics"),
        Page::Home | Page::Login | Page::Register | Page::AccessDenied | Page::NotFound => (
            "Not found",
            "Use navigation to return to a supported view.",
        ),
    }
}
