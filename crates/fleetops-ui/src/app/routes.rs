//! Routing definitions for the Fleetops UI.
use yew_router::prelude::*;

use crate::core::routes::Page;

#[derive(Clone, Copy, Routable, PartialEq, Eq, Debug)]
pub(crate) enum Route {
    #[at("/")]
    Home,
    #[at("/login")]
    Login,
    #[at("/register")]
    Register,
    #[at("/access-denied")]
    AccessDenied,
    #[at("/admin/dashboard")]
    AdminDashboard,
    #[at("/manager/dashboard")]
    ManagerDashboard,
    #[at("/driver/dashboard")]
    DriverDashboard,
    #[at("/maintenance")]
    Maintenance,
    #[at("/projects")]
    Projects,
    #[at("/suppliers")]
    Suppliers,
    #[at("/finance")]
    Finance,
    #[at("/ai")]
    AiConsole,
    #[at("/analytics")]
    Analytics,
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl From<Route> for Page {
    fn from(route: Route) -> Self {
        match route {
            Route::Home => Self::Home,
            Route::Login => Self::Login,
            Route::Register => Self::Register,
            Route::AccessDenied => Self::AccessDenied,
            Route::AdminDashboard => Self::AdminDashboard,
            Route::ManagerDashboard => Self::ManagerDashboard,
            Route::DriverDashboard => Self::DriverDashboard,
            Route::Maintenance => Self::Maintenance,
            Route::Projects => Self::Projects,
            Route::Suppliers => Self::Suppliers,
            Route::Finance => Self::Finance,
            Route::AiConsole => Self::AiConsole,
            Route::Analytics => Self::Analytics,
            Route::NotFound => Self::NotFound,
        }
    }
}

impl From<Page> for Route {
    fn from(page: Page) -> Self {
        match page {
            Page::Home => Self::Home,
            Page::Login => Self::Login,
            Page::Register => Self::Register,
            Page::AccessDenied => Self::AccessDenied,
            Page::AdminDashboard => Self::AdminDashboard,
            Page::ManagerDashboard => Self::ManagerDashboard,
            Page::DriverDashboard => Self::DriverDashboard,
            Page::Maintenance => Self::Maintenance,
            Page::Projects => Self::Projects,
            Page::Suppliers => Self::Suppliers,
            Page::Finance => Self::Finance,
            Page::AiConsole => Self::AiConsole,
            Page::Analytics => Self::Analytics,
            Page::NotFound => Self::NotFound,
        }
    }
}

/// Route for an in-app path such as a resolved home or sidebar URL.
pub(crate) fn route_for_path(path: &str) -> Route {
    Page::from_path(path).into()
}
