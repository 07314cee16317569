//! Client route table, landing-page resolution and role-filtered navigation.
//!
//! # Design
//! - One table owns paths and role requirements; the router and sidebar read it.
//! - Protected pages sit behind the staff shell guard plus an optional page guard.

use crate::core::guard::{Authorization, authorize_nested};
use crate::core::role::Role;
use crate::core::session::Session;

/// Login page path.
pub const LOGIN_PATH: &str = "/login";
/// Registration page path.
pub const REGISTER_PATH: &str = "/register";
/// Access-denied page path.
pub const ACCESS_DENIED_PATH: &str = "/access-denied";

/// Every page the client knows how to render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Page {
    /// `/`, redirects to the landing page.
    Home,
    /// `/login`.
    Login,
    /// `/register`.
    Register,
    /// `/access-denied`.
    AccessDenied,
    /// `/admin/dashboard`.
    AdminDashboard,
    /// `/manager/dashboard`.
    ManagerDashboard,
    /// `/driver/dashboard`.
    DriverDashboard,
    /// `/maintenance`.
    Maintenance,
    /// `/projects`.
    Projects,
    /// `/suppliers`.
    Suppliers,
    /// `/finance`.
    Finance,
    /// `/ai`.
    AiConsole,
    /// `/analytics`.
    Analytics,
    /// Anything else; rendered inside the shell.
    NotFound,
}

impl Page {
    /// All routable pages, for iteration in tests and menus.
    pub const ALL: [Self; 14] = [
        Self::Home,
        Self::Login,
        Self::Register,
        Self::AccessDenied,
        Self::AdminDashboard,
        Self::ManagerDashboard,
        Self::DriverDashboard,
        Self::Maintenance,
        Self::Projects,
        Self::Suppliers,
        Self::Finance,
        Self::AiConsole,
        Self::Analytics,
        Self::NotFound,
    ];

    /// Canonical path.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => LOGIN_PATH,
            Self::Register => REGISTER_PATH,
            Self::AccessDenied => ACCESS_DENIED_PATH,
            Self::AdminDashboard => "/admin/dashboard",
            Self::ManagerDashboard => "/manager/dashboard",
            Self::DriverDashboard => "/driver/dashboard",
            Self::Maintenance => "/maintenance",
            Self::Projects => "/projects",
            Self::Suppliers => "/suppliers",
            Self::Finance => "/finance",
            Self::AiConsole => "/ai",
            Self::Analytics => "/analytics",
            Self::NotFound => "/404",
        }
    }

    /// Page for `path`, ignoring a trailing slash and any query or fragment.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };
        Self::ALL
            .into_iter()
            .find(|page| *page != Self::NotFound && page.path() == normalized)
            .unwrap_or(Self::NotFound)
    }

    /// Pages reachable without a session.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Login | Self::Register | Self::AccessDenied)
    }

    /// Page-level role restriction inside the shell, if any.
    #[must_use]
    pub fn page_roles(self) -> Option<Vec<Role>> {
        match self {
            Self::AdminDashboard => Some(vec![Role::Admin]),
            Self::ManagerDashboard => Some(vec![Role::Manager]),
            Self::DriverDashboard => Some(vec![Role::Driver]),
            Self::Analytics => Some(vec![Role::Admin, Role::Manager]),
            _ => None,
        }
    }

    /// Guard levels, outermost first. Empty for public pages.
    #[must_use]
    pub fn guard_levels(self) -> Vec<Vec<Role>> {
        if self.is_public() {
            return Vec::new();
        }
        let mut levels = vec![Role::staff().to_vec()];
        if let Some(page) = self.page_roles() {
            levels.push(page);
        }
        levels
    }

    /// Full authorization decision for this page.
    #[must_use]
    pub fn authorize(self, session: &Session) -> Authorization {
        if self.is_public() {
            return Authorization::Render;
        }
        let levels = self.guard_levels();
        authorize_nested(session, levels.iter().map(Vec::as_slice))
    }
}

/// Landing path for `session`: the login page when anonymous, otherwise
/// `/{role}/dashboard`.
#[must_use]
pub fn resolve_home(session: &Session) -> String {
    session.role().map_or_else(
        || LOGIN_PATH.to_string(),
        |role| format!("/{}/dashboard", role.slug()),
    )
}

/// Sidebar entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavItem {
    /// Link label.
    pub title: &'static str,
    /// Link target.
    pub url: String,
}

/// Titled group of sidebar entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavSection {
    /// Section heading.
    pub title: &'static str,
    /// Entries visible to the current role.
    pub items: Vec<NavItem>,
}

struct NavEntry {
    title: &'static str,
    /// `None` links to the role's own dashboard.
    page: Option<Page>,
}

const MAIN: &[NavEntry] = &[
    NavEntry {
        title: "Dashboard",
        page: None,
    },
    NavEntry {
        title: "Analytics",
        page: Some(Page::Analytics),
    },
];

const OPERATIONS: &[NavEntry] = &[
    NavEntry {
        title: "Maintenance",
        page: Some(Page::Maintenance),
    },
    NavEntry {
        title: "Projects",
        page: Some(Page::Projects),
    },
    NavEntry {
        title: "Suppliers",
        page: Some(Page::Suppliers),
    },
    NavEntry {
        title: "Finance",
        page: Some(Page::Finance),
    },
];

const AI_AGENTS: &[NavEntry] = &[NavEntry {
    title: "AI Console",
    page: Some(Page::AiConsole),
}];

const NAVIGATION: [(&str, &[NavEntry]); 3] = [
    ("Main", MAIN),
    ("Operations", OPERATIONS),
    ("AI Agents", AI_AGENTS),
];

/// Sidebar sections visible to `session`. Sections left empty are dropped.
#[must_use]
pub fn navigation(session: &Session) -> Vec<NavSection> {
    let Some(role) = session.role() else {
        return Vec::new();
    };
    let home = resolve_home(session);
    NAVIGATION
        .iter()
        .filter_map(|&(title, entries)| {
            let items: Vec<NavItem> = entries
                .iter()
                .filter(|entry| {
                    entry.page
                        .and_then(Page::page_roles)
                        .unwrap_or_else(|| Role::staff().to_vec())
                        .contains(role)
                })
                .map(|entry| NavItem {
                    title: entry.title,
                    url: entry
                        .page
                        .map_or_else(|| home.clone(), |page| page.path().to_string()),
                })
                .collect();
            (!items.is_empty()).then(|| NavSection { title, items })
        })
        .collect()
}
