//! Render-or-redirect decisions for protected routes.

use crate::core::role::Role;
use crate::core::session::Session;

/// Outcome of a route check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Authorization {
    /// Show the protected content.
    Render,
    /// Nobody is signed in.
    RedirectToLogin,
    /// Signed in with a role the route does not allow.
    RedirectToAccessDenied,
    /// Session restore has not finished; render a neutral placeholder.
    Pending,
}

impl Authorization {
    /// Whether the protected content may be shown.
    #[must_use]
    pub const fn is_render(self) -> bool {
        matches!(self, Self::Render)
    }
}

/// Decide whether `session` may see a route allowing `allowed_roles`.
/// An empty role list admits any signed-in user.
#[must_use]
pub fn authorize(session: &Session, allowed_roles: &[Role]) -> Authorization {
    if session.is_loading() {
        return Authorization::Pending;
    }
    let Some(role) = session.role() else {
        return Authorization::RedirectToLogin;
    };
    if !allowed_roles.is_empty() && !allowed_roles.contains(role) {
        return Authorization::RedirectToAccessDenied;
    }
    Authorization::Render
}

/// Apply nested guards outermost first; the first non-render result wins.
#[must_use]
pub fn authorize_nested<'a, I>(session: &Session, levels: I) -> Authorization
where
    I: IntoIterator<Item = &'a [Role]>,
{
    for allowed in levels {
        let decision = authorize(session, allowed);
        if !decision.is_render() {
            return decision;
        }
    }
    if session.is_loading() {
        return Authorization::Pending;
    }
    if session.is_authenticated() {
        Authorization::Render
    } else {
        Authorization::RedirectToLogin
    }
}
