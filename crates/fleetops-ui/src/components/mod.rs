//! UI components.
pub(crate) mod access_denied;
pub(crate) mod auth;
pub(crate) mod guard;
pub(crate) mod pages;
pub(crate) mod shell;
