#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::multiple_crate_versions)]
//! Fleetops web UI.
//!
//! The `core` module holds the DOM-free session, role and routing logic and is
//! tested natively. The Yew application, browser storage adapter and REST
//! client only build for wasm32.

pub mod core;

pub use crate::core::auth::{AuthBackend, AuthHandle};
pub use crate::core::guard::{Authorization, authorize};
pub use crate::core::role::Role;
pub use crate::core::routes::{Page, resolve_home};
pub use crate::core::session::{AuthPhase, AuthSession, Session};
pub use crate::core::storage::{KeyValueStore, MemoryStorage, TokenStore};

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod components;
#[cfg(target_arch = "wasm32")]
mod services;

#[cfg(target_arch = "wasm32")]
pub use app::run_app;
