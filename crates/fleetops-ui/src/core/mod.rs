//! Core, DOM-free primitives for authentication and route gating.
pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod inflight;
pub mod role;
pub mod routes;
pub mod session;
pub mod storage;
pub mod telemetry;
pub mod token;
