//! Axum handlers. Each one extracts the service and session, calls into the
//! domain and maps failures with `map_domain_error`.

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod inbox;
pub mod plan;
pub mod site;
pub mod supplier;
