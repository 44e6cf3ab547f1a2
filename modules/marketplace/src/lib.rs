//! EventFlow marketplace: suppliers list venues and services, customers
//! plan events and message suppliers, admins moderate listings.

// === PUBLIC CONTRACT ===
pub mod contract;
pub use contract::model;

// === ERROR CATALOG ===
pub mod errors;

// === MODULE DEFINITION ===
pub mod module;
pub use module::Marketplace;

// === INTERNAL MODULES ===
// Exposed for integration tests and the server binary; not a stable API.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod auth;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;

pub use config::MarketplaceConfig;
