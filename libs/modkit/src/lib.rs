//! # ModKit
//!
//! Shared building blocks for EventFlow modules: the `RestfulModule`
//! contract, the type-safe `OperationBuilder` that feeds the OpenAPI
//! registry, RFC 9457 problem responses, request rate limiting and
//! shutdown signal handling.
//!
//! ```rust,ignore
//! use modkit::{OperationBuilder, RestfulModule};
//!
//! impl RestfulModule for Catalog {
//!     fn name(&self) -> &'static str { "catalog" }
//!
//!     fn register_rest(&self, router: Router, openapi: &dyn OpenApiRegistry) -> anyhow::Result<Router> {
//!         Ok(OperationBuilder::get("/items")
//!             .handler(list_items)
//!             .json_response(200, "Items")
//!             .register(router, openapi))
//!     }
//! }
//! ```

pub use anyhow::Result;

pub mod api;
pub mod contracts;
pub mod http;
pub mod runtime;

pub use api::problem::{
    bad_request, internal_error, not_found, too_many_requests, ErrDef, Problem, ProblemResponse,
};
pub use api::{JsonBody, JsonBodyOrDefault, OpenApiRegistry, OperationBuilder};
pub use contracts::RestfulModule;
