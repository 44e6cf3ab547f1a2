use axum::Router;

pub use crate::api::OpenApiRegistry;

/// A module that contributes HTTP routes to the host router.
///
/// Pure wiring; must be sync. Every route should be declared through
/// [`crate::api::OperationBuilder`] so it shows up in the OpenAPI document.
pub trait RestfulModule: Send + Sync {
    /// Stable module name, used in logs.
    fn name(&self) -> &'static str;

    fn register_rest(&self, router: Router, openapi: &dyn OpenApiRegistry)
        -> anyhow::Result<Router>;
}
