//! HTTP host: owns the axum router and server, applies the global middleware
//! stack and collects typed operation specs into a single OpenAPI document.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use arc_swap::ArcSwap;
use axum::http::{header, Method};
use axum::response::IntoResponse;
use axum::{middleware::from_fn, routing::get, Router};
use dashmap::DashMap;
use modkit::api::{OpenApiRegistry, OperationSpec, SchemaCollection};
use modkit::RestfulModule;
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

mod config;
mod model;
pub mod openapi;
pub mod request_id;
mod web;

pub use config::ApiIngressConfig;
use model::{ComponentsRegistry, SchemaInsert};

pub struct ApiIngress {
    config: ArcSwap<ApiIngressConfig>,
    components_registry: ArcSwap<ComponentsRegistry>,
    /// Router produced by `build_router`, consumed by `serve`.
    final_router: Mutex<Option<Router>>,

    // Duplicate detection (per (method, path) and per handler id)
    registered_routes: DashMap<(Method, String), ()>,
    registered_handlers: DashMap<String, ()>,

    operation_specs: DashMap<String, OperationSpec>,
}

impl Default for ApiIngress {
    fn default() -> Self {
        Self::new(ApiIngressConfig::default())
    }
}

impl ApiIngress {
    pub fn new(config: ApiIngressConfig) -> Self {
        Self {
            config: ArcSwap::from_pointee(config),
            components_registry: ArcSwap::from_pointee(ComponentsRegistry::default()),
            final_router: Mutex::new(None),
            registered_routes: DashMap::new(),
            registered_handlers: DashMap::new(),
            operation_specs: DashMap::new(),
        }
    }

    pub fn get_config(&self) -> ApiIngressConfig {
        (**self.config.load()).clone()
    }

    pub fn operation_count(&self) -> usize {
        self.operation_specs.len()
    }

    /// Mount `/health`, every module's routes and (optionally) the docs, then
    /// wrap the result in the global middleware stack.
    pub fn build_router(&self, modules: &[&dyn RestfulModule]) -> Result<Router> {
        let config = self.get_config();
        let mut router = Router::new().route("/health", get(web::health_check));

        for module in modules {
            router = module
                .register_rest(router, self)
                .with_context(|| format!("module '{}' failed to register routes", module.name()))?;
            tracing::debug!(module = module.name(), "registered REST routes");
        }

        if config.enable_docs {
            tracing::info!(
                operations = self.operation_count(),
                "emitting OpenAPI document"
            );
            let document = Arc::new(serde_json::to_value(self.build_openapi()?)?);
            router = router
                .route(
                    "/openapi.json",
                    get(move || {
                        let document = document.clone();
                        async move {
                            (
                                [(header::CACHE_CONTROL, "no-store")],
                                axum::Json((*document).clone()),
                            )
                                .into_response()
                        }
                    }),
                )
                .route("/docs", get(web::serve_docs));
        }

        // Outermost last: BodyLimit -> CORS -> Timeout -> Trace -> push -> SetRequestId -> Propagate
        let x_request_id = request_id::header();
        router = router
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(SetRequestIdLayer::new(x_request_id, request_id::MakeReqId))
            .layer(from_fn(request_id::push_req_id_to_extensions))
            .layer(request_id::create_trace_layer())
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.request_timeout_secs,
            )));
        if config.cors_enabled {
            router = router.layer(CorsLayer::permissive());
        }
        router = router.layer(RequestBodyLimitLayer::new(config.body_limit_bytes));

        *self.final_router.lock() = Some(router.clone());
        Ok(router)
    }

    pub fn build_openapi(&self) -> Result<openapi::OpenApi> {
        let components = self.components_registry.load();
        let specs: Vec<OperationSpec> = self
            .operation_specs
            .iter()
            .map(|e| e.value().clone())
            .collect();
        openapi::build_document(&specs, &components)
    }

    /// Bind the configured address and serve until `cancel` fires.
    pub async fn serve(self: Arc<Self>, cancel: CancellationToken) -> Result<()> {
        let cfg = self.get_config();
        let addr: SocketAddr = cfg
            .bind_addr
            .parse()
            .with_context(|| format!("invalid bind address '{}'", cfg.bind_addr))?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        self.serve_with_listener(listener, cancel).await
    }

    pub async fn serve_with_listener(
        self: Arc<Self>,
        listener: TcpListener,
        cancel: CancellationToken,
    ) -> Result<()> {
        // Take the router so the guard is dropped before awaiting.
        let stored = { self.final_router.lock().take() };
        let router = stored.context("router not built; call build_router first")?;

        tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            cancel.cancelled().await;
            tracing::info!("HTTP server shutting down gracefully");
        })
        .await
        .context("HTTP server failed")
    }
}

impl OpenApiRegistry for ApiIngress {
    fn register_operation(&self, spec: &OperationSpec) {
        // First registration wins; a second one is a programming error.
        if self
            .registered_handlers
            .insert(spec.handler_id.clone(), ())
            .is_some()
        {
            tracing::error!(
                handler_id = %spec.handler_id,
                "duplicate handler_id; ignoring subsequent registration"
            );
            return;
        }
        let route_key = (spec.method.clone(), spec.path.clone());
        if self.registered_routes.insert(route_key, ()).is_some() {
            tracing::error!(
                method = %spec.method,
                path = %spec.path,
                "duplicate (method, path); ignoring subsequent registration"
            );
            return;
        }

        let key = format!("{}:{}", spec.method, spec.path);
        self.operation_specs.insert(key, spec.clone());
        tracing::debug!(
            method = %spec.method,
            path = %spec.path,
            total_operations = self.operation_specs.len(),
            "registered API operation"
        );
    }

    fn ensure_schema_raw(&self, name: &str, schemas: SchemaCollection) -> String {
        // Copy-on-write update of the components snapshot.
        self.components_registry.rcu(|current| {
            let mut next = (**current).clone();
            for (schema_name, schema) in schemas.iter().cloned() {
                if next.register_schema(schema_name.clone(), schema) == SchemaInsert::Conflict {
                    tracing::error!(schema_name = %schema_name, root = %name, "schema conflict");
                }
            }
            next
        });
        name.to_string()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
