use std::path::Path;
use std::sync::Arc;

use modkit::api::OpenApiRegistry;
use modkit::http::FixedWindowLimiter;
use modkit::RestfulModule;
use tracing::{info, warn};

use crate::api::rest::routes::{self, Limiters};
use crate::auth::JwtManager;
use crate::config::{MarketplaceConfig, DEFAULT_JWT_SECRET};
use crate::domain::ports::Notifier;
use crate::domain::seed::seed_demo_data;
use crate::domain::service::{Repositories, Service, ServiceConfig};
use crate::infra::mail::OutboxNotifier;
use crate::infra::storage::open_repositories;

/// The marketplace module: accounts, catalogue, planning, messaging and
/// moderation behind one REST surface.
pub struct Marketplace {
    service: Arc<Service>,
    jwt: Arc<JwtManager>,
    limiters: Limiters,
}

impl Marketplace {
    /// Open the collections under `home`, seed demo data when enabled and
    /// wire the service.
    pub async fn init(cfg: MarketplaceConfig, home: &Path) -> anyhow::Result<Self> {
        cfg.validate()?;
        if cfg.jwt_secret == DEFAULT_JWT_SECRET {
            warn!("marketplace.jwt_secret is the built-in default; set a real secret outside local runs");
        }

        let data_dir = cfg.data_path(home);
        info!(data_dir = %data_dir.display(), "initializing marketplace module");
        let repos = open_repositories(&data_dir).await?;
        if cfg.seed_demo_data {
            seed_demo_data(&repos)
                .await
                .map_err(|e| anyhow::anyhow!("seeding demo data failed: {e}"))?;
        }

        let notifier = if cfg.outbox_enabled {
            OutboxNotifier::new(cfg.outbox_path(home), cfg.from_email.clone())
        } else {
            info!("notification outbox disabled");
            OutboxNotifier::disabled()
        };
        Ok(Self::with_parts(repos, Arc::new(notifier), &cfg))
    }

    /// Wire the module around already-opened repositories.
    pub fn with_parts(
        repos: Repositories,
        notifier: Arc<dyn Notifier>,
        cfg: &MarketplaceConfig,
    ) -> Self {
        let service = Service::new(
            repos,
            notifier,
            ServiceConfig {
                featured_limit: cfg.featured_limit,
                message_max_chars: cfg.message_max_chars,
                public_base_url: cfg.public_base_url.trim_end_matches('/').to_string(),
            },
        );
        Self {
            service: Arc::new(service),
            jwt: Arc::new(JwtManager::new(
                cfg.jwt_secret.as_bytes(),
                cfg.session_ttl_secs(),
            )),
            limiters: Limiters {
                auth: Arc::new(FixedWindowLimiter::new("auth", cfg.auth_rate_limit)),
                write: Arc::new(FixedWindowLimiter::new("write", cfg.write_rate_limit)),
            },
        }
    }
}

impl RestfulModule for Marketplace {
    fn name(&self) -> &'static str {
        "marketplace"
    }

    fn register_rest(
        &self,
        router: axum::Router,
        openapi: &dyn OpenApiRegistry,
    ) -> anyhow::Result<axum::Router> {
        info!("Registering marketplace REST routes");

        let router = routes::register_routes(
            router,
            openapi,
            self.service.clone(),
            self.jwt.clone(),
            self.limiters.clone(),
        )?;
        info!("Marketplace REST routes registered");
        Ok(router)
    }
}
