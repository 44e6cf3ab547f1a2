use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use modkit::http::RateLimitPolicy;
use serde::{Deserialize, Serialize};

/// Secret used when none is configured; fine for local runs only.
pub const DEFAULT_JWT_SECRET: &str = "change_me";

/// `modules.marketplace` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MarketplaceConfig {
    /// Collection files; relative paths resolve against `server.home_dir`.
    pub data_dir: String,
    /// Recorded notifications (`.eml`); relative like `data_dir`.
    pub outbox_dir: String,
    pub outbox_enabled: bool,
    pub jwt_secret: String,
    pub session_ttl_days: u32,
    /// Seed demo accounts and listings into empty collections on start.
    pub seed_demo_data: bool,
    pub from_email: String,
    /// Sitemap link base; blank means `http://localhost:<server.port>`.
    pub public_base_url: String,
    pub featured_limit: usize,
    pub message_max_chars: usize,
    pub auth_rate_limit: RateLimitPolicy,
    pub write_rate_limit: RateLimitPolicy,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            outbox_dir: "outbox".to_string(),
            outbox_enabled: true,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            session_ttl_days: 7,
            seed_demo_data: true,
            from_email: "no-reply@eventflow.local".to_string(),
            public_base_url: String::new(),
            featured_limit: 6,
            message_max_chars: 4000,
            auth_rate_limit: RateLimitPolicy {
                max_requests: 100,
                window_secs: 15 * 60,
            },
            write_rate_limit: RateLimitPolicy {
                max_requests: 80,
                window_secs: 10 * 60,
            },
        }
    }
}

impl MarketplaceConfig {
    pub fn with_fallback_base_url(mut self, port: u16) -> Self {
        if self.public_base_url.trim().is_empty() {
            self.public_base_url = format!("http://localhost:{port}");
        }
        self
    }

    pub fn data_path(&self, home: &Path) -> PathBuf {
        resolve(home, &self.data_dir)
    }

    pub fn outbox_path(&self, home: &Path) -> PathBuf {
        resolve(home, &self.outbox_dir)
    }

    pub fn session_ttl_secs(&self) -> i64 {
        i64::from(self.session_ttl_days) * 24 * 60 * 60
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.is_empty() {
            anyhow::bail!("marketplace.jwt_secret must not be empty");
        }
        if self.session_ttl_days == 0 {
            anyhow::bail!("marketplace.session_ttl_days must be at least 1");
        }
        if self.message_max_chars == 0 {
            anyhow::bail!("marketplace.message_max_chars must be at least 1");
        }
        if !self.public_base_url.is_empty() {
            let url = url::Url::parse(&self.public_base_url).with_context(|| {
                format!("invalid marketplace.public_base_url '{}'", self.public_base_url)
            })?;
            if !matches!(url.scheme(), "http" | "https") {
                anyhow::bail!("marketplace.public_base_url must be http(s)");
            }
        }
        Ok(())
    }
}

fn resolve(home: &Path, configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        home.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let cfg = MarketplaceConfig::default();
        assert_eq!(cfg.session_ttl_secs(), 7 * 24 * 3600);
        assert_eq!(cfg.auth_rate_limit.max_requests, 100);
        assert_eq!(cfg.write_rate_limit.window_secs, 600);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_section_keeps_defaults() {
        let cfg: MarketplaceConfig = serde_json::from_value(serde_json::json!({
            "jwt_secret": "s3cret",
            "write_rate_limit": { "max_requests": 5, "window_secs": 60 }
        }))
        .unwrap();
        assert_eq!(cfg.jwt_secret, "s3cret");
        assert_eq!(cfg.write_rate_limit.max_requests, 5);
        assert_eq!(cfg.featured_limit, 6);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let res: Result<MarketplaceConfig, _> =
            serde_json::from_value(serde_json::json!({ "smtp_host": "mail" }));
        assert!(res.is_err());
    }

    #[test]
    fn paths_resolve_against_home() {
        let cfg = MarketplaceConfig::default();
        let home = Path::new("/srv/eventflow");
        assert_eq!(cfg.data_path(home), Path::new("/srv/eventflow/data"));

        let cfg = MarketplaceConfig {
            outbox_dir: "/var/mail/eventflow".into(),
            ..Default::default()
        };
        assert_eq!(cfg.outbox_path(home), Path::new("/var/mail/eventflow"));
    }

    #[test]
    fn base_url_fallback_and_validation() {
        let cfg = MarketplaceConfig::default().with_fallback_base_url(8080);
        assert_eq!(cfg.public_base_url, "http://localhost:8080");
        assert!(cfg.validate().is_ok());

        let bad = MarketplaceConfig {
            public_base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let ftp = MarketplaceConfig {
            public_base_url: "ftp://example.com".into(),
            ..Default::default()
        };
        assert!(ftp.validate().is_err());
    }
}
