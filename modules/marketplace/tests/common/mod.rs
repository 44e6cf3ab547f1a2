//! Boots the marketplace behind the real ingress router on a temp home.

#![allow(dead_code)]

use api_ingress::{ApiIngress, ApiIngressConfig};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use marketplace::{Marketplace, MarketplaceConfig};
use modkit::http::RateLimitPolicy;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN: (&str, &str) = ("admin@eventflow.local", "Admin123!");
pub const SUPPLIER: (&str, &str) = ("supplier@eventflow.local", "Supplier123!");
pub const CUSTOMER: (&str, &str) = ("customer@eventflow.local", "Customer123!");

pub struct TestApp {
    pub router: Router,
    pub home: TempDir,
}

pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
    pub content_type: Option<String>,
    /// `name=value` of the first `Set-Cookie` header.
    pub cookie: Option<String>,
    pub set_cookie: Option<String>,
}

pub fn test_config() -> MarketplaceConfig {
    MarketplaceConfig {
        jwt_secret: "integration-secret".to_string(),
        public_base_url: "https://eventflow.test".to_string(),
        auth_rate_limit: RateLimitPolicy {
            max_requests: 1_000,
            window_secs: 60,
        },
        write_rate_limit: RateLimitPolicy {
            max_requests: 1_000,
            window_secs: 60,
        },
        ..Default::default()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(cfg: MarketplaceConfig) -> TestApp {
    let home = tempfile::tempdir().unwrap();
    let module = Marketplace::init(cfg, home.path()).await.unwrap();
    let ingress = ApiIngress::new(ApiIngressConfig::default());
    let router = ingress.build_router(&[&module]).unwrap();
    TestApp { router, home }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Reply {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        let body = match body {
            Some(json) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let resp = self
            .router
            .clone()
            .oneshot(req.body(body).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let set_cookie = resp
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let cookie = set_cookie
            .as_deref()
            .and_then(|c| c.split(';').next())
            .map(str::to_owned);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        Reply {
            status,
            body,
            content_type,
            cookie,
            set_cookie,
        }
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Reply {
        self.request(Method::GET, uri, cookie, None).await
    }

    pub async fn post(&self, uri: &str, cookie: Option<&str>, body: Value) -> Reply {
        self.request(Method::POST, uri, cookie, Some(body)).await
    }

    /// POST with no body and no content type.
    pub async fn post_empty(&self, uri: &str, cookie: Option<&str>) -> Reply {
        self.request(Method::POST, uri, cookie, None).await
    }

    pub async fn patch(&self, uri: &str, cookie: Option<&str>, body: Value) -> Reply {
        self.request(Method::PATCH, uri, cookie, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> Reply {
        self.request(Method::DELETE, uri, cookie, None).await
    }

    /// Sign in and return the session cookie.
    pub async fn login(&self, (email, password): (&str, &str)) -> String {
        let reply = self
            .post(
                "/api/auth/login",
                None,
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "login failed: {}", reply.body);
        reply.cookie.expect("login sets a session cookie")
    }

    /// Register an account and return its session cookie.
    pub async fn register(&self, name: &str, email: &str, role: &str) -> String {
        let reply = self
            .post(
                "/api/auth/register",
                None,
                serde_json::json!({
                    "name": name,
                    "email": email,
                    "password": "Passw0rd!",
                    "role": role,
                }),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "register failed: {}", reply.body);
        reply.cookie.expect("register sets a session cookie")
    }

    /// Id of the seeded supplier in `category`.
    pub async fn seeded_supplier(&self, category: &str) -> String {
        let reply = self
            .get(&format!("/api/suppliers?category={category}"), None)
            .await;
        reply.body["items"][0]["id"]
            .as_str()
            .expect("seeded supplier")
            .to_string()
    }

    /// Supplier account submits a listing and the admin approves it.
    pub async fn approved_listing(&self, supplier_cookie: &str, name: &str, category: &str) -> String {
        let created = self
            .post(
                "/api/me/suppliers",
                Some(supplier_cookie),
                serde_json::json!({ "name": name, "category": category }),
            )
            .await;
        assert_eq!(created.status, StatusCode::OK, "{}", created.body);
        let id = created.body["supplier"]["id"].as_str().unwrap().to_string();

        let admin = self.login(ADMIN).await;
        let approved = self
            .post(
                &format!("/api/admin/suppliers/{id}/approve"),
                Some(&admin),
                serde_json::json!({ "approved": true }),
            )
            .await;
        assert_eq!(approved.status, StatusCode::OK, "{}", approved.body);
        id
    }
}
