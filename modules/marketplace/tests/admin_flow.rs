mod common;

use axum::http::StatusCode;
use common::{spawn_app, spawn_app_with, test_config, ADMIN, CUSTOMER};
use modkit::http::RateLimitPolicy;
use serde_json::json;

#[tokio::test]
async fn metrics_count_every_collection() {
    let app = spawn_app().await;
    let admin = app.login(ADMIN).await;
    app.register("New Customer", "new@example.com", "customer").await;

    let reply = app.get("/api/admin/metrics", Some(&admin)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let counts = &reply.body["counts"];
    assert_eq!(counts["usersTotal"], 4);
    assert_eq!(
        counts["usersByRole"],
        json!({"admin": 1, "customer": 2, "supplier": 1})
    );
    assert_eq!(counts["suppliersTotal"], 3);
    assert_eq!(counts["packagesTotal"], 3);
    assert_eq!(counts["plansTotal"], 0);
    assert_eq!(counts["messagesTotal"], 0);
    assert_eq!(counts["threadsTotal"], 0);
}

#[tokio::test]
async fn timeseries_covers_two_weeks() {
    let app = spawn_app().await;
    let admin = app.login(ADMIN).await;
    for _ in 0..3 {
        let reply = app
            .post("/api/metrics/track", None, json!({"type": "pageview", "meta": {"path": "/"}}))
            .await;
        assert_eq!(reply.status, StatusCode::OK);
    }
    app.post("/api/metrics/track", None, json!({"type": "click"})).await;

    let reply = app.get("/api/admin/metrics/timeseries", Some(&admin)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let days = reply.body["days"].as_array().unwrap();
    assert_eq!(days.len(), 14);
    let today = chrono::Utc::now().date_naive().to_string();
    assert_eq!(days[13], today.as_str());
    assert!(days[0].as_str().unwrap() < days[13].as_str().unwrap());
    assert_eq!(reply.body["pageviews"][13], 3);
    // The seeded accounts signed up today.
    assert_eq!(reply.body["signups"][13], 3);
    assert_eq!(reply.body["messages"][13], 0);
}

#[tokio::test]
async fn admin_routes_reject_other_roles() {
    let app = spawn_app().await;
    let customer = app.login(CUSTOMER).await;
    for uri in [
        "/api/admin/metrics",
        "/api/admin/metrics/timeseries",
        "/api/admin/suppliers",
        "/api/admin/packages",
    ] {
        let reply = app.get(uri, Some(&customer)).await;
        assert_eq!(reply.status, StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn moderation_flags_and_unknown_ids() {
    let app = spawn_app().await;
    let admin = app.login(ADMIN).await;

    let packages = app.get("/api/admin/packages", Some(&admin)).await;
    let second = packages.body["items"][1]["id"].as_str().unwrap().to_string();
    let reply = app
        .post(
            &format!("/api/admin/packages/{second}/feature"),
            Some(&admin),
            json!({"featured": "yes"}),
        )
        .await;
    assert_eq!(reply.body["package"]["featured"], true);

    // Missing flag means false.
    let reply = app
        .post(&format!("/api/admin/packages/{second}/approve"), Some(&admin), json!({}))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["package"]["approved"], false);
    let featured = app.get("/api/packages/featured", None).await;
    assert_eq!(featured.body["items"].as_array().unwrap().len(), 2);

    for uri in [
        "/api/admin/suppliers/sup_missing/approve",
        "/api/admin/packages/pkg_missing/approve",
        "/api/admin/packages/pkg_missing/feature",
    ] {
        let reply = app.post(uri, Some(&admin), json!({"approved": true})).await;
        assert_eq!(reply.status, StatusCode::NOT_FOUND, "{uri}");
    }

    let suppliers = app.get("/api/admin/suppliers", Some(&admin)).await;
    assert_eq!(suppliers.body["items"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn moderation_flags_default_to_false_without_a_body() {
    let app = spawn_app().await;
    let admin = app.login(ADMIN).await;
    let customer = app.login(CUSTOMER).await;

    let suppliers = app.get("/api/admin/suppliers", Some(&admin)).await;
    let supplier = suppliers.body["items"][0]["id"].as_str().unwrap().to_string();
    let packages = app.get("/api/admin/packages", Some(&admin)).await;
    let package = packages.body["items"][0]["id"].as_str().unwrap().to_string();

    let reply = app
        .post_empty(&format!("/api/admin/suppliers/{supplier}/approve"), Some(&admin))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["supplier"]["approved"], false);

    let reply = app
        .post_empty(&format!("/api/admin/packages/{package}/approve"), Some(&admin))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["package"]["approved"], false);

    let reply = app
        .post_empty(&format!("/api/admin/packages/{package}/feature"), Some(&admin))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["package"]["featured"], false);

    for uri in [
        format!("/api/admin/suppliers/{supplier}/approve"),
        format!("/api/admin/packages/{package}/approve"),
        format!("/api/admin/packages/{package}/feature"),
    ] {
        let reply = app.post_empty(&uri, Some(&customer)).await;
        assert_eq!(reply.status, StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn tracking_needs_a_type() {
    let app = spawn_app().await;
    let reply = app.post("/api/metrics/track", None, json!({"meta": {}})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["detail"], "Missing type");
}

#[tokio::test]
async fn write_routes_are_rate_limited() {
    let app = spawn_app_with(marketplace::MarketplaceConfig {
        write_rate_limit: RateLimitPolicy {
            max_requests: 2,
            window_secs: 600,
        },
        ..test_config()
    })
    .await;

    for _ in 0..2 {
        let reply = app.post("/api/metrics/track", None, json!({"type": "pageview"})).await;
        assert_eq!(reply.status, StatusCode::OK);
    }
    let reply = app.post("/api/metrics/track", None, json!({"type": "pageview"})).await;
    assert_eq!(reply.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(reply.content_type.as_deref(), Some("application/problem+json"));

    // Reads and the auth bucket are unaffected.
    let reply = app.get("/api/suppliers", None).await;
    assert_eq!(reply.status, StatusCode::OK);
}
