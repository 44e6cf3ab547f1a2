mod common;

use axum::http::StatusCode;
use common::{spawn_app, ADMIN};
use serde_json::json;

#[tokio::test]
async fn register_starts_a_session() {
    let app = spawn_app().await;
    let reply = app
        .post(
            "/api/auth/register",
            None,
            json!({"name": "  Ada  ", "email": "Ada@Example.com", "password": "Passw0rd!"}),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["ok"], true);
    assert_eq!(reply.body["user"]["name"], "Ada");
    assert_eq!(reply.body["user"]["email"], "ada@example.com");
    assert_eq!(reply.body["user"]["role"], "customer");
    assert!(reply.body["user"].get("notify").is_none());

    let set_cookie = reply.set_cookie.unwrap();
    assert!(set_cookie.starts_with("token="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=604800"));

    let me = app.get("/api/auth/me", reply.cookie.as_deref()).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["user"]["email"], "ada@example.com");
    assert_eq!(me.body["user"]["notify"], true);
}

#[tokio::test]
async fn admin_role_cannot_be_self_assigned() {
    let app = spawn_app().await;
    let reply = app
        .post(
            "/api/auth/register",
            None,
            json!({"name": "Mallory", "email": "m@example.com", "password": "Passw0rd!", "role": "admin"}),
        )
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["user"]["role"], "customer");

    let reply = app
        .post(
            "/api/auth/register",
            None,
            json!({"name": "Sam", "email": "s@example.com", "password": "Passw0rd!", "role": "supplier"}),
        )
        .await;
    assert_eq!(reply.body["user"]["role"], "supplier");
}

#[tokio::test]
async fn registration_validates_input() {
    let app = spawn_app().await;
    let cases = [
        (json!({"name": "A", "email": "a@example.com"}), "Missing fields"),
        (json!({"name": "  ", "email": "a@example.com", "password": "Passw0rd!"}), "Missing fields"),
        (json!({"name": "A", "email": "not-an-email", "password": "Passw0rd!"}), "Invalid email"),
        (json!({"name": "A", "email": "a@example.com", "password": "short1"}), "Weak password"),
        (json!({"name": "A", "email": "a@example.com", "password": "lettersonly"}), "Weak password"),
    ];
    for (body, detail) in cases {
        let reply = app.post("/api/auth/register", None, body.clone()).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(reply.body["detail"], detail, "{body}");
        assert_eq!(reply.body["code"], "MARKETPLACE_VALIDATION");
        assert_eq!(reply.content_type.as_deref(), Some("application/problem+json"));
    }
}

#[tokio::test]
async fn duplicate_email_is_a_conflict_regardless_of_case() {
    let app = spawn_app().await;
    let reply = app
        .post(
            "/api/auth/register",
            None,
            json!({"name": "Copy", "email": "ADMIN@eventflow.local", "password": "Passw0rd!"}),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert_eq!(reply.body["detail"], "Email already registered");
    assert_eq!(reply.body["instance"], "/api/auth/register");
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let app = spawn_app().await;

    let reply = app
        .post("/api/auth/login", None, json!({"email": ADMIN.0, "password": "wrong-pass1"}))
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.body["detail"], "Invalid email or password");
    assert!(reply.set_cookie.is_none());

    let reply = app
        .post("/api/auth/login", None, json!({"email": "nobody@example.com", "password": "Passw0rd!"}))
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = app.post("/api/auth/login", None, json!({"email": ADMIN.0})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    // Email lookup ignores case.
    let reply = app
        .post("/api/auth/login", None, json!({"email": "Admin@EventFlow.local", "password": ADMIN.1}))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["user"]["role"], "admin");
}

#[tokio::test]
async fn me_is_null_without_a_valid_session() {
    let app = spawn_app().await;

    let reply = app.get("/api/auth/me", None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body["user"].is_null());

    let reply = app.get("/api/auth/me", Some("token=not-a-jwt")).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body["user"].is_null());
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = spawn_app().await;
    let cookie = app.login(ADMIN).await;

    let reply = app.post("/api/auth/logout", Some(&cookie), json!({})).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["ok"], true);
    let cleared = reply.set_cookie.unwrap();
    assert!(cleared.starts_with("token="));
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = spawn_app().await;
    for uri in ["/api/me/settings", "/api/plan", "/api/threads/my", "/api/admin/metrics"] {
        let reply = app.get(uri, None).await;
        assert_eq!(reply.status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(reply.body["code"], "MARKETPLACE_UNAUTHENTICATED");
        assert_eq!(reply.body["instance"], uri);
    }
}

#[tokio::test]
async fn notification_settings_round_trip() {
    let app = spawn_app().await;
    let cookie = app.register("Nia", "nia@example.com", "customer").await;

    let reply = app.get("/api/me/settings", Some(&cookie)).await;
    assert_eq!(reply.body, json!({"notify": true}));

    let reply = app.post("/api/me/settings", Some(&cookie), json!({"notify": 0})).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({"ok": true, "notify": false}));

    let reply = app.get("/api/auth/me", Some(&cookie)).await;
    assert_eq!(reply.body["user"]["notify"], false);

    app.post("/api/me/settings", Some(&cookie), json!({"notify": true})).await;
    let reply = app.post_empty("/api/me/settings", Some(&cookie)).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, json!({"ok": true, "notify": false}));
}

#[tokio::test]
async fn malformed_json_is_a_problem() {
    let app = spawn_app().await;
    let reply = app
        .post("/api/auth/login", None, json!({"email": 42, "password": true}))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["code"], "INVALID_JSON_BODY");
}
