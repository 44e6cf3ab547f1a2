mod common;

use axum::http::StatusCode;
use common::{spawn_app, CUSTOMER, SUPPLIER};
use serde_json::json;

#[tokio::test]
async fn customers_build_a_plan() {
    let app = spawn_app().await;
    let customer = app.login(CUSTOMER).await;
    let venue = app.seeded_supplier("Venues").await;
    let catering = app.seeded_supplier("Catering").await;

    for id in [&venue, &venue, &catering] {
        let reply = app.post("/api/plan", Some(&customer), json!({"supplierId": id})).await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
        assert_eq!(reply.body["ok"], true);
    }

    let plan = app.get("/api/plan", Some(&customer)).await;
    let ids: Vec<&str> = plan.body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![venue.as_str(), catering.as_str()]);

    let progress = app.get("/api/plan/progress", Some(&customer)).await;
    assert_eq!(progress.body["score"], 50);
    assert_eq!(progress.body["covered"], json!(["Venues", "Catering"]));
    assert_eq!(progress.body["missing"], json!(["Photography", "Entertainment"]));

    let removed = app.delete(&format!("/api/plan/{venue}"), Some(&customer)).await;
    assert_eq!(removed.status, StatusCode::OK);
    let removed = app.delete(&format!("/api/plan/{venue}"), Some(&customer)).await;
    assert_eq!(removed.status, StatusCode::OK);

    let plan = app.get("/api/plan", Some(&customer)).await;
    assert_eq!(plan.body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn plan_input_is_validated() {
    let app = spawn_app().await;
    let customer = app.login(CUSTOMER).await;

    let reply = app.post("/api/plan", Some(&customer), json!({})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["detail"], "Missing supplierId");

    let reply = app
        .post("/api/plan", Some(&customer), json!({"supplierId": "sup_missing"}))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["detail"], "Supplier not found");
}

#[tokio::test]
async fn plan_and_notes_are_customers_only() {
    let app = spawn_app().await;
    let supplier = app.login(SUPPLIER).await;

    for uri in ["/api/plan", "/api/plan/progress", "/api/notes"] {
        let reply = app.get(uri, Some(&supplier)).await;
        assert_eq!(reply.status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(reply.body["detail"], "Customers only");
    }
}

#[tokio::test]
async fn notes_are_saved_per_customer() {
    let app = spawn_app().await;
    let customer = app.login(CUSTOMER).await;
    let other = app.register("Other", "other@example.com", "customer").await;

    let reply = app.get("/api/notes", Some(&customer)).await;
    assert_eq!(reply.body, json!({"text": ""}));

    let reply = app
        .post("/api/notes", Some(&customer), json!({"text": "Ask about parking"}))
        .await;
    assert_eq!(reply.status, StatusCode::OK);
    app.post("/api/notes", Some(&customer), json!({"text": "Ask about parking and music"}))
        .await;

    let reply = app.get("/api/notes", Some(&customer)).await;
    assert_eq!(reply.body["text"], "Ask about parking and music");
    let reply = app.get("/api/notes", Some(&other)).await;
    assert_eq!(reply.body["text"], "");

    let reply = app.post_empty("/api/notes", Some(&customer)).await;
    assert_eq!(reply.status, StatusCode::OK);
    let reply = app.get("/api/notes", Some(&customer)).await;
    assert_eq!(reply.body["text"], "");
}
