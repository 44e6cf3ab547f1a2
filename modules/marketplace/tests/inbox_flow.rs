mod common;

use axum::http::StatusCode;
use common::{spawn_app, CUSTOMER, SUPPLIER};
use serde_json::json;

#[tokio::test]
async fn customer_and_supplier_exchange_messages() {
    let app = spawn_app().await;
    let supplier = app.login(SUPPLIER).await;
    let customer = app.login(CUSTOMER).await;
    let listing = app.approved_listing(&supplier, "Harbour Hall", "Venues").await;

    let started = app
        .post("/api/threads/start", Some(&customer), json!({"supplierId": listing}))
        .await;
    assert_eq!(started.status, StatusCode::OK, "{}", started.body);
    assert_eq!(started.body["thread"]["supplierName"], "Harbour Hall");
    let thread = started.body["thread"]["id"].as_str().unwrap().to_string();

    // Starting again reuses the thread.
    let again = app
        .post("/api/threads/start", Some(&customer), json!({"supplierId": listing}))
        .await;
    assert_eq!(again.body["thread"]["id"], thread.as_str());

    let uri = format!("/api/threads/{thread}/messages");
    for (cookie, text) in [
        (&customer, "Is June free?"),
        (&supplier, "Yes, 14th and 21st."),
        (&customer, "The 21st please."),
    ] {
        let reply = app.post(&uri, Some(cookie), json!({"text": text})).await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.body);
    }

    let messages = app.get(&uri, Some(&supplier)).await;
    let items = messages.body["items"].as_array().unwrap();
    let texts: Vec<&str> = items.iter().map(|m| m["text"].as_str().unwrap()).collect();
    assert_eq!(texts, vec!["Is June free?", "Yes, 14th and 21st.", "The 21st please."]);
    assert_eq!(items[1]["fromRole"], "supplier");

    let inbox = app.get("/api/threads/my", Some(&supplier)).await;
    let threads = inbox.body["items"].as_array().unwrap();
    assert_eq!(threads.len(), 1);
    assert_eq!(threads[0]["id"], thread.as_str());
    assert_eq!(threads[0]["last"]["text"], "The 21st please.");

    // Two enquiries and two customer messages to the listing contact, one
    // reply to the customer.
    let outbox = app.home.path().join("outbox");
    let mails = std::fs::read_dir(&outbox).unwrap().count();
    assert_eq!(mails, 5);
}

#[tokio::test]
async fn outsiders_are_kept_out_of_threads() {
    let app = spawn_app().await;
    let customer = app.login(CUSTOMER).await;
    let venue = app.seeded_supplier("Venues").await;
    let started = app
        .post("/api/threads/start", Some(&customer), json!({"supplierId": venue}))
        .await;
    let thread = started.body["thread"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/threads/{thread}/messages");

    let stranger = app.register("Stranger", "stranger@example.com", "customer").await;
    let reply = app.get(&uri, Some(&stranger)).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
    let reply = app.post(&uri, Some(&stranger), json!({"text": "hi"})).await;
    assert_eq!(reply.status, StatusCode::FORBIDDEN);

    let inbox = app.get("/api/threads/my", Some(&stranger)).await;
    assert!(inbox.body["items"].as_array().unwrap().is_empty());

    let reply = app.get("/api/threads/thd_missing/messages", Some(&customer)).await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body["detail"], "Thread not found");
}

#[tokio::test]
async fn thread_input_is_validated() {
    let app = spawn_app().await;
    let customer = app.login(CUSTOMER).await;

    let reply = app.post("/api/threads/start", Some(&customer), json!({})).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["detail"], "Missing supplierId");

    let reply = app
        .post("/api/threads/start", Some(&customer), json!({"supplierId": "sup_missing"}))
        .await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    let venue = app.seeded_supplier("Venues").await;
    let started = app
        .post("/api/threads/start", Some(&customer), json!({"supplierId": venue}))
        .await;
    let thread = started.body["thread"]["id"].as_str().unwrap().to_string();
    let reply = app
        .post(&format!("/api/threads/{thread}/messages"), Some(&customer), json!({"text": "  "}))
        .await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.body["detail"], "Missing text");

    let reply = app
        .post("/api/threads/start", None, json!({"supplierId": venue}))
        .await;
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
}
