// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{create_test_app, register_payment_app, PAYMENT_APP};
use axum::http::StatusCode;
use serde_json::json;
use synchook::domain::models::webhook::WebhookEventSyncType;
use synchook::domain::repositories::webhook_repository::WebhookRepository;

#[tokio::test]
async fn test_register_app_creates_targets() {
    let app = create_test_app().await;

    let registered = register_payment_app(&app, "http://localhost:8000", None).await;
    assert_eq!(registered["identifier"], PAYMENT_APP);
    assert_eq!(registered["webhooks"].as_array().map(Vec::len), Some(2));

    let targets = app
        .webhook_repo
        .find_targets_for_event(WebhookEventSyncType::ListStoredPaymentMethods, None)
        .await
        .unwrap();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].target_url, "http://localhost:8000/list");
}

#[tokio::test]
async fn test_duplicate_identifier_conflicts() {
    let app = create_test_app().await;
    register_payment_app(&app, "http://localhost:8000", None).await;

    let response = app
        .server
        .post("/v1/apps")
        .json(&json!({"identifier": PAYMENT_APP, "name": "Again", "webhooks": []}))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_invalid_subscription_is_rejected() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/apps")
        .json(&json!({
            "identifier": "broken.app",
            "name": "Broken",
            "webhooks": [{
                "name": "list",
                "target_url": "http://localhost:8000/list",
                "events": ["list_stored_payment_methods"],
                "subscription_query": "subscription { event { "
            }]
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<serde_json::Value>()["error"]
        .as_str()
        .unwrap_or_default()
        .contains("subscription"));
}

#[tokio::test]
async fn test_deeply_nested_subscription_is_rejected() {
    let app = create_test_app().await;
    let depth = 200_000;
    let query = format!("subscription {}{}", "{ a ".repeat(depth), "}".repeat(depth));

    let response = app
        .server
        .post("/v1/apps")
        .json(&json!({
            "identifier": "nested.app",
            "name": "Nested",
            "webhooks": [{
                "name": "list",
                "target_url": "http://localhost:8000/list",
                "events": ["list_stored_payment_methods"],
                "subscription_query": query
            }]
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // The server keeps serving requests and nothing was stored.
    app.server.get("/health").await.assert_status_ok();
    let targets = app
        .webhook_repo
        .find_targets_for_event(WebhookEventSyncType::ListStoredPaymentMethods, None)
        .await
        .unwrap();
    assert!(targets.is_empty());
}
