// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::helpers::{
    create_test_app, delete_request, delivery_count, list_request, register_payment_app,
};
use synchook::domain::repositories::event_delivery_repository::EventDeliveryRepository;
use axum::http::StatusCode;
use serde_json::{json, Value};
use wiremock::matchers::{body_string, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_EVENT: &str = "list_stored_payment_methods";
const DELETE_EVENT: &str = "stored_payment_method_delete_requested";

const DELETE_SUBSCRIPTION: &str = r#"
subscription {
  event {
    ... on StoredPaymentMethodDeleteRequested{
      user{
        id
      }
      paymentMethodId
      channel{
        id
      }
    }
  }
}
"#;

fn list_response() -> Value {
    json!({
        "paymentMethods": [{
            "id": "pm_1",
            "supportedPaymentFlows": ["INTERACTIVE"],
            "type": "Credit Card",
            "creditCardInfo": {
                "brand": "visa",
                "lastDigits": "4242",
                "expMonth": 12,
                "expYear": 2030,
                "firstDigits": null
            },
            "name": "Visa",
            "data": null
        }]
    })
}

async fn list(app: &super::helpers::TestApp) -> Value {
    let response = app
        .server
        .post("/v1/stored-payment-methods/list")
        .json(&list_request())
        .await;
    response.assert_status(StatusCode::OK);
    response.json::<Value>()
}

#[tokio::test]
async fn test_list_is_cached_until_delete_invalidates_it() {
    let app = create_test_app().await;
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/list"))
        .and(header("X-Synchook-Event", LIST_EVENT))
        .and(header_exists("X-Synchook-Signature"))
        .and(body_string(r#"{"user_id":"VXNlcjox","channel_slug":"main"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(list_response()))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/delete"))
        .and(body_string(
            r#"{"payment_method_id":"pm_1","user_id":"VXNlcjox","channel_slug":"main"}"#,
        ))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "message": "Payment method deleted successfully"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    register_payment_app(&app, &mock_server.uri(), None).await;

    // Miss: the app is asked once.
    let body = list(&app).await;
    assert_eq!(
        body["payment_methods"][0]["id"],
        "app:saleor.app.payment:pm_1"
    );
    assert_eq!(body["payment_methods"][0]["type"], "Credit Card");

    // Hit: no new delivery.
    let cached = list(&app).await;
    assert_eq!(cached, body);
    assert_eq!(delivery_count(&app, LIST_EVENT).await, 1);

    let response = app
        .server
        .post("/v1/stored-payment-methods/delete")
        .json(&delete_request("app:saleor.app.payment:pm_1"))
        .await;
    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({
        "success": true,
        "message": "Payment method deleted successfully"
    }));
    assert_eq!(delivery_count(&app, DELETE_EVENT).await, 1);

    // The list entry was invalidated, so the app is asked again.
    list(&app).await;
    assert_eq!(delivery_count(&app, LIST_EVENT).await, 2);
}

#[tokio::test]
async fn test_delete_uses_subscription_payload() {
    let app = create_test_app().await;
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/delete"))
        .and(body_string(
            r#"{"user":{"id":"VXNlcjox"},"paymentMethodId":"123","channel":{"id":"Q2hhbm5lbDox"}}"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    register_payment_app(&app, &mock_server.uri(), Some(DELETE_SUBSCRIPTION)).await;

    let response = app
        .server
        .post("/v1/stored-payment-methods/delete")
        .json(&delete_request("app:saleor.app.payment:123"))
        .await;
    response.assert_json(&json!({"success": true, "message": null}));
}

#[tokio::test]
async fn test_failed_list_is_not_cached_and_records_attempts() {
    let app = create_test_app().await;
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/list"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(2)
        .mount(&mock_server)
        .await;

    register_payment_app(&app, &mock_server.uri(), None).await;

    for _ in 0..2 {
        let body = list(&app).await;
        assert_eq!(body["payment_methods"], json!([]));
    }

    let deliveries = app
        .delivery_repo
        .list_by_event_type(LIST_EVENT.parse().unwrap())
        .await
        .unwrap();
    assert_eq!(deliveries.len(), 2);

    let attempts = app.delivery_repo.attempts_for(deliveries[0].id).await.unwrap();
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].response_status_code, Some(503));
    assert_eq!(attempts[0].response_body.as_deref(), Some("unavailable"));
}

#[tokio::test]
async fn test_delete_without_response_reports_delivery_failure() {
    let app = create_test_app().await;
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    register_payment_app(&app, &mock_server.uri(), None).await;

    let response = app
        .server
        .post("/v1/stored-payment-methods/delete")
        .json(&delete_request("app:saleor.app.payment:123"))
        .await;
    response.assert_status(StatusCode::OK);
    response.assert_json(&json!({
        "success": false,
        "message": "Failed to delivery request."
    }));
}

#[tokio::test]
async fn test_delete_for_unknown_app_is_not_dispatched() {
    let app = create_test_app().await;
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&mock_server)
        .await;

    register_payment_app(&app, &mock_server.uri(), None).await;

    let response = app
        .server
        .post("/v1/stored-payment-methods/delete")
        .json(&delete_request("app:another.app:123"))
        .await;
    response.assert_status(StatusCode::OK);
    assert_eq!(response.json::<Value>()["success"], false);
    assert_eq!(delivery_count(&app, DELETE_EVENT).await, 0);
}

#[tokio::test]
async fn test_invalid_request_is_rejected() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/v1/stored-payment-methods/list")
        .json(&json!({
            "user": {"id": 1, "email": "not-an-email"},
            "channel": {"id": 1, "slug": "main", "name": "Main", "currency_code": "USD"}
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}
