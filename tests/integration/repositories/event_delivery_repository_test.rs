// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::integration::helpers::setup_db;
use synchook::domain::models::event_delivery::NewEventDelivery;
use synchook::domain::models::webhook::{App, Webhook, WebhookEventSyncType, WebhookTarget};
use synchook::domain::repositories::event_delivery_repository::EventDeliveryRepository;
use synchook::domain::repositories::webhook_repository::WebhookRepository;
use synchook::infrastructure::repositories::event_delivery_repo_impl::EventDeliveryRepoImpl;
use synchook::infrastructure::repositories::webhook_repo_impl::WebhookRepoImpl;

/// 投递记录引用真实的调用目标
#[tokio::test]
async fn test_delivery_for_registered_target() {
    let db = setup_db().await;
    let webhook_repo = WebhookRepoImpl::new(db.clone());
    let delivery_repo = EventDeliveryRepoImpl::new(db);

    let app = App::new("saleor.app.payment", "Payment App");
    let webhook = Webhook::new(
        app.id,
        "delete",
        "http://localhost:8000/delete/",
        vec![WebhookEventSyncType::StoredPaymentMethodDeleteRequested],
    );
    webhook_repo
        .register_app(&app, std::slice::from_ref(&webhook))
        .await
        .unwrap();

    let targets: Vec<WebhookTarget> = webhook_repo
        .find_targets_for_event(
            WebhookEventSyncType::StoredPaymentMethodDeleteRequested,
            Some("saleor.app.payment"),
        )
        .await
        .unwrap();
    assert_eq!(targets.len(), 1);

    let delivery = delivery_repo
        .create(NewEventDelivery::for_target(
            WebhookEventSyncType::StoredPaymentMethodDeleteRequested,
            r#"{"payment_method_id":"123","user_id":"VXNlcjox","channel_slug":"main"}"#
                .to_string(),
            &targets[0],
        ))
        .await
        .unwrap();

    assert_eq!(delivery.webhook_id, webhook.id);
    assert_eq!(delivery.app_id, app.id);
    assert_eq!(delivery.target_url, "http://localhost:8000/delete/");
    let found = delivery_repo.find_by_id(delivery.id).await.unwrap().unwrap();
    assert_eq!(found.id, delivery.id);
    assert_eq!(found.payload, delivery.payload);
}
