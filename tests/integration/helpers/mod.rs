// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum_test::TestServer;
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use synchook::application::use_cases::webhook_plugin::{PluginConfig, WebhookPlugin};
use synchook::domain::repositories::event_delivery_repository::EventDeliveryRepository;
use synchook::domain::repositories::webhook_repository::WebhookRepository;
use synchook::infrastructure::cache::cache_manager::CacheManager;
use synchook::infrastructure::repositories::event_delivery_repo_impl::EventDeliveryRepoImpl;
use synchook::infrastructure::repositories::webhook_repo_impl::WebhookRepoImpl;
use synchook::infrastructure::services::sync_webhook_service_impl::SyncWebhookServiceImpl;
use synchook::presentation::routes;

pub const TEST_SECRET: &str = "test-secret";
pub const PAYMENT_APP: &str = "saleor.app.payment";

#[allow(dead_code)]
pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<DatabaseConnection>,
    pub cache: Arc<CacheManager>,
    pub delivery_repo: Arc<EventDeliveryRepoImpl>,
    pub webhook_repo: Arc<WebhookRepoImpl>,
}

pub async fn setup_db() -> Arc<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to sqlite");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    Arc::new(db)
}

pub async fn create_test_app() -> TestApp {
    let db = setup_db().await;
    let cache = Arc::new(CacheManager::in_memory());
    let delivery_repo = Arc::new(EventDeliveryRepoImpl::new(db.clone()));
    let webhook_repo = Arc::new(WebhookRepoImpl::new(db.clone()));

    let sync_webhook_service = Arc::new(SyncWebhookServiceImpl::new(
        TEST_SECRET.to_string(),
        delivery_repo.clone(),
    ));
    let plugin = Arc::new(WebhookPlugin::new(
        webhook_repo.clone(),
        delivery_repo.clone(),
        sync_webhook_service,
        cache.clone(),
        PluginConfig {
            sync_timeout: Duration::from_secs(2),
            ..PluginConfig::default()
        },
    ));

    let dyn_webhook_repo: Arc<dyn WebhookRepository> = webhook_repo.clone();
    let server = TestServer::new(routes::app(plugin, dyn_webhook_repo))
        .expect("Failed to create test server");

    TestApp {
        server,
        db,
        cache,
        delivery_repo,
        webhook_repo,
    }
}

/// 用户1在main渠道下的请求体
pub fn user_and_channel() -> (Value, Value) {
    (
        json!({"id": 1, "email": "test@example.com"}),
        json!({"id": 1, "slug": "main", "name": "Main", "currency_code": "USD"}),
    )
}

pub fn list_request() -> Value {
    let (user, channel) = user_and_channel();
    json!({"user": user, "channel": channel})
}

pub fn delete_request(payment_method_id: &str) -> Value {
    let (user, channel) = user_and_channel();
    json!({"user": user, "payment_method_id": payment_method_id, "channel": channel})
}

/// 注册一个同时订阅列表和删除事件的应用
pub async fn register_payment_app(
    app: &TestApp,
    base_url: &str,
    delete_subscription: Option<&str>,
) -> Value {
    let response = app
        .server
        .post("/v1/apps")
        .json(&json!({
            "identifier": PAYMENT_APP,
            "name": "Payment App",
            "webhooks": [
                {
                    "name": "list",
                    "target_url": format!("{}/list", base_url),
                    "events": ["list_stored_payment_methods"]
                },
                {
                    "name": "delete",
                    "target_url": format!("{}/delete", base_url),
                    "events": ["stored_payment_method_delete_requested"],
                    "subscription_query": delete_subscription
                }
            ]
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json::<Value>()
}

#[allow(dead_code)]
pub async fn delivery_count(app: &TestApp, event: &str) -> usize {
    app.delivery_repo
        .list_by_event_type(event.parse().expect("known event type"))
        .await
        .expect("Failed to list deliveries")
        .len()
}
