// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;
use synchook::application::use_cases::webhook_plugin::{PluginConfig, WebhookPlugin};
use synchook::config::settings::Settings;
use synchook::domain::repositories::event_delivery_repository::EventDeliveryRepository;
use synchook::domain::repositories::webhook_repository::WebhookRepository;
use synchook::infrastructure::cache::cache_manager::CacheManager;
use synchook::infrastructure::database::connection;
use synchook::infrastructure::repositories::event_delivery_repo_impl::EventDeliveryRepoImpl;
use synchook::infrastructure::repositories::webhook_repo_impl::WebhookRepoImpl;
use synchook::infrastructure::services::sync_webhook_service_impl::SyncWebhookServiceImpl;
use synchook::presentation::routes;
use synchook::utils::telemetry;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Load configuration
    let settings = Settings::new()?;

    // 2. Initialize logging and metrics
    telemetry::init_telemetry(settings.logging.json);
    info!("Starting synchook...");
    if let Err(e) = synchook::infrastructure::metrics::init_metrics(&settings.metrics) {
        warn!("Metrics exporter not started: {:#}", e);
    }

    // 3. Connect to database
    let db = Arc::new(connection::connect_and_migrate(&settings.database).await?);
    info!("Database connection established");

    // 4. Response cache
    let cache = Arc::new(
        CacheManager::new(
            settings.cache.strategy_config(),
            settings.cache.redis_url.as_deref(),
        )
        .await?,
    );

    // 5. Repositories, dispatcher and plugin
    let webhook_repo: Arc<dyn WebhookRepository> = Arc::new(WebhookRepoImpl::new(db.clone()));
    let delivery_repo: Arc<dyn EventDeliveryRepository> =
        Arc::new(EventDeliveryRepoImpl::new(db.clone()));
    let sync_webhook_service = Arc::new(
        SyncWebhookServiceImpl::new(settings.webhook.secret.clone(), delivery_repo.clone())
            .with_max_response_body_bytes(settings.webhook.max_response_body_bytes)
            .with_max_response_bytes(settings.webhook.max_response_bytes),
    );
    let plugin = Arc::new(WebhookPlugin::new(
        webhook_repo.clone(),
        delivery_repo,
        sync_webhook_service,
        cache,
        PluginConfig::from(&settings),
    ));

    // 6. Start HTTP server
    let app = routes::app(plugin, webhook_repo);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
