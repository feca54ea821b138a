// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::application::use_cases::webhook_plugin::WebhookPlugin;
use crate::domain::repositories::webhook_repository::WebhookRepository;
use crate::presentation::handlers::{app_handler, stored_payment_method_handler};
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// 创建应用路由
///
/// 处理器依赖通过 `Extension` 层注入：`Arc<WebhookPlugin>` 和 `Arc<dyn WebhookRepository>`。
pub fn routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/v1/version", get(version))
        .route(
            "/v1/stored-payment-methods/list",
            post(stored_payment_method_handler::list_stored_payment_methods),
        )
        .route(
            "/v1/stored-payment-methods/delete",
            post(stored_payment_method_handler::request_delete_stored_payment_method),
        )
        .route("/v1/apps", post(app_handler::register_app))
}

/// 创建注入了依赖和请求追踪的完整应用
pub fn app(plugin: Arc<WebhookPlugin>, webhook_repo: Arc<dyn WebhookRepository>) -> Router {
    routes()
        .layer(Extension(plugin))
        .layer(Extension(webhook_repo))
        .layer(TraceLayer::new_for_http())
}

/// 健康检查端点
///
/// # 返回值
///
/// 返回"OK"字符串
pub async fn health_check() -> &'static str {
    "OK"
}

/// 版本信息端点
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
