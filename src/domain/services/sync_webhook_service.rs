// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::event_delivery::EventDelivery;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// 同步Webhook服务特质
///
/// 定义同步Webhook请求的发送逻辑
#[async_trait]
pub trait SyncWebhookService: Send + Sync {
    /// 发送同步Webhook请求并等待响应
    ///
    /// # 参数
    ///
    /// * `delivery` - 已持久化的投递记录，包含负载与目标URL
    /// * `timeout` - 请求超时时间
    ///
    /// # 返回值
    ///
    /// * `Some(Value)` - 收到2xx且响应体为合法JSON
    /// * `None` - 传输错误、超时、非2xx或响应体无法解析
    async fn send_webhook_request_sync(
        &self,
        delivery: &EventDelivery,
        timeout: Duration,
    ) -> Option<Value>;
}
