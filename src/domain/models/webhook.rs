// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// 同步Webhook调用的统一超时时间
pub const WEBHOOK_SYNC_TIMEOUT: Duration = Duration::from_secs(20);

/// 同步Webhook响应的默认缓存时间
pub const WEBHOOK_CACHE_DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// 已安装的第三方应用
///
/// 应用通过Webhook暴露同步能力（例如存储的支付方式）。
/// `identifier` 用于为应用返回的支付方式ID加上命名空间。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct App {
    /// 应用唯一标识符
    pub id: Uuid,
    /// 应用标识，用于区分多个提供相同能力的应用
    pub identifier: String,
    /// 应用名称
    pub name: String,
    /// 是否启用
    pub is_active: bool,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl App {
    /// 创建一个新的启用状态的应用
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            identifier: identifier.into(),
            name: name.into(),
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Webhook实体
///
/// 应用配置的一个回调端点，订阅一组同步事件。
/// 配置了 `subscription_query` 时，请求负载由订阅文档计算得到，
/// 否则使用静态负载。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    /// Webhook唯一标识符
    pub id: Uuid,
    /// 所属应用ID
    pub app_id: Uuid,
    /// Webhook名称
    pub name: String,
    /// 回调URL
    pub target_url: String,
    /// 订阅文档（可选）
    pub subscription_query: Option<String>,
    /// 是否启用
    pub is_active: bool,
    /// 订阅的事件类型
    pub events: Vec<WebhookEventSyncType>,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

impl Webhook {
    /// 为应用创建一个新的Webhook配置
    pub fn new(
        app_id: Uuid,
        name: impl Into<String>,
        target_url: impl Into<String>,
        events: Vec<WebhookEventSyncType>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            app_id,
            name: name.into(),
            target_url: target_url.into(),
            subscription_query: None,
            is_active: true,
            events,
            created_at: Utc::now(),
        }
    }

    /// 设置订阅文档
    pub fn with_subscription_query(mut self, query: impl Into<String>) -> Self {
        self.subscription_query = Some(query.into());
        self
    }
}

/// 同步调用目标
///
/// 已启用的Webhook与其已启用应用的组合，
/// 包含构建负载、计算缓存键和发送请求所需的全部信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    pub webhook_id: Uuid,
    pub target_url: String,
    pub subscription_query: Option<String>,
    pub app: App,
}

/// 同步Webhook事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventSyncType {
    /// 列出用户在渠道下存储的支付方式
    ListStoredPaymentMethods,
    /// 请求删除存储的支付方式
    StoredPaymentMethodDeleteRequested,
}

impl WebhookEventSyncType {
    /// 事件类型的持久化名称
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEventSyncType::ListStoredPaymentMethods => "list_stored_payment_methods",
            WebhookEventSyncType::StoredPaymentMethodDeleteRequested => {
                "stored_payment_method_delete_requested"
            }
        }
    }

    /// 订阅文档中事件对象的类型名
    pub fn graphql_type_name(&self) -> &'static str {
        match self {
            WebhookEventSyncType::ListStoredPaymentMethods => "ListStoredPaymentMethods",
            WebhookEventSyncType::StoredPaymentMethodDeleteRequested => {
                "StoredPaymentMethodDeleteRequested"
            }
        }
    }
}

impl fmt::Display for WebhookEventSyncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WebhookEventSyncType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list_stored_payment_methods" => Ok(WebhookEventSyncType::ListStoredPaymentMethods),
            "stored_payment_method_delete_requested" => {
                Ok(WebhookEventSyncType::StoredPaymentMethodDeleteRequested)
            }
            _ => Err(()),
        }
    }
}
