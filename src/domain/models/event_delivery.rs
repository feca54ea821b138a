// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::webhook::{WebhookEventSyncType, WebhookTarget};

/// 事件投递记录
///
/// 每次对外发送同步请求之前创建的不可变审计记录，
/// 保存序列化后的负载以及目标信息。创建后不会再被修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDelivery {
    /// 投递记录唯一标识符
    pub id: Uuid,
    /// 事件类型
    pub event_type: WebhookEventSyncType,
    /// 序列化后的请求负载（JSON）
    pub payload: String,
    /// 目标Webhook ID
    pub webhook_id: Uuid,
    /// 目标应用ID
    pub app_id: Uuid,
    /// 请求目标URL
    pub target_url: String,
    /// 创建时间
    pub created_at: DateTime<Utc>,
}

/// 待创建的投递记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEventDelivery {
    pub event_type: WebhookEventSyncType,
    pub payload: String,
    pub webhook_id: Uuid,
    pub app_id: Uuid,
    pub target_url: String,
}

impl NewEventDelivery {
    /// 为指定调用目标构造投递记录
    pub fn for_target(
        event_type: WebhookEventSyncType,
        payload: String,
        target: &WebhookTarget,
    ) -> Self {
        Self {
            event_type,
            payload,
            webhook_id: target.webhook_id,
            app_id: target.app.id,
            target_url: target.target_url.clone(),
        }
    }

    /// 生成带有ID和创建时间的投递记录
    pub fn into_delivery(self) -> EventDelivery {
        EventDelivery {
            id: Uuid::new_v4(),
            event_type: self.event_type,
            payload: self.payload,
            webhook_id: self.webhook_id,
            app_id: self.app_id,
            target_url: self.target_url,
            created_at: Utc::now(),
        }
    }
}

/// 投递尝试结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    /// 收到2xx且响应体为合法JSON
    Success,
    /// 传输错误、超时、非2xx或响应体无法解析
    Failed,
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptStatus::Success => write!(f, "success"),
            AttemptStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for AttemptStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(AttemptStatus::Success),
            "failed" => Ok(AttemptStatus::Failed),
            _ => Err(()),
        }
    }
}

/// 投递尝试记录
///
/// 追加写入，记录一次发送的结果，不会修改对应的投递记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    pub id: Uuid,
    pub delivery_id: Uuid,
    pub status: AttemptStatus,
    pub response_status_code: Option<u16>,
    pub response_body: Option<String>,
    pub duration_ms: i64,
    pub created_at: DateTime<Utc>,
}

impl DeliveryAttempt {
    pub fn new(
        delivery_id: Uuid,
        status: AttemptStatus,
        response_status_code: Option<u16>,
        response_body: Option<String>,
        duration_ms: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            delivery_id,
            status,
            response_status_code,
            response_body,
            duration_ms,
            created_at: Utc::now(),
        }
    }
}
