// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::event_delivery::{DeliveryAttempt, EventDelivery, NewEventDelivery};
use crate::domain::models::webhook::WebhookEventSyncType;
use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

/// 仓库错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// 数据库错误
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
    /// 记录未找到
    #[error("Record not found")]
    NotFound,
    /// 存储的数据无法映射为领域模型
    #[error("Invalid stored value: {0}")]
    InvalidData(String),
}

/// 投递记录仓库特质
///
/// 只追加：创建投递记录和投递尝试，不提供更新或删除。
#[async_trait]
pub trait EventDeliveryRepository: Send + Sync {
    /// 创建投递记录
    async fn create(&self, delivery: NewEventDelivery) -> Result<EventDelivery, RepositoryError>;
    /// 根据ID查找投递记录
    async fn find_by_id(&self, id: Uuid) -> Result<Option<EventDelivery>, RepositoryError>;
    /// 按事件类型列出投递记录（按创建时间升序）
    async fn list_by_event_type(
        &self,
        event_type: WebhookEventSyncType,
    ) -> Result<Vec<EventDelivery>, RepositoryError>;
    /// 追加一次投递尝试
    async fn record_attempt(&self, attempt: &DeliveryAttempt) -> Result<(), RepositoryError>;
    /// 列出投递记录的所有尝试
    async fn attempts_for(&self, delivery_id: Uuid)
        -> Result<Vec<DeliveryAttempt>, RepositoryError>;
}
