// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::event_delivery_repository::RepositoryError;
use crate::domain::models::webhook::{App, Webhook, WebhookEventSyncType, WebhookTarget};
use async_trait::async_trait;

/// Webhook配置仓库特质
///
/// 定义应用与Webhook配置的数据访问接口
#[async_trait]
pub trait WebhookRepository: Send + Sync {
    /// 在一个事务中创建应用、它的Webhook及事件订阅
    ///
    /// 任何一步失败时整个注册回滚，不会留下没有Webhook的应用。
    async fn register_app(&self, app: &App, webhooks: &[Webhook]) -> Result<(), RepositoryError>;
    /// 查找订阅了指定事件的调用目标
    ///
    /// 只返回已启用应用下已启用的Webhook；给定 `app_identifier` 时只返回该应用的目标。
    /// 结果按Webhook创建时间排序。
    async fn find_targets_for_event(
        &self,
        event_type: WebhookEventSyncType,
        app_identifier: Option<&str>,
    ) -> Result<Vec<WebhookTarget>, RepositoryError>;
}
