// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::webhook::{App, Webhook, WebhookEventSyncType, WebhookTarget};
use crate::domain::repositories::event_delivery_repository::RepositoryError;
use crate::domain::repositories::webhook_repository::WebhookRepository;
use crate::infrastructure::database::entities::{app, webhook, webhook_event_subscription};
use async_trait::async_trait;
use sea_orm::*;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Webhook仓库实现
#[derive(Clone)]
pub struct WebhookRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl WebhookRepoImpl {
    /// 创建新的Webhook仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<app::Model> for App {
    fn from(model: app::Model) -> Self {
        Self {
            id: model.id,
            identifier: model.identifier,
            name: model.name,
            is_active: model.is_active,
            created_at: model.created_at.into(),
        }
    }
}

/// 写入Webhook及其事件订阅
async fn insert_webhook<C: ConnectionTrait>(db: &C, webhook: &Webhook) -> Result<(), DbErr> {
    let model = webhook::ActiveModel {
        id: Set(webhook.id),
        app_id: Set(webhook.app_id),
        name: Set(webhook.name.clone()),
        target_url: Set(webhook.target_url.clone()),
        subscription_query: Set(webhook.subscription_query.clone()),
        is_active: Set(webhook.is_active),
        created_at: Set(webhook.created_at.into()),
    };
    model.insert(db).await?;

    for event_type in &webhook.events {
        let subscription = webhook_event_subscription::ActiveModel {
            id: Set(Uuid::new_v4()),
            webhook_id: Set(webhook.id),
            event_type: Set(event_type.to_string()),
        };
        subscription.insert(db).await?;
    }
    Ok(())
}

#[async_trait]
impl WebhookRepository for WebhookRepoImpl {
    async fn register_app(&self, app: &App, webhooks: &[Webhook]) -> Result<(), RepositoryError> {
        let txn = self.db.begin().await?;

        let model = app::ActiveModel {
            id: Set(app.id),
            identifier: Set(app.identifier.clone()),
            name: Set(app.name.clone()),
            is_active: Set(app.is_active),
            created_at: Set(app.created_at.into()),
        };
        model.insert(&txn).await?;

        for webhook in webhooks {
            insert_webhook(&txn, webhook).await?;
        }

        // Dropping the transaction on any error above rolls everything back.
        txn.commit().await?;
        Ok(())
    }

    async fn find_targets_for_event(
        &self,
        event_type: WebhookEventSyncType,
        app_identifier: Option<&str>,
    ) -> Result<Vec<WebhookTarget>, RepositoryError> {
        let webhook_ids: Vec<Uuid> = webhook_event_subscription::Entity::find()
            .filter(webhook_event_subscription::Column::EventType.eq(event_type.to_string()))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|subscription| subscription.webhook_id)
            .collect();

        if webhook_ids.is_empty() {
            return Ok(Vec::new());
        }

        let webhooks = webhook::Entity::find()
            .filter(webhook::Column::Id.is_in(webhook_ids))
            .filter(webhook::Column::IsActive.eq(true))
            .order_by_asc(webhook::Column::CreatedAt)
            .order_by_asc(webhook::Column::Id)
            .all(self.db.as_ref())
            .await?;

        if webhooks.is_empty() {
            return Ok(Vec::new());
        }

        let mut app_query = app::Entity::find()
            .filter(app::Column::Id.is_in(webhooks.iter().map(|w| w.app_id).collect::<Vec<_>>()))
            .filter(app::Column::IsActive.eq(true));
        if let Some(identifier) = app_identifier {
            app_query = app_query.filter(app::Column::Identifier.eq(identifier));
        }

        let apps: HashMap<Uuid, App> = app_query
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|model| (model.id, App::from(model)))
            .collect();

        Ok(webhooks
            .into_iter()
            .filter_map(|webhook| {
                apps.get(&webhook.app_id).map(|app| WebhookTarget {
                    webhook_id: webhook.id,
                    target_url: webhook.target_url,
                    subscription_query: webhook.subscription_query,
                    app: app.clone(),
                })
            })
            .collect())
    }
}
