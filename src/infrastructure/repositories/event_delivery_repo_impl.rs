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

use crate::domain::models::event_delivery::{
    AttemptStatus, DeliveryAttempt, EventDelivery, NewEventDelivery,
};
use crate::domain::models::webhook::WebhookEventSyncType;
use crate::domain::repositories::event_delivery_repository::{
    EventDeliveryRepository, RepositoryError,
};
use crate::infrastructure::database::entities::event_delivery;
use crate::infrastructure::database::entities::event_delivery_attempt::{
    self, SeaAttemptStatus,
};
use async_trait::async_trait;
use sea_orm::*;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// 投递记录仓库实现
#[derive(Clone)]
pub struct EventDeliveryRepoImpl {
    db: Arc<DatabaseConnection>,
}

impl EventDeliveryRepoImpl {
    /// 创建新的投递记录仓库实现
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl From<AttemptStatus> for SeaAttemptStatus {
    fn from(status: AttemptStatus) -> Self {
        match status {
            AttemptStatus::Success => SeaAttemptStatus::Success,
            AttemptStatus::Failed => SeaAttemptStatus::Failed,
        }
    }
}

impl From<SeaAttemptStatus> for AttemptStatus {
    fn from(status: SeaAttemptStatus) -> Self {
        match status {
            SeaAttemptStatus::Success => AttemptStatus::Success,
            SeaAttemptStatus::Failed => AttemptStatus::Failed,
        }
    }
}

impl TryFrom<event_delivery::Model> for EventDelivery {
    type Error = RepositoryError;

    fn try_from(model: event_delivery::Model) -> Result<Self, Self::Error> {
        let event_type = model.event_type.parse().map_err(|_| {
            RepositoryError::InvalidData(format!("unknown event type '{}'", model.event_type))
        })?;

        Ok(Self {
            id: model.id,
            event_type,
            payload: model.payload,
            webhook_id: model.webhook_id,
            app_id: model.app_id,
            target_url: model.target_url,
            created_at: model.created_at.into(),
        })
    }
}

impl From<event_delivery_attempt::Model> for DeliveryAttempt {
    fn from(model: event_delivery_attempt::Model) -> Self {
        Self {
            id: model.id,
            delivery_id: model.delivery_id,
            status: model.status.into(),
            response_status_code: model.response_status_code.map(|s| s as u16),
            response_body: model.response_body,
            duration_ms: model.duration_ms,
            created_at: model.created_at.into(),
        }
    }
}

#[async_trait]
impl EventDeliveryRepository for EventDeliveryRepoImpl {
    async fn create(&self, delivery: NewEventDelivery) -> Result<EventDelivery, RepositoryError> {
        let delivery = delivery.into_delivery();

        let active_model = event_delivery::ActiveModel {
            id: Set(delivery.id),
            event_type: Set(delivery.event_type.to_string()),
            payload: Set(delivery.payload.clone()),
            webhook_id: Set(delivery.webhook_id),
            app_id: Set(delivery.app_id),
            target_url: Set(delivery.target_url.clone()),
            created_at: Set(delivery.created_at.into()),
        };

        event_delivery::Entity::insert(active_model)
            .exec(self.db.as_ref())
            .await?;

        debug!(
            "Recorded event delivery {} ({}) for webhook {}",
            delivery.id, delivery.event_type, delivery.webhook_id
        );
        Ok(delivery)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<EventDelivery>, RepositoryError> {
        event_delivery::Entity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .map(EventDelivery::try_from)
            .transpose()
    }

    async fn list_by_event_type(
        &self,
        event_type: WebhookEventSyncType,
    ) -> Result<Vec<EventDelivery>, RepositoryError> {
        let models = event_delivery::Entity::find()
            .filter(event_delivery::Column::EventType.eq(event_type.to_string()))
            .order_by_asc(event_delivery::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        models.into_iter().map(EventDelivery::try_from).collect()
    }

    async fn record_attempt(&self, attempt: &DeliveryAttempt) -> Result<(), RepositoryError> {
        let active_model = event_delivery_attempt::ActiveModel {
            id: Set(attempt.id),
            delivery_id: Set(attempt.delivery_id),
            status: Set(attempt.status.into()),
            response_status_code: Set(attempt.response_status_code.map(|s| s as i16)),
            response_body: Set(attempt.response_body.clone()),
            duration_ms: Set(attempt.duration_ms),
            created_at: Set(attempt.created_at.into()),
        };

        event_delivery_attempt::Entity::insert(active_model)
            .exec(self.db.as_ref())
            .await?;

        Ok(())
    }

    async fn attempts_for(
        &self,
        delivery_id: Uuid,
    ) -> Result<Vec<DeliveryAttempt>, RepositoryError> {
        let models = event_delivery_attempt::Entity::find()
            .filter(event_delivery_attempt::Column::DeliveryId.eq(delivery_id))
            .order_by_asc(event_delivery_attempt::Column::CreatedAt)
            .all(self.db.as_ref())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }
}
