// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::domain::models::webhook::{App, Webhook, WebhookEventSyncType};

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct RegisterAppRequestDto {
    /// 应用标识，作为支付方式ID的命名空间，不能包含冒号
    #[validate(length(min = 1, max = 256))]
    pub identifier: String,
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(nested)]
    #[serde(default)]
    pub webhooks: Vec<WebhookRequestDto>,
}

#[derive(Debug, Deserialize, Serialize, Validate, Clone)]
pub struct WebhookRequestDto {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(url)]
    pub target_url: String,
    #[validate(length(min = 1))]
    pub events: Vec<WebhookEventSyncType>,
    pub subscription_query: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RegisteredWebhookDto {
    pub id: Uuid,
    pub name: String,
    pub target_url: String,
    pub events: Vec<WebhookEventSyncType>,
    pub is_active: bool,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RegisteredAppDto {
    pub id: Uuid,
    pub identifier: String,
    pub name: String,
    pub webhooks: Vec<RegisteredWebhookDto>,
}

impl From<Webhook> for RegisteredWebhookDto {
    fn from(webhook: Webhook) -> Self {
        Self {
            id: webhook.id,
            name: webhook.name,
            target_url: webhook.target_url,
            events: webhook.events,
            is_active: webhook.is_active,
        }
    }
}

impl RegisteredAppDto {
    pub fn new(app: App, webhooks: Vec<Webhook>) -> Self {
        Self {
            id: app.id,
            identifier: app.identifier,
            name: app.name,
            webhooks: webhooks.into_iter().map(Into::into).collect(),
        }
    }
}
