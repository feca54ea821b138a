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

use crate::{
    application::dto::app_registration::{RegisterAppRequestDto, RegisteredAppDto},
    domain::{
        models::webhook::{App, Webhook},
        repositories::{
            event_delivery_repository::RepositoryError, webhook_repository::WebhookRepository,
        },
        subscription::{parse_document, SubscriptionError},
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use url::Url;
use validator::Validate;

#[derive(Error, Debug)]
pub enum RegisterAppError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Invalid subscription query for webhook '{webhook}': {source}")]
    InvalidSubscription {
        webhook: String,
        #[source]
        source: SubscriptionError,
    },
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// 注册应用及其Webhook
pub struct RegisterAppUseCase {
    webhook_repo: Arc<dyn WebhookRepository>,
}

impl RegisterAppUseCase {
    pub fn new(webhook_repo: Arc<dyn WebhookRepository>) -> Self {
        Self { webhook_repo }
    }

    pub async fn execute(
        &self,
        request: RegisterAppRequestDto,
    ) -> Result<RegisteredAppDto, RegisterAppError> {
        validate(&request)?;

        let app = App::new(request.identifier, request.name);
        let webhooks: Vec<Webhook> = request
            .webhooks
            .into_iter()
            .map(|dto| {
                let mut webhook = Webhook::new(app.id, dto.name, dto.target_url, dto.events);
                webhook.subscription_query = dto.subscription_query;
                webhook.is_active = dto.is_active;
                webhook
            })
            .collect();

        self.webhook_repo.register_app(&app, &webhooks).await?;

        info!(
            "Registered app {} with {} webhook(s)",
            app.identifier,
            webhooks.len()
        );
        Ok(RegisteredAppDto::new(app, webhooks))
    }
}

fn validate(request: &RegisterAppRequestDto) -> Result<(), RegisterAppError> {
    request
        .validate()
        .map_err(|e| RegisterAppError::Validation(e.to_string()))?;

    if request.identifier.contains(':') {
        return Err(RegisterAppError::Validation(
            "identifier: must not contain ':'".to_string(),
        ));
    }

    for webhook in &request.webhooks {
        let url = Url::parse(&webhook.target_url)
            .map_err(|e| RegisterAppError::Validation(format!("target_url: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RegisterAppError::Validation(format!(
                "target_url: unsupported scheme '{}'",
                url.scheme()
            )));
        }

        if let Some(query) = &webhook.subscription_query {
            parse_document(query).map_err(|source| RegisterAppError::InvalidSubscription {
                webhook: webhook.name.clone(),
                source,
            })?;
        }
    }

    Ok(())
}
