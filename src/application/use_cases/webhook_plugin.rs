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
    config::settings::Settings,
    domain::{
        models::{
            event_delivery::NewEventDelivery,
            payment::{
                payment_methods_from_response, Channel, ListStoredPaymentMethodsRequestData,
                PaymentAppId, PaymentMethodData, StoredPaymentMethodRequestDeleteData,
                StoredPaymentMethodRequestDeleteResponseData, User,
            },
            webhook::{
                WebhookEventSyncType, WebhookTarget, WEBHOOK_CACHE_DEFAULT_TIMEOUT,
                WEBHOOK_SYNC_TIMEOUT,
            },
        },
        repositories::{
            event_delivery_repository::{EventDeliveryRepository, RepositoryError},
            webhook_repository::WebhookRepository,
        },
        services::{
            cache_key::generate_cache_key_for_webhook,
            payload_builder::{build_payload, list_stored_payment_methods_payload, SyncEvent},
            sync_webhook_service::SyncWebhookService,
        },
    },
    infrastructure::cache::cache_manager::CacheManager,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// 插件错误
///
/// 只有读取Webhook配置和写入投递记录的失败会作为错误返回，
/// 其余失败都表现为类型化的响应。
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Failed to load webhook configuration: {0}")]
    Configuration(#[source] RepositoryError),
    #[error("Failed to record event delivery: {0}")]
    DeliveryRecord(#[source] RepositoryError),
}

/// 插件配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginConfig {
    /// 同步请求超时时间
    pub sync_timeout: Duration,
    /// 列表响应的缓存时间
    pub cache_ttl: Duration,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            sync_timeout: WEBHOOK_SYNC_TIMEOUT,
            cache_ttl: WEBHOOK_CACHE_DEFAULT_TIMEOUT,
        }
    }
}

impl From<&Settings> for PluginConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            sync_timeout: settings.webhook.sync_timeout(),
            cache_ttl: settings.cache.default_ttl(),
        }
    }
}

/// Webhook插件
///
/// 把存储的支付方式操作转换为对应用的同步Webhook请求：
/// 构建负载、查询缓存、记录投递、发送请求、写入或失效缓存，最后解析响应。
pub struct WebhookPlugin {
    webhook_repo: Arc<dyn WebhookRepository>,
    delivery_repo: Arc<dyn EventDeliveryRepository>,
    sync_webhook_service: Arc<dyn SyncWebhookService>,
    cache: Arc<CacheManager>,
    config: PluginConfig,
}

impl WebhookPlugin {
    pub fn new(
        webhook_repo: Arc<dyn WebhookRepository>,
        delivery_repo: Arc<dyn EventDeliveryRepository>,
        sync_webhook_service: Arc<dyn SyncWebhookService>,
        cache: Arc<CacheManager>,
        config: PluginConfig,
    ) -> Self {
        Self {
            webhook_repo,
            delivery_repo,
            sync_webhook_service,
            cache,
            config,
        }
    }

    /// 列出用户在渠道下存储的支付方式
    ///
    /// 对每个订阅了列表事件的应用先查缓存，未命中时发送同步请求，
    /// 成功的响应按配置的TTL缓存。结果为 `previous_value` 后接各应用返回的支付方式。
    pub async fn list_stored_payment_methods(
        &self,
        data: &ListStoredPaymentMethodsRequestData,
        previous_value: Vec<PaymentMethodData>,
    ) -> Result<Vec<PaymentMethodData>, PluginError> {
        let event_type = WebhookEventSyncType::ListStoredPaymentMethods;
        let targets = self
            .webhook_repo
            .find_targets_for_event(event_type, None)
            .await
            .map_err(PluginError::Configuration)?;
        if targets.is_empty() {
            return Ok(previous_value);
        }

        // The cache key always comes from the static payload, even when a
        // webhook defines its own subscription document.
        let cache_payload = match list_stored_payment_methods_payload(&data.user, &data.channel)
        {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to build list payload for cache key: {}", e);
                return Ok(previous_value);
            }
        };

        let event = SyncEvent::ListStoredPaymentMethods(data);
        let mut payment_methods = previous_value;

        for target in targets {
            let cache_key = generate_cache_key_for_webhook(
                &cache_payload,
                &target.target_url,
                event_type,
                target.app.id,
            );

            let response = match self.cache.get(&cache_key).await {
                Some(cached) => {
                    debug!(
                        "Using cached {} response for app {}",
                        event_type, target.app.identifier
                    );
                    Some(cached)
                }
                None => {
                    let response = self.request_for_target(&event, &target).await?;
                    if let Some(response) = &response {
                        self.cache
                            .set(&cache_key, response, Some(self.config.cache_ttl))
                            .await;
                    }
                    response
                }
            };

            if let Some(response) = response {
                payment_methods.extend(payment_methods_from_response(&response, &target.app));
            }
        }

        Ok(payment_methods)
    }

    /// 请求应用删除存储的支付方式
    ///
    /// 支付方式ID无法解析或所属应用没有删除Webhook时原样返回 `previous_value`。
    /// 删除请求从不使用缓存；收到响应后失效该应用的列表缓存。
    pub async fn stored_payment_method_request_delete(
        &self,
        data: &StoredPaymentMethodRequestDeleteData,
        previous_value: StoredPaymentMethodRequestDeleteResponseData,
    ) -> Result<StoredPaymentMethodRequestDeleteResponseData, PluginError> {
        let payment_app_id: PaymentAppId = match data.payment_method_id.parse() {
            Ok(id) => id,
            Err(e) => {
                debug!(
                    "Ignoring delete request for '{}': {}",
                    data.payment_method_id, e
                );
                return Ok(previous_value);
            }
        };

        let event_type = WebhookEventSyncType::StoredPaymentMethodDeleteRequested;
        let targets = self
            .webhook_repo
            .find_targets_for_event(event_type, Some(&payment_app_id.app_identifier))
            .await
            .map_err(PluginError::Configuration)?;
        let Some(target) = targets.into_iter().next() else {
            debug!(
                "App {} has no {} webhook",
                payment_app_id.app_identifier, event_type
            );
            return Ok(previous_value);
        };

        let event = SyncEvent::StoredPaymentMethodDeleteRequested {
            data,
            external_id: &payment_app_id.external_id,
        };
        let Some(response) = self.request_for_target(&event, &target).await? else {
            return Ok(StoredPaymentMethodRequestDeleteResponseData::failed_to_deliver());
        };

        self.invalidate_cache_for_stored_payment_methods(
            &data.user,
            &data.channel,
            &target.app.identifier,
        )
        .await?;

        Ok(StoredPaymentMethodRequestDeleteResponseData::from_response(
            &response,
        ))
    }

    /// 删除应用在 (用户, 渠道) 下的列表缓存
    ///
    /// 对应用的每个列表Webhook重新计算列表缓存键并删除。
    pub async fn invalidate_cache_for_stored_payment_methods(
        &self,
        user: &User,
        channel: &Channel,
        app_identifier: &str,
    ) -> Result<(), PluginError> {
        let event_type = WebhookEventSyncType::ListStoredPaymentMethods;
        let targets = self
            .webhook_repo
            .find_targets_for_event(event_type, Some(app_identifier))
            .await
            .map_err(PluginError::Configuration)?;
        if targets.is_empty() {
            return Ok(());
        }

        let payload = match list_stored_payment_methods_payload(user, channel) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to build list payload for cache invalidation: {}", e);
                return Ok(());
            }
        };

        for target in targets {
            let cache_key = generate_cache_key_for_webhook(
                &payload,
                &target.target_url,
                event_type,
                target.app.id,
            );
            self.cache.delete(&cache_key).await;
            metrics::counter!("sync_webhook_cache_invalidations_total").increment(1);
            info!(
                "Invalidated stored payment methods cache for app {}",
                app_identifier
            );
        }

        Ok(())
    }

    /// 记录投递并发送同步请求
    ///
    /// 投递记录总是在发送之前写入；写入失败时不会发送请求。
    pub async fn trigger_webhook_sync(
        &self,
        event_type: WebhookEventSyncType,
        payload: String,
        target: &WebhookTarget,
    ) -> Result<Option<Value>, PluginError> {
        let delivery = self
            .delivery_repo
            .create(NewEventDelivery::for_target(event_type, payload, target))
            .await
            .map_err(PluginError::DeliveryRecord)?;

        debug!(
            "Sending {} to app {} (delivery {})",
            event_type, target.app.identifier, delivery.id
        );

        Ok(self
            .sync_webhook_service
            .send_webhook_request_sync(&delivery, self.config.sync_timeout)
            .await)
    }

    async fn request_for_target(
        &self,
        event: &SyncEvent<'_>,
        target: &WebhookTarget,
    ) -> Result<Option<Value>, PluginError> {
        let payload = match build_payload(event, target.subscription_query.as_deref()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(
                    "Skipping {} webhook {} of app {}: {}",
                    event.event_type(),
                    target.webhook_id,
                    target.app.identifier,
                    e
                );
                return Ok(None);
            }
        };

        self.trigger_webhook_sync(event.event_type(), payload, target)
            .await
    }
}

#[cfg(test)]
#[path = "webhook_plugin_test.rs"]
mod tests;
