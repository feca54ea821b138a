// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::Serialize;
use thiserror::Error;

use crate::domain::models::payment::{
    Channel, ListStoredPaymentMethodsRequestData, StoredPaymentMethodRequestDeleteData, User,
};
use crate::domain::models::webhook::WebhookEventSyncType;
use crate::domain::subscription::{self, SourceObject, SubscriptionError};
use crate::utils::global_id::to_global_id;

/// 负载构建错误
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid subscription query: {0}")]
    Subscription(#[from] SubscriptionError),
}

/// 同步事件
///
/// 同时提供静态负载和供订阅文档查询的事件对象。
#[derive(Debug, Clone, Copy)]
pub enum SyncEvent<'a> {
    ListStoredPaymentMethods(&'a ListStoredPaymentMethodsRequestData),
    StoredPaymentMethodDeleteRequested {
        data: &'a StoredPaymentMethodRequestDeleteData,
        /// 去掉应用命名空间后的支付方式ID
        external_id: &'a str,
    },
}

#[derive(Serialize)]
struct ListStoredPaymentMethodsPayload<'a> {
    user_id: String,
    channel_slug: &'a str,
}

#[derive(Serialize)]
struct StoredPaymentMethodDeletePayload<'a> {
    payment_method_id: &'a str,
    user_id: String,
    channel_slug: &'a str,
}

impl SyncEvent<'_> {
    pub fn event_type(&self) -> WebhookEventSyncType {
        match self {
            SyncEvent::ListStoredPaymentMethods(_) => WebhookEventSyncType::ListStoredPaymentMethods,
            SyncEvent::StoredPaymentMethodDeleteRequested { .. } => {
                WebhookEventSyncType::StoredPaymentMethodDeleteRequested
            }
        }
    }

    /// 静态负载：固定字段集合，按固定顺序序列化
    pub fn static_payload(&self) -> Result<String, PayloadError> {
        let payload = match self {
            SyncEvent::ListStoredPaymentMethods(data) => {
                list_stored_payment_methods_payload(&data.user, &data.channel)?
            }
            SyncEvent::StoredPaymentMethodDeleteRequested { data, external_id } => {
                serde_json::to_string(&StoredPaymentMethodDeletePayload {
                    payment_method_id: *external_id,
                    user_id: to_global_id("User", data.user.id),
                    channel_slug: &data.channel.slug,
                })?
            }
        };
        Ok(payload)
    }

    /// 供订阅文档查询的事件对象
    pub fn source(&self) -> SourceObject {
        match self {
            SyncEvent::ListStoredPaymentMethods(data) => {
                SourceObject::new(self.event_type().graphql_type_name())
                    .field("user", user_source(&data.user))
                    .field("channel", channel_source(&data.channel))
            }
            SyncEvent::StoredPaymentMethodDeleteRequested { data, external_id } => {
                SourceObject::new(self.event_type().graphql_type_name())
                    .field("user", user_source(&data.user))
                    .field("paymentMethodId", *external_id)
                    .field("channel", channel_source(&data.channel))
            }
        }
    }
}

/// 列表操作的静态负载
///
/// 列表操作的缓存键总是由它计算，删除操作失效缓存时也用它重新计算同一个键。
pub fn list_stored_payment_methods_payload(
    user: &User,
    channel: &Channel,
) -> Result<String, PayloadError> {
    Ok(serde_json::to_string(&ListStoredPaymentMethodsPayload {
        user_id: to_global_id("User", user.id),
        channel_slug: &channel.slug,
    })?)
}

/// 构建请求负载
///
/// 配置了订阅文档时返回文档在事件对象上的投影，否则返回静态负载。
pub fn build_payload(
    event: &SyncEvent<'_>,
    subscription_query: Option<&str>,
) -> Result<String, PayloadError> {
    match subscription_query {
        Some(query) => {
            let document = subscription::parse_document(query)?;
            let payload = subscription::evaluate(&document, &event.source())?;
            Ok(serde_json::to_string(&payload)?)
        }
        None => event.static_payload(),
    }
}

fn user_source(user: &User) -> SourceObject {
    SourceObject::new("User")
        .field("id", to_global_id("User", user.id))
        .field("email", user.email.as_str())
}

fn channel_source(channel: &Channel) -> SourceObject {
    SourceObject::new("Channel")
        .field("id", to_global_id("Channel", channel.id))
        .field("slug", channel.slug.as_str())
        .field("name", channel.name.as_str())
        .field("currencyCode", channel.currency_code.as_str())
}
