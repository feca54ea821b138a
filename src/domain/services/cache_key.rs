// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::models::webhook::WebhookEventSyncType;

/// 同步Webhook响应缓存键前缀
pub const CACHE_KEY_PREFIX: &str = "webhook:";

/// 生成同步Webhook响应的缓存键
///
/// 相同的（负载、目标URL、事件类型、应用ID）总是得到相同的键，
/// 任一输入不同都会得到不同的键。
///
/// # 参数
///
/// * `payload` - 序列化后的负载
/// * `target_url` - Webhook目标URL
/// * `event_type` - 事件类型
/// * `app_id` - 应用ID
pub fn generate_cache_key_for_webhook(
    payload: &str,
    target_url: &str,
    event_type: WebhookEventSyncType,
    app_id: Uuid,
) -> String {
    // Fields are newline separated. Compact JSON and validated target URLs
    // never contain a raw newline.
    let mut hasher = Sha256::new();
    hasher.update(event_type.as_str().as_bytes());
    hasher.update(b"\n");
    hasher.update(target_url.as_bytes());
    hasher.update(b"\n");
    hasher.update(app_id.as_bytes());
    hasher.update(b"\n");
    hasher.update(payload.as_bytes());

    format!("{}{}", CACHE_KEY_PREFIX, hex::encode(hasher.finalize()))
}
