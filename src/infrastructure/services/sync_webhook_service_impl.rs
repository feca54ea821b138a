// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::domain::models::event_delivery::{AttemptStatus, DeliveryAttempt, EventDelivery};
use crate::domain::repositories::event_delivery_repository::EventDeliveryRepository;
use crate::domain::services::sync_webhook_service::SyncWebhookService;
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

type HmacSha256 = Hmac<Sha256>;

/// 投递尝试记录中保存的响应体默认上限
pub const DEFAULT_MAX_RESPONSE_BODY_BYTES: usize = 4096;

/// 接受的响应体默认上限，超过时按格式错误处理
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// 同步Webhook服务实现
///
/// 通过HTTP POST发送投递记录中的负载，并把每次尝试的结果追加到投递存储。
pub struct SyncWebhookServiceImpl {
    /// HTTP 客户端
    client: reqwest::Client,
    /// 签名密钥
    secret: String,
    /// 投递记录仓库
    delivery_repo: Arc<dyn EventDeliveryRepository>,
    /// 记录的响应体上限（字节）
    max_response_body_bytes: usize,
    /// 接受的响应体上限（字节）
    max_response_bytes: usize,
}

/// 一次发送的结果
struct Outcome {
    status: AttemptStatus,
    status_code: Option<u16>,
    body: Option<String>,
    response: Option<Value>,
}

impl Outcome {
    fn failed(status_code: Option<u16>, body: Option<String>) -> Self {
        Self {
            status: AttemptStatus::Failed,
            status_code,
            body,
            response: None,
        }
    }
}

impl SyncWebhookServiceImpl {
    /// 创建新的同步Webhook服务实现
    pub fn new(secret: String, delivery_repo: Arc<dyn EventDeliveryRepository>) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret,
            delivery_repo,
            max_response_body_bytes: DEFAULT_MAX_RESPONSE_BODY_BYTES,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    /// 设置记录的响应体上限
    pub fn with_max_response_body_bytes(mut self, max_bytes: usize) -> Self {
        self.max_response_body_bytes = max_bytes;
        self
    }

    /// 设置接受的响应体上限
    pub fn with_max_response_bytes(mut self, max_bytes: usize) -> Self {
        self.max_response_bytes = max_bytes;
        self
    }

    /// 为负载生成签名
    fn generate_signature(&self, payload: &str, timestamp: i64) -> Option<String> {
        let message = format!("{}.{}", timestamp, payload);
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes()).ok()?;
        mac.update(message.as_bytes());
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    async fn send(&self, delivery: &EventDelivery, timeout: Duration) -> Outcome {
        let timestamp = chrono::Utc::now().timestamp();

        let mut request = self
            .client
            .post(&delivery.target_url)
            .timeout(timeout)
            .header("Content-Type", "application/json")
            .header("X-Synchook-Event", delivery.event_type.as_str())
            .header("X-Synchook-Delivery-Id", delivery.id.to_string())
            .header("X-Synchook-Timestamp", timestamp.to_string());
        match self.generate_signature(&delivery.payload, timestamp) {
            Some(signature) => request = request.header("X-Synchook-Signature", signature),
            None => warn!("Could not sign delivery {}", delivery.id),
        }

        let response = match request.body(delivery.payload.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(
                    "Sync webhook request to {} failed (delivery {}): {}",
                    delivery.target_url, delivery.id, e
                );
                return Outcome::failed(None, Some(e.to_string()));
            }
        };

        let status = response.status();
        let body = match read_body(response, self.max_response_bytes).await {
            Ok(Body::Complete(body)) => body,
            Ok(Body::TooLarge(prefix)) => {
                warn!(
                    "Sync webhook {} response exceeds {} bytes (delivery {})",
                    delivery.target_url, self.max_response_bytes, delivery.id
                );
                return Outcome::failed(
                    Some(status.as_u16()),
                    Some(String::from_utf8_lossy(&prefix).into_owned()),
                );
            }
            Err(e) => {
                warn!(
                    "Failed to read sync webhook response from {}: {}",
                    delivery.target_url, e
                );
                return Outcome::failed(Some(status.as_u16()), None);
            }
        };
        let text = String::from_utf8_lossy(&body).into_owned();

        if !status.is_success() {
            warn!(
                "Sync webhook {} responded with status {} (delivery {})",
                delivery.target_url, status, delivery.id
            );
            return Outcome::failed(Some(status.as_u16()), Some(text));
        }

        match serde_json::from_slice::<Value>(&body) {
            Ok(value) => Outcome {
                status: AttemptStatus::Success,
                status_code: Some(status.as_u16()),
                body: Some(text),
                response: Some(value),
            },
            Err(e) => {
                warn!(
                    "Sync webhook {} returned a malformed JSON body (delivery {}): {}",
                    delivery.target_url, delivery.id, e
                );
                Outcome::failed(Some(status.as_u16()), Some(text))
            }
        }
    }
}

/// 读取到的响应体
enum Body {
    Complete(Vec<u8>),
    /// 超过上限，只保留已读取的部分
    TooLarge(Vec<u8>),
}

/// 分块读取响应体，累计超过 `limit` 字节时停止读取
async fn read_body(mut response: reqwest::Response, limit: usize) -> reqwest::Result<Body> {
    if response
        .content_length()
        .is_some_and(|length| length > limit as u64)
    {
        return Ok(Body::TooLarge(Vec::new()));
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > limit {
            let remaining = limit - body.len();
            body.extend_from_slice(&chunk[..remaining]);
            return Ok(Body::TooLarge(body));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(Body::Complete(body))
}

/// 按字节上限截断，保持UTF-8字符边界
fn truncate_body(mut body: String, max_bytes: usize) -> String {
    if body.len() > max_bytes {
        let mut end = max_bytes;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}

#[async_trait]
impl SyncWebhookService for SyncWebhookServiceImpl {
    async fn send_webhook_request_sync(
        &self,
        delivery: &EventDelivery,
        timeout: Duration,
    ) -> Option<Value> {
        let started = Instant::now();
        let outcome = self.send(delivery, timeout).await;
        let elapsed = started.elapsed();

        metrics::counter!(
            "sync_webhook_dispatch_total",
            "event" => delivery.event_type.as_str(),
            "status" => outcome.status.to_string()
        )
        .increment(1);
        metrics::histogram!(
            "sync_webhook_dispatch_duration_seconds",
            "event" => delivery.event_type.as_str()
        )
        .record(elapsed.as_secs_f64());

        debug!(
            "Sync webhook delivery {} finished with {} in {:?}",
            delivery.id, outcome.status, elapsed
        );

        let attempt = DeliveryAttempt::new(
            delivery.id,
            outcome.status,
            outcome.status_code,
            outcome
                .body
                .map(|body| truncate_body(body, self.max_response_body_bytes)),
            elapsed.as_millis() as i64,
        );
        if let Err(e) = self.delivery_repo.record_attempt(&attempt).await {
            error!(
                "Failed to record attempt for delivery {}: {}",
                delivery.id, e
            );
        }

        outcome.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::event_delivery::NewEventDelivery;
    use crate::domain::models::webhook::WebhookEventSyncType;
    use crate::domain::repositories::event_delivery_repository::RepositoryError;
    use mockall::mock;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{body_string, header, header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    mock! {
        pub DeliveryRepo {}
        #[async_trait]
        impl EventDeliveryRepository for DeliveryRepo {
            async fn create(&self, delivery: NewEventDelivery) -> Result<EventDelivery, RepositoryError>;
            async fn find_by_id(&self, id: Uuid) -> Result<Option<EventDelivery>, RepositoryError>;
            async fn list_by_event_type(&self, event_type: WebhookEventSyncType) -> Result<Vec<EventDelivery>, RepositoryError>;
            async fn record_attempt(&self, attempt: &DeliveryAttempt) -> Result<(), RepositoryError>;
            async fn attempts_for(&self, delivery_id: Uuid) -> Result<Vec<DeliveryAttempt>, RepositoryError>;
        }
    }

    const PAYLOAD: &str = r#"{"user_id":"VXNlcjox","channel_slug":"main"}"#;

    fn delivery(target_url: String) -> EventDelivery {
        NewEventDelivery {
            event_type: WebhookEventSyncType::ListStoredPaymentMethods,
            payload: PAYLOAD.to_string(),
            webhook_id: Uuid::new_v4(),
            app_id: Uuid::new_v4(),
            target_url,
        }
        .into_delivery()
    }

    fn repo_expecting(status: AttemptStatus, code: Option<u16>) -> Arc<MockDeliveryRepo> {
        let mut repo = MockDeliveryRepo::new();
        repo.expect_record_attempt()
            .withf(move |attempt| attempt.status == status && attempt.response_status_code == code)
            .times(1)
            .returning(|_| Ok(()));
        Arc::new(repo)
    }

    #[tokio::test]
    async fn test_successful_request_returns_parsed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .and(header("Content-Type", "application/json"))
            .and(header("X-Synchook-Event", "list_stored_payment_methods"))
            .and(header_exists("X-Synchook-Signature"))
            .and(header_exists("X-Synchook-Timestamp"))
            .and(body_string(PAYLOAD))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"paymentMethods": []})))
            .expect(1)
            .mount(&server)
            .await;

        let service = SyncWebhookServiceImpl::new(
            "secret".to_string(),
            repo_expecting(AttemptStatus::Success, Some(200)),
        );
        let delivery = delivery(format!("{}/webhook", server.uri()));

        let response = service
            .send_webhook_request_sync(&delivery, Duration::from_secs(5))
            .await;
        assert_eq!(response, Some(json!({"paymentMethods": []})));
    }

    #[tokio::test]
    async fn test_non_success_status_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("{}"))
            .mount(&server)
            .await;

        let service = SyncWebhookServiceImpl::new(
            "secret".to_string(),
            repo_expecting(AttemptStatus::Failed, Some(500)),
        );
        let response = service
            .send_webhook_request_sync(&delivery(server.uri()), Duration::from_secs(5))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let service = SyncWebhookServiceImpl::new(
            "secret".to_string(),
            repo_expecting(AttemptStatus::Failed, Some(200)),
        );
        let response = service
            .send_webhook_request_sync(&delivery(server.uri()), Duration::from_secs(5))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_oversized_body_returns_none() {
        let server = MockServer::start().await;
        let methods: Vec<_> = (0..100)
            .map(|i| json!({"id": format!("pm_{}", i), "type": "Credit Card"}))
            .collect();
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"paymentMethods": methods})))
            .mount(&server)
            .await;

        let mut repo = MockDeliveryRepo::new();
        repo.expect_record_attempt()
            .withf(|attempt| {
                attempt.status == AttemptStatus::Failed
                    && attempt.response_status_code == Some(200)
                    && attempt.response_body.as_deref().map_or(0, str::len) <= 256
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = SyncWebhookServiceImpl::new("secret".to_string(), Arc::new(repo))
            .with_max_response_bytes(256);
        let response = service
            .send_webhook_request_sync(&delivery(server.uri()), Duration::from_secs(5))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_body_at_limit_is_accepted() {
        let server = MockServer::start().await;
        let body = r#"{"success":true}"#;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let service = SyncWebhookServiceImpl::new(
            "secret".to_string(),
            repo_expecting(AttemptStatus::Success, Some(200)),
        )
        .with_max_response_bytes(body.len());
        let response = service
            .send_webhook_request_sync(&delivery(server.uri()), Duration::from_secs(5))
            .await;
        assert_eq!(response, Some(json!({"success": true})));
    }

    #[tokio::test]
    async fn test_timeout_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"paymentMethods": []}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let service = SyncWebhookServiceImpl::new(
            "secret".to_string(),
            repo_expecting(AttemptStatus::Failed, None),
        );
        let response = service
            .send_webhook_request_sync(&delivery(server.uri()), Duration::from_millis(50))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_target_returns_none() {
        let service = SyncWebhookServiceImpl::new(
            "secret".to_string(),
            repo_expecting(AttemptStatus::Failed, None),
        );
        let response = service
            .send_webhook_request_sync(
                &delivery("http://127.0.0.1:9/unreachable".to_string()),
                Duration::from_secs(1),
            )
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn test_attempt_persistence_failure_is_not_fatal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .mount(&server)
            .await;

        let mut repo = MockDeliveryRepo::new();
        repo.expect_record_attempt()
            .times(1)
            .returning(|_| Err(RepositoryError::NotFound));

        let service = SyncWebhookServiceImpl::new("secret".to_string(), Arc::new(repo));
        let response = service
            .send_webhook_request_sync(&delivery(server.uri()), Duration::from_secs(5))
            .await;
        assert_eq!(response, Some(json!({"success": true})));
    }

    #[test]
    fn test_signature_is_hmac_of_timestamp_and_payload() {
        let service = SyncWebhookServiceImpl::new(
            "secret".to_string(),
            Arc::new(MockDeliveryRepo::new()),
        );
        let signature = service.generate_signature(PAYLOAD, 1_700_000_000).unwrap();

        let mut mac = HmacSha256::new_from_slice(b"secret").unwrap();
        mac.update(format!("1700000000.{}", PAYLOAD).as_bytes());
        assert_eq!(signature, hex::encode(mac.finalize().into_bytes()));
        assert_ne!(
            signature,
            service.generate_signature(PAYLOAD, 1_700_000_001).unwrap()
        );
    }

    #[test]
    fn test_truncate_body_respects_char_boundaries() {
        assert_eq!(truncate_body("abcdef".to_string(), 3), "abc");
        assert_eq!(truncate_body("ab".to_string(), 3), "ab");
        // "é" is two bytes; cutting in the middle backs off to the boundary.
        assert_eq!(truncate_body("aé".to_string(), 2), "a");
    }
}
