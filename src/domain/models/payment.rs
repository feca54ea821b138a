// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use super::webhook::App;

/// 应用命名空间前缀
pub const PAYMENT_APP_ID_PREFIX: &str = "app";

/// 删除请求无法送达时返回给调用方的消息
pub const FAILED_TO_DELIVER_MESSAGE: &str = "Failed to delivery request.";

/// 发起操作的用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// 用户主键
    pub id: i64,
    pub email: String,
}

/// 销售渠道
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// 渠道主键
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub currency_code: String,
}

/// 列出存储的支付方式的请求数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListStoredPaymentMethodsRequestData {
    pub user: User,
    pub channel: Channel,
}

/// 删除存储的支付方式的请求数据
///
/// `payment_method_id` 带有应用命名空间，格式见 [`PaymentAppId`]。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPaymentMethodRequestDeleteData {
    pub user: User,
    pub payment_method_id: String,
    pub channel: Channel,
}

/// 删除存储的支付方式的响应数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPaymentMethodRequestDeleteResponseData {
    pub success: bool,
    pub message: Option<String>,
}

impl StoredPaymentMethodRequestDeleteResponseData {
    /// 请求未能送达时的固定失败响应
    pub fn failed_to_deliver() -> Self {
        Self {
            success: false,
            message: Some(FAILED_TO_DELIVER_MESSAGE.to_string()),
        }
    }

    /// 将应用返回的响应体转换为类型化响应
    ///
    /// `success` 缺失或不是布尔值时视为失败。
    pub fn from_response(response: &Value) -> Self {
        let success = response
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let message = response
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        Self { success, message }
    }
}

/// 支付方式ID格式错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentAppIdError {
    #[error("payment method id must start with '{PAYMENT_APP_ID_PREFIX}:'")]
    MissingPrefix,
    #[error("payment method id is missing the app identifier")]
    MissingAppIdentifier,
    #[error("payment method id is missing the external id")]
    MissingExternalId,
}

/// 带应用命名空间的支付方式ID
///
/// 格式为 `app:<应用标识>:<应用内部ID>`。应用内部ID可以包含冒号。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaymentAppId {
    pub app_identifier: String,
    pub external_id: String,
}

impl PaymentAppId {
    pub fn new(app: &App, external_id: impl Into<String>) -> Self {
        Self {
            app_identifier: app.identifier.clone(),
            external_id: external_id.into(),
        }
    }
}

impl fmt::Display for PaymentAppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            PAYMENT_APP_ID_PREFIX, self.app_identifier, self.external_id
        )
    }
}

impl FromStr for PaymentAppId {
    type Err = PaymentAppIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        if parts.next() != Some(PAYMENT_APP_ID_PREFIX) {
            return Err(PaymentAppIdError::MissingPrefix);
        }
        let app_identifier = match parts.next() {
            Some(identifier) if !identifier.is_empty() => identifier,
            _ => return Err(PaymentAppIdError::MissingAppIdentifier),
        };
        let external_id = match parts.next() {
            Some(external_id) if !external_id.is_empty() => external_id,
            _ => return Err(PaymentAppIdError::MissingExternalId),
        };
        Ok(Self {
            app_identifier: app_identifier.to_string(),
            external_id: external_id.to_string(),
        })
    }
}

/// 令牌化支付流程
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenizedPaymentFlow {
    Interactive,
}

/// 信用卡信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardInfo {
    pub brand: String,
    pub last_digits: String,
    pub exp_month: u32,
    pub exp_year: u32,
    pub first_digits: Option<String>,
}

/// 存储的支付方式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodData {
    /// 带应用命名空间的ID
    pub id: String,
    /// 应用内部ID
    pub external_id: String,
    pub supported_payment_flows: Vec<TokenizedPaymentFlow>,
    #[serde(rename = "type")]
    pub type_: String,
    pub name: Option<String>,
    pub credit_card_info: Option<CreditCardInfo>,
    pub data: Option<Value>,
}

/// 应用返回的单个支付方式
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentMethodPayload {
    id: String,
    #[serde(default)]
    supported_payment_flows: Vec<TokenizedPaymentFlow>,
    #[serde(rename = "type")]
    type_: String,
    name: Option<String>,
    credit_card_info: Option<CreditCardInfo>,
    data: Option<Value>,
}

/// 解析应用对列表请求的响应
///
/// 响应格式为 `{"paymentMethods": [...]}`，格式错误的条目会被跳过。
pub fn payment_methods_from_response(response: &Value, app: &App) -> Vec<PaymentMethodData> {
    let Some(items) = response.get("paymentMethods").and_then(Value::as_array) else {
        warn!(
            "App {} returned a list response without paymentMethods",
            app.identifier
        );
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            match serde_json::from_value::<PaymentMethodPayload>(item.clone()) {
                Ok(payload) => Some(PaymentMethodData {
                    id: PaymentAppId::new(app, payload.id.clone()).to_string(),
                    external_id: payload.id,
                    supported_payment_flows: payload.supported_payment_flows,
                    type_: payload.type_,
                    name: payload.name,
                    credit_card_info: payload.credit_card_info,
                    data: payload.data,
                }),
                Err(e) => {
                    warn!(
                        "Skipping malformed payment method from app {}: {}",
                        app.identifier, e
                    );
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn app() -> App {
        App::new("saleor.app.payment", "Payment App")
    }

    #[test]
    fn test_payment_app_id_format_and_parse() {
        let id = PaymentAppId::new(&app(), "123");
        assert_eq!(id.to_string(), "app:saleor.app.payment:123");

        let parsed: PaymentAppId = "app:saleor.app.payment:123".parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_payment_app_id_keeps_colons_in_external_id() {
        let parsed: PaymentAppId = "app:stripe:pm:abc:1".parse().unwrap();
        assert_eq!(parsed.app_identifier, "stripe");
        assert_eq!(parsed.external_id, "pm:abc:1");
    }

    #[test]
    fn test_payment_app_id_rejects_malformed_values() {
        assert_eq!(
            "123".parse::<PaymentAppId>(),
            Err(PaymentAppIdError::MissingPrefix)
        );
        assert_eq!(
            "app::123".parse::<PaymentAppId>(),
            Err(PaymentAppIdError::MissingAppIdentifier)
        );
        assert_eq!(
            "app:stripe".parse::<PaymentAppId>(),
            Err(PaymentAppIdError::MissingExternalId)
        );
        assert_eq!(
            "app:stripe:".parse::<PaymentAppId>(),
            Err(PaymentAppIdError::MissingExternalId)
        );
    }

    #[test]
    fn test_delete_response_from_webhook_body() {
        let response = json!({"success": true, "message": "Payment method deleted successfully"});
        assert_eq!(
            StoredPaymentMethodRequestDeleteResponseData::from_response(&response),
            StoredPaymentMethodRequestDeleteResponseData {
                success: true,
                message: Some("Payment method deleted successfully".to_string()),
            }
        );

        let response = json!({"message": "nope"});
        let parsed = StoredPaymentMethodRequestDeleteResponseData::from_response(&response);
        assert!(!parsed.success);
        assert_eq!(parsed.message.as_deref(), Some("nope"));
    }

    #[test]
    fn test_payment_methods_from_response_namespaces_ids() {
        let response = json!({
            "paymentMethods": [
                {
                    "id": "pm_1",
                    "supportedPaymentFlows": ["INTERACTIVE"],
                    "type": "Credit Card",
                    "creditCardInfo": {
                        "brand": "visa",
                        "lastDigits": "4242",
                        "expMonth": 12,
                        "expYear": 2030,
                        "firstDigits": null
                    },
                    "name": "Visa",
                    "data": {"default": true}
                },
                {"type": "missing id"}
            ]
        });

        let methods = payment_methods_from_response(&response, &app());
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].id, "app:saleor.app.payment:pm_1");
        assert_eq!(methods[0].external_id, "pm_1");
        assert_eq!(
            methods[0].supported_payment_flows,
            vec![TokenizedPaymentFlow::Interactive]
        );
        assert_eq!(
            methods[0].credit_card_info.as_ref().map(|c| c.last_digits.as_str()),
            Some("4242")
        );
    }

    #[test]
    fn test_payment_methods_from_response_without_list() {
        assert!(payment_methods_from_response(&json!({"foo": 1}), &app()).is_empty());
        assert!(payment_methods_from_response(&json!({"paymentMethods": []}), &app()).is_empty());
    }
}
