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

use crate::application::dto::stored_payment_method_request::{
    ListStoredPaymentMethodsRequestDto, ListStoredPaymentMethodsResponseDto,
    StoredPaymentMethodDeleteRequestDto,
};
use crate::application::use_cases::webhook_plugin::WebhookPlugin;
use crate::domain::models::payment::StoredPaymentMethodRequestDeleteResponseData;
use crate::presentation::errors::AppError;
use axum::{Extension, Json};
use std::sync::Arc;
use validator::Validate;

/// 没有应用处理删除请求时返回的消息
pub const NO_APP_HANDLES_PAYMENT_METHOD: &str = "No app handles this payment method.";

/// 列出存储的支付方式
pub async fn list_stored_payment_methods(
    Extension(plugin): Extension<Arc<WebhookPlugin>>,
    Json(payload): Json<ListStoredPaymentMethodsRequestDto>,
) -> Result<Json<ListStoredPaymentMethodsResponseDto>, AppError> {
    payload.validate()?;

    let payment_methods = plugin
        .list_stored_payment_methods(&payload.into(), Vec::new())
        .await?;

    Ok(Json(ListStoredPaymentMethodsResponseDto { payment_methods }))
}

/// 请求删除存储的支付方式
pub async fn request_delete_stored_payment_method(
    Extension(plugin): Extension<Arc<WebhookPlugin>>,
    Json(payload): Json<StoredPaymentMethodDeleteRequestDto>,
) -> Result<Json<StoredPaymentMethodRequestDeleteResponseData>, AppError> {
    payload.validate()?;

    let previous_value = StoredPaymentMethodRequestDeleteResponseData {
        success: false,
        message: Some(NO_APP_HANDLES_PAYMENT_METHOD.to_string()),
    };
    let response = plugin
        .stored_payment_method_request_delete(&payload.into(), previous_value)
        .await?;

    Ok(Json(response))
}
