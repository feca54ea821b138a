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

use crate::application::dto::app_registration::{RegisterAppRequestDto, RegisteredAppDto};
use crate::application::use_cases::register_app::RegisterAppUseCase;
use crate::domain::repositories::webhook_repository::WebhookRepository;
use crate::presentation::errors::AppError;
use axum::{http::StatusCode, Extension, Json};
use std::sync::Arc;

/// 注册应用及其Webhook
pub async fn register_app(
    Extension(repo): Extension<Arc<dyn WebhookRepository>>,
    Json(payload): Json<RegisterAppRequestDto>,
) -> Result<(StatusCode, Json<RegisteredAppDto>), AppError> {
    let use_case = RegisterAppUseCase::new(repo);
    let app = use_case.execute(payload).await?;
    Ok((StatusCode::CREATED, Json(app)))
}
