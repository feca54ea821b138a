// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::SqlErr;
use serde_json::json;
use tracing::error;

use crate::application::use_cases::register_app::RegisterAppError;
use crate::application::use_cases::webhook_plugin::PluginError;
use crate::domain::repositories::event_delivery_repository::RepositoryError;

/// 应用错误类型
///
/// 封装所有可能的应用层错误，提供统一的错误处理接口
#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<validator::ValidationErrors>().is_some() {
            return StatusCode::BAD_REQUEST;
        }

        if let Some(err) = self.0.downcast_ref::<RegisterAppError>() {
            return match err {
                RegisterAppError::Validation(_) | RegisterAppError::InvalidSubscription { .. } => {
                    StatusCode::BAD_REQUEST
                }
                RegisterAppError::Repository(repo_err) => repository_status(repo_err),
            };
        }

        if let Some(err) = self.0.downcast_ref::<PluginError>() {
            return match err {
                PluginError::Configuration(repo_err) | PluginError::DeliveryRecord(repo_err) => {
                    repository_status(repo_err)
                }
            };
        }

        match self.0.downcast_ref::<RepositoryError>() {
            Some(repo_err) => repository_status(repo_err),
            None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn repository_status(err: &RepositoryError) -> StatusCode {
    match err {
        RepositoryError::NotFound => StatusCode::NOT_FOUND,
        RepositoryError::Database(db_err) => match db_err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
        RepositoryError::InvalidData(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = self.0.to_string();

        if status.is_server_error() {
            error!("Request failed: {:#}", self.0);
        }

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
