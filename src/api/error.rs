//! Maps [`CoreError`] onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::errors::CoreError;

/// JSON body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub message: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Core(err) => match err {
                CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                CoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                CoreError::Conflict(_) => StatusCode::CONFLICT,
                CoreError::Forbidden(_) => StatusCode::FORBIDDEN,
                CoreError::BudgetExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                CoreError::Storage(_) | CoreError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Internal(_) => "INTERNAL_ERROR",
            ApiError::Core(err) => match err {
                CoreError::NotFound { .. } => "NOT_FOUND",
                CoreError::Validation(_) => "VALIDATION_ERROR",
                CoreError::Conflict(_) => "CONFLICT",
                CoreError::Forbidden(_) => "FORBIDDEN",
                CoreError::BudgetExceeded { .. } => "BUDGET_EXCEEDED",
                CoreError::Storage(_) => "STORAGE_ERROR",
                CoreError::Config(_) => "CONFIG_ERROR",
            },
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::Internal(_) => "InternalError",
            ApiError::Core(err) => match err {
                CoreError::NotFound { .. } => "NotFound",
                CoreError::Validation(_) => "ValidationError",
                CoreError::Conflict(_) => "Conflict",
                CoreError::Forbidden(_) => "Forbidden",
                CoreError::BudgetExceeded { .. } => "BudgetExceeded",
                CoreError::Storage(_) | CoreError::Config(_) => "InternalError",
            },
        }
    }

    fn details(&self) -> Option<Value> {
        match self {
            ApiError::Core(CoreError::BudgetExceeded {
                planned,
                spent,
                requested,
                shortfall,
            }) => Some(json!({
                "planned": planned,
                "spent": spent,
                "requested": requested,
                "shortfall": shortfall,
            })),
            ApiError::Core(CoreError::NotFound { entity, id }) => {
                Some(json!({ "entity": entity, "id": id }))
            }
            _ => None,
        }
    }

    pub fn body(&self) -> ApiErrorResponse {
        ApiErrorResponse {
            error: self.error_type().into(),
            message: self.to_string(),
            code: self.code().into(),
            details: self.details(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = self.body();
        if status.is_server_error() {
            tracing::error!(code = %body.code, "{}", body.message);
        } else {
            tracing::debug!(code = %body.code, "{}", body.message);
        }
        (status, Json(body)).into_response()
    }
}
