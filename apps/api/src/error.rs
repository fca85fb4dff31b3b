//! # API Error Types and Response Envelope
//!
//! Every JSON response has the same outer shape:
//!
//! ```json
//! { "success": true,  "data": { ... } }
//! { "success": false, "error": { "code": "NOT_FOUND", "message": "Order not found: o-1" } }
//! ```
//!
//! | Variant        | HTTP | code               |
//! |----------------|------|--------------------|
//! | Unauthorized   | 401  | `UNAUTHORIZED`     |
//! | Forbidden      | 403  | `FORBIDDEN`        |
//! | NotFound       | 404  | `NOT_FOUND`        |
//! | Conflict       | 409  | `CONFLICT`         |
//! | Validation     | 422  | `VALIDATION_ERROR` |
//! | BadRequest     | 400  | `BAD_REQUEST`      |
//! | PaymentFailed  | 400  | `PAYMENT_FAILED`   |
//! | Internal       | 500  | `INTERNAL_ERROR`   |

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

use kaori_core::ValidationError;
use kaori_orders::OrderError;

/// Response envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// `200 OK` with `data`.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data: Some(data),
        error: None,
    })
}

/// `201 Created` with `data`.
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, ok(data))
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

// =============================================================================
// ApiError
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PaymentFailed(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::BadRequest(_) | ApiError::PaymentFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::PaymentFailed(_) => "PAYMENT_FAILED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(ErrorBody {
                code: self.code(),
                message,
            }),
        });
        (self.status(), body).into_response()
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::NotFound(_) => ApiError::NotFound(message),
            OrderError::Validation(_) | OrderError::Pricing(_) => ApiError::Validation(message),
            OrderError::InvalidTransition { .. } | OrderError::AlreadyPaid(_) => {
                ApiError::Conflict(message)
            }
            OrderError::Forbidden { .. } => ApiError::Forbidden(message),
            OrderError::InsufficientPayment { .. } | OrderError::AmountMismatch { .. } => {
                ApiError::PaymentFailed(message)
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(format!("Invalid path: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(format!("Invalid query: {}", rejection.body_text()))
    }
}
