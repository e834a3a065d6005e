use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

use crate::response::{ApiResponse, Meta};

/// Why a request could not be authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    MissingToken,
    InvalidToken,
    BadSignature,
    Expired,
    Unsupported,
    Revoked,
    BadCredentials,
}

impl AuthFailure {
    pub fn code(self) -> &'static str {
        match self {
            AuthFailure::MissingToken | AuthFailure::InvalidToken => "JWT_INVALID",
            AuthFailure::BadSignature => "JWT_SIGN",
            AuthFailure::Expired => "JWT_EXPIRED",
            AuthFailure::Unsupported => "JWT_UNSUPPORTED",
            AuthFailure::Revoked => "JWT_REVOKED",
            AuthFailure::BadCredentials => "LOGIN_FAILED",
        }
    }

    fn message(self) -> &'static str {
        match self {
            AuthFailure::MissingToken => "Missing bearer token",
            AuthFailure::InvalidToken => "Invalid token",
            AuthFailure::BadSignature => "Invalid token signature",
            AuthFailure::Expired => "Token expired",
            AuthFailure::Unsupported => "Unsupported token",
            AuthFailure::Revoked => "Token has been revoked",
            AuthFailure::BadCredentials => "Invalid email or password",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Product is not on sale")]
    NotSelling,

    #[error("Not enough stock")]
    InsufficientStock,

    #[error("Payment failed")]
    FailPayment,

    #[error("Payment could not be verified")]
    InvalidPayment,

    #[error("Unauthorized: {}", .0.message())]
    Unauthorized(AuthFailure),

    #[error("Forbidden")]
    Forbidden,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error")]
    DbError(#[from] sqlx::Error),

    #[error("ORM error")]
    OrmError(#[from] DbErr),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::NotFound(_)
            | AppError::InvalidState(_)
            | AppError::NotSelling
            | AppError::InsufficientStock
            | AppError::FailPayment
            | AppError::InvalidPayment => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::NotSelling => "NOT_SELLING_PRODUCT",
            AppError::InsufficientStock => "NOT_ENOUGH_STOCK",
            AppError::FailPayment => "FAIL_PAYMENT",
            AppError::InvalidPayment => "INVALID_PAYMENT",
            AppError::Unauthorized(failure) => failure.code(),
            AppError::Forbidden => "FORBIDDEN",
            AppError::Conflict(_) => "CONFLICT",
            AppError::DbError(_) | AppError::OrmError(_) | AppError::Internal(_) => "INTERNAL",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        AppError::InvalidState(message.into())
    }

    /// Turns a unique-constraint violation into `Conflict`, leaving other errors untouched.
    pub fn from_unique(err: DbErr, conflict: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(conflict.to_string()),
            _ => AppError::OrmError(err),
        }
    }
}

#[derive(Serialize)]
struct ErrorData {
    error: String,
    code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::DbError(err) => tracing::error!(error = %err, "database error"),
            AppError::OrmError(err) => tracing::error!(error = %err, "orm error"),
            AppError::Internal(err) => tracing::error!(error = %err, "internal error"),
            _ => {}
        }

        let body = ApiResponse {
            result: Some(ErrorData {
                error: self.to_string(),
                code: self.code(),
            }),
            result_code: status.as_u16(),
            message: self.to_string(),
            meta: Some(Meta::empty()),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
