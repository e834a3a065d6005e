use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct Meta {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub total: Option<i64>,
}

impl Meta {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            total: Some(total),
        }
    }

    pub fn empty() -> Self {
        Self {
            page: None,
            per_page: None,
            total: None,
        }
    }
}

/// Uniform envelope: `{ result, resultCode, message }`, plus `meta` on paged listings.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    #[serde(rename = "resultCode")]
    pub result_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T, meta: Option<Meta>) -> Self {
        Self::with_status(StatusCode::OK, message, Some(data), meta)
    }

    pub fn with_status(
        status: StatusCode,
        message: impl Into<String>,
        data: Option<T>,
        meta: Option<Meta>,
    ) -> Self {
        Self {
            result: data,
            result_code: status.as_u16(),
            message: message.into(),
            meta,
        }
    }
}

impl ApiResponse<serde_json::Value> {
    /// Message-only acknowledgement.
    pub fn ok(message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, message, None, None)
    }
}
