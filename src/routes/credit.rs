use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::credit::{
        CreditRequest, MerchantUid, PaymentInfo, PaymentKey, PaymentResult, RefundRequest,
    },
    error::AppResult,
    middleware::{auth::AuthMember, json::ValidJson},
    response::ApiResponse,
    services::credit_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/credit/{id}/complete", post(complete_payment))
        .route("/refund/{imp_uid}", post(refund))
        .route("/payment/{id}/info", get(payment_info))
        .route("/payment/merchant", get(merchant_uid))
        .route("/payment/key", get(payment_key))
}

#[utoipa::path(
    post,
    path = "/api/credit/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = CreditRequest,
    responses(
        (status = 200, description = "Payment verified and captured", body = ApiResponse<PaymentResult>),
        (status = 400, description = "FAIL_PAYMENT, INVALID_STATE or NOT_ENOUGH_STOCK"),
        (status = 403, description = "Not the owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn complete_payment(
    State(state): State<AppState>,
    member: AuthMember,
    Path(order_id): Path<Uuid>,
    ValidJson(payload): ValidJson<CreditRequest>,
) -> AppResult<Json<ApiResponse<PaymentResult>>> {
    let resp = credit_service::create_and_verify_payment(&state, &member, order_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/refund/{imp_uid}",
    params(
        ("imp_uid" = String, Path, description = "Gateway transaction id")
    ),
    request_body = RefundRequest,
    responses(
        (status = 200, description = "Payment refunded", body = ApiResponse<PaymentResult>),
        (status = 400, description = "INVALID_PAYMENT or INVALID_STATE"),
        (status = 403, description = "Not the owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn refund(
    State(state): State<AppState>,
    member: AuthMember,
    Path(imp_uid): Path<String>,
    ValidJson(payload): ValidJson<RefundRequest>,
) -> AppResult<Json<ApiResponse<PaymentResult>>> {
    let resp = credit_service::cancel_payment(&state, &member, &imp_uid, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payment/{id}/info",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Data for the gateway checkout widget", body = ApiResponse<PaymentInfo>)
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn payment_info(
    State(state): State<AppState>,
    member: AuthMember,
    Path(order_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PaymentInfo>>> {
    let resp = credit_service::payment_info(&state, &member, order_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/payment/merchant",
    responses(
        (status = 200, description = "Fresh merchant uid", body = ApiResponse<MerchantUid>)
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn merchant_uid(_member: AuthMember) -> Json<ApiResponse<MerchantUid>> {
    Json(credit_service::merchant_uid())
}

#[utoipa::path(
    get,
    path = "/api/payment/key",
    responses(
        (status = 200, description = "Gateway key for the checkout widget", body = ApiResponse<PaymentKey>),
        (status = 404, description = "No key configured")
    ),
    security(("bearer_auth" = [])),
    tag = "Payment"
)]
pub async fn payment_key(
    State(state): State<AppState>,
    _member: AuthMember,
) -> AppResult<Json<ApiResponse<PaymentKey>>> {
    let resp = credit_service::payment_key(&state)?;
    Ok(Json(resp))
}
