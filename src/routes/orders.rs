use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::orders::{OrderCreated, OrderList, SingleOrderRequest, UpdateDeliveryRequest},
    error::AppResult,
    middleware::{auth::AuthMember, json::ValidJson},
    models::{OrderDetail, OrderSummary},
    response::ApiResponse,
    routes::params::Pagination,
    services::order_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order).patch(update_delivery))
        .route("/orders/{id}/verify", get(verify_order))
        .route("/product/{id}/orders", post(create_single_order))
        .route("/cart/orders", post(create_cart_order))
}

#[utoipa::path(
    get,
    path = "/api/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10")
    ),
    responses(
        (status = 200, description = "Own orders, newest first", body = ApiResponse<OrderList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    member: AuthMember,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_orders(&state, &member, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order with lines and payment", body = ApiResponse<OrderDetail>),
        (status = 400, description = "Order not found"),
        (status = 403, description = "Not the owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    member: AuthMember,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderDetail>>> {
    let resp = order_service::get_order_detail(&state, &member, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}/verify",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order belongs to caller and awaits payment", body = ApiResponse<OrderSummary>),
        (status = 400, description = "Order not found or not READY"),
        (status = 403, description = "Not the owner")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn verify_order(
    State(state): State<AppState>,
    member: AuthMember,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<OrderSummary>>> {
    let resp = order_service::is_right_order(&state, &member, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order ID")
    ),
    request_body = UpdateDeliveryRequest,
    responses(
        (status = 200, description = "Delivery details replaced", body = ApiResponse<OrderSummary>)
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn update_delivery(
    State(state): State<AppState>,
    member: AuthMember,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<UpdateDeliveryRequest>,
) -> AppResult<Json<ApiResponse<OrderSummary>>> {
    let resp = order_service::update_delivery(&state, &member, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/product/{id}/orders",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = SingleOrderRequest,
    responses(
        (status = 200, description = "Order placed", body = ApiResponse<OrderCreated>),
        (status = 400, description = "Not selling or not enough stock")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_single_order(
    State(state): State<AppState>,
    member: AuthMember,
    Path(product_id): Path<Uuid>,
    ValidJson(payload): ValidJson<SingleOrderRequest>,
) -> AppResult<Json<ApiResponse<OrderCreated>>> {
    let resp = order_service::create_single_order(&state, &member, product_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/orders",
    responses(
        (status = 200, description = "Cart converted into an order", body = ApiResponse<OrderCreated>),
        (status = 400, description = "Empty cart, not selling or not enough stock")
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn create_cart_order(
    State(state): State<AppState>,
    member: AuthMember,
) -> AppResult<Json<ApiResponse<OrderCreated>>> {
    let resp = order_service::create_cart_order(&state, &member).await?;
    Ok(Json(resp))
}
