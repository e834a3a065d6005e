use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::cart::{AddToCartRequest, CartView, EditCartRequest},
    error::AppResult,
    middleware::{auth::AuthMember, json::ValidJson},
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cart", get(get_cart).patch(edit_cart))
        .route("/product/{id}/cart", post(add_to_cart))
}

#[utoipa::path(
    get,
    path = "/api/cart",
    responses(
        (status = 200, description = "Cart with lines priced at current prices", body = ApiResponse<CartView>)
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn get_cart(
    State(state): State<AppState>,
    member: AuthMember,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::get_cart(&state, &member).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/product/{id}/cart",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Product added to cart", body = ApiResponse<CartView>),
        (status = 400, description = "Product not found or count below 1"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    member: AuthMember,
    Path(product_id): Path<Uuid>,
    ValidJson(payload): ValidJson<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::add_to_cart(&state, &member, product_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/cart",
    request_body = EditCartRequest,
    responses(
        (status = 200, description = "Cart line updated or removed", body = ApiResponse<CartView>),
        (status = 400, description = "Cart or line not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn edit_cart(
    State(state): State<AppState>,
    member: AuthMember,
    ValidJson(payload): ValidJson<EditCartRequest>,
) -> AppResult<Json<ApiResponse<CartView>>> {
    let resp = cart_service::edit_cart(&state, &member, payload).await?;
    Ok(Json(resp))
}
