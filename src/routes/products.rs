use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::products::{ProductList, RegisterProductRequest, UpdateProductRequest},
    error::AppResult,
    middleware::{auth::AuthMember, json::ValidJson},
    models::ProductDetail,
    response::ApiResponse,
    routes::params::ProductQuery,
    services::product_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/product", get(list_products).post(register_product))
        .route("/product/{id}", get(get_product).patch(update_product))
}

#[utoipa::path(
    get,
    path = "/api/product",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10"),
        ("code" = Option<String>, Query, description = "Product code contains"),
        ("name" = Option<String>, Query, description = "Product name contains"),
        ("category" = Option<String>, Query, description = "CHAIR, TABLE, CLOSET or BED"),
        ("status" = Option<String>, Query, description = "SELLING, STOP or READY"),
    ),
    responses(
        (status = 200, description = "Search products", body = ApiResponse<ProductList>),
        (status = 400, description = "Unknown category or status")
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let filter = query.filter()?;
    let resp = product_service::list_products(&state, filter, query.pagination()).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/product/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Get product", body = ApiResponse<ProductDetail>),
        (status = 400, description = "Product not found"),
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::get_product(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/product",
    request_body = RegisterProductRequest,
    responses(
        (status = 200, description = "Register product", body = ApiResponse<ProductDetail>),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Duplicate product code")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn register_product(
    State(state): State<AppState>,
    member: AuthMember,
    ValidJson(payload): ValidJson<RegisterProductRequest>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::register_product(&state, &member, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/product/{id}",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = UpdateProductRequest,
    responses(
        (status = 200, description = "Updated product", body = ApiResponse<ProductDetail>),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    member: AuthMember,
    Path(id): Path<Uuid>,
    ValidJson(payload): ValidJson<UpdateProductRequest>,
) -> AppResult<Json<ApiResponse<ProductDetail>>> {
    let resp = product_service::update_product(&state, &member, id, payload).await?;
    Ok(Json(resp))
}
