use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::reviews::{ReviewList, ReviewRequest},
    error::AppResult,
    middleware::{auth::AuthMember, json::ValidJson},
    models::Review,
    response::ApiResponse,
    routes::params::Pagination,
    services::review_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/product/{id}/review", get(list_reviews).post(add_review))
        .route("/review/{id}", patch(edit_review).delete(delete_review))
}

#[utoipa::path(
    get,
    path = "/api/product/{id}/review",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 10")
    ),
    responses(
        (status = 200, description = "Reviews of a product", body = ApiResponse<ReviewList>)
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = review_service::list_reviews(&state, product_id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/product/{id}/review",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review added", body = ApiResponse<Review>),
        (status = 400, description = "No finished order for the product")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn add_review(
    State(state): State<AppState>,
    member: AuthMember,
    Path(product_id): Path<Uuid>,
    ValidJson(payload): ValidJson<ReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::add_review(&state, &member, product_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/review/{id}",
    params(
        ("id" = Uuid, Path, description = "Review ID")
    ),
    request_body = ReviewRequest,
    responses(
        (status = 200, description = "Review updated", body = ApiResponse<Review>),
        (status = 403, description = "Not the author")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn edit_review(
    State(state): State<AppState>,
    member: AuthMember,
    Path(review_id): Path<Uuid>,
    ValidJson(payload): ValidJson<ReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::edit_review(&state, &member, review_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/review/{id}",
    params(
        ("id" = Uuid, Path, description = "Review ID")
    ),
    responses(
        (status = 200, description = "Review deleted", body = ApiResponse<serde_json::Value>),
        (status = 403, description = "Not the author")
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn delete_review(
    State(state): State<AppState>,
    member: AuthMember,
    Path(review_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = review_service::delete_review(&state, &member, review_id).await?;
    Ok(Json(resp))
}
