use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::reviews::{ReviewList, ReviewRequest},
    entity::{
        OrderLines, Orders, Products, Reviews, order_lines,
        orders::{self, OrderStatus},
        reviews,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::Review,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

async fn has_purchased<C: sea_orm::ConnectionTrait>(
    conn: &C,
    member_id: Uuid,
    product_id: Uuid,
) -> AppResult<bool> {
    let finished = OrderLines::find()
        .inner_join(Orders)
        .filter(order_lines::Column::ProductId.eq(product_id))
        .filter(orders::Column::MemberId.eq(member_id))
        .filter(orders::Column::Status.eq(OrderStatus::Finish))
        .count(conn)
        .await?;
    Ok(finished > 0)
}

async fn find_own_review<C: sea_orm::ConnectionTrait>(
    conn: &C,
    member: &AuthMember,
    review_id: Uuid,
) -> AppResult<reviews::Model> {
    let review = Reviews::find_by_id(review_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound("review"))?;
    if review.member_id != member.member_id {
        return Err(AppError::Forbidden);
    }
    Ok(review)
}

pub async fn add_review(
    state: &AppState,
    member: &AuthMember,
    product_id: Uuid,
    payload: ReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;
    Products::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("product"))?;
    if !has_purchased(&txn, member.member_id, product_id).await? {
        tracing::info!(member_id = %member.member_id, %product_id, "review rejected: no finished order");
        return Err(AppError::validation(
            "only members with a finished order for this product can review it",
        ));
    }

    let review = reviews::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product_id),
        member_id: Set(member.member_id),
        comment: Set(payload.comment.trim().to_string()),
        rate: Set(payload.rate),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(member.member_id),
        "review_add",
        "reviews",
        serde_json::json!({ "review_id": review.id, "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::success("Review added", review.into(), None))
}

pub async fn edit_review(
    state: &AppState,
    member: &AuthMember,
    review_id: Uuid,
    payload: ReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let review = find_own_review(&txn, member, review_id).await?;
    let mut active = review.into_active_model();
    active.comment = Set(payload.comment.trim().to_string());
    active.rate = Set(payload.rate);
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(member.member_id),
        "review_edit",
        "reviews",
        serde_json::json!({ "review_id": review_id }),
    )
    .await;

    Ok(ApiResponse::success("Review updated", updated.into(), None))
}

pub async fn delete_review(
    state: &AppState,
    member: &AuthMember,
    review_id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let review = find_own_review(&txn, member, review_id).await?;
    review.delete(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(member.member_id),
        "review_delete",
        "reviews",
        serde_json::json!({ "review_id": review_id }),
    )
    .await;

    Ok(ApiResponse::ok("Review deleted"))
}

pub async fn list_reviews(
    state: &AppState,
    product_id: Uuid,
    pagination: Pagination,
) -> AppResult<ApiResponse<ReviewList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Reviews::find()
        .filter(reviews::Column::ProductId.eq(product_id))
        .order_by_desc(reviews::Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Review::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Reviews", ReviewList { items }, Some(meta)))
}
