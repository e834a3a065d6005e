use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::products::{ProductFilter, ProductList, RegisterProductRequest, UpdateProductRequest},
    entity::products::{ActiveModel, Column, Entity as Products},
    error::{AppError, AppResult},
    middleware::auth::{AuthMember, ensure_admin},
    models::ProductDetail,
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    filter: ProductFilter,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, limit, offset) = pagination.normalize();
    let mut condition = Condition::all();

    if let Some(code) = filter.code {
        condition = condition.add(Expr::col(Column::Code).ilike(format!("%{code}%")));
    }
    if let Some(name) = filter.name {
        condition = condition.add(Expr::col(Column::Name).ilike(format!("%{name}%")));
    }
    if let Some(category) = filter.category {
        condition = condition.add(Column::Category.eq(category));
    }
    if let Some(status) = filter.status {
        condition = condition.add(Column::Status.eq(status));
    }

    let finder = Products::find()
        .filter(condition)
        .order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(state: &AppState, id: Uuid) -> AppResult<ApiResponse<ProductDetail>> {
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("product"))?;
    Ok(ApiResponse::success("Product", product.into(), None))
}

pub async fn register_product(
    state: &AppState,
    member: &AuthMember,
    payload: RegisterProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(member)?;
    let parsed = payload.validate()?;

    let product = ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(payload.code.trim().to_string()),
        name: Set(payload.name.trim().to_string()),
        category: Set(parsed.category),
        status: Set(parsed.status),
        stock: Set(payload.stock),
        price: Set(payload.price),
        width: Set(payload.width),
        length: Set(payload.length),
        height: Set(payload.height),
        description: Set(payload.description),
        sell_count: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await
    .map_err(|err| AppError::from_unique(err, "Product code already exists"))?;

    audit::record(
        &state.pool,
        Some(member.member_id),
        "product_register",
        "products",
        serde_json::json!({ "product_id": product.id, "code": product.code }),
    )
    .await;

    Ok(ApiResponse::success("Product registered", product.into(), None))
}

pub async fn update_product(
    state: &AppState,
    member: &AuthMember,
    id: Uuid,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(member)?;
    let changes = payload.validate()?;

    let txn = state.orm.begin().await?;
    let existing = Products::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("product"))?;

    let mut active = existing.into_active_model();
    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(category) = changes.category {
        active.category = Set(category);
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }
    if let Some(stock) = changes.stock {
        active.stock = Set(stock);
    }
    if let Some(price) = changes.price {
        active.price = Set(price);
    }
    if let Some((width, length, height)) = changes.size {
        active.width = Set(width);
        active.length = Set(length);
        active.height = Set(height);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    active.updated_at = Set(Utc::now().fixed_offset());

    let product = active.update(&txn).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(member.member_id),
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    Ok(ApiResponse::success("Updated", product.into(), None))
}
