use chrono::{DateTime, Duration, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    db::OrmConn,
    dto::orders::{OrderCreated, OrderList, SingleOrderRequest, UpdateDeliveryRequest},
    entity::{
        Credits, Members, OrderLines, Orders, Products, credits, members, order_lines,
        orders::{self, OrderStatus},
        products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::{OrderDetail, OrderLineView, OrderSummary, PaymentSummary},
    response::{ApiResponse, Meta},
    routes::params::Pagination,
    services::cart_service,
    state::AppState,
};

async fn find_member<C: ConnectionTrait>(conn: &C, member_id: Uuid) -> AppResult<members::Model> {
    Members::find_by_id(member_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound("member"))
}

/// Writes a READY order with one line per `(product, count)`, snapshotting the
/// member's address, name and phone. Stock is checked, not reserved.
async fn place_order<C: ConnectionTrait>(
    conn: &C,
    member: &members::Model,
    items: &[(products::Model, i32)],
) -> AppResult<orders::Model> {
    let mut priced = Vec::with_capacity(items.len());
    let mut total: i64 = 0;
    for (product, count) in items {
        product.ensure_orderable(*count)?;
        let line_total = product.line_price(*count)?;
        total = total
            .checked_add(line_total)
            .ok_or_else(|| AppError::validation("order total overflow"))?;
        priced.push((product, *count, line_total));
    }

    let order = orders::ActiveModel {
        id: Set(Uuid::new_v4()),
        member_id: Set(member.id),
        total_price: Set(total),
        status: Set(OrderStatus::Ready),
        zip_code: Set(member.zip_code.clone()),
        city: Set(member.city.clone()),
        street: Set(member.street.clone()),
        receiver: Set(member.username.clone()),
        phone: Set(member.phone.clone()),
        memo: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(conn)
    .await?;

    for (product, count, line_total) in priced {
        order_lines::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order.id),
            product_id: Set(product.id),
            count: Set(count),
            unit_price: Set(product.price),
            total_price: Set(line_total),
            created_at: NotSet,
        }
        .insert(conn)
        .await?;
    }

    Ok(order)
}

pub async fn create_single_order(
    state: &AppState,
    member: &AuthMember,
    product_id: Uuid,
    payload: SingleOrderRequest,
) -> AppResult<ApiResponse<OrderCreated>> {
    if payload.count < 1 {
        return Err(AppError::validation("count must be at least 1"));
    }

    let txn = state.orm.begin().await?;
    let buyer = find_member(&txn, member.member_id).await?;
    let product = Products::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("product"))?;

    let order = place_order(&txn, &buyer, &[(product, payload.count)]).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, member_id = %member.member_id, total = order.total_price, "order placed");
    audit::record(
        &state.pool,
        Some(member.member_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "product_id": product_id, "count": payload.count }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        OrderCreated {
            order_id: order.id,
            total_price: order.total_price,
        },
        None,
    ))
}

/// Converts the whole cart into one order. Any failing line aborts everything
/// and leaves the cart untouched.
pub async fn create_cart_order(state: &AppState, member: &AuthMember) -> AppResult<ApiResponse<OrderCreated>> {
    let txn = state.orm.begin().await?;
    let buyer = find_member(&txn, member.member_id).await?;
    let mut loaded = cart_service::load_cart(&txn, member.member_id)
        .await?
        .filter(|loaded| !loaded.cart.is_empty())
        .ok_or(AppError::NotFound("cart"))?;

    let items = loaded
        .cart
        .lines()
        .iter()
        .map(|line| {
            loaded
                .products
                .get(&line.product_id)
                .cloned()
                .map(|product| (product, line.count))
                .ok_or(AppError::NotFound("product"))
        })
        .collect::<AppResult<Vec<_>>>()?;

    let order = place_order(&txn, &buyer, &items).await?;
    cart_service::clear_cart(&txn, &mut loaded.cart).await?;
    txn.commit().await?;

    tracing::info!(order_id = %order.id, member_id = %member.member_id, lines = items.len(), "cart checked out");
    audit::record(
        &state.pool,
        Some(member.member_id),
        "order_create",
        "orders",
        serde_json::json!({ "order_id": order.id, "from_cart": true }),
    )
    .await;

    Ok(ApiResponse::success(
        "Order created",
        OrderCreated {
            order_id: order.id,
            total_price: order.total_price,
        },
        None,
    ))
}

pub async fn list_orders(
    state: &AppState,
    member: &AuthMember,
    pagination: Pagination,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = pagination.normalize();
    let finder = Orders::find()
        .filter(orders::Column::MemberId.eq(member.member_id))
        .order_by_desc(orders::Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(OrderSummary::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Orders", OrderList { items }, Some(meta)))
}

/// The order exists, belongs to the caller and still awaits payment.
pub(crate) async fn check_right_order<C: ConnectionTrait>(
    conn: &C,
    member_id: Uuid,
    order_id: Uuid,
) -> AppResult<orders::Model> {
    let order = Orders::find_by_id(order_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound("order"))?;
    order.ensure_payable_by(member_id)?;
    Ok(order)
}

pub async fn is_right_order(
    state: &AppState,
    member: &AuthMember,
    order_id: Uuid,
) -> AppResult<ApiResponse<OrderSummary>> {
    let order = check_right_order(&state.orm, member.member_id, order_id).await?;
    Ok(ApiResponse::success("Order is payable", order.into(), None))
}

pub async fn get_order_detail(
    state: &AppState,
    member: &AuthMember,
    order_id: Uuid,
) -> AppResult<ApiResponse<OrderDetail>> {
    let order = Orders::find_by_id(order_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("order"))?;
    if order.member_id != member.member_id {
        return Err(AppError::Forbidden);
    }

    let lines = OrderLines::find()
        .filter(order_lines::Column::OrderId.eq(order.id))
        .order_by_asc(order_lines::Column::CreatedAt)
        .find_also_related(Products)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|(line, product)| {
            product
                .map(|p| OrderLineView::new(line, &p))
                .ok_or(AppError::NotFound("product"))
        })
        .collect::<AppResult<Vec<_>>>()?;

    let payment = match order.status {
        OrderStatus::Ready => None,
        status => {
            let credit = Credits::find()
                .filter(credits::Column::OrderId.eq(order.id))
                .one(&state.orm)
                .await?
                .ok_or(AppError::NotFound("credit"))?;
            Some(PaymentSummary {
                amount: credit.amount,
                mileage: credit.mileage,
                pay_method: credit.pay_method,
                imp_uid: credit.imp_uid,
                paid_at: (status == OrderStatus::Finish).then(|| credit.paid_at.with_timezone(&Utc)),
                cancelled_at: if status == OrderStatus::Cancel {
                    credit.cancelled_at.map(|at| at.with_timezone(&Utc))
                } else {
                    None
                },
            })
        }
    };

    let detail = OrderDetail {
        id: order.id,
        status: order.status,
        total_price: order.total_price,
        lines,
        receiver: order.receiver,
        phone: order.phone,
        zip_code: order.zip_code,
        city: order.city,
        street: order.street,
        memo: order.memo,
        payment,
        created_at: order.created_at.with_timezone(&Utc),
    };
    Ok(ApiResponse::success("Order", detail, None))
}

/// Replaces the delivery snapshot of an order that has not been paid yet.
pub async fn update_delivery(
    state: &AppState,
    member: &AuthMember,
    order_id: Uuid,
    payload: UpdateDeliveryRequest,
) -> AppResult<ApiResponse<OrderSummary>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let order = check_right_order(&txn, member.member_id, order_id).await?;

    let mut active = order.into_active_model();
    active.receiver = Set(payload.receiver.trim().to_string());
    active.phone = Set(payload.phone.trim().to_string());
    active.zip_code = Set(payload.zip_code.trim().to_string());
    active.city = Set(payload.city.trim().to_string());
    active.street = Set(payload.street.trim().to_string());
    active.memo = Set(payload.memo());
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success("Delivery updated", updated.into(), None))
}

/// Deletes READY orders created before `now - max_age`. Lines go with them.
/// Returns how many orders were removed.
pub async fn purge_expired_orders(orm: &OrmConn, now: DateTime<Utc>, max_age: Duration) -> AppResult<u64> {
    let cutoff = (now - max_age).fixed_offset();
    let txn = orm.begin().await?;
    let result = Orders::delete_many()
        .filter(orders::Column::Status.eq(OrderStatus::Ready))
        .filter(orders::Column::CreatedAt.lt(cutoff))
        .exec(&txn)
        .await?;
    txn.commit().await?;
    Ok(result.rows_affected)
}
