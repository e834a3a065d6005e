use std::collections::HashMap;

use sea_orm::sea_query::{Expr, LockType};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    domain::cart::{Cart, CartLine, LineChange},
    dto::cart::{AddToCartRequest, CartView, EditCartRequest},
    entity::{CartLines, Carts, Products, cart_lines, carts, products},
    error::{AppError, AppResult},
    middleware::auth::AuthMember,
    models::CartLineView,
    response::ApiResponse,
    state::AppState,
};

/// A member's cart with its lines priced at the current product prices.
/// `resynced` is set when the stored total no longer matched those prices.
pub(crate) struct LoadedCart {
    pub cart: Cart,
    pub products: HashMap<Uuid, products::Model>,
    pub resynced: bool,
}

impl LoadedCart {
    fn view(&self) -> CartView {
        let lines = self
            .cart
            .lines()
            .iter()
            .filter_map(|line| {
                let product = self.products.get(&line.product_id)?;
                Some(CartLineView {
                    product_id: line.product_id,
                    product_code: product.code.clone(),
                    product_name: product.name.clone(),
                    count: line.count,
                    price: line.line_price(),
                })
            })
            .collect();
        CartView {
            lines,
            total_price: self.cart.total_price(),
        }
    }
}

/// Loads the member's cart, locking the cart row for the rest of the transaction.
/// The running total is recomputed from current prices before any mutation sees it.
pub(crate) async fn load_cart<C: ConnectionTrait>(
    conn: &C,
    member_id: Uuid,
) -> AppResult<Option<LoadedCart>> {
    let Some(row) = Carts::find()
        .filter(carts::Column::MemberId.eq(member_id))
        .lock(LockType::Update)
        .one(conn)
        .await?
    else {
        return Ok(None);
    };

    let rows = CartLines::find()
        .filter(cart_lines::Column::CartId.eq(row.id))
        .order_by_asc(cart_lines::Column::CreatedAt)
        .find_also_related(Products)
        .all(conn)
        .await?;

    let mut lines = Vec::with_capacity(rows.len());
    let mut products = HashMap::with_capacity(rows.len());
    for (line, product) in rows {
        let product = product.ok_or(AppError::NotFound("product"))?;
        lines.push(CartLine {
            id: line.id,
            product_id: line.product_id,
            unit_price: product.price,
            count: line.count,
        });
        products.insert(product.id, product);
    }

    let mut cart = Cart::from_parts(row.id, member_id, row.total_price, lines);
    let resynced = cart.resync_total();
    if resynced {
        tracing::debug!(
            cart_id = %cart.id,
            stored = row.total_price,
            total = cart.total_price(),
            "cart total drifted from current prices"
        );
    }

    Ok(Some(LoadedCart {
        cart,
        products,
        resynced,
    }))
}

async fn load_or_create_cart<C: ConnectionTrait>(conn: &C, member_id: Uuid) -> AppResult<LoadedCart> {
    if let Some(loaded) = load_cart(conn, member_id).await? {
        return Ok(loaded);
    }

    let row = carts::ActiveModel {
        id: Set(Uuid::new_v4()),
        member_id: Set(member_id),
        total_price: Set(0),
        created_at: NotSet,
    }
    .insert(conn)
    .await?;
    tracing::debug!(%member_id, cart_id = %row.id, "created cart");

    Ok(LoadedCart {
        cart: Cart::new(row.id, member_id),
        products: HashMap::new(),
        resynced: false,
    })
}

async fn persist_change<C: ConnectionTrait>(conn: &C, cart_id: Uuid, change: &LineChange) -> AppResult<()> {
    match change {
        LineChange::Inserted(line) => {
            cart_lines::ActiveModel {
                id: Set(line.id),
                cart_id: Set(cart_id),
                product_id: Set(line.product_id),
                count: Set(line.count),
                created_at: NotSet,
            }
            .insert(conn)
            .await?;
        }
        LineChange::CountChanged { line_id, count } => {
            CartLines::update_many()
                .col_expr(cart_lines::Column::Count, Expr::value(*count))
                .filter(cart_lines::Column::Id.eq(*line_id))
                .exec(conn)
                .await?;
        }
        LineChange::Removed { line_id } => {
            CartLines::delete_by_id(*line_id).exec(conn).await?;
        }
    }
    Ok(())
}

pub(crate) async fn save_total<C: ConnectionTrait>(conn: &C, cart: &Cart) -> AppResult<()> {
    Carts::update_many()
        .col_expr(carts::Column::TotalPrice, Expr::value(cart.total_price()))
        .filter(carts::Column::Id.eq(cart.id))
        .exec(conn)
        .await?;
    Ok(())
}

/// Removes every line and resets the running total.
pub(crate) async fn clear_cart<C: ConnectionTrait>(conn: &C, cart: &mut Cart) -> AppResult<()> {
    CartLines::delete_many()
        .filter(cart_lines::Column::CartId.eq(cart.id))
        .exec(conn)
        .await?;
    cart.clear();
    save_total(conn, cart).await
}

pub async fn add_to_cart(
    state: &AppState,
    member: &AuthMember,
    product_id: Uuid,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    let product = Products::find_by_id(product_id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("product"))?;

    let mut loaded = load_or_create_cart(&txn, member.member_id).await?;
    let change = loaded.cart.add_line(product.id, product.price, payload.count)?;
    persist_change(&txn, loaded.cart.id, &change).await?;
    save_total(&txn, &loaded.cart).await?;
    loaded.products.insert(product.id, product);
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(member.member_id),
        "cart_add",
        "cart_lines",
        serde_json::json!({ "product_id": product_id, "count": payload.count }),
    )
    .await;

    Ok(ApiResponse::success("Added to cart", loaded.view(), None))
}

/// Returns the cart priced at current product prices. A member without a cart
/// gets an empty one created on the spot.
pub async fn get_cart(state: &AppState, member: &AuthMember) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    let loaded = load_or_create_cart(&txn, member.member_id).await?;
    if loaded.resynced {
        save_total(&txn, &loaded.cart).await?;
    }
    txn.commit().await?;

    let view = if loaded.cart.is_empty() {
        CartView::empty()
    } else {
        loaded.view()
    };
    Ok(ApiResponse::success("Cart", view, None))
}

pub async fn edit_cart(
    state: &AppState,
    member: &AuthMember,
    payload: EditCartRequest,
) -> AppResult<ApiResponse<CartView>> {
    let txn = state.orm.begin().await?;
    let mut loaded = load_cart(&txn, member.member_id)
        .await?
        .ok_or(AppError::NotFound("cart"))?;

    let change = loaded.cart.edit_line(payload.product_id, payload.count)?;
    persist_change(&txn, loaded.cart.id, &change).await?;
    save_total(&txn, &loaded.cart).await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(member.member_id),
        "cart_edit",
        "cart_lines",
        serde_json::json!({ "product_id": payload.product_id, "count": payload.count }),
    )
    .await;

    Ok(ApiResponse::success("Cart updated", loaded.view(), None))
}
