mod common;

use furniture_shop_api::{
    dto::{
        cart::AddToCartRequest,
        orders::{SingleOrderRequest, UpdateDeliveryRequest},
    },
    entity::{
        OrderLines, Orders, order_lines,
        orders::{self, OrderStatus},
        products::ProductStatus,
    },
    error::AppError,
    routes::params::Pagination,
    services::{cart_service, order_service},
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use common::{auth, create_member, create_product, create_product_with_status, reload_product};

async fn order_count(state: &furniture_shop_api::state::AppState, member_id: uuid::Uuid) -> anyhow::Result<u64> {
    Ok(Orders::find()
        .filter(orders::Column::MemberId.eq(member_id))
        .count(&state.orm)
        .await?)
}

#[tokio::test]
async fn single_order_snapshots_member_and_leaves_stock() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = create_member(&state, 0).await?;
    let product = create_product(&state, 100, 10).await?;

    let created = order_service::create_single_order(
        &state,
        &auth(&member),
        product.id,
        SingleOrderRequest { count: 5 },
    )
    .await?
    .result
    .expect("order");
    assert_eq!(created.total_price, 500);

    let order = common::find_order(&state, created.order_id).await?.expect("order row");
    assert_eq!(order.status, OrderStatus::Ready);
    assert_eq!(order.receiver, member.username);
    assert_eq!(order.phone, member.phone);
    assert_eq!(order.city, member.city);
    assert_eq!(order.zip_code, member.zip_code);

    let lines = OrderLines::find()
        .filter(order_lines::Column::OrderId.eq(order.id))
        .all(&state.orm)
        .await?;
    assert_eq!(lines.len(), 1);
    assert_eq!((lines[0].count, lines[0].unit_price, lines[0].total_price), (5, 100, 500));

    assert_eq!(reload_product(&state, product.id).await?.stock, 10);
    Ok(())
}

#[tokio::test]
async fn single_order_over_stock_creates_nothing() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = create_member(&state, 0).await?;
    let product = create_product(&state, 100, 3).await?;

    let err = order_service::create_single_order(
        &state,
        &auth(&member),
        product.id,
        SingleOrderRequest { count: 4 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock));
    assert_eq!(order_count(&state, member.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn single_order_for_product_not_on_sale_creates_nothing() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = create_member(&state, 0).await?;
    let product = create_product_with_status(&state, 100, 10, ProductStatus::Stop).await?;

    let err = order_service::create_single_order(
        &state,
        &auth(&member),
        product.id,
        SingleOrderRequest { count: 1 },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::NotSelling));
    assert_eq!(order_count(&state, member.id).await?, 0);
    Ok(())
}

#[tokio::test]
async fn cart_order_converts_all_lines_and_clears_cart() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = create_member(&state, 0).await?;
    let caller = auth(&member);
    let chair = create_product(&state, 100, 10).await?;
    let table = create_product(&state, 300, 2).await?;

    cart_service::add_to_cart(&state, &caller, chair.id, AddToCartRequest { count: 2 }).await?;
    cart_service::add_to_cart(&state, &caller, table.id, AddToCartRequest { count: 1 }).await?;

    let created = order_service::create_cart_order(&state, &caller)
        .await?
        .result
        .expect("order");
    assert_eq!(created.total_price, 500);

    let lines = OrderLines::find()
        .filter(order_lines::Column::OrderId.eq(created.order_id))
        .count(&state.orm)
        .await?;
    assert_eq!(lines, 2);

    let cart = cart_service::get_cart(&state, &caller).await?.result.expect("cart");
    assert!(cart.lines.is_empty());
    assert_eq!(cart.total_price, 0);

    let err = order_service::create_cart_order(&state, &caller).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("cart")));
    Ok(())
}

#[tokio::test]
async fn cart_order_with_one_bad_line_is_all_or_nothing() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = create_member(&state, 0).await?;
    let caller = auth(&member);
    let chair = create_product(&state, 100, 10).await?;
    let scarce = create_product(&state, 300, 1).await?;

    cart_service::add_to_cart(&state, &caller, chair.id, AddToCartRequest { count: 2 }).await?;
    cart_service::add_to_cart(&state, &caller, scarce.id, AddToCartRequest { count: 2 }).await?;

    let err = order_service::create_cart_order(&state, &caller).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock));
    assert_eq!(order_count(&state, member.id).await?, 0);

    let cart = cart_service::get_cart(&state, &caller).await?.result.expect("cart");
    assert_eq!(cart.lines.len(), 2);
    assert_eq!(cart.total_price, 800);
    Ok(())
}

#[tokio::test]
async fn right_order_checks_owner_then_state() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let owner = create_member(&state, 0).await?;
    let stranger = create_member(&state, 0).await?;
    let product = create_product(&state, 100, 10).await?;

    let created = order_service::create_single_order(
        &state,
        &auth(&owner),
        product.id,
        SingleOrderRequest { count: 1 },
    )
    .await?
    .result
    .expect("order");

    assert!(order_service::is_right_order(&state, &auth(&owner), created.order_id).await.is_ok());

    let err = order_service::is_right_order(&state, &auth(&stranger), created.order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    let err = order_service::is_right_order(&state, &auth(&owner), uuid::Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("order")));

    let err = order_service::get_order_detail(&state, &auth(&stranger), created.order_id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    Ok(())
}

#[tokio::test]
async fn delivery_update_replaces_snapshot_and_lists_newest_first() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = create_member(&state, 0).await?;
    let caller = auth(&member);
    let product = create_product(&state, 100, 10).await?;

    let first = order_service::create_single_order(&state, &caller, product.id, SingleOrderRequest { count: 1 })
        .await?
        .result
        .expect("order");
    let second = order_service::create_single_order(&state, &caller, product.id, SingleOrderRequest { count: 2 })
        .await?
        .result
        .expect("order");

    let updated = order_service::update_delivery(
        &state,
        &caller,
        first.order_id,
        UpdateDeliveryRequest {
            receiver: "Lee".into(),
            phone: "01099998888".into(),
            zip_code: "48058".into(),
            city: "Busan".into(),
            street: "Haeundae-ro 5".into(),
            memo: Some("leave at the door".into()),
        },
    )
    .await?
    .result
    .expect("order");
    assert_eq!(updated.receiver, "Lee");
    assert_eq!(updated.city, "Busan");

    let detail = order_service::get_order_detail(&state, &caller, first.order_id)
        .await?
        .result
        .expect("detail");
    assert_eq!(detail.memo.as_deref(), Some("leave at the door"));
    assert!(detail.payment.is_none());
    assert_eq!(detail.lines.len(), 1);

    let list = order_service::list_orders(&state, &caller, Pagination::default()).await?;
    assert_eq!(list.meta.as_ref().map(|m| m.total), Some(Some(2)));
    let items = list.result.expect("orders").items;
    assert_eq!(items[0].id, second.order_id);
    assert_eq!(items[1].id, first.order_id);
    Ok(())
}
