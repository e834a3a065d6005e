mod common;

use furniture_shop_api::{
    dto::cart::{AddToCartRequest, EditCartRequest},
    entity::{CartLines, Carts, Products, carts, products},
    error::AppError,
    services::cart_service,
};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use common::{auth, create_member, create_product};

#[tokio::test]
async fn adding_same_product_twice_merges_into_one_line() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = create_member(&state, 0).await?;
    let product = create_product(&state, 100, 10).await?;
    let caller = auth(&member);

    cart_service::add_to_cart(&state, &caller, product.id, AddToCartRequest { count: 3 }).await?;
    let resp =
        cart_service::add_to_cart(&state, &caller, product.id, AddToCartRequest { count: 4 }).await?;

    let view = resp.result.expect("cart view");
    assert_eq!(view.lines.len(), 1);
    assert_eq!(view.lines[0].count, 7);
    assert_eq!(view.total_price, 700);

    let cart = Carts::find()
        .filter(carts::Column::MemberId.eq(member.id))
        .one(&state.orm)
        .await?
        .expect("cart row");
    assert_eq!(cart.total_price, 700);
    Ok(())
}

#[tokio::test]
async fn total_tracks_every_line_and_edit_to_zero_subtracts() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = create_member(&state, 0).await?;
    let chair = create_product(&state, 100, 10).await?;
    let table = create_product(&state, 250, 10).await?;
    let caller = auth(&member);

    cart_service::add_to_cart(&state, &caller, chair.id, AddToCartRequest { count: 2 }).await?;
    cart_service::add_to_cart(&state, &caller, table.id, AddToCartRequest { count: 1 }).await?;

    let edited = cart_service::edit_cart(
        &state,
        &caller,
        EditCartRequest {
            product_id: chair.id,
            count: 5,
        },
    )
    .await?
    .result
    .expect("cart view");
    assert_eq!(edited.total_price, 5 * 100 + 250);

    let removed = cart_service::edit_cart(
        &state,
        &caller,
        EditCartRequest {
            product_id: chair.id,
            count: 0,
        },
    )
    .await?
    .result
    .expect("cart view");
    assert_eq!(removed.lines.len(), 1);
    assert_eq!(removed.lines[0].product_id, table.id);
    assert_eq!(removed.total_price, 250);

    let cart = Carts::find()
        .filter(carts::Column::MemberId.eq(member.id))
        .one(&state.orm)
        .await?
        .expect("cart row");
    assert_eq!(cart.total_price, 250);
    Ok(())
}

#[tokio::test]
async fn add_rejects_unknown_product_and_zero_count() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = create_member(&state, 0).await?;
    let product = create_product(&state, 100, 10).await?;
    let caller = auth(&member);

    let err = cart_service::add_to_cart(&state, &caller, uuid::Uuid::new_v4(), AddToCartRequest { count: 1 })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound("product")));

    let err = cart_service::add_to_cart(&state, &caller, product.id, AddToCartRequest { count: 0 })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn editing_without_cart_or_line_is_not_found() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = create_member(&state, 0).await?;
    let product = create_product(&state, 100, 10).await?;
    let caller = auth(&member);
    let edit = || EditCartRequest {
        product_id: product.id,
        count: 1,
    };

    let err = cart_service::edit_cart(&state, &caller, edit()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("cart")));

    cart_service::get_cart(&state, &caller).await?;
    let err = cart_service::edit_cart(&state, &caller, edit()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound("cart line")));
    Ok(())
}

#[tokio::test]
async fn get_cart_creates_empty_cart_and_resyncs_drifted_total() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = create_member(&state, 0).await?;
    let caller = auth(&member);

    let empty = cart_service::get_cart(&state, &caller).await?.result.expect("cart view");
    assert!(empty.lines.is_empty());
    assert_eq!(empty.total_price, 0);
    let carts = Carts::find()
        .filter(carts::Column::MemberId.eq(member.id))
        .count(&state.orm)
        .await?;
    assert_eq!(carts, 1);

    let product = create_product(&state, 100, 10).await?;
    cart_service::add_to_cart(&state, &caller, product.id, AddToCartRequest { count: 2 }).await?;

    Products::update_many()
        .col_expr(products::Column::Price, Expr::value(150_i64))
        .filter(products::Column::Id.eq(product.id))
        .exec(&state.orm)
        .await?;

    let view = cart_service::get_cart(&state, &caller).await?.result.expect("cart view");
    assert_eq!(view.total_price, 300);
    assert_eq!(view.lines[0].price, 300);

    let cart = Carts::find()
        .filter(carts::Column::MemberId.eq(member.id))
        .one(&state.orm)
        .await?
        .expect("cart row");
    assert_eq!(cart.total_price, 300);
    assert_eq!(
        CartLines::find()
            .filter(furniture_shop_api::entity::cart_lines::Column::CartId.eq(cart.id))
            .count(&state.orm)
            .await?,
        1
    );
    Ok(())
}

#[tokio::test]
async fn editing_after_a_price_change_keeps_total_consistent() -> anyhow::Result<()> {
    let Some(state) = common::state().await? else {
        return Ok(());
    };
    let member = create_member(&state, 0).await?;
    let caller = auth(&member);
    let chair = create_product(&state, 100, 10).await?;
    let table = create_product(&state, 200, 10).await?;

    cart_service::add_to_cart(&state, &caller, chair.id, AddToCartRequest { count: 1 }).await?;
    cart_service::add_to_cart(&state, &caller, table.id, AddToCartRequest { count: 2 }).await?;

    Products::update_many()
        .col_expr(products::Column::Price, Expr::value(1_000_i64))
        .filter(products::Column::Id.eq(chair.id))
        .exec(&state.orm)
        .await?;

    let edited = cart_service::edit_cart(
        &state,
        &caller,
        EditCartRequest {
            product_id: table.id,
            count: 3,
        },
    )
    .await?
    .result
    .expect("cart view");
    assert_eq!(edited.total_price, 1_000 + 3 * 200);

    let removed = cart_service::edit_cart(
        &state,
        &caller,
        EditCartRequest {
            product_id: chair.id,
            count: 0,
        },
    )
    .await?
    .result
    .expect("cart view");
    assert_eq!(removed.total_price, 600);

    let added = cart_service::add_to_cart(&state, &caller, chair.id, AddToCartRequest { count: 1 })
        .await?
        .result
        .expect("cart view");
    assert_eq!(added.total_price, 1_600);

    let cart = Carts::find()
        .filter(carts::Column::MemberId.eq(member.id))
        .one(&state.orm)
        .await?
        .expect("cart row");
    assert_eq!(cart.total_price, 1_600);
    Ok(())
}
