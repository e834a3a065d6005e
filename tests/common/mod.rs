#![allow(dead_code)]

use std::sync::{Arc, LazyLock};

use furniture_shop_api::{
    config::JwtConfig,
    db::{create_orm_conn, run_migrations},
    dto::credit::CreditRequest,
    entity::{
        Members, Orders, Products,
        members::{self, MemberGender, MemberRole, MemberStatus},
        orders,
        products::{self, ProductCategory, ProductStatus},
    },
    gateway::{GatewayPayment, MockPaymentGateway},
    middleware::auth::AuthMember,
    state::AppState,
};
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use tokio::sync::OnceCell;
use uuid::Uuid;

static MIGRATED: LazyLock<OnceCell<()>> = LazyLock::new(OnceCell::new);

pub fn database_url() -> Option<String> {
    match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
        Ok(url) => Some(url),
        Err(_) => {
            eprintln!("Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration tests.");
            None
        }
    }
}

/// App state backed by the test database and the given gateway double.
/// `None` when no database is configured.
pub async fn state_with(gateway: MockPaymentGateway) -> anyhow::Result<Option<AppState>> {
    let Some(url) = database_url() else {
        return Ok(None);
    };

    MIGRATED
        .get_or_try_init(|| async {
            let conn = create_orm_conn(&url).await?;
            run_migrations(&conn).await?;
            anyhow::Ok(())
        })
        .await?;

    let orm = create_orm_conn(&url).await?;
    let jwt = JwtConfig {
        secret: "test-secret".into(),
        expiry_hours: 1,
        refresh_expiry_hours: 24,
    };
    Ok(Some(AppState::new(orm, jwt, Arc::new(gateway))))
}

pub async fn state() -> anyhow::Result<Option<AppState>> {
    state_with(MockPaymentGateway::new()).await
}

fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..12].to_string()
}

pub async fn create_member(state: &AppState, mileage: i64) -> anyhow::Result<members::Model> {
    let member = members::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set("tester".into()),
        password_hash: Set("not-a-real-hash".into()),
        phone: Set("01012345678".into()),
        email: Set(format!("{}@t.io", short_id())),
        zip_code: Set("06236".into()),
        city: Set("Seoul".into()),
        street: Set("Teheran-ro 1".into()),
        mileage: Set(mileage),
        gender: Set(MemberGender::Male),
        status: Set(MemberStatus::Active),
        role: Set(MemberRole::Member),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(member)
}

pub async fn create_product(state: &AppState, price: i64, stock: i32) -> anyhow::Result<products::Model> {
    create_product_with_status(state, price, stock, ProductStatus::Selling).await
}

pub async fn create_product_with_status(
    state: &AppState,
    price: i64,
    stock: i32,
    status: ProductStatus,
) -> anyhow::Result<products::Model> {
    let product = products::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(format!("T{}", short_id())),
        name: Set("Test chair".into()),
        category: Set(ProductCategory::Chair),
        status: Set(status),
        stock: Set(stock),
        price: Set(price),
        width: Set(45.0),
        length: Set(50.0),
        height: Set(90.0),
        description: Set("For tests".into()),
        sell_count: Set(0),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(product)
}

pub fn auth(member: &members::Model) -> AuthMember {
    AuthMember {
        member_id: member.id,
        email: member.email.clone(),
        role: member.role,
    }
}

pub fn admin(member: &members::Model) -> AuthMember {
    AuthMember {
        role: MemberRole::Admin,
        ..auth(member)
    }
}

pub fn payment(imp_uid: &str, amount: i64, status: &str) -> GatewayPayment {
    GatewayPayment {
        imp_uid: imp_uid.to_string(),
        merchant_uid: None,
        amount,
        status: status.to_string(),
        pay_method: Some("card".into()),
    }
}

pub fn new_imp_uid() -> String {
    format!("imp_{}", short_id())
}

pub fn credit_request(amount: i64, imp_uid: &str) -> CreditRequest {
    CreditRequest {
        amount,
        merchant_uid: format!("order_test_{}", Uuid::new_v4()),
        imp_uid: imp_uid.to_string(),
        pay_method: "card".into(),
    }
}

pub async fn reload_product(state: &AppState, id: Uuid) -> anyhow::Result<products::Model> {
    Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product {id} disappeared"))
}

pub async fn reload_member(state: &AppState, id: Uuid) -> anyhow::Result<members::Model> {
    Members::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("member {id} disappeared"))
}

pub async fn find_order(state: &AppState, id: Uuid) -> anyhow::Result<Option<orders::Model>> {
    Ok(Orders::find_by_id(id).one(&state.orm).await?)
}
