use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    members::{self, MemberGender, MemberRole},
    order_lines,
    orders::{self, OrderStatus},
    products::{self, ProductCategory, ProductStatus},
    reviews,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MemberInfo {
    pub id: Uuid,
    pub username: String,
    pub phone: String,
    pub email: String,
    pub zip_code: String,
    pub city: String,
    pub street: String,
    pub gender: MemberGender,
    pub mileage: i64,
    pub role: MemberRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<members::Model> for MemberInfo {
    fn from(model: members::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            phone: model.phone,
            email: model.email,
            zip_code: model.zip_code,
            city: model.city,
            street: model.street,
            gender: model.gender,
            mileage: model.mileage,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductDetail {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub category: ProductCategory,
    pub status: ProductStatus,
    pub stock: i32,
    pub price: i64,
    pub width: f64,
    pub length: f64,
    pub height: f64,
    pub description: String,
    pub sell_count: i64,
    pub created_at: DateTime<Utc>,
}

impl From<products::Model> for ProductDetail {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            category: model.category,
            status: model.status,
            stock: model.stock,
            price: model.price,
            width: model.width,
            length: model.length,
            height: model.height,
            description: model.description,
            sell_count: model.sell_count,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub status: ProductStatus,
    pub category: ProductCategory,
    pub price: i64,
}

impl From<products::Model> for ProductSummary {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            code: model.code,
            name: model.name,
            status: model.status,
            category: model.category,
            price: model.price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartLineView {
    pub product_id: Uuid,
    pub product_code: String,
    pub product_name: String,
    pub count: i32,
    /// `count * current price`.
    pub price: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    pub id: Uuid,
    pub total_price: i64,
    pub status: OrderStatus,
    pub zip_code: String,
    pub city: String,
    pub street: String,
    pub receiver: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<orders::Model> for OrderSummary {
    fn from(model: orders::Model) -> Self {
        Self {
            id: model.id,
            total_price: model.total_price,
            status: model.status,
            zip_code: model.zip_code,
            city: model.city,
            street: model.street,
            receiver: model.receiver,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderLineView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_code: String,
    pub product_name: String,
    pub unit_price: i64,
    pub count: i32,
    pub total_price: i64,
}

impl OrderLineView {
    pub fn new(line: order_lines::Model, product: &products::Model) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            product_code: product.code.clone(),
            product_name: product.name.clone(),
            unit_price: line.unit_price,
            count: line.count,
            total_price: line.total_price,
        }
    }
}

/// Payment facts attached to a paid or refunded order.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentSummary {
    pub amount: i64,
    pub mileage: i64,
    pub pay_method: String,
    pub imp_uid: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderDetail {
    pub id: Uuid,
    pub status: OrderStatus,
    pub total_price: i64,
    pub lines: Vec<OrderLineView>,
    pub receiver: String,
    pub phone: String,
    pub zip_code: String,
    pub city: String,
    pub street: String,
    pub memo: Option<String>,
    pub payment: Option<PaymentSummary>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub member_id: Uuid,
    pub comment: String,
    pub rate: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<reviews::Model> for Review {
    fn from(model: reviews::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            member_id: model.member_id,
            comment: model.comment,
            rate: model.rate,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}
