use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::CartLineView;

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub count: i32,
}

/// `count = 0` removes the line.
#[derive(Debug, Deserialize, ToSchema)]
pub struct EditCartRequest {
    pub product_id: Uuid,
    pub count: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total_price: i64,
}

impl CartView {
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            total_price: 0,
        }
    }
}
