use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::{provided, require},
    error::AppResult,
    models::OrderSummary,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SingleOrderRequest {
    pub count: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderCreated {
    pub order_id: Uuid,
    pub total_price: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDeliveryRequest {
    pub receiver: String,
    pub phone: String,
    pub zip_code: String,
    pub city: String,
    pub street: String,
    pub memo: Option<String>,
}

impl UpdateDeliveryRequest {
    pub fn validate(&self) -> AppResult<()> {
        require("receiver", &self.receiver)?;
        require("phone", &self.phone)?;
        require("zip_code", &self.zip_code)?;
        require("city", &self.city)?;
        require("street", &self.street)
    }

    pub fn memo(&self) -> Option<String> {
        provided(&self.memo).map(str::to_string)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<OrderSummary>)]
    pub items: Vec<OrderSummary>,
}
