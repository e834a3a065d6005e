use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::require,
    error::{AppError, AppResult},
};

/// What the checkout page received back from the gateway SDK.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreditRequest {
    pub amount: i64,
    pub merchant_uid: String,
    pub imp_uid: String,
    pub pay_method: String,
}

impl CreditRequest {
    pub fn validate(&self) -> AppResult<()> {
        if self.amount < 0 {
            return Err(AppError::validation("amount must not be negative"));
        }
        require("merchant_uid", &self.merchant_uid)?;
        validate_imp_uid(&self.imp_uid)?;
        require("pay_method", &self.pay_method)
    }
}

/// Gateway transaction ids are ASCII letters, digits and underscores.
pub fn validate_imp_uid(imp_uid: &str) -> AppResult<()> {
    require("imp_uid", imp_uid)?;
    let valid = imp_uid
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(AppError::validation(
            "imp_uid may only contain letters, digits and underscores",
        ));
    }
    Ok(())
}

/// Optional refund details; blank fields are dropped before reaching the gateway.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RefundRequest {
    pub reason: Option<String>,
    pub refund_bank: Option<String>,
    pub refund_holder: Option<String>,
    pub refund_account: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentResult {
    pub imp_uid: String,
    pub amount: i64,
    pub mileage: i64,
}

/// Data the checkout page hands to the gateway SDK.
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentInfo {
    pub product_name: String,
    pub amount: i64,
    pub buyer_name: String,
    pub buyer_email: String,
    pub buyer_phone: String,
    pub buyer_address: String,
    pub buyer_postcode: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MerchantUid {
    pub merchant_uid: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentKey {
    pub key: String,
}
