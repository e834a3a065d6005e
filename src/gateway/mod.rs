//! Payment gateway boundary.
//!
//! The gateway is the source of truth for money movement. Local state only
//! changes after it confirms the expected outcome.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod iamport;

/// Gateway-side view of a payment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayPayment {
    pub imp_uid: String,
    #[serde(default)]
    pub merchant_uid: Option<String>,
    #[serde(default)]
    pub amount: i64,
    pub status: String,
    #[serde(default)]
    pub pay_method: Option<String>,
}

impl GatewayPayment {
    pub fn is_paid(&self) -> bool {
        self.status.eq_ignore_ascii_case("paid")
    }
}

/// Full refund of a payment. Blank optional fields are never forwarded.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CancelRequest {
    pub imp_uid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_bank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_holder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_account: Option<String>,
}

impl CancelRequest {
    pub fn new(imp_uid: impl Into<String>) -> Self {
        Self {
            imp_uid: imp_uid.into(),
            ..Self::default()
        }
    }

    pub fn reason(mut self, reason: Option<String>) -> Self {
        self.reason = non_blank(reason);
        self
    }

    pub fn refund_account(
        mut self,
        bank: Option<String>,
        holder: Option<String>,
        account: Option<String>,
    ) -> Self {
        self.refund_bank = non_blank(bank);
        self.refund_holder = non_blank(holder);
        self.refund_account = non_blank(account);
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gateway answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("gateway rejected the request ({code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("gateway authentication failed: {0}")]
    Auth(String),

    #[error("invalid gateway url: {0}")]
    InvalidUrl(String),
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Current gateway status of a payment. `None` when the gateway answered without a payment.
    async fn find_payment(&self, imp_uid: &str) -> Result<Option<GatewayPayment>, GatewayError>;

    /// Requests a full refund. `None` when the gateway answered without a payment.
    async fn cancel_payment(
        &self,
        request: CancelRequest,
    ) -> Result<Option<GatewayPayment>, GatewayError>;
}
