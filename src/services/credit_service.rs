//! Payment capture and refund.
//!
//! Both flows ask the gateway first and only then touch local state. Every
//! counter a payment moves (stock, sell count, mileage) is moved back by the
//! exact inverse on refund.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::sea_query::LockType;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait,
    IntoActiveModel, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::credit::{
        CreditRequest, MerchantUid, PaymentInfo, PaymentKey, PaymentResult, RefundRequest,
        validate_imp_uid,
    },
    entity::{
        Credits, Members, OrderLines, Orders, Products,
        credits::{self, mileage_for},
        members, order_lines,
        orders::{self, OrderStatus},
        products,
    },
    error::{AppError, AppResult},
    gateway::{CancelRequest, GatewayPayment},
    middleware::auth::AuthMember,
    response::ApiResponse,
    services::order_service::check_right_order,
    state::AppState,
};

pub fn new_merchant_uid(now: DateTime<Utc>) -> String {
    format!("order_{}_{}", now.format("%Y%m%d"), Uuid::new_v4())
}

/// Order, lines and products of a payment, all locked for update.
struct LockedOrder {
    order: orders::Model,
    lines: Vec<order_lines::Model>,
    products: HashMap<Uuid, products::Model>,
}

async fn lock_order_lines(
    txn: &DatabaseTransaction,
    order: orders::Model,
) -> AppResult<LockedOrder> {
    let lines = OrderLines::find()
        .filter(order_lines::Column::OrderId.eq(order.id))
        .all(txn)
        .await?;
    let ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let products = Products::find()
        .filter(products::Column::Id.is_in(ids))
        .lock(LockType::Update)
        .all(txn)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();
    Ok(LockedOrder {
        order,
        lines,
        products,
    })
}

async fn lock_member<C: ConnectionTrait>(conn: &C, member_id: Uuid) -> AppResult<members::Model> {
    Members::find_by_id(member_id)
        .lock(LockType::Update)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound("member"))
}

impl LockedOrder {
    /// Applies `f` to the product of every line, in memory.
    fn apply_to_products(
        &mut self,
        mut f: impl FnMut(&mut products::Model, i32) -> AppResult<()>,
    ) -> AppResult<()> {
        for line in &self.lines {
            let product = self
                .products
                .get_mut(&line.product_id)
                .ok_or(AppError::NotFound("product"))?;
            f(product, line.count)?;
        }
        Ok(())
    }

    async fn save(&self, txn: &DatabaseTransaction, status: OrderStatus, now: DateTime<FixedOffset>) -> AppResult<()> {
        for product in self.products.values() {
            let mut active = product.clone().into_active_model();
            active.stock = Set(product.stock);
            active.sell_count = Set(product.sell_count);
            active.updated_at = Set(now);
            active.update(txn).await?;
        }
        let mut order = self.order.clone().into_active_model();
        order.status = Set(status);
        order.updated_at = Set(now);
        order.update(txn).await?;
        Ok(())
    }
}

async fn save_mileage(txn: &DatabaseTransaction, member: &members::Model, now: DateTime<FixedOffset>) -> AppResult<()> {
    let mut active = member.clone().into_active_model();
    active.mileage = Set(member.mileage);
    active.updated_at = Set(now);
    active.update(txn).await?;
    Ok(())
}

/// Fetches the gateway's view of a payment and requires it to be paid.
async fn paid_payment(state: &AppState, imp_uid: &str, failure: fn() -> AppError) -> AppResult<GatewayPayment> {
    let payment = match state.gateway.find_payment(imp_uid).await {
        Ok(Some(payment)) => payment,
        Ok(None) => {
            tracing::warn!(imp_uid, "gateway returned no payment");
            return Err(failure());
        }
        Err(err) => {
            tracing::warn!(imp_uid, error = %err, "gateway lookup failed");
            return Err(failure());
        }
    };
    if !payment.is_paid() {
        tracing::info!(imp_uid, status = %payment.status, "payment is not in paid state");
        return Err(failure());
    }
    Ok(payment)
}

pub async fn create_and_verify_payment(
    state: &AppState,
    member: &AuthMember,
    order_id: Uuid,
    payload: CreditRequest,
) -> AppResult<ApiResponse<PaymentResult>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let order = Orders::find_by_id(order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("order"))?;
    order.ensure_payable_by(member.member_id)?;

    let payment = paid_payment(state, &payload.imp_uid, || AppError::FailPayment).await?;
    if payment.amount != order.total_price || payload.amount != order.total_price {
        tracing::warn!(
            %order_id,
            order_total = order.total_price,
            claimed = payload.amount,
            gateway_amount = payment.amount,
            "payment amount does not match the order"
        );
        return Err(AppError::FailPayment);
    }

    let next = order.status.transition(OrderStatus::Finish)?;
    let mut locked = lock_order_lines(&txn, order).await?;
    locked.apply_to_products(|product, count| product.record_sale(count))?;

    let mileage = mileage_for(payload.amount)?;
    let mut buyer = lock_member(&txn, member.member_id).await?;
    buyer.earn_mileage(mileage)?;

    let now = Utc::now().fixed_offset();
    let credit = credits::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_id: Set(order_id),
        amount: Set(payload.amount),
        mileage: Set(mileage),
        merchant_uid: Set(payload.merchant_uid.trim().to_string()),
        imp_uid: Set(payload.imp_uid.trim().to_string()),
        pay_method: Set(payload.pay_method.trim().to_string()),
        paid_at: Set(now),
        cancelled_at: Set(None),
    }
    .insert(&txn)
    .await
    .map_err(|err| AppError::from_unique(err, "Payment is already recorded"))?;

    locked.save(&txn, next, now).await?;
    save_mileage(&txn, &buyer, now).await?;
    txn.commit().await?;

    tracing::info!(
        %order_id,
        imp_uid = %credit.imp_uid,
        amount = credit.amount,
        "payment captured"
    );
    audit::record(
        &state.pool,
        Some(member.member_id),
        "payment_complete",
        "credits",
        serde_json::json!({ "order_id": order_id, "imp_uid": credit.imp_uid, "amount": credit.amount }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment completed",
        PaymentResult {
            imp_uid: credit.imp_uid,
            amount: credit.amount,
            mileage: credit.mileage,
        },
        None,
    ))
}

/// Refunds a captured payment. Every reversal is checked before the gateway is
/// asked to cancel, so a refused reversal never reaches the gateway.
pub async fn cancel_payment(
    state: &AppState,
    member: &AuthMember,
    imp_uid: &str,
    payload: RefundRequest,
) -> AppResult<ApiResponse<PaymentResult>> {
    validate_imp_uid(imp_uid)?;

    let txn = state.orm.begin().await?;
    let credit = Credits::find()
        .filter(credits::Column::ImpUid.eq(imp_uid))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("credit"))?;
    let order = Orders::find_by_id(credit.order_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound("order"))?;
    if order.member_id != member.member_id && !member.is_admin() {
        return Err(AppError::Forbidden);
    }

    let next = order.status.transition(OrderStatus::Cancel)?;
    let buyer_id = order.member_id;
    let mut locked = lock_order_lines(&txn, order).await?;
    locked.apply_to_products(|product, count| product.revert_sale(count))?;
    let mut buyer = lock_member(&txn, buyer_id).await?;
    buyer.revoke_mileage(credit.mileage)?;

    paid_payment(state, imp_uid, || AppError::InvalidPayment).await?;

    let request = CancelRequest::new(imp_uid)
        .reason(payload.reason)
        .refund_account(payload.refund_bank, payload.refund_holder, payload.refund_account);
    match state.gateway.cancel_payment(request).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(imp_uid, "gateway returned no cancellation");
            return Err(AppError::InvalidPayment);
        }
        Err(err) => {
            tracing::warn!(imp_uid, error = %err, "gateway cancel failed");
            return Err(AppError::InvalidPayment);
        }
    }

    let now = Utc::now().fixed_offset();
    let mut cancelled = credit.clone().into_active_model();
    cancelled.cancelled_at = Set(Some(now));
    cancelled.update(&txn).await?;
    locked.save(&txn, next, now).await?;
    save_mileage(&txn, &buyer, now).await?;
    txn.commit().await.map_err(|err| {
        tracing::error!(imp_uid, error = %err, "refund cancelled at gateway but local commit failed");
        err
    })?;

    tracing::info!(imp_uid, order_id = %credit.order_id, "payment refunded");
    audit::record(
        &state.pool,
        Some(member.member_id),
        "payment_refund",
        "credits",
        serde_json::json!({ "order_id": credit.order_id, "imp_uid": imp_uid }),
    )
    .await;

    Ok(ApiResponse::success(
        "Payment cancelled",
        PaymentResult {
            imp_uid: credit.imp_uid,
            amount: credit.amount,
            mileage: credit.mileage,
        },
        None,
    ))
}

pub async fn payment_info(
    state: &AppState,
    member: &AuthMember,
    order_id: Uuid,
) -> AppResult<ApiResponse<PaymentInfo>> {
    let order = check_right_order(&state.orm, member.member_id, order_id).await?;
    let buyer = Members::find_by_id(member.member_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound("member"))?;

    let info = PaymentInfo {
        product_name: format!("order_{}", order.id),
        amount: order.total_price,
        buyer_name: buyer.username,
        buyer_email: buyer.email,
        buyer_phone: buyer.phone,
        buyer_address: format!("{} {}", buyer.city, buyer.street),
        buyer_postcode: buyer.zip_code,
    };
    Ok(ApiResponse::success("Payment info", info, None))
}

pub fn merchant_uid() -> ApiResponse<MerchantUid> {
    ApiResponse::success(
        "Merchant uid",
        MerchantUid {
            merchant_uid: new_merchant_uid(Utc::now()),
        },
        None,
    )
}

/// The gateway key the checkout page initialises its widget with.
pub fn payment_key(state: &AppState) -> AppResult<ApiResponse<PaymentKey>> {
    if state.checkout_key.is_empty() {
        tracing::warn!("payment key requested but none is configured");
        return Err(AppError::NotFound("payment key"));
    }
    Ok(ApiResponse::success(
        "Payment key",
        PaymentKey {
            key: state.checkout_key.to_string(),
        },
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn merchant_uid_carries_date_and_uuid() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 12, 0, 0).unwrap();
        let uid = new_merchant_uid(now);
        let rest = uid.strip_prefix("order_20240309_").unwrap();
        assert!(Uuid::parse_str(rest).is_ok());
    }
}
