use sea_orm::entity::prelude::*;

use crate::error::{AppError, AppResult};

/// Mileage rate applied to captured amounts, in percent.
pub const MILEAGE_PERCENT: i64 = 10;

/// Mileage earned for a captured amount, truncated toward zero.
pub fn mileage_for(amount: i64) -> AppResult<i64> {
    amount
        .checked_mul(MILEAGE_PERCENT)
        .map(|scaled| scaled / 100)
        .ok_or_else(|| AppError::validation("amount is too large"))
}

/// Payment ledger entry for an order. Never deleted; a refund only stamps `cancelled_at`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "credits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub order_id: Uuid,
    pub amount: i64,
    pub mileage: i64,
    #[sea_orm(unique)]
    pub merchant_uid: String,
    #[sea_orm(unique)]
    pub imp_uid: String,
    pub pay_method: String,
    pub paid_at: DateTimeWithTimeZone,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::orders::Entity",
        from = "Column::OrderId",
        to = "super::orders::Column::Id"
    )]
    Orders,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
