use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

/// `READY -> FINISH` on payment, `FINISH -> CANCEL` on refund. Nothing else.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[sea_orm(string_value = "READY")]
    Ready,
    #[sea_orm(string_value = "FINISH")]
    Finish,
    #[sea_orm(string_value = "CANCEL")]
    Cancel,
}

impl OrderStatus {
    pub fn transition(self, next: OrderStatus) -> AppResult<OrderStatus> {
        match (self, next) {
            (OrderStatus::Ready, OrderStatus::Finish) | (OrderStatus::Finish, OrderStatus::Cancel) => {
                Ok(next)
            }
            (from, to) => Err(AppError::invalid_state(format!(
                "order cannot move from {from:?} to {to:?}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub member_id: Uuid,
    pub total_price: i64,
    pub status: OrderStatus,
    pub zip_code: String,
    pub city: String,
    pub street: String,
    pub receiver: String,
    pub phone: String,
    pub memo: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::members::Entity",
        from = "Column::MemberId",
        to = "super::members::Column::Id"
    )]
    Members,
    #[sea_orm(has_many = "super::order_lines::Entity")]
    OrderLines,
    #[sea_orm(has_one = "super::credits::Entity")]
    Credits,
}

impl Related<super::members::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::order_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl Related<super::credits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credits.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Ownership and lifecycle guard shared by checkout-page checks and payment.
    pub fn ensure_payable_by(&self, member_id: Uuid) -> AppResult<()> {
        if self.member_id != member_id {
            return Err(AppError::Forbidden);
        }
        if self.status != OrderStatus::Ready {
            return Err(AppError::invalid_state("order is not awaiting payment"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_transitions() {
        assert_eq!(
            OrderStatus::Ready.transition(OrderStatus::Finish).unwrap(),
            OrderStatus::Finish
        );
        assert_eq!(
            OrderStatus::Finish.transition(OrderStatus::Cancel).unwrap(),
            OrderStatus::Cancel
        );
    }

    #[test]
    fn terminal_and_skipping_transitions_are_rejected() {
        for (from, to) in [
            (OrderStatus::Ready, OrderStatus::Cancel),
            (OrderStatus::Finish, OrderStatus::Finish),
            (OrderStatus::Finish, OrderStatus::Ready),
            (OrderStatus::Cancel, OrderStatus::Finish),
            (OrderStatus::Cancel, OrderStatus::Ready),
        ] {
            assert!(
                matches!(from.transition(to), Err(AppError::InvalidState(_))),
                "{from:?} -> {to:?}"
            );
        }
    }
}
