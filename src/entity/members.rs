use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberGender {
    #[sea_orm(string_value = "FEMALE")]
    Female,
    #[sea_orm(string_value = "MALE")]
    Male,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "STOP")]
    Stop,
    #[sea_orm(string_value = "BAN")]
    Ban,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    #[sea_orm(string_value = "MEMBER")]
    Member,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub phone: String,
    #[sea_orm(unique)]
    pub email: String,
    pub zip_code: String,
    pub city: String,
    pub street: String,
    pub mileage: i64,
    pub gender: MemberGender,
    pub status: MemberStatus,
    pub role: MemberRole,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::carts::Entity")]
    Carts,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
}

impl Related<super::carts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Carts.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_active(&self) -> bool {
        self.status == MemberStatus::Active
    }

    /// Credits mileage awarded by a confirmed payment.
    pub fn earn_mileage(&mut self, amount: i64) -> AppResult<()> {
        if amount < 0 {
            return Err(AppError::validation("mileage award must not be negative"));
        }
        self.mileage = self
            .mileage
            .checked_add(amount)
            .ok_or_else(|| AppError::invalid_state("mileage overflow"))?;
        Ok(())
    }

    /// Takes back mileage awarded by a payment that is being refunded.
    /// The balance never goes below zero.
    pub fn revoke_mileage(&mut self, amount: i64) -> AppResult<()> {
        if amount < 0 {
            return Err(AppError::validation("mileage to revoke must not be negative"));
        }
        if self.mileage < amount {
            return Err(AppError::invalid_state(format!(
                "member holds {} mileage, cannot revoke {}",
                self.mileage, amount
            )));
        }
        self.mileage -= amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn member(mileage: i64) -> Model {
        let now = Utc::now().fixed_offset();
        Model {
            id: Uuid::new_v4(),
            username: "tester".into(),
            password_hash: "hash".into(),
            phone: "01012345678".into(),
            email: "tester@example.com".into(),
            zip_code: "12345".into(),
            city: "Seoul".into(),
            street: "Gangnam-daero 1234".into(),
            mileage,
            gender: MemberGender::Male,
            status: MemberStatus::Active,
            role: MemberRole::Member,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn earn_then_revoke_restores_balance() {
        let mut m = member(7);
        m.earn_mileage(50).unwrap();
        assert_eq!(m.mileage, 57);
        m.revoke_mileage(50).unwrap();
        assert_eq!(m.mileage, 7);
    }

    #[test]
    fn revoke_below_zero_is_rejected_without_change() {
        let mut m = member(10);
        let err = m.revoke_mileage(11).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
        assert_eq!(m.mileage, 10);
    }

    #[test]
    fn inactive_members_are_reported() {
        let mut m = member(0);
        assert!(m.is_active());
        m.status = MemberStatus::Ban;
        assert!(!m.is_active());
    }
}
