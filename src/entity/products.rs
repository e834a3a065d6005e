use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductCategory {
    #[sea_orm(string_value = "CHAIR")]
    Chair,
    #[sea_orm(string_value = "TABLE")]
    Table,
    #[sea_orm(string_value = "CLOSET")]
    Closet,
    #[sea_orm(string_value = "BED")]
    Bed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductStatus {
    #[sea_orm(string_value = "SELLING")]
    Selling,
    #[sea_orm(string_value = "STOP")]
    Stop,
    #[sea_orm(string_value = "READY")]
    Ready,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
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
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_lines::Entity")]
    CartLines,
    #[sea_orm(has_many = "super::order_lines::Entity")]
    OrderLines,
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
}

impl Related<super::cart_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartLines.def()
    }
}

impl Related<super::order_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Price of `count` units at the current list price.
    pub fn line_price(&self, count: i32) -> AppResult<i64> {
        self.price
            .checked_mul(i64::from(count))
            .ok_or_else(|| AppError::validation("line price overflow"))
    }

    /// Order-time check. Stock is not reserved here, only compared.
    pub fn ensure_orderable(&self, count: i32) -> AppResult<()> {
        if self.status != ProductStatus::Selling {
            return Err(AppError::NotSelling);
        }
        if count > self.stock {
            return Err(AppError::InsufficientStock);
        }
        Ok(())
    }

    /// Applies a confirmed sale: stock goes down, sell count goes up.
    pub fn record_sale(&mut self, count: i32) -> AppResult<()> {
        if count <= 0 {
            return Err(AppError::validation("sold count must be positive"));
        }
        if self.stock < count {
            return Err(AppError::InsufficientStock);
        }
        self.stock -= count;
        self.sell_count += i64::from(count);
        Ok(())
    }

    /// Exact inverse of [`Model::record_sale`], used by refunds.
    pub fn revert_sale(&mut self, count: i32) -> AppResult<()> {
        if count <= 0 {
            return Err(AppError::validation("refunded count must be positive"));
        }
        if self.sell_count < i64::from(count) {
            return Err(AppError::invalid_state(format!(
                "product {} has sold {} units, cannot revert {}",
                self.code, self.sell_count, count
            )));
        }
        self.stock = self
            .stock
            .checked_add(count)
            .ok_or_else(|| AppError::invalid_state("stock overflow"))?;
        self.sell_count -= i64::from(count);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Utc;

    pub(crate) fn product(price: i64, stock: i32) -> Model {
        let now = Utc::now().fixed_offset();
        Model {
            id: Uuid::new_v4(),
            code: "CH-0001".into(),
            name: "Oak chair".into(),
            category: ProductCategory::Chair,
            status: ProductStatus::Selling,
            stock,
            price,
            width: 45.0,
            length: 50.0,
            height: 90.0,
            description: "Solid oak".into(),
            sell_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn orderable_checks_status_before_stock() {
        let mut p = product(100, 1);
        p.status = ProductStatus::Stop;
        assert!(matches!(p.ensure_orderable(5), Err(AppError::NotSelling)));
        p.status = ProductStatus::Selling;
        assert!(matches!(p.ensure_orderable(5), Err(AppError::InsufficientStock)));
        assert!(p.ensure_orderable(1).is_ok());
    }

    #[test]
    fn sale_and_revert_are_symmetric() {
        let mut p = product(100, 10);
        p.record_sale(5).unwrap();
        assert_eq!((p.stock, p.sell_count), (5, 5));
        p.revert_sale(5).unwrap();
        assert_eq!((p.stock, p.sell_count), (10, 0));
    }

    #[test]
    fn sale_never_drives_stock_negative() {
        let mut p = product(100, 3);
        assert!(matches!(p.record_sale(4), Err(AppError::InsufficientStock)));
        assert_eq!((p.stock, p.sell_count), (3, 0));
    }

    #[test]
    fn revert_without_matching_sale_is_rejected() {
        let mut p = product(100, 3);
        assert!(matches!(p.revert_sale(1), Err(AppError::InvalidState(_))));
        assert_eq!((p.stock, p.sell_count), (3, 0));
    }

    #[test]
    fn line_price_multiplies_count() {
        assert_eq!(product(100, 10).line_price(5).unwrap(), 500);
    }
}
