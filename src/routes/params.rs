use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    dto::{products::ProductFilter, provided},
    entity::parse_enum,
    error::AppResult,
};

pub const DEFAULT_PER_PAGE: i64 = 10;

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub code: Option<String>,
    pub name: Option<String>,
    /// `CHAIR`, `TABLE`, `CLOSET` or `BED`.
    pub category: Option<String>,
    /// `SELLING`, `STOP` or `READY`.
    pub status: Option<String>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }

    /// Parses the enum filters; unknown values are a validation error.
    pub fn filter(&self) -> AppResult<ProductFilter> {
        Ok(ProductFilter {
            code: provided(&self.code).map(str::to_string),
            name: provided(&self.name).map(str::to_string),
            category: provided(&self.category)
                .map(|raw| parse_enum("category", raw))
                .transpose()?,
            status: provided(&self.status)
                .map(|raw| parse_enum("status", raw))
                .transpose()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entity::products::ProductCategory, error::AppError};

    #[test]
    fn pagination_defaults_to_ten_per_page() {
        assert_eq!(Pagination::default().normalize(), (1, 10, 0));
        let p = Pagination {
            page: Some(3),
            per_page: Some(500),
        };
        assert_eq!(p.normalize(), (3, 100, 200));
    }

    #[test]
    fn product_filter_parses_known_category() {
        let query = ProductQuery {
            category: Some("bed".into()),
            name: Some("  ".into()),
            ..Default::default()
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.category, Some(ProductCategory::Bed));
        assert_eq!(filter.name, None);
    }

    #[test]
    fn product_filter_rejects_unknown_status() {
        let query = ProductQuery {
            status: Some("SOLD_OUT".into()),
            ..Default::default()
        };
        assert!(matches!(query.filter(), Err(AppError::Validation(_))));
    }
}
