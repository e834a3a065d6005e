use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::{max_len, provided, require},
    entity::{
        parse_enum,
        products::{ProductCategory, ProductStatus},
    },
    error::{AppError, AppResult},
    models::ProductSummary,
};

pub const MAX_CODE_LEN: usize = 15;
pub const MAX_NAME_LEN: usize = 20;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterProductRequest {
    pub code: String,
    pub name: String,
    pub category: String,
    pub status: String,
    pub stock: i32,
    pub price: i64,
    pub width: f64,
    pub length: f64,
    pub height: f64,
    pub description: String,
}

/// Register payload with its enums parsed.
pub struct NewProduct {
    pub category: ProductCategory,
    pub status: ProductStatus,
}

impl RegisterProductRequest {
    pub fn validate(&self) -> AppResult<NewProduct> {
        require("code", &self.code)?;
        max_len("code", &self.code, MAX_CODE_LEN)?;
        require("name", &self.name)?;
        max_len("name", &self.name, MAX_NAME_LEN)?;
        require("description", &self.description)?;
        non_negative("stock", i64::from(self.stock))?;
        non_negative("price", self.price)?;
        for (field, value) in [
            ("width", self.width),
            ("length", self.length),
            ("height", self.height),
        ] {
            positive_size(field, value)?;
        }
        Ok(NewProduct {
            category: parse_enum("category", &self.category)?,
            status: parse_enum("status", &self.status)?,
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub stock: Option<i32>,
    pub price: Option<i64>,
    pub width: Option<f64>,
    pub length: Option<f64>,
    pub height: Option<f64>,
    pub description: Option<String>,
}

/// Parsed update; `None` leaves the stored value untouched.
#[derive(Debug, Default, PartialEq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub category: Option<ProductCategory>,
    pub status: Option<ProductStatus>,
    pub stock: Option<i32>,
    pub price: Option<i64>,
    pub size: Option<(f64, f64, f64)>,
    pub description: Option<String>,
}

impl UpdateProductRequest {
    pub fn validate(&self) -> AppResult<ProductChanges> {
        if let Some(name) = provided(&self.name) {
            max_len("name", name, MAX_NAME_LEN)?;
        }
        if let Some(stock) = self.stock {
            non_negative("stock", i64::from(stock))?;
        }
        if let Some(price) = self.price {
            non_negative("price", price)?;
        }
        let size = match (self.width, self.length, self.height) {
            (Some(w), Some(l), Some(h)) => {
                positive_size("width", w)?;
                positive_size("length", l)?;
                positive_size("height", h)?;
                Some((w, l, h))
            }
            _ => None,
        };

        Ok(ProductChanges {
            name: provided(&self.name).map(str::to_string),
            category: provided(&self.category)
                .map(|raw| parse_enum("category", raw))
                .transpose()?,
            status: provided(&self.status)
                .map(|raw| parse_enum("status", raw))
                .transpose()?,
            stock: self.stock,
            price: self.price,
            size,
            description: provided(&self.description).map(str::to_string),
        })
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<ProductSummary>)]
    pub items: Vec<ProductSummary>,
}

/// Catalog search filters after parsing. Text filters match substrings.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ProductFilter {
    pub code: Option<String>,
    pub name: Option<String>,
    pub category: Option<ProductCategory>,
    pub status: Option<ProductStatus>,
}

fn non_negative(field: &str, value: i64) -> AppResult<()> {
    if value < 0 {
        return Err(AppError::validation(format!("{field} must not be negative")));
    }
    Ok(())
}

fn positive_size(field: &str, value: f64) -> AppResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(AppError::validation(format!("{field} must be positive")));
    }
    Ok(())
}
