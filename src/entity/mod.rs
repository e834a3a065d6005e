use sea_orm::ActiveEnum;

use crate::error::{AppError, AppResult};

pub mod audit_logs;
pub mod cart_lines;
pub mod carts;
pub mod credits;
pub mod members;
pub mod order_lines;
pub mod orders;
pub mod products;
pub mod refresh_tokens;
pub mod reviews;
pub mod revoked_tokens;

pub use audit_logs::Entity as AuditLogs;
pub use cart_lines::Entity as CartLines;
pub use carts::Entity as Carts;
pub use credits::Entity as Credits;
pub use members::Entity as Members;
pub use order_lines::Entity as OrderLines;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use refresh_tokens::Entity as RefreshTokens;
pub use reviews::Entity as Reviews;
pub use revoked_tokens::Entity as RevokedTokens;

/// Parses a string-backed enum at the request boundary, case-insensitively.
pub fn parse_enum<E>(field: &str, raw: &str) -> AppResult<E>
where
    E: ActiveEnum<Value = String>,
{
    let normalized = raw.trim().to_ascii_uppercase();
    E::try_from_value(&normalized).map_err(|_| {
        AppError::validation(format!(
            "{field} must be one of {}",
            E::values().join(", ")
        ))
    })
}
