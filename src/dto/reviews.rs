use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::require,
    error::{AppError, AppResult},
    models::Review,
};

pub const MAX_RATE: f64 = 5.0;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewRequest {
    pub comment: String,
    /// 0 to 5.
    pub rate: f64,
}

impl ReviewRequest {
    pub fn validate(&self) -> AppResult<()> {
        require("comment", &self.comment)?;
        if !(0.0..=MAX_RATE).contains(&self.rate) {
            return Err(AppError::validation(format!(
                "rate must be between 0 and {MAX_RATE}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ReviewList {
    #[schema(value_type = Vec<Review>)]
    pub items: Vec<Review>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_must_stay_in_range() {
        for (rate, ok) in [(0.0, true), (5.0, true), (4.5, true), (-0.1, false), (5.5, false)] {
            let req = ReviewRequest {
                comment: "good".into(),
                rate,
            };
            assert_eq!(req.validate().is_ok(), ok, "rate {rate}");
        }
    }
}
