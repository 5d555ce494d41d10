//! Game (catalog entry) model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Lowest price per day accepted from the create/update forms
pub const MIN_PRICE_PER_DAY: Decimal = Decimal::ONE;

/// Highest price per day a `NUMERIC(6, 2)` column holds
pub const MAX_PRICE_PER_DAY: Decimal = Decimal::from_parts(999_999, 0, 0, false, 2);

/// Default price per day (50.00)
pub fn default_price_per_day() -> Decimal {
    Decimal::new(5000, 2)
}

/// Game record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Game {
    pub id: i32,
    pub title: String,
    pub description: String,
    /// Image file reference (path or URL)
    pub image: Option<String>,
    pub available: bool,
    pub price_per_day: Decimal,
    /// User who listed the game
    pub added_by: Option<i32>,
    pub created_at: DateTime<Utc>,
}

/// Create game request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateGame {
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(max = 255))]
    pub image: Option<String>,
    pub available: Option<bool>,
    /// Defaults to 50.00
    pub price_per_day: Option<Decimal>,
}

/// Update game request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGame {
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters"))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 255))]
    pub image: Option<String>,
    pub available: Option<bool>,
    pub price_per_day: Option<Decimal>,
}

/// Availability toggle request
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetAvailability {
    pub available: bool,
}

/// Price rule for the create/update forms: between 1 and 9999.99, at most two decimals
pub fn validate_price(price: Option<Decimal>) -> AppResult<()> {
    match price {
        Some(p) if p < MIN_PRICE_PER_DAY => Err(AppError::Validation(format!(
            "Price per day must be at least {}",
            MIN_PRICE_PER_DAY
        ))),
        Some(p) if p > MAX_PRICE_PER_DAY => Err(AppError::Validation(format!(
            "Price per day must be at most {}",
            MAX_PRICE_PER_DAY
        ))),
        Some(p) if p.normalize().scale() > 2 => Err(AppError::Validation(
            "Price per day must have at most two decimal places".to_string(),
        )),
        _ => Ok(()),
    }
}
