//! Rental model and the rental state machine.
//!
//! Transitions are pure functions over a [`Rental`] value: they take the
//! current time and the game's price as arguments and return the next record,
//! leaving persistence to the repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::game::Game;
use crate::error::{AppError, AppResult};

/// Payment method recorded when the client does not supply one
pub const DEFAULT_PAYMENT_METHOD: &str = "Mock Method";

/// Approval status of a rental
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Pending,
    Approved,
    Denied,
    /// Game handed back; only reachable from `Approved`
    Returned,
}

impl RentalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Approved => "approved",
            RentalStatus::Denied => "denied",
            RentalStatus::Returned => "returned",
        }
    }

    /// Whether an admin may move a rental from `self` to `target`
    pub fn can_transition_to(self, target: RentalStatus) -> bool {
        match (self, target) {
            (RentalStatus::Returned, _) => false,
            (RentalStatus::Approved, RentalStatus::Returned) => true,
            (_, RentalStatus::Returned) => false,
            _ => true,
        }
    }
}

impl std::str::FromStr for RentalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(RentalStatus::Pending),
            "approved" => Ok(RentalStatus::Approved),
            "denied" => Ok(RentalStatus::Denied),
            "returned" => Ok(RentalStatus::Returned),
            _ => Err(format!("Invalid rental status: {}", s)),
        }
    }
}

text_column!(RentalStatus);

/// Mock payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

text_column!(PaymentStatus);

/// Rental record from database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Rental {
    pub id: i32,
    pub user_id: i32,
    pub game_id: i32,
    pub status: RentalStatus,
    pub requested_at: DateTime<Utc>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<i32>,
    pub rental_days: i32,
    pub cost: Option<Decimal>,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub payment_date: Option<DateTime<Utc>>,
    pub transaction_id: Option<String>,
}

/// Rental joined with the game and renter it refers to
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RentalDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub rental: Rental,
    pub game_title: String,
    pub game_owner_id: Option<i32>,
    pub renter_username: String,
}

/// Insert payload for a new pending rental
#[derive(Debug, Clone)]
pub struct NewRental {
    pub user_id: i32,
    pub game_id: i32,
    pub rental_days: i32,
    pub cost: Decimal,
}

/// Rental request form submission
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct RentalRequest {
    /// Number of days (1 to 30, default 3)
    #[validate(range(min = 1, max = 30, message = "Number of days must be between 1 and 30"))]
    pub rental_days: Option<i32>,
}

/// Payment form submission
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct PaymentRequest {
    /// Free text; "Mock Method" when absent
    #[validate(length(max = 50, message = "Payment method must be at most 50 characters"))]
    pub payment_method: Option<String>,
}

/// Result of a payment attempt on an approved rental
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    /// Nothing to do, the rental was paid before
    AlreadyPaid,
    /// The rental with its payment fields stamped
    Paid(Rental),
}

/// Data for the rental request form
#[derive(Debug, Serialize, ToSchema)]
pub struct RentalForm {
    pub game: Game,
    pub default_days: i32,
    pub min_days: i32,
    pub max_days: i32,
    /// Cost for `default_days`
    pub estimated_cost: Decimal,
}

/// Data for the payment form
#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentForm {
    pub rental: RentalDetails,
    pub amount_due: Decimal,
    pub already_paid: bool,
}

/// Total price of a rental. Decimal arithmetic, rounded to cents.
pub fn rental_cost(rental_days: i32, price_per_day: Decimal) -> Decimal {
    (Decimal::from(rental_days) * price_per_day).round_dp(2)
}

/// Transaction reference for a payment made at `paid_at`
pub fn transaction_id(rental_id: i32, paid_at: DateTime<Utc>) -> String {
    format!("TXN-{}-{}", rental_id, paid_at.timestamp())
}

impl Rental {
    fn cost_is_unset(&self) -> bool {
        self.cost.map_or(true, |c| c.is_zero())
    }

    /// Move the rental to `target` on behalf of `actor_id`.
    ///
    /// First approval stamps `approved_at`/`approved_by`; cost is computed from
    /// `price_per_day` only while it is still null or zero.
    pub fn transition(
        &self,
        target: RentalStatus,
        price_per_day: Decimal,
        actor_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<Rental> {
        if !self.status.can_transition_to(target) {
            return Err(AppError::PreconditionFailed(format!(
                "Cannot change a {} rental to {}.",
                self.status, target
            )));
        }

        let mut next = self.clone();
        next.status = target;

        if target == RentalStatus::Approved {
            if next.approved_at.is_none() {
                next.approved_at = Some(now);
                next.approved_by = Some(actor_id);
            }
            if next.cost_is_unset() {
                next.cost = Some(rental_cost(next.rental_days, price_per_day));
            }
        }

        Ok(next)
    }

    /// Record a mock payment.
    ///
    /// Only approved rentals can be paid; paying twice is a no-op.
    pub fn pay(&self, method: Option<&str>, now: DateTime<Utc>) -> AppResult<PaymentOutcome> {
        if self.status != RentalStatus::Approved {
            return Err(AppError::PreconditionFailed(
                "You cannot pay for a rental that is not approved.".to_string(),
            ));
        }
        if self.payment_status == PaymentStatus::Paid {
            return Ok(PaymentOutcome::AlreadyPaid);
        }

        let method = method
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_PAYMENT_METHOD);

        let mut paid = self.clone();
        paid.payment_status = PaymentStatus::Paid;
        paid.payment_method = Some(method.to_string());
        paid.payment_date = Some(now);
        paid.transaction_id = Some(transaction_id(self.id, now));

        Ok(PaymentOutcome::Paid(paid))
    }
}
