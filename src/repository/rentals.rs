//! Rentals repository for database operations.
//!
//! Plain store-and-fetch: business rules live in `models::rental`. Writes that
//! follow a read are compare-and-set updates guarded on the state that was read.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        profile::RentalTotals,
        rental::{NewRental, Rental, RentalDetails, RentalStatus},
    },
};

const PENDING_UNIQUE_INDEX: &str = "rentals_one_pending_per_user_game";

const DETAILS_SELECT: &str = r#"
    SELECT r.*, g.title AS game_title, g.added_by AS game_owner_id,
           u.username AS renter_username
    FROM rentals r
    JOIN games g ON g.id = r.game_id
    JOIN users u ON u.id = r.user_id
"#;

#[derive(Clone)]
pub struct RentalsRepository {
    pool: Pool<Postgres>,
}

impl RentalsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get rental by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Rental> {
        sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rental with id {} not found", id)))
    }

    /// Get rental with game and renter details
    pub async fn get_details(&self, id: i32) -> AppResult<RentalDetails> {
        let query = format!("{} WHERE r.id = $1", DETAILS_SELECT);
        sqlx::query_as::<_, RentalDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rental with id {} not found", id)))
    }

    /// Whether the user already has a pending request for the game
    pub async fn has_pending(&self, user_id: i32, game_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM rentals WHERE user_id = $1 AND game_id = $2 AND status = 'pending')",
        )
        .bind(user_id)
        .bind(game_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Insert a pending rental.
    ///
    /// A second pending request for the same (user, game) is rejected by the
    /// partial unique index and reported as a failed precondition.
    pub async fn create(&self, rental: &NewRental) -> AppResult<Rental> {
        sqlx::query_as::<_, Rental>(
            r#"
            INSERT INTO rentals (user_id, game_id, status, rental_days, cost)
            VALUES ($1, $2, 'pending', $3, $4)
            RETURNING *
            "#,
        )
        .bind(rental.user_id)
        .bind(rental.game_id)
        .bind(rental.rental_days)
        .bind(rental.cost)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db)
                if db.is_unique_violation() && db.constraint() == Some(PENDING_UNIQUE_INDEX) =>
            {
                AppError::PreconditionFailed("You have already requested this game.".to_string())
            }
            other => other.into(),
        })
    }

    /// Store a status transition if the rental is still in `expected` status.
    ///
    /// Returns `None` when another request changed the status first.
    pub async fn compare_and_set_status(
        &self,
        next: &Rental,
        expected: RentalStatus,
    ) -> AppResult<Option<Rental>> {
        let updated = sqlx::query_as::<_, Rental>(
            r#"
            UPDATE rentals
            SET status = $1, approved_at = $2, approved_by = $3, cost = $4
            WHERE id = $5 AND status = $6
            RETURNING *
            "#,
        )
        .bind(next.status)
        .bind(next.approved_at)
        .bind(next.approved_by)
        .bind(next.cost)
        .bind(next.id)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db)
                if db.is_unique_violation() && db.constraint() == Some(PENDING_UNIQUE_INDEX) =>
            {
                AppError::PreconditionFailed(
                    "The renter already has another pending request for this game.".to_string(),
                )
            }
            other => other.into(),
        })?;
        Ok(updated)
    }

    /// Store payment fields if the rental is still approved and unpaid.
    ///
    /// Returns `None` when the rental changed since it was read.
    pub async fn record_payment(&self, paid: &Rental) -> AppResult<Option<Rental>> {
        let updated = sqlx::query_as::<_, Rental>(
            r#"
            UPDATE rentals
            SET payment_status = $1, payment_method = $2, payment_date = $3, transaction_id = $4
            WHERE id = $5 AND status = 'approved' AND payment_status = 'pending'
            RETURNING *
            "#,
        )
        .bind(paid.payment_status)
        .bind(&paid.payment_method)
        .bind(paid.payment_date)
        .bind(&paid.transaction_id)
        .bind(paid.id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    /// Rentals made by a user, newest first
    pub async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<RentalDetails>> {
        let query = format!(
            "{} WHERE r.user_id = $1 ORDER BY r.requested_at DESC, r.id DESC",
            DETAILS_SELECT
        );
        let rentals = sqlx::query_as::<_, RentalDetails>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rentals)
    }

    /// Rentals of the games a user added, newest first
    pub async fn list_by_game_owner(&self, owner_id: i32) -> AppResult<Vec<RentalDetails>> {
        let query = format!(
            "{} WHERE g.added_by = $1 ORDER BY r.requested_at DESC, r.id DESC",
            DETAILS_SELECT
        );
        let rentals = sqlx::query_as::<_, RentalDetails>(&query)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rentals)
    }

    /// Every rental, newest first
    pub async fn list_all(&self) -> AppResult<Vec<RentalDetails>> {
        let query = format!("{} ORDER BY r.requested_at DESC, r.id DESC", DETAILS_SELECT);
        let rentals = sqlx::query_as::<_, RentalDetails>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rentals)
    }

    /// Totals over the rentals a user made
    pub async fn totals_by_user(&self, user_id: i32) -> AppResult<RentalTotals> {
        let totals = sqlx::query_as::<_, RentalTotals>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'approved') AS active,
                   COUNT(*) FILTER (WHERE status = 'returned') AS completed,
                   COALESCE(SUM(cost) FILTER (WHERE payment_status = 'paid'), 0) AS paid_amount
            FROM rentals
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }

    /// Totals over the rentals of the games a user added
    pub async fn totals_by_game_owner(&self, owner_id: i32) -> AppResult<RentalTotals> {
        let totals = sqlx::query_as::<_, RentalTotals>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE r.status = 'approved') AS active,
                   COUNT(*) FILTER (WHERE r.status = 'returned') AS completed,
                   COALESCE(SUM(r.cost) FILTER (WHERE r.payment_status = 'paid'), 0) AS paid_amount
            FROM rentals r
            JOIN games g ON g.id = r.game_id
            WHERE g.added_by = $1
            "#,
        )
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }
}
