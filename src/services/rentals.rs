//! Rental workflow service.
//!
//! Loads records, asks [`Viewer`] whether the requester may act, applies the
//! pure transitions from `models::rental` and stores the result with a
//! compare-and-set write.

use chrono::Utc;
use validator::Validate;

use crate::{
    config::RentalsConfig,
    error::{AppError, AppResult},
    models::{
        access::{pages, Viewer},
        game::Game,
        rental::{
            rental_cost, NewRental, PaymentForm, PaymentOutcome, PaymentRequest, Rental,
            RentalDetails, RentalForm, RentalRequest, RentalStatus,
        },
    },
    repository::Repository,
};

/// Result of a payment request
#[derive(Debug, Clone)]
pub enum PaymentResult {
    /// The rental had been paid before; nothing changed
    AlreadyPaid(Rental),
    Paid(Rental),
}

#[derive(Clone)]
pub struct RentalsService {
    repository: Repository,
    config: RentalsConfig,
}

impl RentalsService {
    pub fn new(repository: Repository, config: RentalsConfig) -> Self {
        Self { repository, config }
    }

    async fn rentable_game(&self, game_id: i32) -> AppResult<Game> {
        let game = self.repository.games.get_by_id(game_id).await?;
        if !game.available {
            return Err(AppError::PreconditionFailed(
                "This game is currently not available.".to_string(),
            )
            .redirect_to(pages::STUDENT_DASHBOARD));
        }
        Ok(game)
    }

    /// Rental request form for a game
    pub async fn request_form(&self, viewer: &Viewer, game_id: i32) -> AppResult<RentalForm> {
        let game = self.rentable_game(game_id).await?;

        if self
            .repository
            .rentals
            .has_pending(viewer.user_id, game.id)
            .await?
        {
            return Err(AppError::PreconditionFailed(
                "You have already requested this game.".to_string(),
            )
            .redirect_to(pages::STUDENT_DASHBOARD));
        }

        let default_days = self.config.default_days;
        Ok(RentalForm {
            estimated_cost: rental_cost(default_days, game.price_per_day),
            game,
            default_days,
            min_days: 1,
            max_days: self.config.max_days,
        })
    }

    /// Create a pending rental with its cost precomputed
    pub async fn request_rental(
        &self,
        viewer: &Viewer,
        game_id: i32,
        data: RentalRequest,
    ) -> AppResult<(Rental, Game)> {
        data.validate()?;
        let rental_days = data.rental_days.unwrap_or(self.config.default_days);
        if rental_days > self.config.max_days {
            return Err(AppError::Validation(format!(
                "Number of days must be between 1 and {}",
                self.config.max_days
            )));
        }

        let game = self.rentable_game(game_id).await?;

        let rental = self
            .repository
            .rentals
            .create(&NewRental {
                user_id: viewer.user_id,
                game_id: game.id,
                rental_days,
                cost: rental_cost(rental_days, game.price_per_day),
            })
            .await
            .map_err(|e| match e {
                AppError::PreconditionFailed(_) => e.redirect_to(pages::STUDENT_DASHBOARD),
                other => other,
            })?;

        tracing::info!(
            "Rental {} requested by user {} for game {} ({} days)",
            rental.id,
            viewer.user_id,
            game.id,
            rental_days
        );
        Ok((rental, game))
    }

    /// Rentals of the requester, newest first
    pub async fn my_rentals(&self, viewer: &Viewer) -> AppResult<Vec<RentalDetails>> {
        self.repository.rentals.list_by_user(viewer.user_id).await
    }

    /// Move a rental to `new_status` on behalf of a game manager
    pub async fn update_status(
        &self,
        viewer: &Viewer,
        rental_id: i32,
        new_status: &str,
    ) -> AppResult<Rental> {
        let rental = self.repository.rentals.get_by_id(rental_id).await?;
        let game = self.repository.games.get_by_id(rental.game_id).await?;

        if !viewer.can_manage_game(game.added_by).is_allowed() {
            tracing::warn!(
                "User {} refused status change on rental {}",
                viewer.user_id,
                rental.id
            );
            return Err(AppError::Authorization(
                "You don't have permission to update this rental.".to_string(),
            )
            .redirect_to(viewer.dashboard()));
        }

        let target: RentalStatus = new_status.parse().map_err(AppError::Validation)?;

        let next = rental
            .transition(target, game.price_per_day, viewer.user_id, Utc::now())
            .map_err(|e| e.redirect_to(viewer.dashboard()))?;

        let updated = self
            .repository
            .rentals
            .compare_and_set_status(&next, rental.status)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(
                    "This rental was updated by someone else. Reload and try again.".to_string(),
                )
            })?;

        tracing::info!(
            "Rental {} moved from {} to {} by user {}",
            updated.id,
            rental.status,
            updated.status,
            viewer.user_id
        );
        Ok(updated)
    }

    async fn owned_rental(&self, viewer: &Viewer, rental_id: i32) -> AppResult<RentalDetails> {
        let details = self.repository.rentals.get_details(rental_id).await?;
        viewer
            .can_pay_for(details.rental.user_id)
            .or_forbidden("You can only pay for your own rentals.")
            .map_err(|e| e.redirect_to(pages::MY_RENTALS))?;
        Ok(details)
    }

    /// Payment form for one of the requester's rentals
    pub async fn payment_form(&self, viewer: &Viewer, rental_id: i32) -> AppResult<PaymentForm> {
        let details = self.owned_rental(viewer, rental_id).await?;

        let already_paid = match details.rental.pay(None, Utc::now()) {
            Ok(PaymentOutcome::AlreadyPaid) => true,
            Ok(PaymentOutcome::Paid(_)) => false,
            Err(e) => return Err(e.redirect_to(pages::MY_RENTALS)),
        };

        Ok(PaymentForm {
            amount_due: details.rental.cost.unwrap_or_default(),
            already_paid,
            rental: details,
        })
    }

    /// Record a mock payment on an approved rental
    pub async fn pay(
        &self,
        viewer: &Viewer,
        rental_id: i32,
        data: PaymentRequest,
    ) -> AppResult<PaymentResult> {
        data.validate()?;
        let rental = self.owned_rental(viewer, rental_id).await?.rental;

        let paid = match rental
            .pay(data.payment_method.as_deref(), Utc::now())
            .map_err(|e| e.redirect_to(pages::MY_RENTALS))?
        {
            PaymentOutcome::AlreadyPaid => return Ok(PaymentResult::AlreadyPaid(rental)),
            PaymentOutcome::Paid(paid) => paid,
        };

        match self.repository.rentals.record_payment(&paid).await? {
            Some(stored) => {
                tracing::info!(
                    "Rental {} paid by user {} ({})",
                    stored.id,
                    viewer.user_id,
                    stored.transaction_id.as_deref().unwrap_or_default()
                );
                Ok(PaymentResult::Paid(stored))
            }
            None => {
                // Lost a race: report the state the other writer left behind
                let current = self.repository.rentals.get_by_id(rental_id).await?;
                match current.pay(None, Utc::now()) {
                    Ok(PaymentOutcome::AlreadyPaid) => Ok(PaymentResult::AlreadyPaid(current)),
                    Ok(PaymentOutcome::Paid(_)) => Err(AppError::Conflict(
                        "This rental was updated by someone else. Reload and try again."
                            .to_string(),
                    )),
                    Err(e) => Err(e.redirect_to(pages::MY_RENTALS)),
                }
            }
        }
    }
}
