//! Profile analytics

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use super::{access::Viewer, game::Game, rental::RentalDetails, user::User};

/// Counts and sums over one set of rentals
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct RentalTotals {
    pub total: i64,
    /// Rentals currently out (status approved)
    pub active: i64,
    /// Rentals handed back (status returned)
    pub completed: i64,
    /// Sum of cost over paid rentals
    pub paid_amount: Decimal,
}

/// Profile page of a user as seen by the requester
#[derive(Debug, Serialize, ToSchema)]
pub struct Profile {
    pub user_profile: User,
    pub is_own_profile: bool,
    pub viewer_is_admin: bool,
    pub show_financial_details: bool,

    pub games_listed: Vec<Game>,
    pub total_games_listed: i64,

    pub total_rentals_made: i64,
    pub active_rentals: i64,
    pub completed_rentals: i64,
    pub currently_rented_games: i64,
    pub past_rentals_of_games: i64,

    /// Zero unless financial details are visible
    pub total_revenue_earned: Decimal,
    /// Zero unless financial details are visible
    pub total_spent_on_rentals: Decimal,

    pub rentals_made: Vec<RentalDetails>,
    pub rentals_received: Vec<RentalDetails>,
}

/// Rentals a user made, with their totals
#[derive(Debug, Clone, Default)]
pub struct RentalActivity {
    pub rentals: Vec<RentalDetails>,
    pub totals: RentalTotals,
}

/// Games a user listed and the rentals those games received
#[derive(Debug, Clone, Default)]
pub struct ListingActivity {
    pub games: Vec<Game>,
    pub received: RentalActivity,
}

impl Profile {
    /// Project a user's activity for `viewer`.
    ///
    /// `listings` is only consulted for admins; money sums are zeroed unless
    /// the viewer may see the target's financials.
    pub fn assemble(
        viewer: &Viewer,
        user: User,
        made: RentalActivity,
        listings: Option<ListingActivity>,
    ) -> Profile {
        let show_financial_details = viewer.can_see_financials_of(user.id).is_allowed();
        let listings = if user.role.is_admin() {
            listings.unwrap_or_default()
        } else {
            ListingActivity::default()
        };
        let financial = |amount: Decimal| {
            if show_financial_details {
                amount
            } else {
                Decimal::ZERO
            }
        };

        Profile {
            is_own_profile: viewer.user_id == user.id,
            viewer_is_admin: viewer.is_admin(),
            show_financial_details,

            total_games_listed: listings.games.len() as i64,
            games_listed: listings.games,

            total_rentals_made: made.totals.total,
            active_rentals: made.totals.active,
            completed_rentals: made.totals.completed,
            currently_rented_games: listings.received.totals.active,
            past_rentals_of_games: listings.received.totals.completed,

            total_revenue_earned: financial(listings.received.totals.paid_amount),
            total_spent_on_rentals: financial(made.totals.paid_amount),

            rentals_made: made.rentals,
            rentals_received: listings.received.rentals,
            user_profile: user,
        }
    }
}
