//! Profile analytics service

use crate::{
    error::AppResult,
    models::{
        access::Viewer,
        profile::{ListingActivity, Profile, RentalActivity},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct ProfileService {
    repository: Repository,
}

impl ProfileService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Profile of `user_id` (the viewer when `None`) as seen by the viewer
    pub async fn get(&self, viewer: &Viewer, user_id: Option<i32>) -> AppResult<Profile> {
        let user = self
            .repository
            .users
            .get_by_id(user_id.unwrap_or(viewer.user_id))
            .await?;

        let made = RentalActivity {
            rentals: self.repository.rentals.list_by_user(user.id).await?,
            totals: self.repository.rentals.totals_by_user(user.id).await?,
        };

        let listings = if user.role.is_admin() {
            Some(ListingActivity {
                games: self.repository.games.list_by_owner(user.id).await?,
                received: RentalActivity {
                    rentals: self.repository.rentals.list_by_game_owner(user.id).await?,
                    totals: self.repository.rentals.totals_by_game_owner(user.id).await?,
                },
            })
        } else {
            None
        };

        Ok(Profile::assemble(viewer, user, made, listings))
    }
}
