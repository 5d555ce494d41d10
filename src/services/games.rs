//! Catalog service

use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        access::Viewer,
        game::{validate_price, CreateGame, Game, UpdateGame},
        user::Role,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct GamesService {
    repository: Repository,
}

impl GamesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Games visible to the viewer: available ones for students, own ones
    /// for student admins, all for super admins
    pub async fn list(&self, viewer: &Viewer) -> AppResult<Vec<Game>> {
        match viewer.role {
            Role::SuperAdmin => self.repository.games.list_all().await,
            Role::StudentAdmin => self.repository.games.list_by_owner(viewer.user_id).await,
            Role::Student => self.repository.games.list_available().await,
        }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Game> {
        self.repository.games.get_by_id(id).await
    }

    /// Add a game owned by the viewer
    pub async fn create(&self, viewer: &Viewer, data: CreateGame) -> AppResult<Game> {
        viewer
            .can_list_games()
            .or_forbidden("Only game administrators can add games.")?;
        data.validate()?;
        validate_price(data.price_per_day)?;

        let game = self.repository.games.create(&data, viewer.user_id).await?;
        tracing::info!("Game {} ({}) added by user {}", game.title, game.id, viewer.user_id);
        Ok(game)
    }

    pub async fn update(&self, viewer: &Viewer, id: i32, data: UpdateGame) -> AppResult<Game> {
        let game = self.repository.games.get_by_id(id).await?;
        viewer.require_game_manager(game.added_by)?;
        data.validate()?;
        validate_price(data.price_per_day)?;

        self.repository.games.update(id, &data).await
    }

    pub async fn set_availability(&self, viewer: &Viewer, id: i32, available: bool) -> AppResult<Game> {
        let game = self.repository.games.get_by_id(id).await?;
        viewer.require_game_manager(game.added_by)?;

        let game = self.repository.games.set_availability(id, available).await?;
        tracing::info!("Game {} availability set to {}", game.id, available);
        Ok(game)
    }
}
