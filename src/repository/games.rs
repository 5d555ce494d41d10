//! Games repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::game::{default_price_per_day, CreateGame, Game, UpdateGame},
};

#[derive(Clone)]
pub struct GamesRepository {
    pool: Pool<Postgres>,
}

impl GamesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get game by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Game> {
        sqlx::query_as::<_, Game>("SELECT * FROM games WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game with id {} not found", id)))
    }

    /// List every game
    pub async fn list_all(&self) -> AppResult<Vec<Game>> {
        let games = sqlx::query_as::<_, Game>("SELECT * FROM games ORDER BY title")
            .fetch_all(&self.pool)
            .await?;
        Ok(games)
    }

    /// List games open for rental
    pub async fn list_available(&self) -> AppResult<Vec<Game>> {
        let games =
            sqlx::query_as::<_, Game>("SELECT * FROM games WHERE available = TRUE ORDER BY title")
                .fetch_all(&self.pool)
                .await?;
        Ok(games)
    }

    /// List games added by a user
    pub async fn list_by_owner(&self, owner_id: i32) -> AppResult<Vec<Game>> {
        let games =
            sqlx::query_as::<_, Game>("SELECT * FROM games WHERE added_by = $1 ORDER BY title")
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(games)
    }

    /// Create a game owned by `added_by`
    pub async fn create(&self, data: &CreateGame, added_by: i32) -> AppResult<Game> {
        let game = sqlx::query_as::<_, Game>(
            r#"
            INSERT INTO games (title, description, image, available, price_per_day, added_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.image)
        .bind(data.available.unwrap_or(true))
        .bind(data.price_per_day.unwrap_or_else(default_price_per_day))
        .bind(added_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(game)
    }

    /// Update the supplied fields of a game
    pub async fn update(&self, id: i32, data: &UpdateGame) -> AppResult<Game> {
        let mut sets = Vec::new();
        let mut idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.title, "title");
        add_field!(data.description, "description");
        add_field!(data.image, "image");
        add_field!(data.available, "available");
        add_field!(data.price_per_day, "price_per_day");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE games SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Game>(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.title);
        bind_field!(data.description);
        bind_field!(data.image);
        bind_field!(data.available);
        bind_field!(data.price_per_day);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game with id {} not found", id)))
    }

    /// Mark a game (un)available
    pub async fn set_availability(&self, id: i32, available: bool) -> AppResult<Game> {
        sqlx::query_as::<_, Game>("UPDATE games SET available = $1 WHERE id = $2 RETURNING *")
            .bind(available)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Game with id {} not found", id)))
    }
}
