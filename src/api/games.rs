//! Catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::game::{CreateGame, Game, SetAvailability, UpdateGame},
    AppState,
};

use super::AuthenticatedUser;

/// List games visible to the requester
#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Available games for students, own games for student admins, all for super admins", body = Vec<Game>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_games(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<Game>>> {
    let games = state.services.games.list(&user.viewer()).await?;
    Ok(Json(games))
}

/// Get game details by ID
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Game ID")
    ),
    responses(
        (status = 200, description = "Game details", body = Game),
        (status = 404, description = "Game not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_game(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Game>> {
    let game = state.services.games.get_by_id(id).await?;
    Ok(Json(game))
}

/// Add a game to the catalog
#[utoipa::path(
    post,
    path = "/games",
    tag = "games",
    security(("bearer_auth" = [])),
    request_body = CreateGame,
    responses(
        (status = 201, description = "Game created", body = Game),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse),
        (status = 403, description = "Not a game administrator", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_game(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(game): Json<CreateGame>,
) -> AppResult<(StatusCode, Json<Game>)> {
    let created = state.services.games.create(&user.viewer(), game).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Update a game
#[utoipa::path(
    put,
    path = "/games/{id}",
    tag = "games",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Game ID")
    ),
    request_body = UpdateGame,
    responses(
        (status = 200, description = "Game updated", body = Game),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Game not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_game(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(game): Json<UpdateGame>,
) -> AppResult<Json<Game>> {
    let updated = state.services.games.update(&user.viewer(), id, game).await?;
    Ok(Json(updated))
}

/// Open or close a game for rental
#[utoipa::path(
    post,
    path = "/games/{id}/availability",
    tag = "games",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Game ID")
    ),
    request_body = SetAvailability,
    responses(
        (status = 200, description = "Availability updated", body = Game),
        (status = 403, description = "Not the owner", body = crate::error::ErrorResponse),
        (status = 404, description = "Game not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn set_availability(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    Json(request): Json<SetAvailability>,
) -> AppResult<Json<Game>> {
    let game = state
        .services
        .games
        .set_availability(&user.viewer(), id, request.available)
        .await?;
    Ok(Json(game))
}
