//! Profile analytics endpoints

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{error::AppResult, models::profile::Profile, AppState};

use super::AuthenticatedUser;

/// Profile of the current user
#[utoipa::path(
    get,
    path = "/profile",
    tag = "profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own profile with financial details", body = Profile),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn my_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Profile>> {
    let profile = state.services.profile.get(&user.viewer(), None).await?;
    Ok(Json(profile))
}

/// Profile of another user
#[utoipa::path(
    get,
    path = "/profile/{user_id}",
    tag = "profile",
    security(("bearer_auth" = [])),
    params(
        ("user_id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Profile; money figures are zero unless own profile or super admin", body = Profile),
        (status = 404, description = "User not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn user_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Profile>> {
    let profile = state
        .services
        .profile
        .get(&user.viewer(), Some(user_id))
        .await?;
    Ok(Json(profile))
}
