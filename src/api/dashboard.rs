//! Role dashboards

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::dashboard::{Dashboard, StudentAdminDashboard, StudentDashboard, SuperAdminDashboard},
    AppState,
};

use super::AuthenticatedUser;

/// Dashboard of the current user's role
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard tagged by `kind`", body = Dashboard),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Dashboard>> {
    let dashboard = state.services.dashboard.for_viewer(&user.viewer()).await?;
    Ok(Json(dashboard))
}

/// All users, games and rentals
#[utoipa::path(
    get,
    path = "/dashboard/super-admin",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Global overview", body = SuperAdminDashboard),
        (status = 403, description = "Not a super admin", body = crate::error::ErrorResponse)
    )
)]
pub async fn super_admin(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<SuperAdminDashboard>> {
    let dashboard = state.services.dashboard.super_admin(&user.viewer()).await?;
    Ok(Json(dashboard))
}

/// Own games and the rentals they received
#[utoipa::path(
    get,
    path = "/dashboard/student-admin",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Listed games and their rentals", body = StudentAdminDashboard),
        (status = 403, description = "Not a game administrator", body = crate::error::ErrorResponse)
    )
)]
pub async fn student_admin(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<StudentAdminDashboard>> {
    let dashboard = state.services.dashboard.student_admin(&user.viewer()).await?;
    Ok(Json(dashboard))
}

/// Available games and own rentals
#[utoipa::path(
    get,
    path = "/dashboard/student",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Rentable games and own rentals", body = StudentDashboard),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn student(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<StudentDashboard>> {
    let dashboard = state.services.dashboard.student(&user.viewer()).await?;
    Ok(Json(dashboard))
}
