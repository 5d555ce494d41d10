//! API handlers for Campus GameHub REST endpoints

pub mod auth;
pub mod dashboard;
pub mod games;
pub mod health;
pub mod openapi;
pub mod profile;
pub mod rentals;
pub mod users;

use axum::{
    async_trait,
    body::{Body, Bytes},
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    routing::{get, post, put},
    Json, RequestPartsExt, Router,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::{de::DeserializeOwned, Serialize};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::ToSchema;

use crate::{
    error::AppError,
    models::{access::Viewer, user::UserClaims},
    AppState,
};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

impl AuthenticatedUser {
    pub fn viewer(&self) -> Viewer {
        self.0.viewer()
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AppError::Authentication("Missing or invalid authorization header".to_string()))?;

        let claims = UserClaims::from_token(bearer.token(), &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// JSON body that may be left out entirely.
///
/// An empty body yields `None`. Any other body must be valid JSON for `T`
/// sent as `application/json`, otherwise the request is rejected with 400.
pub struct OptionalJson<T>(pub Option<T>);

#[async_trait]
impl<T> FromRequest<AppState> for OptionalJson<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = Bytes::from_request(Request::from_parts(parts.clone(), body), state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(OptionalJson(None));
        }

        let Json(value) = Json::<T>::from_request(Request::from_parts(parts, Body::from(bytes)), state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;

        Ok(OptionalJson(Some(value)))
    }
}

/// Severity of a [`Notice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
}

/// User-facing message with the page the client should show next
#[derive(Debug, Serialize, ToSchema)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub redirect: String,
}

impl Notice {
    pub fn success(message: impl Into<String>, redirect: &str) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
            redirect: redirect.to_string(),
        }
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/redirect", get(auth::role_redirect))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/verify-otp", post(auth::verify_otp))
        .route("/auth/reset-password", post(auth::reset_password))
        // Users
        .route("/users/:id/role", put(users::update_role))
        // Games
        .route("/games", get(games::list_games).post(games::create_game))
        .route("/games/:id", get(games::get_game).put(games::update_game))
        .route("/games/:id/availability", post(games::set_availability))
        // Rentals
        .route(
            "/request/:game_id",
            get(rentals::request_form).post(rentals::request_rental),
        )
        .route("/my-rentals", get(rentals::my_rentals))
        .route(
            "/update-status/:rental_id/:new_status",
            get(rentals::update_status).post(rentals::update_status),
        )
        .route(
            "/rental/:rental_id/pay",
            get(rentals::payment_form).post(rentals::pay),
        )
        // Profile
        .route("/profile", get(profile::my_profile))
        .route("/profile/:user_id", get(profile::user_profile))
        // Dashboards
        .route("/dashboard", get(dashboard::dashboard))
        .route("/dashboard/super-admin", get(dashboard::super_admin))
        .route("/dashboard/student-admin", get(dashboard::student_admin))
        .route("/dashboard/student", get(dashboard::student))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
