//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, dashboard, games, health, profile, rentals, users};

/// Registers the `bearer_auth` scheme referenced by protected paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campus GameHub API",
        version = "0.3.0",
        description = "Campus game rental REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        auth::role_redirect,
        auth::forgot_password,
        auth::verify_otp,
        auth::reset_password,
        // Users
        users::update_role,
        // Games
        games::list_games,
        games::get_game,
        games::create_game,
        games::update_game,
        games::set_availability,
        // Rentals
        rentals::request_form,
        rentals::request_rental,
        rentals::my_rentals,
        rentals::update_status,
        rentals::payment_form,
        rentals::pay,
        // Profile
        profile::my_profile,
        profile::user_profile,
        // Dashboards
        dashboard::dashboard,
        dashboard::super_admin,
        dashboard::student_admin,
        dashboard::student,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            auth::RedirectResponse,
            auth::VerifyOtpResponse,
            crate::models::user::RegisterUser,
            crate::models::user::ForgotPassword,
            crate::models::user::VerifyOtp,
            crate::models::user::ResetPassword,
            // Users
            crate::models::user::Role,
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::UpdateRole,
            // Games
            crate::models::game::Game,
            crate::models::game::CreateGame,
            crate::models::game::UpdateGame,
            crate::models::game::SetAvailability,
            // Rentals
            crate::models::rental::Rental,
            crate::models::rental::RentalDetails,
            crate::models::rental::RentalStatus,
            crate::models::rental::PaymentStatus,
            crate::models::rental::RentalRequest,
            crate::models::rental::RentalForm,
            crate::models::rental::PaymentRequest,
            crate::models::rental::PaymentForm,
            rentals::RentalNotice,
            // Profile & dashboards
            crate::models::profile::Profile,
            crate::models::dashboard::Dashboard,
            crate::models::dashboard::SuperAdminDashboard,
            crate::models::dashboard::StudentAdminDashboard,
            crate::models::dashboard::StudentDashboard,
            // Common
            super::Notice,
            super::NoticeLevel,
            health::HealthResponse,
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration, login and password reset"),
        (name = "users", description = "User management"),
        (name = "games", description = "Game catalog"),
        (name = "rentals", description = "Rental requests, approvals and payments"),
        (name = "profile", description = "Profile analytics"),
        (name = "dashboard", description = "Role dashboards")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
