//! Rental workflow endpoints: request, status transition, payment

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{
        access::pages,
        rental::{PaymentForm, PaymentRequest, Rental, RentalDetails, RentalForm, RentalRequest},
    },
    services::rentals::PaymentResult,
    AppState,
};

use super::{AuthenticatedUser, NoticeLevel, OptionalJson};

/// Outcome message together with the affected rental
#[derive(Serialize, ToSchema)]
pub struct RentalNotice {
    pub level: NoticeLevel,
    pub message: String,
    /// Page the client should show next
    pub redirect: String,
    pub rental: Rental,
}

/// Rental request form
#[utoipa::path(
    get,
    path = "/request/{game_id}",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("game_id" = i32, Path, description = "Game ID")
    ),
    responses(
        (status = 200, description = "Form data with the estimated cost", body = RentalForm),
        (status = 404, description = "Game not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Game unavailable or already requested", body = crate::error::ErrorResponse)
    )
)]
pub async fn request_form(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(game_id): Path<i32>,
) -> AppResult<Json<RentalForm>> {
    let form = state
        .services
        .rentals
        .request_form(&user.viewer(), game_id)
        .await?;
    Ok(Json(form))
}

/// Request a rental
#[utoipa::path(
    post,
    path = "/request/{game_id}",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("game_id" = i32, Path, description = "Game ID")
    ),
    request_body(content = RentalRequest, description = "Number of days, 3 when omitted"),
    responses(
        (status = 201, description = "Pending rental created", body = RentalNotice),
        (status = 400, description = "Malformed form or number of days out of range", body = crate::error::ErrorResponse),
        (status = 404, description = "Game not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Game unavailable or already requested", body = crate::error::ErrorResponse)
    )
)]
pub async fn request_rental(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(game_id): Path<i32>,
    OptionalJson(request): OptionalJson<RentalRequest>,
) -> AppResult<(StatusCode, Json<RentalNotice>)> {
    let request = request.unwrap_or_default();
    let (rental, game) = state
        .services
        .rentals
        .request_rental(&user.viewer(), game_id, request)
        .await?;

    let message = format!(
        "Rental request for {} submitted for {} days! Total cost: ₹{}",
        game.title,
        rental.rental_days,
        rental.cost.unwrap_or_default()
    );

    Ok((
        StatusCode::CREATED,
        Json(RentalNotice {
            level: NoticeLevel::Success,
            message,
            redirect: pages::STUDENT_DASHBOARD.to_string(),
            rental,
        }),
    ))
}

/// Rentals of the current user
#[utoipa::path(
    get,
    path = "/my-rentals",
    tag = "rentals",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Rentals, newest first", body = Vec<RentalDetails>),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn my_rentals(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Json<Vec<RentalDetails>>> {
    let rentals = state.services.rentals.my_rentals(&user.viewer()).await?;
    Ok(Json(rentals))
}

/// Approve, deny, reset or close a rental
#[utoipa::path(
    post,
    path = "/update-status/{rental_id}/{new_status}",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("rental_id" = i32, Path, description = "Rental ID"),
        ("new_status" = String, Path, description = "pending, approved, denied or returned (case-insensitive)")
    ),
    responses(
        (status = 200, description = "Status updated", body = RentalNotice),
        (status = 400, description = "Unknown status", body = crate::error::ErrorResponse),
        (status = 403, description = "Not allowed to manage this game", body = crate::error::ErrorResponse),
        (status = 404, description = "Rental not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Rental changed concurrently", body = crate::error::ErrorResponse),
        (status = 422, description = "Transition not allowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((rental_id, new_status)): Path<(i32, String)>,
) -> AppResult<Json<RentalNotice>> {
    let viewer = user.viewer();
    let rental = state
        .services
        .rentals
        .update_status(&viewer, rental_id, &new_status)
        .await?;

    Ok(Json(RentalNotice {
        level: NoticeLevel::Success,
        message: format!("Rental status updated to {}.", rental.status),
        redirect: viewer.dashboard().to_string(),
        rental,
    }))
}

/// Payment form
#[utoipa::path(
    get,
    path = "/rental/{rental_id}/pay",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("rental_id" = i32, Path, description = "Rental ID")
    ),
    responses(
        (status = 200, description = "Amount due", body = PaymentForm),
        (status = 403, description = "Not your rental", body = crate::error::ErrorResponse),
        (status = 404, description = "Rental not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Rental not approved", body = crate::error::ErrorResponse)
    )
)]
pub async fn payment_form(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(rental_id): Path<i32>,
) -> AppResult<Json<PaymentForm>> {
    let form = state
        .services
        .rentals
        .payment_form(&user.viewer(), rental_id)
        .await?;
    Ok(Json(form))
}

/// Pay for an approved rental (mock payment)
#[utoipa::path(
    post,
    path = "/rental/{rental_id}/pay",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("rental_id" = i32, Path, description = "Rental ID")
    ),
    request_body(content = PaymentRequest, description = "Payment method, \"Mock Method\" when omitted"),
    responses(
        (status = 200, description = "Paid, or already paid", body = RentalNotice),
        (status = 400, description = "Malformed payment form", body = crate::error::ErrorResponse),
        (status = 403, description = "Not your rental", body = crate::error::ErrorResponse),
        (status = 404, description = "Rental not found", body = crate::error::ErrorResponse),
        (status = 422, description = "Rental not approved", body = crate::error::ErrorResponse)
    )
)]
pub async fn pay(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(rental_id): Path<i32>,
    OptionalJson(request): OptionalJson<PaymentRequest>,
) -> AppResult<Json<RentalNotice>> {
    let request = request.unwrap_or_default();
    let result = state
        .services
        .rentals
        .pay(&user.viewer(), rental_id, request)
        .await?;

    let notice = match result {
        PaymentResult::AlreadyPaid(rental) => RentalNotice {
            level: NoticeLevel::Info,
            message: "This rental is already paid.".to_string(),
            redirect: pages::MY_RENTALS.to_string(),
            rental,
        },
        PaymentResult::Paid(rental) => RentalNotice {
            level: NoticeLevel::Success,
            message: format!(
                "Payment successful! Transaction ID: {}",
                rental.transaction_id.as_deref().unwrap_or_default()
            ),
            redirect: pages::MY_RENTALS.to_string(),
            rental,
        },
    };

    Ok(Json(notice))
}
