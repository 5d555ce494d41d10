//! HTTP integration tests for the rental workflow, identity and analytics.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, create_game, get, post, register, request_rental, send, super_admin};
use gamehub_server::{
    models::user::{NewUser, Role},
    repository::Repository,
    AppError,
};
use regex::Regex;
use serde_json::json;
use sqlx::PgPool;

async fn rental_row(pool: &PgPool, id: i64) -> (String, String, Option<String>) {
    sqlx::query_as("SELECT status, payment_status, transaction_id FROM rentals WHERE id = $1")
        .bind(id as i32)
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_health_and_readiness(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = send(&app, Method::GET, "/api/v1/health", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");

    let response = send(&app, Method::GET, "/api/v1/ready", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ready");
}

// ---------------------------------------------------------------------------
// Rental workflow
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_request_approve_pay_scenario(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (admin, _) = register(&app, "owner", "student_admin").await;
    let (student, student_id) = register(&app, "ada", "student").await;
    let game_id = create_game(&app, &admin, json!({ "title": "Catan" })).await;

    let form = body_json(get(&app, &format!("/api/v1/request/{}", game_id), &student).await).await;
    assert_eq!(form["default_days"], 3);
    assert_eq!(form["estimated_cost"], "150.00");

    let response = post(
        &app,
        &format!("/api/v1/request/{}", game_id),
        &student,
        Some(json!({ "rental_days": 3 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(
        json["message"],
        "Rental request for Catan submitted for 3 days! Total cost: ₹150.00"
    );
    assert_eq!(json["redirect"], "/dashboard/student");
    assert_eq!(json["rental"]["status"], "pending");
    assert_eq!(json["rental"]["cost"], "150.00");
    assert_eq!(json["rental"]["user_id"], student_id);
    assert!(json["rental"]["approved_at"].is_null());
    let rental_id = json["rental"]["id"].as_i64().unwrap();

    let response = post(
        &app,
        &format!("/api/v1/update-status/{}/Approved", rental_id),
        &admin,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Rental status updated to approved.");
    assert_eq!(json["redirect"], "/dashboard/student-admin");
    assert_eq!(json["rental"]["status"], "approved");
    assert_eq!(json["rental"]["cost"], "150.00");
    assert!(json["rental"]["approved_at"].is_string());

    let response = post(&app, &format!("/api/v1/rental/{}/pay", rental_id), &student, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["rental"]["payment_status"], "paid");
    assert_eq!(json["rental"]["payment_method"], "Mock Method");
    let txn = json["rental"]["transaction_id"].as_str().unwrap();
    let pattern = Regex::new(&format!(r"^TXN-{}-\d+$", rental_id)).unwrap();
    assert!(pattern.is_match(txn), "unexpected transaction id {}", txn);
    assert_eq!(
        json["message"],
        format!("Payment successful! Transaction ID: {}", txn)
    );

    let mine = body_json(get(&app, "/api/v1/my-rentals", &student).await).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["game_title"], "Catan");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unavailable_game_cannot_be_requested(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (admin, _) = register(&app, "owner", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let game_id = create_game(&app, &admin, json!({ "title": "Go", "available": false })).await;

    let response = get(&app, &format!("/api/v1/request/{}", game_id), &student).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = post(&app, &format!("/api/v1/request/{}", game_id), &student, None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["message"], "This game is currently not available.");
    assert_eq!(json["redirect"], "/dashboard/student");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rentals")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_duplicate_pending_request_is_refused(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (admin, _) = register(&app, "owner", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let game_id = create_game(&app, &admin, json!({ "title": "Chess" })).await;

    request_rental(&app, &student, game_id, 2).await;

    let response = post(
        &app,
        &format!("/api/v1/request/{}", game_id),
        &student,
        Some(json!({ "rental_days": 5 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["message"],
        "You have already requested this game."
    );

    let response = get(&app, &format!("/api/v1/request/{}", game_id), &student).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_request_days_out_of_range(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin, _) = register(&app, "owner", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let game_id = create_game(&app, &admin, json!({ "title": "Chess" })).await;

    for days in [0, 31] {
        let response = post(
            &app,
            &format!("/api/v1/request/{}", game_id),
            &student,
            Some(json!({ "rental_days": days })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{} days", days);
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_request_without_body_uses_default_days(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (admin, _) = register(&app, "owner", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let game_id = create_game(
        &app,
        &admin,
        json!({ "title": "Azul", "price_per_day": "19.99" }),
    )
    .await;

    let response = post(&app, &format!("/api/v1/request/{}", game_id), &student, None).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["rental"]["rental_days"], 3);
    assert_eq!(json["rental"]["cost"], "59.97");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_malformed_request_body_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (admin, _) = register(&app, "owner", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let game_id = create_game(&app, &admin, json!({ "title": "Chess" })).await;

    for body in [json!({ "rental_days": "ten" }), json!("three days"), json!([3])] {
        let response = post(
            &app,
            &format!("/api/v1/request/{}", game_id),
            &student,
            Some(body.clone()),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {}", body);
        assert_eq!(body_json(response).await["error"], "BadValue");
    }

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rentals")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_non_owner_admin_cannot_change_status(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (owner, _) = register(&app, "owner", "student_admin").await;
    let (other, _) = register(&app, "other", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let game_id = create_game(&app, &owner, json!({ "title": "Catan" })).await;
    let rental_id = request_rental(&app, &student, game_id, 3).await;

    for token in [&other, &student] {
        let response = post(
            &app,
            &format!("/api/v1/update-status/{}/approved", rental_id),
            token,
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let json = body_json(response).await;
        assert_eq!(json["message"], "You don't have permission to update this rental.");
        if token == &other {
            assert_eq!(json["redirect"], "/dashboard/student-admin");
        } else {
            assert_eq!(json["redirect"], "/dashboard/student");
        }
    }

    let (status, _, _) = rental_row(&pool, rental_id).await;
    assert_eq!(status, "pending");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_super_admin_can_manage_any_rental(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (owner, _) = register(&app, "owner", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let root = super_admin(&app, &pool, "root").await;
    let game_id = create_game(&app, &owner, json!({ "title": "Catan" })).await;
    let rental_id = request_rental(&app, &student, game_id, 3).await;

    let response = send(
        &app,
        Method::GET,
        &format!("/api/v1/update-status/{}/denied", rental_id),
        Some(&root),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["rental"]["status"], "denied");
    assert_eq!(json["redirect"], "/dashboard/super-admin");
    assert!(json["rental"]["approved_at"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unknown_status_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (owner, _) = register(&app, "owner", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let game_id = create_game(&app, &owner, json!({ "title": "Catan" })).await;
    let rental_id = request_rental(&app, &student, game_id, 3).await;

    let response = post(
        &app,
        &format!("/api/v1/update-status/{}/ongoing", rental_id),
        &owner,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, _, _) = rental_row(&pool, rental_id).await;
    assert_eq!(status, "pending");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_returned_requires_approval(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (owner, _) = register(&app, "owner", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let game_id = create_game(&app, &owner, json!({ "title": "Catan" })).await;
    let rental_id = request_rental(&app, &student, game_id, 3).await;
    let uri = |status: &str| format!("/api/v1/update-status/{}/{}", rental_id, status);

    let response = post(&app, &uri("returned"), &owner, None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    assert_eq!(post(&app, &uri("approved"), &owner, None).await.status(), StatusCode::OK);
    assert_eq!(post(&app, &uri("returned"), &owner, None).await.status(), StatusCode::OK);

    let response = post(&app, &uri("pending"), &owner, None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let (status, _, _) = rental_row(&pool, rental_id).await;
    assert_eq!(status, "returned");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_missing_rental_is_not_found(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (owner, _) = register(&app, "owner", "student_admin").await;

    let response = post(&app, "/api/v1/update-status/999/approved", &owner, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post(&app, "/api/v1/rental/999/pay", &owner, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_cannot_pay_pending_rental(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (owner, _) = register(&app, "owner", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let game_id = create_game(&app, &owner, json!({ "title": "Catan" })).await;
    let rental_id = request_rental(&app, &student, game_id, 3).await;

    let response = post(&app, &format!("/api/v1/rental/{}/pay", rental_id), &student, None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["message"], "You cannot pay for a rental that is not approved.");
    assert_eq!(json["redirect"], "/my-rentals");

    let (_, payment_status, txn) = rental_row(&pool, rental_id).await;
    assert_eq!(payment_status, "pending");
    assert!(txn.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_paying_twice_keeps_first_payment(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (owner, _) = register(&app, "owner", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let game_id = create_game(&app, &owner, json!({ "title": "Catan" })).await;
    let rental_id = request_rental(&app, &student, game_id, 3).await;
    post(
        &app,
        &format!("/api/v1/update-status/{}/approved", rental_id),
        &owner,
        None,
    )
    .await;

    let pay_uri = format!("/api/v1/rental/{}/pay", rental_id);
    let first = body_json(
        post(&app, &pay_uri, &student, Some(json!({ "payment_method": "UPI" }))).await,
    )
    .await;
    assert_eq!(first["rental"]["payment_method"], "UPI");

    let response = post(&app, &pay_uri, &student, Some(json!({ "payment_method": "Card" }))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let second = body_json(response).await;
    assert_eq!(second["level"], "info");
    assert_eq!(second["message"], "This rental is already paid.");
    assert_eq!(second["rental"]["payment_method"], "UPI");
    assert_eq!(second["rental"]["transaction_id"], first["rental"]["transaction_id"]);

    let form = body_json(get(&app, &pay_uri, &student).await).await;
    assert_eq!(form["already_paid"], true);
    assert_eq!(form["amount_due"], "150.00");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_malformed_payment_body_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (owner, _) = register(&app, "owner", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let game_id = create_game(&app, &owner, json!({ "title": "Catan" })).await;
    let rental_id = request_rental(&app, &student, game_id, 3).await;
    post(
        &app,
        &format!("/api/v1/update-status/{}/approved", rental_id),
        &owner,
        None,
    )
    .await;

    let response = post(
        &app,
        &format!("/api/v1/rental/{}/pay", rental_id),
        &student,
        Some(json!({ "payment_method": 5 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, payment_status, txn) = rental_row(&pool, rental_id).await;
    assert_eq!(status, "approved");
    assert_eq!(payment_status, "pending");
    assert!(txn.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_only_renter_can_pay(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (owner, _) = register(&app, "owner", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let (intruder, _) = register(&app, "eve", "student").await;
    let game_id = create_game(&app, &owner, json!({ "title": "Catan" })).await;
    let rental_id = request_rental(&app, &student, game_id, 3).await;
    post(
        &app,
        &format!("/api/v1/update-status/{}/approved", rental_id),
        &owner,
        None,
    )
    .await;

    let response = post(&app, &format!("/api/v1/rental/{}/pay", rental_id), &intruder, None).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (_, payment_status, _) = rental_row(&pool, rental_id).await;
    assert_eq!(payment_status, "pending");
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_catalog_permissions(pool: PgPool) {
    let app = common::build_test_app(pool);
    let (owner, _) = register(&app, "owner", "student_admin").await;
    let (other, _) = register(&app, "other", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;

    let response = post(&app, "/api/v1/games", &student, Some(json!({ "title": "Risk" }))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post(
        &app,
        "/api/v1/games",
        &owner,
        Some(json!({ "title": "Risk", "price_per_day": "0.50" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for price in ["10000.00", "1.005"] {
        let response = post(
            &app,
            "/api/v1/games",
            &owner,
            Some(json!({ "title": "Risk", "price_per_day": price })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "price {}", price);
    }

    let game_id = create_game(&app, &owner, json!({ "title": "Risk" })).await;

    let response = send(
        &app,
        Method::PUT,
        &format!("/api/v1/games/{}", game_id),
        Some(&owner),
        Some(json!({ "price_per_day": "12345.00" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post(
        &app,
        &format!("/api/v1/games/{}/availability", game_id),
        &other,
        Some(json!({ "available": false })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post(
        &app,
        &format!("/api/v1/games/{}/availability", game_id),
        &owner,
        Some(json!({ "available": false })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["available"], false);

    let visible = body_json(get(&app, "/api/v1/games", &student).await).await;
    assert!(visible.as_array().unwrap().is_empty());

    let own = body_json(get(&app, "/api/v1/games", &owner).await).await;
    assert_eq!(own.as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_registration_rules(pool: PgPool) {
    let app = common::build_test_app(pool);
    let register_with = |body: serde_json::Value| {
        let app = app.clone();
        async move { send(&app, Method::POST, "/api/v1/auth/register", None, Some(body)).await }
    };

    let response = register_with(json!({
        "username": "root",
        "email": "root@campus.edu",
        "password": "password123",
        "password_confirm": "password123",
        "role": "super_admin",
    }))
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = register_with(json!({
        "username": "ada",
        "email": "ada@campus.edu",
        "password": "password123",
        "password_confirm": "password124",
    }))
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Passwords do not match.");

    let (_, _) = register(&app, "ada", "student").await;
    let response = register_with(json!({
        "username": "ada",
        "email": "other@campus.edu",
        "password": "password123",
        "password_confirm": "password123",
    }))
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_account_insert_maps_only_account_conflicts(pool: PgPool) {
    let repository = Repository::new(pool.clone());
    let account = |username: &'static str, email: &'static str| NewUser {
        username,
        email,
        password_hash: "hash",
        first_name: Some("Ada"),
        last_name: None,
        role: Role::Student,
    };

    repository
        .users
        .create(&account("ada", "ada@campus.edu"))
        .await
        .unwrap();

    let err = repository
        .users
        .create(&account("ada", "other@campus.edu"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let err = repository
        .users
        .create(&account("grace", "ada@campus.edu"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    sqlx::query("CREATE UNIQUE INDEX users_first_name_idx ON users (first_name)")
        .execute(&pool)
        .await
        .unwrap();
    let err = repository
        .users
        .create(&account("grace", "grace@campus.edu"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Database(_)));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_login_redirects_to_role_dashboard(pool: PgPool) {
    let app = common::build_test_app(pool);
    register(&app, "owner", "student_admin").await;

    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "owner", "password": "password123" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["redirect"], "/dashboard/student-admin");
    assert_eq!(json["user"]["role"], "student_admin");
    let token = json["token"].as_str().unwrap().to_string();

    let json = body_json(get(&app, "/api/v1/auth/redirect", &token).await).await;
    assert_eq!(json["redirect"], "/dashboard/student-admin");

    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/login",
        None,
        Some(json!({ "username": "owner", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_protected_routes_require_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = send(&app, Method::GET, "/api/v1/my-rentals", None, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(&app, "/api/v1/profile", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_role_change_is_super_admin_only(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (student, student_id) = register(&app, "ada", "student").await;
    let root = super_admin(&app, &pool, "root").await;
    let uri = format!("/api/v1/users/{}/role", student_id);

    let response = send(
        &app,
        Method::PUT,
        &uri,
        Some(&student),
        Some(json!({ "role": "student_admin" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = send(
        &app,
        Method::PUT,
        &uri,
        Some(&root),
        Some(json!({ "role": "student_admin" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["role"], "student_admin");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_forgot_password_unknown_email(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/forgot-password",
        None,
        Some(json!({ "email": "nobody@campus.edu" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "Email not registered.");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_reset_password_mismatch(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/reset-password",
        None,
        Some(json!({
            "reset_token": "whatever",
            "new_password": "new-password-1",
            "confirm_password": "new-password-2",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Passwords do not match.");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore] // Needs a Redis server at redis://127.0.0.1:6379
async fn test_reset_password_requires_verified_otp(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = send(
        &app,
        Method::POST,
        "/api/v1/auth/reset-password",
        None,
        Some(json!({
            "reset_token": "never-issued",
            "new_password": "new-password-1",
            "confirm_password": "new-password-1",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "You must verify OTP first.");
}

// ---------------------------------------------------------------------------
// Profile & dashboards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_profile_hides_money_from_other_users(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (owner, owner_id) = register(&app, "owner", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let root = super_admin(&app, &pool, "root").await;
    let game_id = create_game(&app, &owner, json!({ "title": "Catan" })).await;
    let rental_id = request_rental(&app, &student, game_id, 3).await;
    post(
        &app,
        &format!("/api/v1/update-status/{}/approved", rental_id),
        &owner,
        None,
    )
    .await;
    post(&app, &format!("/api/v1/rental/{}/pay", rental_id), &student, None).await;

    let own = body_json(get(&app, "/api/v1/profile", &owner).await).await;
    assert_eq!(own["is_own_profile"], true);
    assert_eq!(own["show_financial_details"], true);
    assert_eq!(own["total_games_listed"], 1);
    assert_eq!(own["currently_rented_games"], 1);
    assert_eq!(own["total_revenue_earned"], "150.00");

    let seen = body_json(get(&app, &format!("/api/v1/profile/{}", owner_id), &student).await).await;
    assert_eq!(seen["is_own_profile"], false);
    assert_eq!(seen["show_financial_details"], false);
    assert_eq!(seen["currently_rented_games"], 1);
    assert_eq!(seen["total_revenue_earned"], "0");

    let audited = body_json(get(&app, &format!("/api/v1/profile/{}", owner_id), &root).await).await;
    assert_eq!(audited["show_financial_details"], true);
    assert_eq!(audited["total_revenue_earned"], "150.00");

    let mine = body_json(get(&app, "/api/v1/profile", &student).await).await;
    assert_eq!(mine["total_rentals_made"], 1);
    assert_eq!(mine["active_rentals"], 1);
    assert_eq!(mine["total_spent_on_rentals"], "150.00");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_dashboards_follow_role(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (owner, _) = register(&app, "owner", "student_admin").await;
    let (student, _) = register(&app, "ada", "student").await;
    let root = super_admin(&app, &pool, "root").await;
    let game_id = create_game(&app, &owner, json!({ "title": "Catan" })).await;
    request_rental(&app, &student, game_id, 3).await;

    let json = body_json(get(&app, "/api/v1/dashboard", &student).await).await;
    assert_eq!(json["kind"], "student");
    assert_eq!(json["rentals"].as_array().unwrap().len(), 1);

    let json = body_json(get(&app, "/api/v1/dashboard", &owner).await).await;
    assert_eq!(json["kind"], "student_admin");
    assert_eq!(json["rentals"][0]["renter_username"], "ada");

    let json = body_json(get(&app, "/api/v1/dashboard/super-admin", &root).await).await;
    assert_eq!(json["users"].as_array().unwrap().len(), 3);

    let response = get(&app, "/api/v1/dashboard/super-admin", &owner).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get(&app, "/api/v1/dashboard/student-admin", &student).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
