use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    AppState,
    auth::{self, AuthUser},
    error::ApiError,
    handlers::require_field,
    models::{LoginRequest, NewUser, RegisterUserRequest},
    response::{envelope, message},
    validate,
};

/// register_user
///
/// **Public**: Creates an account. Email and phone number must both be
/// unused; the password is hashed before it ever reaches the repository.
/// The optional `role` field defaults to `visitor`.
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = RegisterUserRequest,
    responses(
        (status = 201, description = "User registered", body = crate::models::User),
        (status = 400, description = "Missing field or invalid email"),
        (status = 409, description = "Email or phone number already registered")
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let full_name = require_field(payload.full_name.as_deref(), "fullName")?;
    let email = require_field(payload.email.as_deref(), "email")?;
    let password = require_field(payload.password.as_deref(), "password")?;
    let phone_number = require_field(payload.phone_number.as_deref(), "phoneNumber")?;
    validate::validate_email(&email)?;

    if state.repo.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::Conflict(
            "Email is already registered.".to_string(),
        ));
    }
    if state.repo.find_user_by_phone(&phone_number).await?.is_some() {
        return Err(ApiError::Conflict(
            "Phone number is already registered.".to_string(),
        ));
    }

    let password_hash = auth::hash_password(&password)?;
    let user = state
        .repo
        .create_user(NewUser {
            full_name,
            email,
            password_hash,
            phone_number,
            role: payload.role.unwrap_or_default(),
            newsletter_opt_in: payload.newsletter_opt_in.unwrap_or(false),
        })
        .await?;

    tracing::info!("registered user {}", user.id);

    Ok((
        StatusCode::CREATED,
        envelope("User registered successfully.", "user", user),
    ))
}

/// login_user
///
/// **Public**: Verifies credentials, signs an access token, and installs it
/// as an HttpOnly cookie (the body carries it too, for non-browser clients).
/// Unknown email and wrong password are indistinguishable from outside.
#[utoipa::path(
    post,
    path = "/api/v1/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; access token in body and cookie"),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = require_field(payload.email.as_deref(), "email")?;
    let password = require_field(payload.password.as_deref(), "password")?;

    // One rejection for both failure kinds, so the endpoint cannot be used
    // to probe which emails hold accounts.
    let rejection = || ApiError::Unauthorized("Invalid email or password.".to_string());

    let user = state
        .repo
        .find_user_by_email(&email)
        .await?
        .ok_or_else(rejection)?;

    if !auth::verify_password(&password, &user.password_hash) {
        return Err(rejection());
    }

    let token = auth::issue_access_token(&user, &state.config)?;

    tracing::info!("user {} logged in", user.id);

    let body = json!({
        "success": true,
        "message": "Logged in successfully.",
        "accessToken": token,
        "user": user,
    });

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, auth::session_cookie(&token))],
        Json(body),
    ))
}

/// logout_user
///
/// **Authenticated**: Ends the browser session by expiring the token cookie.
/// Tokens are stateless, so there is nothing server-side to revoke; a copied
/// token stays valid until it expires.
#[utoipa::path(
    post,
    path = "/api/v1/users/logout",
    responses(
        (status = 200, description = "Session cookie cleared"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn logout_user(_user: AuthUser) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, auth::clear_session_cookie())],
        message("Logged out successfully."),
    )
}

/// current_session
///
/// **Authenticated**: Resolves the caller's credential back to the full user
/// record, re-read from the database.
#[utoipa::path(
    get,
    path = "/api/v1/users/session",
    responses(
        (status = 200, description = "The authenticated user", body = crate::models::User),
        (status = 401, description = "Missing, invalid, or expired token")
    )
)]
pub async fn current_session(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .repo
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Session user no longer exists.".to_string()))?;

    Ok((StatusCode::OK, envelope("Session is active.", "user", user)))
}
