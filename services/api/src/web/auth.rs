//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, logout, profile
//! updates, and session rehydration.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;
use crate::web::token::{self, SESSION_COOKIE, SESSION_TTL_SECONDS};
use crate::web::{ApiFailure, MessageResponse};
use aidoctor_core::domain::User;
use aidoctor_core::ports::{PortError, PortResult};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: String,
    pub country: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub phone: String,
    pub country: String,
}

/// The public view of a user. Never carries the password hash.
#[derive(Serialize, ToSchema)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub country: String,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            country: user.country,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserView,
}

//=========================================================================================
// Password Hashing Helpers
//=========================================================================================

fn hash_password(password: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> PortResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PortError::Unexpected(format!("Failed to parse password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

//=========================================================================================
// Cookie Helpers
//=========================================================================================

fn session_cookie(token: &str) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, SESSION_TTL_SECONDS
    )
}

fn clear_session_cookie() -> String {
    format!(
        "{}=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    )
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Email already registered"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    // 1. Reject duplicate emails up front
    if state
        .db
        .find_credentials_by_email(&req.email)
        .await?
        .is_some()
    {
        return Err(PortError::Conflict("Email already registered".to_string()).into());
    }

    // 2. Hash the password and persist the new user
    let password_hash = hash_password(&req.password)?;
    let user = User {
        id: Uuid::new_v4().to_string(),
        email: req.email,
        name: req.name,
        phone: req.phone,
        country: req.country,
    };
    state.db.create_user(&user, &password_hash).await?;
    info!("User created with id: {}", user.id);

    // 3. Issue the session token and set the cookie
    let token = token::issue(&state.config.session_secret, &user.id)?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&token))],
        Json(AuthResponse { user: user.into() }),
    ))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    // 1. Look up the stored credentials. An unknown email and a wrong
    //    password must produce the exact same response.
    let creds = state
        .db
        .find_credentials_by_email(&req.email)
        .await?
        .ok_or(PortError::InvalidCredentials)?;

    // 2. Verify the password
    if !verify_password(&req.password, &creds.password_hash)? {
        return Err(PortError::InvalidCredentials.into());
    }

    // 3. Load the public view of the user
    let user = state
        .db
        .find_user_by_id(&creds.id)
        .await?
        .ok_or(PortError::InvalidCredentials)?;
    info!("User authenticated: {}", user.id);

    // 4. Issue the session token and set the cookie
    let token = token::issue(&state.config.session_secret, &user.id)?;

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&token))],
        Json(AuthResponse { user: user.into() }),
    ))
}

/// POST /auth/logout - Clear the session cookie
///
/// The server keeps no session state, so logout is purely client-side and
/// succeeds even without a prior session.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful", body = MessageResponse)
    )
)]
pub async fn logout_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(MessageResponse {
            message: "Successfully logged out".to_string(),
        }),
    )
}

/// PUT /auth/update-profile - Overwrite the caller's mutable profile fields
///
/// All three fields must be supplied; there are no partial-field semantics.
/// Email and password are never mutated through this path.
#[utoipa::path(
    put,
    path = "/auth/update-profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = AuthResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<AuthResponse>, ApiFailure> {
    let updated = state
        .db
        .update_profile(&user.id, &req.name, &req.phone, &req.country)
        .await?;
    Ok(Json(AuthResponse {
        user: updated.into(),
    }))
}

/// GET /auth/session - Return the current user, used by clients to
/// rehydrate identity on load.
#[utoipa::path(
    get,
    path = "/auth/session",
    responses(
        (status = 200, description = "Current session user", body = AuthResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn session_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<AuthResponse> {
    Json(AuthResponse { user: user.into() })
}
