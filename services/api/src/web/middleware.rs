//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::web::{state::AppState, token, ApiFailure};
use aidoctor_core::domain::User;
use aidoctor_core::ports::PortError;

/// The authenticated caller, injected into request extensions by `require_auth`.
#[derive(Clone)]
pub struct CurrentUser(pub User);

/// Middleware that validates the session cookie and resolves the caller.
///
/// If valid, inserts the resolved `CurrentUser` into request extensions for
/// handlers to use. If missing or invalid, returns 401 with a generic
/// message; the underlying decode error is never surfaced.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiFailure> {
    // 1. Extract cookie header
    let cookie_header = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(PortError::Unauthorized)?;

    // 2. Parse the session token from the cookie
    let session_token = cookie_header
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
        .ok_or(PortError::Unauthorized)?;

    // 3. Verify the signature and recover the user id
    let user_id = token::verify(&state.config.session_secret, session_token)?;

    // 4. Resolve against the credential store; a token for a deleted
    //    account is as good as no token.
    let user = state
        .db
        .find_user_by_id(&user_id)
        .await
        .map_err(|e| {
            debug!("User lookup failed during auth: {:?}", e);
            PortError::Unauthorized
        })?
        .ok_or(PortError::Unauthorized)?;

    // 5. Continue to the handler with the caller's identity attached
    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}
