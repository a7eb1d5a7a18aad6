//! services/api/src/web/mod.rs
//!
//! The HTTP layer: axum handlers, the auth middleware, the session token
//! module, and the master OpenAPI definition.

pub mod auth;
pub mod conditions;
pub mod consultation;
pub mod graphs;
pub mod middleware;
pub mod state;
pub mod token;

pub use middleware::require_auth;

use aidoctor_core::ports::PortError;
use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use state::AppState;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AI Doctor API",
        description = "API for AI Doctor consultations",
        version = "1.0.0"
    ),
    paths(
        consultation::consultation_handler,
        auth::signup_handler,
        auth::login_handler,
        auth::logout_handler,
        auth::update_profile_handler,
        auth::session_handler,
        conditions::list_conditions_handler,
        conditions::create_condition_handler,
        conditions::delete_condition_handler,
        graphs::save_graphs_handler,
        graphs::list_graphs_handler,
    ),
    components(schemas(
        MessageResponse,
        auth::SignupRequest,
        auth::LoginRequest,
        auth::UpdateProfileRequest,
        auth::UserView,
        auth::AuthResponse,
        conditions::CreateConditionRequest,
        conditions::ConditionView,
        graphs::GraphPayload,
        graphs::GraphView,
        consultation::ConsultationRequest,
        consultation::ConsultationResponse,
    )),
    tags(
        (name = "AI Doctor API", description = "Account management, tracked medical records and AI consultations.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Shared Response Types and HTTP Error Mapping
//=========================================================================================

/// A bare `{"message": ...}` success payload.
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// The body carried by every error response, matching the original API's shape.
#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

/// An HTTP-facing failure: a status code plus a single human-readable detail
/// string. No structured error codes are exposed to clients.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    detail: String,
}

impl From<PortError> for ApiFailure {
    fn from(err: PortError) -> Self {
        let status = match &err {
            PortError::Validation(_) | PortError::Conflict(_) => StatusCode::BAD_REQUEST,
            PortError::Unauthorized | PortError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            PortError::NotFound(_) => StatusCode::NOT_FOUND,
            PortError::Upstream(_) | PortError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            detail: err.to_string(),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

//=========================================================================================
// Router Construction
//=========================================================================================

/// Builds the application router: public auth/consultation endpoints plus
/// the session-protected resource endpoints.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Public routes (no auth required). Logout only clears the cookie, so it
    // is deliberately idempotent without a session.
    let public_routes = Router::new()
        .route("/ai-doctor", post(consultation::consultation_handler))
        .route("/auth/signup", post(auth::signup_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/update-profile", put(auth::update_profile_handler))
        .route("/auth/session", get(auth::session_handler))
        .route(
            "/api/medical-conditions",
            get(conditions::list_conditions_handler).post(conditions::create_condition_handler),
        )
        .route(
            "/api/medical-conditions/{id}",
            delete(conditions::delete_condition_handler),
        )
        .route(
            "/api/medicine-graphs",
            get(graphs::list_graphs_handler).post(graphs::save_graphs_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
}
