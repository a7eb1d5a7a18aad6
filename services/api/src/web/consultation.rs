//! services/api/src/web/consultation.rs
//!
//! The passthrough consultation endpoint: validates the symptom payload,
//! delegates to the consultation adapter, and echoes the input back with
//! the provider's free-text response.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::state::AppState;
use crate::web::ApiFailure;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// A patient age, accepted either as a JSON number or a string and echoed
/// back exactly as received.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Age {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Age {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Age::Integer(n) => write!(f, "{}", n),
            Age::Float(n) => write!(f, "{}", n),
            Age::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Deserialize, Serialize, ToSchema)]
pub struct ConsultationRequest {
    pub symptom: String,
    pub sex: String,
    pub age: Age,
    pub country: String,
}

#[derive(Serialize, ToSchema)]
pub struct ConsultationData {
    pub consultation: String,
    pub original_input: ConsultationRequest,
}

#[derive(Serialize, ToSchema)]
pub struct ConsultationResponse {
    pub message: String,
    pub data: ConsultationData,
}

//=========================================================================================
// Handler
//=========================================================================================

/// POST /ai-doctor - Get an AI doctor consultation
///
/// No session is required on this endpoint, matching the original service.
#[utoipa::path(
    post,
    path = "/ai-doctor",
    request_body = ConsultationRequest,
    responses(
        (status = 200, description = "Consultation generated", body = ConsultationResponse),
        (status = 500, description = "Completion provider failure")
    )
)]
pub async fn consultation_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ConsultationRequest>,
) -> Result<Json<ConsultationResponse>, ApiFailure> {
    let consultation = state
        .consultation_adapter
        .consult(&req.symptom, &req.sex, &req.age.to_string(), &req.country)
        .await?;

    Ok(Json(ConsultationResponse {
        message: "Consultation generated successfully".to_string(),
        data: ConsultationData {
            consultation,
            original_input: req,
        },
    }))
}
