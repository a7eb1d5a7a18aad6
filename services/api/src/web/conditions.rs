//! services/api/src/web/conditions.rs
//!
//! Endpoints for a user's tracked medical condition records. Conditions
//! are created and deleted but never updated.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;
use crate::web::{ApiFailure, MessageResponse};
use aidoctor_core::domain::MedicalCondition;
use aidoctor_core::ports::PortError;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateConditionRequest {
    pub title: String,
    pub description: String,
    /// Optional calendar date in `YYYY-MM-DD` form. Both the camelCase and
    /// snake_case field names are accepted on input.
    #[serde(rename = "diagnosisDate", alias = "diagnosis_date", default)]
    pub diagnosis_date: Option<String>,
    #[serde(default)]
    pub medications: Option<Vec<String>>,
}

#[derive(Serialize, ToSchema)]
pub struct ConditionView {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "diagnosisDate")]
    pub diagnosis_date: Option<String>,
    pub medications: Vec<String>,
}

impl From<MedicalCondition> for ConditionView {
    fn from(condition: MedicalCondition) -> Self {
        Self {
            id: condition.id,
            user_id: condition.user_id,
            title: condition.title,
            description: condition.description,
            diagnosis_date: condition
                .diagnosis_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
            medications: condition.medications,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/medical-conditions - List the caller's conditions
#[utoipa::path(
    get,
    path = "/api/medical-conditions",
    responses(
        (status = 200, description = "The caller's conditions", body = [ConditionView]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_conditions_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<ConditionView>>, ApiFailure> {
    let conditions = state.db.list_conditions(&user.id).await?;
    Ok(Json(conditions.into_iter().map(Into::into).collect()))
}

/// POST /api/medical-conditions - Record a new condition for the caller
#[utoipa::path(
    post,
    path = "/api/medical-conditions",
    request_body = CreateConditionRequest,
    responses(
        (status = 200, description = "Condition created", body = ConditionView),
        (status = 400, description = "Invalid date format"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_condition_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateConditionRequest>,
) -> Result<Json<ConditionView>, ApiFailure> {
    let diagnosis_date = match req.diagnosis_date.as_deref() {
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|e| PortError::Validation(format!("Invalid date format: {}", e)))?,
        ),
        None => None,
    };

    let condition = MedicalCondition {
        id: Uuid::new_v4().to_string(),
        user_id: user.id,
        title: req.title,
        description: req.description,
        diagnosis_date,
        medications: req.medications.unwrap_or_default(),
    };
    state.db.create_condition(&condition).await?;

    Ok(Json(condition.into()))
}

/// DELETE /api/medical-conditions/{id} - Delete one of the caller's conditions
///
/// A condition owned by someone else returns the same 404 as one that does
/// not exist.
#[utoipa::path(
    delete,
    path = "/api/medical-conditions/{id}",
    params(("id" = String, Path, description = "The condition id")),
    responses(
        (status = 200, description = "Condition deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Condition not found")
    )
)]
pub async fn delete_condition_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(condition_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiFailure> {
    state.db.delete_condition(&user.id, &condition_id).await?;
    Ok(Json(MessageResponse {
        message: "Condition deleted successfully".to_string(),
    }))
}
