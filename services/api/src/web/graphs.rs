//! services/api/src/web/graphs.rs
//!
//! Endpoints for medicine-dosage history graphs. A save call replaces the
//! caller's entire graph set atomically; there is no per-graph update.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::web::middleware::CurrentUser;
use crate::web::state::AppState;
use crate::web::{ApiFailure, MessageResponse};
use aidoctor_core::domain::MedicineGraph;

//=========================================================================================
// Request/Response Types
//=========================================================================================

/// One graph as supplied by the client. The id is client-chosen and is
/// persisted verbatim; the caller is responsible for uniqueness.
#[derive(Deserialize, ToSchema)]
pub struct GraphPayload {
    pub id: String,
    pub name: String,
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
}

#[derive(Serialize, ToSchema)]
pub struct GraphView {
    pub id: String,
    pub name: String,
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<Value>,
    pub user_id: String,
}

impl From<MedicineGraph> for GraphView {
    fn from(graph: MedicineGraph) -> Self {
        Self {
            id: graph.id,
            name: graph.name,
            data: graph.data,
            user_id: graph.user_id,
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /api/medicine-graphs - Replace the caller's entire graph set
#[utoipa::path(
    post,
    path = "/api/medicine-graphs",
    request_body = [GraphPayload],
    responses(
        (status = 200, description = "Graphs saved", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 500, description = "Storage failure; no partial state is left behind")
    )
)]
pub async fn save_graphs_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<Vec<GraphPayload>>,
) -> Result<Json<MessageResponse>, ApiFailure> {
    let graphs: Vec<MedicineGraph> = payload
        .into_iter()
        .map(|graph| MedicineGraph {
            id: graph.id,
            name: graph.name,
            data: graph.data,
            user_id: user.id.clone(),
        })
        .collect();

    state.db.replace_graphs(&user.id, &graphs).await?;
    Ok(Json(MessageResponse {
        message: "Graphs saved successfully".to_string(),
    }))
}

/// GET /api/medicine-graphs - List the caller's graphs
///
/// Each graph's data array comes back sorted ascending by its `date` key.
#[utoipa::path(
    get,
    path = "/api/medicine-graphs",
    responses(
        (status = 200, description = "The caller's graphs", body = [GraphView]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_graphs_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<Json<Vec<GraphView>>, ApiFailure> {
    let graphs = state.db.list_graphs(&user.id).await?;
    Ok(Json(graphs.into_iter().map(Into::into).collect()))
}
