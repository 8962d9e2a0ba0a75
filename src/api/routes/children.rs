//! Children Routes
//!
//! The roster every other screen reads from.
//!
//! - GET /api/v1/children - List children
//! - POST /api/v1/children - Add a child
//! - POST /api/v1/children/import - Add children from a CSV body

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::ChildListResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::domain::{Child, ImportSummary, NewChild};

/// GET /api/v1/children
pub async fn list_children(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ChildListResponse>> {
    let children = state.roster.list().await?;
    Ok(Json(ChildListResponse {
        total: children.len(),
        children,
    }))
}

/// POST /api/v1/children
///
/// Names must be unique; a duplicate returns 409.
pub async fn add_child(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewChild>,
) -> ApiResult<(StatusCode, Json<Child>)> {
    let child = state.roster.add(req).await?;
    Ok((StatusCode::CREATED, Json(child)))
}

/// POST /api/v1/children/import
///
/// Body is CSV with a `name,email,email2` header row. Existing names are
/// skipped; invalid rows are listed in the response.
pub async fn import_children(
    State(state): State<Arc<AppState>>,
    body: String,
) -> ApiResult<Json<ImportSummary>> {
    let summary = state.roster.import_csv(body.as_bytes()).await?;
    Ok(Json(summary))
}
