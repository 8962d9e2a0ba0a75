//! Theme Routes
//!
//! - GET /api/v1/themes - Vocabulary, today's themes and today's note
//! - POST /api/v1/themes/tags - Add a tag
//! - DELETE /api/v1/themes/tags/:tag - Remove a tag (also from today's themes)
//! - PUT /api/v1/themes/day - Replace or toggle today's themes
//! - PUT /api/v1/themes/note - Save the common parents note for today

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{DayThemesRequest, NoteRequest, TagRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::domain::{ThemeError, ThemeView};

/// GET /api/v1/themes
pub async fn get_themes(State(state): State<Arc<AppState>>) -> ApiResult<Json<ThemeView>> {
    Ok(Json(state.themes.view_today().await?))
}

/// POST /api/v1/themes/tags
pub async fn add_tag(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TagRequest>,
) -> ApiResult<Json<ThemeView>> {
    state.themes.add_tag(&req.tag).await?;
    Ok(Json(state.themes.view_today().await?))
}

/// DELETE /api/v1/themes/tags/:tag
pub async fn remove_tag(
    State(state): State<Arc<AppState>>,
    Path(tag): Path<String>,
) -> ApiResult<Json<ThemeView>> {
    match state.themes.remove_tag(&tag).await {
        Ok(_) => {}
        Err(ThemeError::UnknownTag(tag)) => {
            return Err(ApiError::NotFound(format!("Unknown theme tag: {:?}", tag)))
        }
        Err(e) => return Err(e.into()),
    }
    Ok(Json(state.themes.view_today().await?))
}

/// PUT /api/v1/themes/day
///
/// Body: `{"themes": [...]}` or `{"tag": "...", "on": true}`.
pub async fn set_day_themes(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DayThemesRequest>,
) -> ApiResult<Json<ThemeView>> {
    match req {
        DayThemesRequest::Replace { themes } => state.themes.set_day_themes(&themes).await?,
        DayThemesRequest::Toggle { tag, on } => state.themes.toggle_day_theme(&tag, on).await?,
    };
    Ok(Json(state.themes.view_today().await?))
}

/// PUT /api/v1/themes/note
pub async fn save_note(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NoteRequest>,
) -> ApiResult<Json<ThemeView>> {
    state.themes.save_note(&req.note).await?;
    Ok(Json(state.themes.view_today().await?))
}
