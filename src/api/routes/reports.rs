//! Report Routes
//!
//! Daily report form and report browser.
//!
//! - GET /api/v1/reports/available - Present children without a report today
//! - GET /api/v1/reports/draft/:child - Prefill for a new report
//! - POST /api/v1/reports - Submit a report
//! - GET /api/v1/reports?date=YYYY-MM-DD - Reports for a date (default today)
//! - GET /api/v1/reports/:id - Open a report for editing
//! - PATCH /api/v1/reports/:id - Save an edit

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{AvailableResponse, ReportListQuery, ReportListResponse, ReportResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::domain::{EditableReport, ReportAction, ReportDraft, ReportFields, ReportForm};

/// GET /api/v1/reports/available
pub async fn available(State(state): State<Arc<AppState>>) -> ApiResult<Json<AvailableResponse>> {
    let date = state.clock.today();
    let children = state
        .reports
        .available_for_report(date)
        .await
        .map_err(|e| ApiError::from_report(e, ReportAction::Load))?;
    Ok(Json(AvailableResponse { date, children }))
}

/// GET /api/v1/reports/draft/:child
pub async fn draft(
    State(state): State<Arc<AppState>>,
    Path(child): Path<String>,
) -> ApiResult<Json<ReportDraft>> {
    let draft = state
        .reports
        .draft(&child)
        .await
        .map_err(|e| ApiError::from_report(e, ReportAction::Load))?;
    Ok(Json(draft))
}

/// POST /api/v1/reports
///
/// Returns 409 if the child already has a report today.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ReportForm>,
) -> ApiResult<(StatusCode, Json<ReportResponse>)> {
    let (id, report) = state
        .reports
        .submit(form)
        .await
        .map_err(|e| ApiError::from_report(e, ReportAction::Submit))?;
    Ok((StatusCode::CREATED, Json(ReportResponse { id, report })))
}

/// GET /api/v1/reports
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReportListQuery>,
) -> ApiResult<Json<ReportListResponse>> {
    let date = query.date.unwrap_or_else(|| state.clock.today());
    let reports = state
        .reports
        .list_for_date(date)
        .await
        .map_err(|e| ApiError::from_report(e, ReportAction::Load))?;
    Ok(Json(ReportListResponse {
        date,
        total: reports.len(),
        reports,
    }))
}

/// GET /api/v1/reports/:id
pub async fn open(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<EditableReport>> {
    let report = state
        .reports
        .open(&id)
        .await
        .map_err(|e| ApiError::from_report(e, ReportAction::Load))?;
    Ok(Json(report))
}

/// PATCH /api/v1/reports/:id
///
/// Only the editable fields are written; child, emails and date are kept.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(edit): Json<ReportFields>,
) -> ApiResult<Json<ReportResponse>> {
    let report = state
        .reports
        .update(&id, edit)
        .await
        .map_err(|e| ApiError::from_report(e, ReportAction::Update))?;
    Ok(Json(ReportResponse { id, report }))
}
