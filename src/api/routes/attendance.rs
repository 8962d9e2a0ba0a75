//! Attendance Routes
//!
//! - GET /api/v1/attendance/today - Today's marks
//! - GET /api/v1/attendance/board - Whole roster with marks and report state
//! - GET /api/v1/attendance/summary - Marked / total counts
//! - PUT /api/v1/attendance/:child - Mark a child present or absent

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{AttendanceTodayResponse, MarkAttendanceRequest};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::domain::{AttendanceEntry, AttendanceSummary, DayBoard, ReportAction};

/// GET /api/v1/attendance/today
pub async fn today(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AttendanceTodayResponse>> {
    let record = state.attendance.today().await?;
    Ok(Json(AttendanceTodayResponse {
        date: state.clock.today(),
        attendance: record.attendance,
    }))
}

/// GET /api/v1/attendance/board
pub async fn board(State(state): State<Arc<AppState>>) -> ApiResult<Json<DayBoard>> {
    let board = state
        .reports
        .board_today()
        .await
        .map_err(|e| ApiError::from_report(e, ReportAction::Load))?;
    Ok(Json(board))
}

/// GET /api/v1/attendance/summary
pub async fn summary(State(state): State<Arc<AppState>>) -> ApiResult<Json<AttendanceSummary>> {
    Ok(Json(state.attendance.summary().await?))
}

/// PUT /api/v1/attendance/:child
///
/// Body: `{"status": "present"}` or `{"status": "absent"}`.
pub async fn mark(
    State(state): State<Arc<AppState>>,
    Path(child): Path<String>,
    Json(req): Json<MarkAttendanceRequest>,
) -> ApiResult<Json<AttendanceEntry>> {
    let entry = state.attendance.mark(&child, req.status).await?;
    Ok(Json(entry))
}
