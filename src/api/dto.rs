//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! Domain types that already have the right wire shape are returned as-is.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{AttendanceEntry, AttendanceStatus, Child, DailyReport, ReportSummary};

// ============================================
// CHILDREN DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct ChildListResponse {
    pub total: usize,
    pub children: Vec<Child>,
}

// ============================================
// ATTENDANCE DTOs
// ============================================

/// Mark attendance request
#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub status: AttendanceStatus,
}

/// Today's attendance board
#[derive(Debug, Serialize)]
pub struct AttendanceTodayResponse {
    pub date: NaiveDate,
    pub attendance: BTreeMap<String, AttendanceEntry>,
}

// ============================================
// REPORT DTOs
// ============================================

/// Children that still need a report
#[derive(Debug, Serialize)]
pub struct AvailableResponse {
    pub date: NaiveDate,
    pub children: Vec<String>,
}

/// Query parameters for listing reports
#[derive(Debug, Deserialize)]
pub struct ReportListQuery {
    /// Defaults to today
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ReportListResponse {
    pub date: NaiveDate,
    pub total: usize,
    pub reports: Vec<ReportSummary>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub id: String,
    pub report: DailyReport,
}

// ============================================
// THEME DTOs
// ============================================

#[derive(Debug, Deserialize)]
pub struct TagRequest {
    pub tag: String,
}

/// Replace today's themes, or switch a single tag
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DayThemesRequest {
    Replace { themes: Vec<String> },
    Toggle { tag: String, on: bool },
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub note: String,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "unhealthy"
    pub status: String,
    /// Store status: "ok" or "error"
    pub store: String,
    pub uptime_seconds: u64,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_themes_request_shapes() {
        let replace: DayThemesRequest =
            serde_json::from_str(r#"{"themes": ["Colors"]}"#).unwrap();
        assert!(matches!(replace, DayThemesRequest::Replace { themes } if themes == ["Colors"]));

        let toggle: DayThemesRequest =
            serde_json::from_str(r#"{"tag": "Animals", "on": false}"#).unwrap();
        assert!(matches!(toggle, DayThemesRequest::Toggle { on: false, .. }));
    }
}
