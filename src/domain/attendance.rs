//! Attendance board
//!
//! One `attendance` document per calendar day, keyed `YYYY-MM-DD`, holding a
//! map of child name → `{status, time, markedAt}`. Marking a child is a single
//! field-level upsert of `attendance.<name>`, so two caretakers marking
//! different children at the same time never overwrite each other.

use crate::domain::clock::Clock;
use crate::domain::models::{AttendanceEntry, AttendanceRecord, AttendanceStatus};
use crate::domain::roster::{RosterError, RosterService};
use crate::domain::time_format::hhmm;
use crate::store::{Collection, DateRange, DocumentStore, StoreError};
use chrono::{NaiveDate, SecondsFormat};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0} is not on the roster")]
    UnknownChild(String),

    #[error("{child} is already marked {status} today")]
    AlreadyMarked {
        child: String,
        status: AttendanceStatus,
    },
}

impl AttendanceError {
    /// Rejections caused by the request rather than the backend
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AttendanceError::UnknownChild(_) | AttendanceError::AlreadyMarked { .. }
        )
    }

    /// Message shown to staff when a mark fails
    pub fn user_message(&self) -> String {
        if self.is_user_error() {
            self.to_string()
        } else {
            "Failed to mark attendance.".to_string()
        }
    }
}

pub type AttendanceResult<T> = Result<T, AttendanceError>;

#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceSettings {
    /// Refuse to change a child's status once it has been set for the day
    pub lock_after_mark: bool,
}

/// Progress line for the day
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AttendanceSummary {
    pub date: NaiveDate,
    pub total: usize,
    pub marked: usize,
    pub present: usize,
    pub absent: usize,
}

/// Document id of the attendance record for `day`
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

#[derive(Clone)]
pub struct AttendanceBoard {
    store: Arc<dyn DocumentStore>,
    roster: RosterService,
    clock: Arc<dyn Clock>,
    settings: AttendanceSettings,
}

impl AttendanceBoard {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        roster: RosterService,
        clock: Arc<dyn Clock>,
        settings: AttendanceSettings,
    ) -> Self {
        Self {
            store,
            roster,
            clock,
            settings,
        }
    }

    /// Attendance for `day`, merged over every document dated that day
    pub async fn record_for(&self, day: NaiveDate) -> AttendanceResult<AttendanceRecord> {
        let range = DateRange::for_day(day, self.clock.offset());
        let docs = self.store.query_range(Collection::Attendance, range).await?;

        let mut merged = AttendanceRecord::default();
        for doc in docs {
            match doc.decode::<AttendanceRecord>() {
                Ok(record) => {
                    merged.date = merged.date.or(record.date);
                    merged.attendance.extend(record.attendance);
                }
                Err(e) => {
                    tracing::warn!(doc_id = %doc.id, error = %e, "Skipping malformed attendance document");
                }
            }
        }
        Ok(merged)
    }

    pub async fn today(&self) -> AttendanceResult<AttendanceRecord> {
        self.record_for(self.clock.today()).await
    }

    /// Names of children marked present on `day`
    pub async fn present_on(&self, day: NaiveDate) -> AttendanceResult<BTreeSet<String>> {
        let record = self.record_for(day).await?;
        Ok(record.present().map(str::to_string).collect())
    }

    /// Mark a child present or absent for today
    pub async fn mark(
        &self,
        child_name: &str,
        status: AttendanceStatus,
    ) -> AttendanceResult<AttendanceEntry> {
        let result = self.try_mark(child_name, status).await;
        match &result {
            Err(e) if e.is_user_error() => {
                tracing::warn!(child = %child_name, status = %status, error = %e, "Rejected attendance mark");
            }
            Err(e) => {
                tracing::error!(child = %child_name, status = %status, error = %e, "Error marking attendance");
            }
            Ok(_) => {}
        }
        result
    }

    async fn try_mark(
        &self,
        child_name: &str,
        status: AttendanceStatus,
    ) -> AttendanceResult<AttendanceEntry> {
        if self.roster.find_by_name(child_name).await?.is_none() {
            return Err(AttendanceError::UnknownChild(child_name.to_string()));
        }

        let now = self.clock.now();
        let today = now.date_naive();

        if self.settings.lock_after_mark {
            if let Some(existing) = self.record_for(today).await?.status_of(child_name) {
                return Err(AttendanceError::AlreadyMarked {
                    child: child_name.to_string(),
                    status: existing,
                });
            }
        }

        let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, false);
        let entry = AttendanceEntry {
            status,
            time: hhmm(now.time()),
            marked_at: stamp.clone(),
        };

        self.store
            .upsert_field(
                Collection::Attendance,
                &day_key(today),
                &["attendance", child_name],
                serde_json::to_value(&entry)?,
                json!({ "date": stamp, "attendance": {} }),
            )
            .await?;

        tracing::info!(child = %child_name, status = %status, time = %entry.time, "Marked attendance");
        Ok(entry)
    }

    pub async fn summary(&self) -> AttendanceResult<AttendanceSummary> {
        let today = self.clock.today();
        let record = self.record_for(today).await?;
        let total = self.roster.list().await?.len();
        let present = record.present().count();

        Ok(AttendanceSummary {
            date: today,
            total,
            marked: record.attendance.len(),
            present,
            absent: record.attendance.len() - present,
        })
    }
}
