//! Daily reports (`dailyReports`)
//!
//! Covers both the report form (who still needs a report today, prefill,
//! validation and submission) and the browser (reports for a date, open one
//! for editing, save the edit).
//!
//! A report is stored under `YYYY-MM-DD:<childName>` so each child gets at
//! most one report per day. Times are stored in display form (`8:30 AM`) and
//! handed back in 24-hour form when a report is opened for editing.

use crate::domain::attendance::{day_key, AttendanceBoard, AttendanceError};
use crate::domain::clock::Clock;
use crate::domain::models::{AttendanceStatus, DailyReport, Feeling, Portion, MAX_COUNT};
use crate::domain::roster::{RosterError, RosterService};
use crate::domain::themes::{ThemeConfigService, ThemeError};
use crate::domain::time_format::{to_display, to_editable, TimeFormatError};
use crate::store::types::require_object;
use crate::store::{Collection, DateRange, DocumentStore, StoreError};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Time error: {0}")]
    Time(#[from] TimeFormatError),

    #[error("{0} is not marked present today")]
    NotPresent(String),

    #[error("{child} already has a report for {date}")]
    AlreadyReported { child: String, date: NaiveDate },

    #[error("Report not found: {0}")]
    NotFound(String),

    #[error("{0} is not on the roster")]
    UnknownChild(String),

    #[error("Theme error: {0}")]
    Theme(#[from] ThemeError),

    #[error("Attendance error: {0}")]
    Attendance(#[from] AttendanceError),

    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),
}

/// Which report operation failed; selects the generic message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportAction {
    Load,
    Submit,
    Update,
}

impl ReportAction {
    pub fn generic_message(&self) -> &'static str {
        match self {
            ReportAction::Load => "Failed to load reports.",
            ReportAction::Submit => "Error submitting daily report.",
            ReportAction::Update => "Failed to update report.",
        }
    }
}

impl ReportError {
    /// True when the error comes from bad input rather than the backend
    pub fn is_user_error(&self) -> bool {
        match self {
            ReportError::Validation(_)
            | ReportError::Time(_)
            | ReportError::NotPresent(_)
            | ReportError::AlreadyReported { .. }
            | ReportError::NotFound(_)
            | ReportError::UnknownChild(_) => true,
            ReportError::Theme(e) => !matches!(e, ThemeError::Store(_)),
            _ => false,
        }
    }

    pub fn user_message(&self, action: ReportAction) -> String {
        if self.is_user_error() {
            self.to_string()
        } else {
            action.generic_message().to_string()
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;

/// The fields staff fill in and may later edit
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportFields {
    pub in_time: String,
    pub out_time: String,
    pub snack: Option<Portion>,
    pub meal: Option<Portion>,
    pub sleep_from: String,
    pub sleep_to: String,
    pub sleep_not: bool,
    pub diaper_changes: Option<u8>,
    pub poops: Option<u8>,
    pub feelings: Vec<Feeling>,
    pub notes: String,
    pub theme_of_the_day: Vec<String>,
    pub ouch: bool,
    pub ouch_report: Option<String>,
}

/// A new report submission
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportForm {
    pub child_name: String,
    #[serde(flatten)]
    pub fields: ReportFields,
}

/// Prefill for a new report
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    pub child_name: String,
    pub email: String,
    pub email2: Option<String>,
    /// Arrival time from attendance, `HH:MM`
    pub in_time: String,
    pub theme_of_the_day: Vec<String>,
    /// Tags that may be selected
    pub theme_options: Vec<String>,
    pub common_parents_note: Option<String>,
}

/// A tile in the report browser
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub id: String,
    pub child_name: String,
    pub date: DateTime<FixedOffset>,
    pub in_time: String,
    pub out_time: String,
}

/// One child's line on the home board
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardRow {
    pub name: String,
    pub status: Option<AttendanceStatus>,
    /// `HH:MM` the child was marked
    pub time: Option<String>,
    pub reported: bool,
}

/// The whole roster for a day with attendance, report state and themes
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayBoard {
    pub date: NaiveDate,
    pub theme: Vec<String>,
    pub theme_of_the_day: Vec<String>,
    pub children: Vec<BoardRow>,
}

/// A stored report opened for editing, times in 24-hour form
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EditableReport {
    pub id: String,
    pub child_name: String,
    pub email: String,
    pub email2: Option<String>,
    pub date: DateTime<FixedOffset>,
    pub common_parents_note: Option<String>,
    #[serde(flatten)]
    pub fields: ReportFields,
}

/// Document id for a child's report on `day`
pub fn report_key(day: NaiveDate, child_name: &str) -> String {
    format!("{}:{}", day_key(day), child_name)
}

/// Validated report fields, times in display form
#[derive(Debug, Clone, PartialEq)]
struct CheckedFields {
    in_time: String,
    out_time: String,
    snack: Portion,
    meal: Portion,
    sleep_from: String,
    sleep_to: String,
    sleep_not: bool,
    diaper_changes: u8,
    poops: u8,
    feelings: Vec<Feeling>,
    notes: String,
    theme_of_the_day: Vec<String>,
    ouch: bool,
    ouch_report: Option<String>,
}

impl CheckedFields {
    /// Patch over exactly the editable fields
    fn patch(&self) -> serde_json::Value {
        json!({
            "inTime": self.in_time,
            "outTime": self.out_time,
            "snack": self.snack,
            "meal": self.meal,
            "sleepFrom": self.sleep_from,
            "sleepTo": self.sleep_to,
            "sleepNot": self.sleep_not,
            "diaperChanges": self.diaper_changes,
            "poops": self.poops,
            "feelings": self.feelings,
            "notes": self.notes,
            "themeOfTheDay": self.theme_of_the_day,
            "ouch": self.ouch,
            "ouchReport": self.ouch_report,
        })
    }
}

fn required_time(label: &str, raw: &str) -> ReportResult<String> {
    if raw.trim().is_empty() {
        return Err(ReportError::Validation(format!("{} is required", label)));
    }
    Ok(to_display(raw)?)
}

fn required_count(label: &str, value: Option<u8>) -> ReportResult<u8> {
    match value {
        None => Err(ReportError::Validation(format!("{} is required", label))),
        Some(n) if n > MAX_COUNT => Err(ReportError::Validation(format!(
            "{} must be between 0 and {}",
            label, MAX_COUNT
        ))),
        Some(n) => Ok(n),
    }
}

/// Check a submission or edit. `allowed` extends the vocabulary with tags
/// already on the stored report.
fn check_fields(
    fields: ReportFields,
    vocabulary: &[String],
    allowed: &[String],
) -> ReportResult<CheckedFields> {
    let in_time = required_time("In time", &fields.in_time)?;
    let out_time = required_time("Out time", &fields.out_time)?;

    let snack = fields
        .snack
        .ok_or_else(|| ReportError::Validation("Snack is required".to_string()))?;
    let meal = fields
        .meal
        .ok_or_else(|| ReportError::Validation("Meal is required".to_string()))?;

    let (sleep_from, sleep_to) = if fields.sleep_not {
        (String::new(), String::new())
    } else {
        (
            required_time("Sleep from", &fields.sleep_from)?,
            required_time("Sleep to", &fields.sleep_to)?,
        )
    };

    let diaper_changes = required_count("Diaper changes", fields.diaper_changes)?;
    let poops = required_count("Poops", fields.poops)?;

    let mut feelings: Vec<Feeling> = Vec::with_capacity(fields.feelings.len());
    for feeling in fields.feelings {
        if !feelings.contains(&feeling) {
            feelings.push(feeling);
        }
    }

    let mut themes: Vec<String> = Vec::with_capacity(fields.theme_of_the_day.len());
    for tag in fields.theme_of_the_day {
        let tag = tag.trim().to_string();
        if tag.is_empty() || themes.contains(&tag) {
            continue;
        }
        if !vocabulary.contains(&tag) && !allowed.contains(&tag) {
            return Err(ThemeError::UnknownTag(tag).into());
        }
        themes.push(tag);
    }

    let ouch_report = if fields.ouch {
        match fields.ouch_report.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Some(text.to_string()),
            _ => {
                return Err(ReportError::Validation(
                    "Describe what happened when ouch is checked".to_string(),
                ))
            }
        }
    } else {
        None
    };

    Ok(CheckedFields {
        in_time,
        out_time,
        snack,
        meal,
        sleep_from,
        sleep_to,
        sleep_not: fields.sleep_not,
        diaper_changes,
        poops,
        feelings,
        notes: fields.notes.trim().to_string(),
        theme_of_the_day: themes,
        ouch: fields.ouch,
        ouch_report,
    })
}

fn editable_time(raw: &str) -> String {
    match to_editable(raw) {
        Ok(time) => time,
        Err(e) => {
            tracing::warn!(time = %raw, error = %e, "Stored report time is not parseable");
            raw.to_string()
        }
    }
}

#[derive(Clone)]
pub struct ReportService {
    store: Arc<dyn DocumentStore>,
    roster: RosterService,
    attendance: AttendanceBoard,
    themes: Arc<ThemeConfigService>,
    clock: Arc<dyn Clock>,
}

impl ReportService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        roster: RosterService,
        attendance: AttendanceBoard,
        themes: Arc<ThemeConfigService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            roster,
            attendance,
            themes,
            clock,
        }
    }

    /// Children with a report dated `day`
    pub async fn reported_on(&self, day: NaiveDate) -> ReportResult<BTreeSet<String>> {
        let range = DateRange::for_day(day, self.clock.offset());
        let docs = self.store.query_range(Collection::DailyReports, range).await?;
        Ok(docs
            .iter()
            .filter_map(|doc| doc.data.get("childName").and_then(|v| v.as_str()))
            .map(str::to_string)
            .collect())
    }

    /// Children present on `day` who do not have a report yet, sorted
    pub async fn available_for_report(&self, day: NaiveDate) -> ReportResult<Vec<String>> {
        let present = self.attendance.present_on(day).await?;
        let reported = self.reported_on(day).await?;
        Ok(present.difference(&reported).cloned().collect())
    }

    pub async fn available_today(&self) -> ReportResult<Vec<String>> {
        self.available_for_report(self.clock.today()).await
    }

    /// Every child on the roster, unmarked ones included
    pub async fn board(&self, day: NaiveDate) -> ReportResult<DayBoard> {
        let children = self.roster.list().await?;
        let record = self.attendance.record_for(day).await?;
        let reported = self.reported_on(day).await?;
        let themes = self.themes.current().await?;

        let children = children
            .into_iter()
            .map(|child| {
                let entry = record.attendance.get(&child.name);
                BoardRow {
                    status: entry.map(|e| e.status),
                    time: entry.map(|e| e.time.clone()),
                    reported: reported.contains(&child.name),
                    name: child.name,
                }
            })
            .collect();

        Ok(DayBoard {
            date: day,
            theme: themes.theme,
            theme_of_the_day: themes.theme_of_the_day,
            children,
        })
    }

    pub async fn board_today(&self) -> ReportResult<DayBoard> {
        self.board(self.clock.today()).await
    }

    /// Ensure a child may get a report today
    async fn check_reportable(&self, child_name: &str, today: NaiveDate) -> ReportResult<()> {
        if self.reported_on(today).await?.contains(child_name) {
            return Err(ReportError::AlreadyReported {
                child: child_name.to_string(),
                date: today,
            });
        }
        if !self.attendance.present_on(today).await?.contains(child_name) {
            return Err(ReportError::NotPresent(child_name.to_string()));
        }
        Ok(())
    }

    /// Prefill a new report for a child who is available today
    pub async fn draft(&self, child_name: &str) -> ReportResult<ReportDraft> {
        let child = self
            .roster
            .find_by_name(child_name)
            .await?
            .ok_or_else(|| ReportError::UnknownChild(child_name.to_string()))?;

        let today = self.clock.today();
        self.check_reportable(&child.name, today).await?;

        let in_time = self
            .attendance
            .record_for(today)
            .await?
            .attendance
            .get(&child.name)
            .map(|entry| entry.time.clone())
            .unwrap_or_default();
        let themes = self.themes.current().await?;

        Ok(ReportDraft {
            common_parents_note: themes.note_for(today).map(str::to_string),
            child_name: child.name,
            email: child.email,
            email2: child.email2,
            in_time,
            theme_of_the_day: themes.theme_of_the_day,
            theme_options: themes.theme,
        })
    }

    /// Validate and file a new report for today
    pub async fn submit(&self, form: ReportForm) -> ReportResult<(String, DailyReport)> {
        let result = self.try_submit(form).await;
        if let Err(e) = &result {
            if e.is_user_error() {
                tracing::warn!(error = %e, "Rejected daily report");
            } else {
                tracing::error!(error = %e, "Error submitting daily report");
            }
        }
        result
    }

    async fn try_submit(&self, form: ReportForm) -> ReportResult<(String, DailyReport)> {
        let name = form.child_name.trim();
        if name.is_empty() {
            return Err(ReportError::Validation("Please select a child".to_string()));
        }
        let child = self
            .roster
            .find_by_name(name)
            .await?
            .ok_or_else(|| ReportError::UnknownChild(name.to_string()))?;

        let now = self.clock.now();
        let today = now.date_naive();
        self.check_reportable(&child.name, today).await?;

        let themes = self.themes.current().await?;
        let fields = check_fields(form.fields, &themes.theme, &[])?;

        let report = DailyReport {
            child_name: child.name.clone(),
            email: child.email,
            email2: child.email2,
            date: now,
            in_time: fields.in_time,
            out_time: fields.out_time,
            snack: fields.snack,
            meal: fields.meal,
            sleep_from: fields.sleep_from,
            sleep_to: fields.sleep_to,
            sleep_not: fields.sleep_not,
            diaper_changes: fields.diaper_changes,
            poops: fields.poops,
            feelings: fields.feelings,
            notes: fields.notes,
            theme_of_the_day: fields.theme_of_the_day,
            ouch: fields.ouch,
            ouch_report: fields.ouch_report,
            common_parents_note: themes.note_for(today).map(str::to_string),
        };

        let id = report_key(today, &child.name);
        match self
            .store
            .create_unique(Collection::DailyReports, &id, serde_json::to_value(&report)?)
            .await
        {
            Ok(_) => {}
            Err(StoreError::AlreadyExists { .. }) => {
                return Err(ReportError::AlreadyReported {
                    child: child.name,
                    date: today,
                })
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(child = %report.child_name, report_id = %id, "Submitted daily report");
        Ok((id, report))
    }

    /// Reports dated `day`, in date order
    pub async fn list_for_date(&self, day: NaiveDate) -> ReportResult<Vec<ReportSummary>> {
        let range = DateRange::for_day(day, self.clock.offset());
        let docs = self.store.query_range(Collection::DailyReports, range).await?;

        Ok(docs
            .into_iter()
            .filter_map(|doc| match doc.decode::<DailyReport>() {
                Ok(report) => Some(ReportSummary {
                    id: doc.id,
                    child_name: report.child_name,
                    date: report.date,
                    in_time: report.in_time,
                    out_time: report.out_time,
                }),
                Err(e) => {
                    tracing::warn!(doc_id = %doc.id, error = %e, "Skipping malformed report document");
                    None
                }
            })
            .collect())
    }

    pub async fn get(&self, id: &str) -> ReportResult<DailyReport> {
        let doc = self
            .store
            .get(Collection::DailyReports, id)
            .await?
            .ok_or_else(|| ReportError::NotFound(id.to_string()))?;
        Ok(doc.decode()?)
    }

    /// A stored report with its times converted back to 24-hour form
    pub async fn open(&self, id: &str) -> ReportResult<EditableReport> {
        let report = self.get(id).await?;
        Ok(EditableReport {
            id: id.to_string(),
            child_name: report.child_name,
            email: report.email,
            email2: report.email2,
            date: report.date,
            common_parents_note: report.common_parents_note,
            fields: ReportFields {
                in_time: editable_time(&report.in_time),
                out_time: editable_time(&report.out_time),
                snack: Some(report.snack),
                meal: Some(report.meal),
                sleep_from: editable_time(&report.sleep_from),
                sleep_to: editable_time(&report.sleep_to),
                sleep_not: report.sleep_not,
                diaper_changes: Some(report.diaper_changes),
                poops: Some(report.poops),
                feelings: report.feelings,
                notes: report.notes,
                theme_of_the_day: report.theme_of_the_day,
                ouch: report.ouch,
                ouch_report: report.ouch_report,
            },
        })
    }

    /// Save an edit. Child, emails and date are never changed.
    pub async fn update(&self, id: &str, edit: ReportFields) -> ReportResult<DailyReport> {
        let result = self.try_update(id, edit).await;
        if let Err(e) = &result {
            if e.is_user_error() {
                tracing::warn!(report_id = %id, error = %e, "Rejected report edit");
            } else {
                tracing::error!(report_id = %id, error = %e, "Error updating report");
            }
        }
        result
    }

    async fn try_update(&self, id: &str, edit: ReportFields) -> ReportResult<DailyReport> {
        let existing = self.get(id).await?;
        let themes = self.themes.current().await?;
        let fields = check_fields(edit, &themes.theme, &existing.theme_of_the_day)?;

        let doc = match self
            .store
            .merge(Collection::DailyReports, id, require_object(fields.patch())?)
            .await
        {
            Ok(doc) => doc,
            Err(StoreError::NotFound { .. }) => return Err(ReportError::NotFound(id.to_string())),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(child = %existing.child_name, report_id = %id, "Updated daily report");
        Ok(doc.decode()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attendance::AttendanceSettings;
    use crate::domain::clock::FixedClock;
    use crate::domain::models::AttendanceStatus;
    use crate::domain::roster::NewChild;
    use crate::store::MemoryStore;
    use chrono::Duration;

    struct Fixture {
        store: Arc<dyn DocumentStore>,
        clock: Arc<FixedClock>,
        attendance: AttendanceBoard,
        themes: Arc<ThemeConfigService>,
        reports: ReportService,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(
            DateTime::parse_from_rfc3339("2026-10-14T09:00:00-04:00").unwrap(),
        ));
        let roster = RosterService::new(Arc::clone(&store));
        for name in ["Alice", "Bob"] {
            roster
                .add(NewChild {
                    name: name.to_string(),
                    email: format!("{}@example.com", name.to_lowercase()),
                    email2: None,
                })
                .await
                .unwrap();
        }
        let attendance = AttendanceBoard::new(
            Arc::clone(&store),
            roster.clone(),
            clock.clone(),
            AttendanceSettings::default(),
        );
        let themes = Arc::new(ThemeConfigService::new(Arc::clone(&store), clock.clone()));
        let reports = ReportService::new(
            Arc::clone(&store),
            roster,
            attendance.clone(),
            Arc::clone(&themes),
            clock.clone(),
        );
        Fixture {
            store,
            clock,
            attendance,
            themes,
            reports,
        }
    }

    fn fields() -> ReportFields {
        ReportFields {
            in_time: "08:30".to_string(),
            out_time: "15:00".to_string(),
            snack: Some(Portion::All),
            meal: Some(Portion::Partial),
            sleep_from: "12:00".to_string(),
            sleep_to: "13:15".to_string(),
            diaper_changes: Some(2),
            poops: Some(1),
            feelings: vec![Feeling::Happy],
            ..Default::default()
        }
    }

    fn form(child: &str) -> ReportForm {
        ReportForm {
            child_name: child.to_string(),
            fields: fields(),
        }
    }

    #[tokio::test]
    async fn test_alice_bob_scenario() {
        let f = fixture().await;
        assert!(f.reports.available_today().await.unwrap().is_empty());

        f.attendance.mark("Alice", AttendanceStatus::Present).await.unwrap();
        let record = f.attendance.today().await.unwrap();
        assert_eq!(record.attendance["Alice"].time, "09:00");
        assert_eq!(f.reports.available_today().await.unwrap(), vec!["Alice"]);

        f.clock.advance(Duration::hours(6));
        f.reports.submit(form("Alice")).await.unwrap();
        assert!(f.reports.available_today().await.unwrap().is_empty());
        assert_eq!(f.attendance.today().await.unwrap().status_of("Bob"), None);
    }

    #[tokio::test]
    async fn test_board_lists_whole_roster() {
        let f = fixture().await;
        f.themes.add_tag("Colors").await.unwrap();
        f.themes.toggle_day_theme("Colors", true).await.unwrap();
        f.attendance.mark("Alice", AttendanceStatus::Present).await.unwrap();
        f.reports.submit(form("Alice")).await.unwrap();

        let board = f.reports.board_today().await.unwrap();
        assert_eq!(board.theme_of_the_day, vec!["Colors"]);
        assert_eq!(board.children.len(), 2);

        let alice = board.children.iter().find(|r| r.name == "Alice").unwrap();
        assert_eq!(alice.status, Some(AttendanceStatus::Present));
        assert_eq!(alice.time.as_deref(), Some("09:00"));
        assert!(alice.reported);

        let bob = board.children.iter().find(|r| r.name == "Bob").unwrap();
        assert_eq!(bob.status, None);
        assert_eq!(bob.time, None);
        assert!(!bob.reported);
    }

    #[tokio::test]
    async fn test_absent_child_never_available() {
        let f = fixture().await;
        f.attendance.mark("Alice", AttendanceStatus::Present).await.unwrap();
        f.attendance.mark("Bob", AttendanceStatus::Absent).await.unwrap();

        assert_eq!(f.reports.available_today().await.unwrap(), vec!["Alice"]);
        assert!(matches!(
            f.reports.submit(form("Bob")).await,
            Err(ReportError::NotPresent(_))
        ));
        assert!(matches!(
            f.reports.draft("Bob").await,
            Err(ReportError::NotPresent(_))
        ));
    }

    #[tokio::test]
    async fn test_second_submission_rejected() {
        let f = fixture().await;
        f.attendance.mark("Alice", AttendanceStatus::Present).await.unwrap();
        f.reports.submit(form("Alice")).await.unwrap();

        let err = f.reports.submit(form("Alice")).await.unwrap_err();
        assert!(matches!(err, ReportError::AlreadyReported { .. }));
        assert!(err.is_user_error());
        assert_eq!(f.reports.list_for_date(f.clock.today()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_formats_and_stamps() {
        let f = fixture().await;
        f.themes.add_tag("Animals").await.unwrap();
        f.themes.save_note("Bring a hat").await.unwrap();
        f.attendance.mark("Alice", AttendanceStatus::Present).await.unwrap();

        let mut submission = form("Alice");
        submission.fields.theme_of_the_day = vec!["Animals".to_string()];
        let (id, report) = f.reports.submit(submission).await.unwrap();

        assert_eq!(id, "2026-10-14:Alice");
        assert_eq!(report.in_time, "8:30 AM");
        assert_eq!(report.out_time, "3:00 PM");
        assert_eq!(report.sleep_to, "1:15 PM");
        assert_eq!(report.email, "alice@example.com");
        assert_eq!(report.date, f.clock.now());
        assert_eq!(report.common_parents_note.as_deref(), Some("Bring a hat"));

        let stored = f.store.get(Collection::DailyReports, &id).await.unwrap().unwrap();
        assert_eq!(stored.data["childName"], "Alice");
        assert_eq!(stored.data["meal"], "Some");
    }

    #[tokio::test]
    async fn test_validation_rules() {
        let f = fixture().await;
        f.attendance.mark("Alice", AttendanceStatus::Present).await.unwrap();

        let mut missing_out = form("Alice");
        missing_out.fields.out_time.clear();
        assert!(matches!(
            f.reports.submit(missing_out).await,
            Err(ReportError::Validation(_))
        ));

        let mut too_many = form("Alice");
        too_many.fields.poops = Some(MAX_COUNT + 1);
        assert!(matches!(
            f.reports.submit(too_many).await,
            Err(ReportError::Validation(_))
        ));

        let mut ouch = form("Alice");
        ouch.fields.ouch = true;
        assert!(matches!(
            f.reports.submit(ouch).await,
            Err(ReportError::Validation(_))
        ));

        let mut unknown_theme = form("Alice");
        unknown_theme.fields.theme_of_the_day = vec!["Space".to_string()];
        assert!(matches!(
            f.reports.submit(unknown_theme).await,
            Err(ReportError::Theme(ThemeError::UnknownTag(_)))
        ));

        let mut bad_time = form("Alice");
        bad_time.fields.in_time = "25:99".to_string();
        assert!(matches!(
            f.reports.submit(bad_time).await,
            Err(ReportError::Time(_))
        ));

        assert!(f.reports.list_for_date(f.clock.today()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sleep_not_clears_sleep_times() {
        let f = fixture().await;
        f.attendance.mark("Alice", AttendanceStatus::Present).await.unwrap();

        let mut no_nap = form("Alice");
        no_nap.fields.sleep_not = true;
        no_nap.fields.sleep_from = "12:00".to_string();
        no_nap.fields.sleep_to = String::new();
        let (_, report) = f.reports.submit(no_nap).await.unwrap();
        assert_eq!(report.sleep_from, "");
        assert_eq!(report.sleep_to, "");
    }

    #[tokio::test]
    async fn test_draft_prefill() {
        let f = fixture().await;
        f.themes.add_tag("Colors").await.unwrap();
        f.themes.toggle_day_theme("Colors", true).await.unwrap();
        f.attendance.mark("Alice", AttendanceStatus::Present).await.unwrap();

        let draft = f.reports.draft("Alice").await.unwrap();
        assert_eq!(draft.email, "alice@example.com");
        assert_eq!(draft.in_time, "09:00");
        assert_eq!(draft.theme_of_the_day, vec!["Colors"]);
        assert_eq!(draft.common_parents_note, None);
    }

    #[tokio::test]
    async fn test_list_for_date_is_half_open() {
        let f = fixture().await;
        for (id, child, date) in [
            ("late", "Alice", "2026-10-13T23:59:00-04:00"),
            ("first", "Alice", "2026-10-14T00:00:00-04:00"),
            ("second", "Bob", "2026-10-14T17:00:00-04:00"),
            ("next", "Bob", "2026-10-15T00:00:00-04:00"),
        ] {
            f.store
                .create_unique(
                    Collection::DailyReports,
                    id,
                    json!({"childName": child, "date": date, "snack": "All", "meal": "All"}),
                )
                .await
                .unwrap();
        }

        let tiles = f.reports.list_for_date(f.clock.today()).await.unwrap();
        let ids: Vec<_> = tiles.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_open_and_update_keeps_identity() {
        let f = fixture().await;
        f.themes.add_tag("Animals").await.unwrap();
        f.attendance.mark("Alice", AttendanceStatus::Present).await.unwrap();
        let mut submission = form("Alice");
        submission.fields.theme_of_the_day = vec!["Animals".to_string()];
        let (id, original) = f.reports.submit(submission).await.unwrap();

        let opened = f.reports.open(&id).await.unwrap();
        assert_eq!(opened.fields.in_time, "08:30");
        assert_eq!(opened.fields.sleep_to, "13:15");

        // a tag removed from the vocabulary stays valid on an existing report
        f.themes.remove_tag("Animals").await.unwrap();
        f.clock.advance(Duration::days(2));

        let mut edit = opened.fields.clone();
        edit.out_time = "16:45".to_string();
        edit.notes = "  Great day  ".to_string();
        let updated = f.reports.update(&id, edit).await.unwrap();

        assert_eq!(updated.out_time, "4:45 PM");
        assert_eq!(updated.notes, "Great day");
        assert_eq!(updated.theme_of_the_day, vec!["Animals"]);
        assert_eq!(updated.child_name, original.child_name);
        assert_eq!(updated.email, original.email);
        assert_eq!(updated.date, original.date);
    }

    #[tokio::test]
    async fn test_update_missing_report() {
        let f = fixture().await;
        let err = f.reports.update("nope", fields()).await.unwrap_err();
        assert!(matches!(err, ReportError::NotFound(_)));
    }

    #[test]
    fn test_generic_messages() {
        let err = ReportError::Store(StoreError::Lock("poisoned".to_string()));
        assert_eq!(err.user_message(ReportAction::Submit), "Error submitting daily report.");
        assert_eq!(err.user_message(ReportAction::Update), "Failed to update report.");

        let err = ReportError::NotPresent("Bob".to_string());
        assert_eq!(err.user_message(ReportAction::Submit), "Bob is not marked present today");
    }

    #[test]
    fn test_report_form_from_json() {
        let form: ReportForm = serde_json::from_value(json!({
            "childName": "Alice",
            "inTime": "08:30",
            "outTime": "15:00",
            "snack": "None",
            "meal": "All",
            "sleepNot": true,
            "diaperChanges": 0,
            "poops": 0,
            "feelings": ["Quiet"],
        }))
        .unwrap();
        assert_eq!(form.child_name, "Alice");
        assert_eq!(form.fields.snack, Some(Portion::Nothing));
        assert_eq!(form.fields.diaper_changes, Some(0));
        assert_eq!(form.fields.feelings, vec![Feeling::Quiet]);
    }
}
