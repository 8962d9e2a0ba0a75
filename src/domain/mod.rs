//! Daycare domain services
//!
//! - **roster**: children on the roster (`kidsInfo`)
//! - **attendance**: the daily attendance board
//! - **reports**: daily report form and report browser
//! - **themes**: weekly theme tags, today's themes and the parents note
//! - **models**: stored document shapes
//! - **time_format**: 12-hour / 24-hour time conversion
//! - **clock**: injected time source

pub mod attendance;
pub mod clock;
pub mod models;
pub mod reports;
pub mod roster;
pub mod themes;
pub mod time_format;

pub use attendance::{AttendanceBoard, AttendanceError, AttendanceSettings, AttendanceSummary};
pub use clock::{Clock, FixedClock, SystemClock};
pub use models::{
    AttendanceEntry, AttendanceRecord, AttendanceStatus, Child, DailyReport, Feeling, Portion,
    ThemeConfig,
};
pub use reports::{
    BoardRow, DayBoard, EditableReport, ReportAction, ReportDraft, ReportError, ReportFields, ReportForm,
    ReportService, ReportSummary,
};
pub use roster::{ImportSummary, NewChild, RosterError, RosterService};
pub use themes::{ThemeConfigService, ThemeError, ThemeView};
