//! Core data types for the daycare collections
//!
//! Field names on the wire are camelCase to match the documents already in
//! the store (`childName`, `themeOfTheDay`, `markedAt`, ...).

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Highest value offered for diaper changes and poops
pub const MAX_COUNT: u8 = 4;

/// A child on the roster
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Child {
    /// Document id; not part of the stored body
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email2: Option<String>,
}

/// Attendance status for one child on one day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceStatus::Present => write!(f, "present"),
            AttendanceStatus::Absent => write!(f, "absent"),
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            _ => Err(format!("Invalid status: {}. Use present or absent", s)),
        }
    }
}

/// One child's entry in a day's attendance map
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    pub status: AttendanceStatus,
    /// Wall-clock time of marking, `HH:MM`
    pub time: String,
    /// Full timestamp of marking
    pub marked_at: String,
}

/// Attendance for one calendar day
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AttendanceRecord {
    #[serde(default)]
    pub date: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub attendance: BTreeMap<String, AttendanceEntry>,
}

impl AttendanceRecord {
    pub fn status_of(&self, child_name: &str) -> Option<AttendanceStatus> {
        self.attendance.get(child_name).map(|e| e.status)
    }

    /// Names of children marked present, sorted
    pub fn present(&self) -> impl Iterator<Item = &str> {
        self.attendance
            .iter()
            .filter(|(_, e)| e.status == AttendanceStatus::Present)
            .map(|(name, _)| name.as_str())
    }
}

/// How much of a snack or meal was eaten
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Portion {
    #[serde(rename = "All")]
    All,
    #[serde(rename = "Some")]
    Partial,
    #[serde(rename = "None")]
    Nothing,
}

/// Mood options on the daily report
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feeling {
    Happy,
    Sad,
    Restless,
    Quiet,
    Playful,
    Sick,
}

impl Feeling {
    pub fn all() -> &'static [Feeling] {
        &[
            Feeling::Happy,
            Feeling::Sad,
            Feeling::Restless,
            Feeling::Quiet,
            Feeling::Playful,
            Feeling::Sick,
        ]
    }
}

impl FromStr for Feeling {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feeling::all()
            .iter()
            .copied()
            .find(|f| format!("{:?}", f).eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid feeling: {}", s))
    }
}

/// A filed daily report, as stored in `dailyReports`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub child_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email2: Option<String>,
    pub date: DateTime<FixedOffset>,
    /// Display form, e.g. `8:30 AM`
    #[serde(default)]
    pub in_time: String,
    #[serde(default)]
    pub out_time: String,
    pub snack: Portion,
    pub meal: Portion,
    #[serde(default)]
    pub sleep_from: String,
    #[serde(default)]
    pub sleep_to: String,
    #[serde(default)]
    pub sleep_not: bool,
    #[serde(default, deserialize_with = "compat::count")]
    pub diaper_changes: u8,
    #[serde(default, deserialize_with = "compat::count")]
    pub poops: u8,
    #[serde(default, deserialize_with = "compat::list_or_csv")]
    pub feelings: Vec<Feeling>,
    #[serde(default)]
    pub notes: String,
    #[serde(default, deserialize_with = "compat::list_or_csv")]
    pub theme_of_the_day: Vec<String>,
    #[serde(default)]
    pub ouch: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ouch_report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_parents_note: Option<String>,
}

/// The singleton `appConfig/themeOfTheWeek` document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThemeConfig {
    /// Tag vocabulary for the week
    #[serde(default, deserialize_with = "compat::list_or_csv")]
    pub theme: Vec<String>,
    /// Subset of `theme` active today
    #[serde(default, deserialize_with = "compat::list_or_csv")]
    pub theme_of_the_day: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_parents_note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_parents_note_date: Option<NaiveDate>,
}

impl ThemeConfig {
    /// Drop duplicate tags and day themes that are not in the vocabulary
    pub fn normalized(mut self) -> Self {
        let mut seen = Vec::with_capacity(self.theme.len());
        for tag in self.theme.drain(..) {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !seen.contains(&tag) {
                seen.push(tag);
            }
        }
        self.theme = seen;

        let day: Vec<String> = self
            .theme
            .iter()
            .filter(|t| self.theme_of_the_day.iter().any(|d| d.trim() == t.as_str()))
            .cloned()
            .collect();
        self.theme_of_the_day = day;
        self
    }

    /// The common parents note, only if it was saved on `day`
    pub fn note_for(&self, day: NaiveDate) -> Option<&str> {
        match (&self.common_parents_note, self.common_parents_note_date) {
            (Some(note), Some(date)) if date == day && !note.trim().is_empty() => {
                Some(note.as_str())
            }
            _ => None,
        }
    }
}

/// Deserializers for older documents written by the first version of the app
mod compat {
    use serde::de::{self, Deserializer};
    use serde::Deserialize;
    use std::fmt::Display;
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv<T> {
        List(Vec<T>),
        Csv(String),
    }

    /// A list, or a comma-separated string of items
    pub fn list_or_csv<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + FromStr,
        T::Err: Display,
    {
        match ListOrCsv::<T>::deserialize(deserializer)? {
            ListOrCsv::List(items) => Ok(items),
            ListOrCsv::Csv(text) => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<T>().map_err(de::Error::custom))
                .collect(),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(u64),
        Text(String),
    }

    /// A small count stored either as a number or as a numeric string
    pub fn count<'de, D>(deserializer: D) -> Result<u8, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = match NumberOrString::deserialize(deserializer)? {
            NumberOrString::Number(n) => n,
            NumberOrString::Text(s) if s.trim().is_empty() => 0,
            NumberOrString::Text(s) => s.trim().parse::<u64>().map_err(de::Error::custom)?,
        };
        u8::try_from(value).map_err(de::Error::custom)
    }
}
