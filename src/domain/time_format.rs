//! Wall-clock time conversion
//!
//! Reports store times in a 12-hour display form (`2:05 PM`); editing works
//! in 24-hour `HH:MM`. Both directions accept either form as input.

use chrono::NaiveTime;
use thiserror::Error;

const PARSE_FORMATS: &[&str] = &["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M:%S %p", "%I:%M%p"];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeFormatError {
    #[error("Invalid time of day: {0:?}")]
    Invalid(String),
}

/// Parse a time of day in 24-hour or 12-hour form
pub fn parse_wall_clock(input: &str) -> Result<NaiveTime, TimeFormatError> {
    let trimmed = input.trim();
    PARSE_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| TimeFormatError::Invalid(input.to_string()))
}

/// `HH:MM`
pub fn hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// `14:05` → `2:05 PM`. Empty input stays empty.
pub fn to_display(input: &str) -> Result<String, TimeFormatError> {
    if input.trim().is_empty() {
        return Ok(String::new());
    }
    Ok(parse_wall_clock(input)?.format("%-I:%M %p").to_string())
}

/// `2:05 PM` → `14:05`. Empty input stays empty.
pub fn to_editable(input: &str) -> Result<String, TimeFormatError> {
    if input.trim().is_empty() {
        return Ok(String::new());
    }
    Ok(hhmm(parse_wall_clock(input)?))
}
