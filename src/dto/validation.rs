//! Validation helpers for DTOs.

use std::collections::HashMap;

use time::{Date, Time, macros::format_description};
use validator::ValidationError;

/// Validates a kick-off time written as 24-hour `HH:MM`.
///
/// # Examples
///
/// ```ignore
/// validate_kickoff_time("19:00") // Ok
/// validate_kickoff_time("7pm")   // Err - not HH:MM
/// validate_kickoff_time("24:00") // Err - out of range
/// ```
pub fn validate_kickoff_time(value: &str) -> Result<(), ValidationError> {
    parse_kickoff_time(value).map(|_| ())
}

/// Validates a session date written as `YYYY-MM-DD`.
pub fn validate_session_date(value: &str) -> Result<(), ValidationError> {
    parse_session_date(value).map(|_| ())
}

/// Validates that every score in a rating sheet lies between 1 and 5.
pub fn validate_vote_sheet(sheet: &HashMap<String, u8>) -> Result<(), ValidationError> {
    if let Some((rated, score)) = sheet.iter().find(|(_, score)| !(1..=5).contains(*score)) {
        let mut err = ValidationError::new("vote_range");
        err.message = Some(format!("score for `{rated}` must be between 1 and 5 (got {score})").into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn parse_kickoff_time(value: &str) -> Result<Time, ValidationError> {
    let format = format_description!("[hour repr:24]:[minute]");
    Time::parse(value, format).map_err(|_| {
        let mut err = ValidationError::new("kickoff_time_format");
        err.message = Some(format!("time must be formatted as HH:MM (got `{value}`)").into());
        err
    })
}

pub(crate) fn parse_session_date(value: &str) -> Result<Date, ValidationError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value, format).map_err(|_| {
        let mut err = ValidationError::new("session_date_format");
        err.message = Some(format!("date must be formatted as YYYY-MM-DD (got `{value}`)").into());
        err
    })
}
