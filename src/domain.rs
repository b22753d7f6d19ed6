pub mod core;
pub mod reserve;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{
    error::Error,
    fmt::{Debug, Display},
    ops::Deref,
    str::FromStr,
};
use thiserror::Error;

pub trait Id:
    Copy
    + Eq
    + Deref<Target = Self::Inner>
    + From<Self::Inner>
    + Display
    + Debug
    + Serialize
    + for<'de> Deserialize<'de>
{
    type Inner: FromStr;
}

pub trait Entity {
    type Id: Id;

    fn id(&self) -> Self::Id;
}

/// Storage access failure, independent of the backing store.
#[derive(Error, Debug)]
pub enum DataAccessError {
    #[error("Database connection error: {0}")]
    ConnectionError(Box<dyn Error + Send + Sync>),
    #[error("Database query error: {0}")]
    QueryError(Box<dyn Error + Send + Sync>),
    #[error("Data read error: {0}")]
    ReadError(Box<dyn Error + Send + Sync>),
    #[error("Data write error: {0}")]
    WriteError(Box<dyn Error + Send + Sync>),
}

/// Malformed or unacceptable caller input. Reported, never silently corrected.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Date is in the past: {0}")]
    PastDate(String),
    #[error("Invalid time: {0}")]
    InvalidTime(String),
    #[error("Date and time must be supplied together")]
    UnpairedDateTime,
    #[error("Number of guests must be a positive integer")]
    InvalidGuestCount,
    #[error("{0} cannot be blank")]
    BlankField(&'static str),
    #[error("Rating must be between 0 and 5: {0}")]
    InvalidRating(f32),
    #[error("Invalid price range: {0}")]
    InvalidPriceRange(String),
    #[error("currGuests cannot exceed maxGuests")]
    GuestsExceedCapacity,
}

/// Parses a zero-padded `YYYY-MM-DD` string into a calendar date.
pub fn parse_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let well_formed = input.len() == 10
        && input.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return Err(ValidationError::InvalidDate(input.to_owned()));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(input.to_owned()))
}

/// As [`parse_date`], but also rejects dates before today on the UTC calendar.
pub fn parse_upcoming_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let date = parse_date(input)?;
    if date < Utc::now().date_naive() {
        return Err(ValidationError::PastDate(input.to_owned()));
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_rejects_invalid_month() {
        assert!(matches!(
            parse_date("2024-13-01"),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_parse_date_rejects_loose_formats() {
        for input in ["2024-1-01", "24-01-01", "2024/01/01", "2024-01-01x", ""] {
            assert!(matches!(
                parse_date(input),
                Err(ValidationError::InvalidDate(_))
            ));
        }
    }

    #[test]
    fn test_parse_date_rejects_impossible_day() {
        assert!(matches!(
            parse_date("2023-02-29"),
            Err(ValidationError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_parse_upcoming_date_rejects_past() {
        assert!(matches!(
            parse_upcoming_date("2000-01-01"),
            Err(ValidationError::PastDate(_))
        ));
    }

    #[test]
    fn test_parse_upcoming_date_accepts_today() {
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(parse_upcoming_date(&today), Ok(Utc::now().date_naive()));
    }

    #[test]
    fn test_parse_upcoming_date_accepts_future() {
        assert!(parse_upcoming_date("2999-12-31").is_ok());
    }
}
