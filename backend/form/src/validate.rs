//! # Field Rules
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. presence of name, mobile, dob and action (whitespace-only counts as absent)
//! 2. name: letters and whitespace only
//! 3. mobile: 10 digits, leading digit 6-9
//! 4. dob: a calendar date strictly before today, giving an age in `0..=150`
//! 5. action: create, update or delete in any case
//!
//! Name and mobile are trimmed before they are checked, so surrounding blanks
//! never reject an otherwise valid value.
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use thiserror::Error;

use crate::{
    action::Action,
    models::{FormInput, Submission},
};

pub const MAX_AGE: i32 = 150;

static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").expect("name pattern compiles"));

static MOBILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("mobile pattern compiles"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingField(Vec<&'static str>),

    #[error("Name must contain only letters and spaces")]
    InvalidName,

    #[error("Mobile number must be 10 digits starting with 6, 7, 8 or 9")]
    InvalidMobile,

    #[error("Invalid date of birth: {0}")]
    InvalidDob(&'static str),

    #[error("Action must be one of: create, update, delete")]
    InvalidAction,
}

pub fn validate(input: &FormInput, today: NaiveDate) -> Result<Submission, ValidationError> {
    let fields = [
        ("name", present(&input.name)),
        ("mobile", present(&input.mobile)),
        ("dob", present(&input.dob)),
        ("action", present(&input.action)),
    ];

    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(field, _)| *field)
        .collect();

    let [name, mobile, dob, action] = fields.map(|(_, value)| value);
    let (Some(name), Some(mobile), Some(dob), Some(action)) = (name, mobile, dob, action) else {
        return Err(ValidationError::MissingField(missing));
    };

    let name = validate_name(name)?;
    let mobile = validate_mobile(mobile)?;
    let (dob, age) = derive_age(dob, today)?;
    let action = action.parse::<Action>()?;

    Ok(Submission {
        name,
        mobile,
        dob,
        age,
        action,
    })
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();

    if NAME.is_match(name) {
        Ok(name.to_string())
    } else {
        Err(ValidationError::InvalidName)
    }
}

pub fn validate_mobile(mobile: &str) -> Result<String, ValidationError> {
    let mobile = mobile.trim();

    if MOBILE.is_match(mobile) {
        Ok(mobile.to_string())
    } else {
        Err(ValidationError::InvalidMobile)
    }
}

/// Accepts `YYYY-MM-DD`, an RFC 3339 timestamp, or a naive `YYYY-MM-DDTHH:MM:SS`.
pub fn parse_dob(dob: &str) -> Result<NaiveDate, ValidationError> {
    let dob = dob.trim();

    NaiveDate::parse_from_str(dob, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(dob).map(|d| d.date_naive()))
        .or_else(|_| NaiveDateTime::parse_from_str(dob, "%Y-%m-%dT%H:%M:%S%.f").map(|d| d.date()))
        .map_err(|_| ValidationError::InvalidDob("not a calendar date"))
}

/// Whole years between `dob` and `today`. The year only counts once the
/// anniversary itself has been reached.
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> i32 {
    let age = today.year() - dob.year();

    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age - 1
    } else {
        age
    }
}

pub fn derive_age(dob: &str, today: NaiveDate) -> Result<(NaiveDate, u8), ValidationError> {
    let dob = parse_dob(dob)?;

    if dob >= today {
        return Err(ValidationError::InvalidDob("must be in the past"));
    }

    let age = age_on(dob, today);
    if !(0..=MAX_AGE).contains(&age) {
        return Err(ValidationError::InvalidDob("age must be between 0 and 150"));
    }

    let age = u8::try_from(age).map_err(|_| ValidationError::InvalidDob("age out of range"))?;

    Ok((dob, age))
}
