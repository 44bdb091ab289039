//! Stateless field-editing rules for moment records.
//!
//! # Responsibility
//! - Produce an updated record from one new field value.
//! - Keep the derived display string consistent with canonical fields.
//! - Parse free-text coordinate input into finite numbers.
//!
//! # Invariants
//! - `set_date` never touches the capture time; `set_time` never touches
//!   the capture date; `set_location` never touches the display string.
//! - The display string is always re-derived fresh from both canonical
//!   components, never patched textually.
//! - A coordinate that does not parse as a finite number leaves the record
//!   unchanged.

use crate::model::moment::{compose_display, Moment};
use chrono::{NaiveDate, NaiveTime, Timelike};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Which coordinate of a location edit failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateField {
    Latitude,
    Longitude,
}

impl Display for CoordinateField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latitude => write!(f, "latitude"),
            Self::Longitude => write!(f, "longitude"),
        }
    }
}

/// Validation failure for a field edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEditError {
    /// Free-text coordinate input did not parse as a finite number.
    InvalidCoordinate {
        field: CoordinateField,
        input: String,
    },
}

impl Display for FieldEditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCoordinate { field, input } => {
                write!(f, "{field} `{input}` is not a finite number")
            }
        }
    }
}

impl Error for FieldEditError {}

/// Returns a copy of `moment` with a new capture date.
///
/// The capture time is preserved as-is; the display string is recomputed
/// from the new date and the existing time (midnight when unset).
pub fn set_date(moment: &Moment, new_date: NaiveDate) -> Moment {
    let mut updated = moment.clone();
    updated.capture_date = new_date;
    updated.display_text = compose_display(new_date, updated.capture_time);
    updated
}

/// Returns a copy of `moment` with a new capture time.
///
/// The capture date is preserved as-is; seconds are truncated because the
/// canonical clock time tracks minutes only.
pub fn set_time(moment: &Moment, new_time: NaiveTime) -> Moment {
    let new_time = truncate_to_minute(new_time);
    let mut updated = moment.clone();
    updated.capture_time = Some(new_time);
    updated.display_text = compose_display(updated.capture_date, Some(new_time));
    updated
}

/// Returns a copy of `moment` with new coordinates parsed from free text.
///
/// Both inputs are parsed before either field is applied, so a failure on
/// one coordinate leaves the whole record unchanged. The display string is
/// not affected by location.
pub fn set_location(
    moment: &Moment,
    latitude_input: &str,
    longitude_input: &str,
) -> Result<Moment, FieldEditError> {
    let latitude = parse_coordinate(CoordinateField::Latitude, latitude_input)?;
    let longitude = parse_coordinate(CoordinateField::Longitude, longitude_input)?;

    let mut updated = moment.clone();
    updated.latitude = latitude;
    updated.longitude = longitude;
    Ok(updated)
}

/// Parses one free-text coordinate into a finite `f64`.
///
/// Rejects anything `f64::from_str` rejects, plus NaN and infinities that
/// would round-trip badly through the JSON blob.
pub fn parse_coordinate(field: CoordinateField, input: &str) -> Result<f64, FieldEditError> {
    let parsed = input.trim().parse::<f64>().map_err(|_| {
        FieldEditError::InvalidCoordinate {
            field,
            input: input.to_string(),
        }
    })?;

    if !parsed.is_finite() {
        return Err(FieldEditError::InvalidCoordinate {
            field,
            input: input.to_string(),
        });
    }

    Ok(parsed)
}

fn truncate_to_minute(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}
