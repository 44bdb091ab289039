//! Moment domain model.
//!
//! # Responsibility
//! - Define the canonical record for one captured photo.
//! - Derive the human-readable display string from canonical fields.
//! - Validate records on write and decode paths.
//!
//! # Invariants
//! - `id` is stable and never reused for another moment.
//! - `capture_date` and `capture_time` are the canonical date/time; the
//!   display string is derived from them, never the other way around.
//! - A moment without a capture time renders a midnight time component.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for a persisted moment.
///
/// Derived from the capture instant in epoch milliseconds; kept as a type
/// alias to make semantic intent explicit in signatures.
pub type MomentId = String;

/// Canonical record for one captured photo.
///
/// The wire shape matches the persisted collection blob: camelCase field
/// names, ISO `YYYY-MM-DD` dates and `HH:MM` clock times so re-parsing is
/// locale-independent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Moment {
    /// Stable ID assigned at capture; never reassigned.
    pub id: MomentId,
    /// Opaque photo URI/path handed over by the capture collaborator.
    /// The core never dereferences it.
    pub photo_ref: String,
    /// Canonical calendar date of the capture.
    pub capture_date: NaiveDate,
    /// Canonical clock time of the capture; `None` means "time not set".
    #[serde(default, with = "clock_time")]
    pub capture_time: Option<NaiveTime>,
    /// Derived `dd/mm/yyyy HH:MM` rendering of the canonical fields.
    /// Recomputed on every date/time mutation; never edited directly.
    pub display_text: String,
    /// Latitude in floating-point degrees. Finite, otherwise unbounded.
    pub latitude: f64,
    /// Longitude in floating-point degrees. Finite, otherwise unbounded.
    pub longitude: f64,
}

/// Validation failure for a moment record.
#[derive(Debug, Clone, PartialEq)]
pub enum MomentValidationError {
    /// The stable ID is empty.
    EmptyId,
    /// The photo reference is empty.
    EmptyPhotoRef,
    /// A coordinate is NaN or infinite.
    NonFiniteCoordinate { field: &'static str, value: f64 },
}

impl Display for MomentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "moment id must not be empty"),
            Self::EmptyPhotoRef => write!(f, "moment photo_ref must not be empty"),
            Self::NonFiniteCoordinate { field, value } => {
                write!(f, "moment {field} must be a finite number, got {value}")
            }
        }
    }
}

impl Error for MomentValidationError {}

impl Moment {
    /// Creates a moment with all canonical fields populated by the caller.
    ///
    /// # Invariants
    /// - `display_text` is initialized from (`capture_date`, `capture_time`).
    pub fn new(
        id: impl Into<MomentId>,
        photo_ref: impl Into<String>,
        capture_date: NaiveDate,
        capture_time: Option<NaiveTime>,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: id.into(),
            photo_ref: photo_ref.into(),
            capture_date,
            capture_time,
            display_text: compose_display(capture_date, capture_time),
            latitude,
            longitude,
        }
    }

    /// Checks record-level invariants.
    ///
    /// Called by repository write paths before persistence and by the load
    /// path after decoding, so invalid state is rejected instead of masked.
    pub fn validate(&self) -> Result<(), MomentValidationError> {
        if self.id.is_empty() {
            return Err(MomentValidationError::EmptyId);
        }
        if self.photo_ref.is_empty() {
            return Err(MomentValidationError::EmptyPhotoRef);
        }
        if !self.latitude.is_finite() {
            return Err(MomentValidationError::NonFiniteCoordinate {
                field: "latitude",
                value: self.latitude,
            });
        }
        if !self.longitude.is_finite() {
            return Err(MomentValidationError::NonFiniteCoordinate {
                field: "longitude",
                value: self.longitude,
            });
        }
        Ok(())
    }

    /// Re-derives `display_text` from the canonical date/time fields.
    pub fn refresh_display(&mut self) {
        self.display_text = compose_display(self.capture_date, self.capture_time);
    }
}

/// Formats canonical date/time components as `dd/mm/yyyy HH:MM`.
///
/// A missing time renders as midnight. This is the only place the display
/// string is produced; callers must never patch it textually.
pub fn compose_display(date: NaiveDate, time: Option<NaiveTime>) -> String {
    let time = time.unwrap_or(NaiveTime::MIN);
    date.and_time(time).format("%d/%m/%Y %H:%M").to_string()
}

/// Serde codec for the optional `HH:MM` wire form of `capture_time`.
///
/// chrono's default `NaiveTime` serialization carries seconds; the persisted
/// blob tracks minutes only, matching what the editing UI can set.
mod clock_time {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => serializer.serialize_some(&time.format("%H:%M").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(text) => NaiveTime::parse_from_str(&text, "%H:%M")
                .map(Some)
                .map_err(|err| {
                    serde::de::Error::custom(format!("invalid clock time `{text}`: {err}"))
                }),
            None => Ok(None),
        }
    }
}
