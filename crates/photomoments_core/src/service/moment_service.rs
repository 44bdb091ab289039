//! Moment use-case service.
//!
//! # Responsibility
//! - Provide capture/list/edit/delete entry points for core callers.
//! - Derive stable ids and canonical date/time from the capture instant.
//! - Route field edits through the pure editor before persistence.
//!
//! # Invariants
//! - Service APIs never bypass store validation/persistence contracts.
//! - Assigned ids are unique in the collection and monotonically derived
//!   from the capture instant.
//! - Callers must serialize mutating calls; overlapping read-modify-write
//!   cycles over the whole-collection blob would lose updates.

use crate::model::moment::{Moment, MomentId};
use crate::repo::moment_repo::{MomentRepository, RepoError};
use crate::service::edit_session::EditDraft;
use crate::service::field_edit::{self, FieldEditError};
use chrono::{DateTime, NaiveDate, NaiveTime, Timelike};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Capture hand-off from the camera/geolocation collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    /// Opaque photo URI/path; the core never dereferences it.
    pub photo_ref: String,
    /// Capture instant in Unix epoch milliseconds.
    pub captured_at_ms: i64,
    /// Latitude reported by the sensor, in degrees.
    pub latitude: f64,
    /// Longitude reported by the sensor, in degrees.
    pub longitude: f64,
}

/// Service error for moment use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// Persistence-layer failure, including range and corruption cases.
    Repo(RepoError),
    /// Recoverable field-edit validation failure; the record is unchanged.
    FieldEdit(FieldEditError),
    /// The capture instant does not map to a representable timestamp.
    InvalidCaptureInstant(i64),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::FieldEdit(err) => write!(f, "{err}"),
            Self::InvalidCaptureInstant(ms) => {
                write!(f, "capture instant {ms}ms is out of range")
            }
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::FieldEdit(err) => Some(err),
            Self::InvalidCaptureInstant(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<FieldEditError> for ServiceError {
    fn from(value: FieldEditError) -> Self {
        Self::FieldEdit(value)
    }
}

/// Use-case facade over the moment store.
pub struct MomentService<R: MomentRepository> {
    repo: R,
}

impl<R: MomentRepository> MomentService<R> {
    /// Creates a service using the provided store implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates and appends a moment from a capture hand-off.
    ///
    /// # Contract
    /// - Capture date and time are derived from the instant in UTC, with
    ///   seconds truncated to the minute.
    /// - The assigned id starts at the instant's epoch milliseconds and is
    ///   bumped until unique within the collection.
    /// - Returns the created record; post-persist it is the last element.
    pub fn capture(&self, request: &CaptureRequest) -> Result<Moment, ServiceError> {
        let instant = DateTime::from_timestamp_millis(request.captured_at_ms)
            .ok_or(ServiceError::InvalidCaptureInstant(request.captured_at_ms))?;
        let naive = instant.naive_utc();
        let time = NaiveTime::from_hms_opt(naive.time().hour(), naive.time().minute(), 0);

        let existing = self.repo.load_all()?;
        let id = assign_moment_id(&existing, request.captured_at_ms);

        let moment = Moment::new(
            id,
            request.photo_ref.clone(),
            naive.date(),
            time,
            request.latitude,
            request.longitude,
        );
        self.repo.append(&moment)?;
        info!(
            "event=moment_capture module=service status=ok id={}",
            moment.id
        );
        Ok(moment)
    }

    /// Loads the full ordered collection.
    pub fn list_moments(&self) -> Result<Vec<Moment>, ServiceError> {
        Ok(self.repo.load_all()?)
    }

    /// Replaces the capture date of the record at `index`.
    ///
    /// The capture time is untouched; the display string is recomputed.
    pub fn edit_date(&self, index: usize, new_date: NaiveDate) -> Result<Moment, ServiceError> {
        let moments = self.repo.load_all()?;
        let target = moment_at(&moments, index)?;
        let updated = field_edit::set_date(target, new_date);
        self.repo.replace_at(index, &updated)?;
        Ok(updated)
    }

    /// Replaces the capture time of the record at `index`.
    ///
    /// The capture date is untouched; the display string is recomputed.
    pub fn edit_time(&self, index: usize, new_time: NaiveTime) -> Result<Moment, ServiceError> {
        let moments = self.repo.load_all()?;
        let target = moment_at(&moments, index)?;
        let updated = field_edit::set_time(target, new_time);
        self.repo.replace_at(index, &updated)?;
        Ok(updated)
    }

    /// Replaces both coordinates of the record at `index` from free text.
    ///
    /// A coordinate that fails to parse as a finite number rejects the
    /// whole edit; nothing is persisted and the store stays unchanged.
    pub fn edit_location(
        &self,
        index: usize,
        latitude_input: &str,
        longitude_input: &str,
    ) -> Result<Moment, ServiceError> {
        let moments = self.repo.load_all()?;
        let target = moment_at(&moments, index)?;
        let updated = field_edit::set_location(target, latitude_input, longitude_input)?;
        self.repo.replace_at(index, &updated)?;
        Ok(updated)
    }

    /// Removes the record at `index` and persists the remainder.
    pub fn delete_moment(&self, index: usize) -> Result<(), ServiceError> {
        self.repo.remove_at(index)?;
        info!("event=moment_delete module=service status=ok index={index}");
        Ok(())
    }

    /// Routes a saved edit-session draft to the matching edit operation.
    pub fn apply_draft(&self, index: usize, draft: EditDraft) -> Result<Moment, ServiceError> {
        match draft {
            EditDraft::Date(new_date) => self.edit_date(index, new_date),
            EditDraft::Time(new_time) => self.edit_time(index, new_time),
            EditDraft::Location {
                latitude,
                longitude,
            } => self.edit_location(index, &latitude, &longitude),
        }
    }
}

fn moment_at<'a>(moments: &'a [Moment], index: usize) -> Result<&'a Moment, ServiceError> {
    moments.get(index).ok_or(ServiceError::Repo(RepoError::OutOfRange {
        index,
        len: moments.len(),
    }))
}

/// Derives a unique id from the capture instant.
///
/// Starts at the instant's epoch milliseconds and bumps by one millisecond
/// until the id does not collide with any record already in the collection.
fn assign_moment_id(existing: &[Moment], captured_at_ms: i64) -> MomentId {
    let mut candidate = captured_at_ms;
    loop {
        let id = candidate.to_string();
        if !existing.iter().any(|moment| moment.id == id) {
            return id;
        }
        candidate += 1;
    }
}
