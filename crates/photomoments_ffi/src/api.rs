//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Keep error semantics simple for the mobile UI: every call returns an
//!   envelope, never a panic.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Mutating calls run one at a time on the platform channel; the core's
//!   whole-collection write contract relies on that serialization.

use chrono::{NaiveDate, NaiveTime};
use log::error;
use photomoments_core::db::open_store;
use photomoments_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CaptureRequest, Moment, MomentService, ServiceError, SqliteMomentRepository,
};
use std::path::PathBuf;
use std::sync::OnceLock;

const MOMENTS_DB_FILE_NAME: &str = "photomoments.sqlite3";
static MOMENTS_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Moment record shape handed to the browsing UI.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentView {
    /// Stable moment ID in string form.
    pub id: String,
    /// Opaque photo URI/path for the image widget.
    pub photo_ref: String,
    /// Canonical capture date as ISO `YYYY-MM-DD`.
    pub capture_date_iso: String,
    /// Canonical capture time as `HH:MM`, or `None` when not set.
    pub capture_time: Option<String>,
    /// Derived `dd/mm/yyyy HH:MM` display string.
    pub display_text: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// List response envelope for the browsing screen.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentListResponse {
    /// Whether the load succeeded.
    pub ok: bool,
    /// Records in insertion order (empty on failure).
    pub items: Vec<MomentView>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

/// Generic action response envelope for capture/edit/delete flows.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentActionResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Created or updated record, when the operation produces one.
    pub moment: Option<MomentView>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl MomentActionResponse {
    fn success(message: impl Into<String>, moment: Option<MomentView>) -> Self {
        Self {
            ok: true,
            moment,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            moment: None,
            message: message.into(),
        }
    }
}

/// Captures a new moment from the camera/geolocation hand-off.
///
/// # FFI contract
/// - Sync call, store-backed execution.
/// - Never panics.
/// - Returns the created record; it is the last element on next list.
#[flutter_rust_bridge::frb(sync)]
pub fn capture_moment(
    photo_ref: String,
    captured_at_ms: i64,
    latitude: f64,
    longitude: f64,
) -> MomentActionResponse {
    let request = CaptureRequest {
        photo_ref: photo_ref.trim().to_string(),
        captured_at_ms,
        latitude,
        longitude,
    };
    match with_moment_service(|service| service.capture(&request)) {
        Ok(moment) => {
            MomentActionResponse::success("Moment saved.", Some(to_moment_view(&moment)))
        }
        Err(err) => MomentActionResponse::failure(format!("capture_moment failed: {err}")),
    }
}

/// Loads the full moment collection in insertion order.
///
/// # FFI contract
/// - Sync call, store-backed execution.
/// - Never panics.
/// - An empty store yields `ok=true` with zero items; an unreadable
///   collection yields `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn list_moments() -> MomentListResponse {
    match with_moment_service(|service| service.list_moments()) {
        Ok(moments) => {
            let items = moments.iter().map(to_moment_view).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No moments saved yet.".to_string()
            } else {
                format!("Loaded {} moment(s).", items.len())
            };
            MomentListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => MomentListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("list_moments failed: {err}"),
        },
    }
}

/// Saves a date edit for the record at `index`.
///
/// # FFI contract
/// - Sync call, store-backed execution.
/// - Never panics; an invalid calendar date is rejected in the envelope.
/// - The capture time is untouched; the display string is recomputed.
#[flutter_rust_bridge::frb(sync)]
pub fn edit_moment_date(index: u32, year: i32, month: u32, day: u32) -> MomentActionResponse {
    let Some(new_date) = NaiveDate::from_ymd_opt(year, month, day) else {
        return MomentActionResponse::failure(format!(
            "edit_moment_date failed: {year:04}-{month:02}-{day:02} is not a valid calendar date"
        ));
    };
    match with_moment_service(|service| service.edit_date(index as usize, new_date)) {
        Ok(moment) => {
            MomentActionResponse::success("Date updated.", Some(to_moment_view(&moment)))
        }
        Err(err) => MomentActionResponse::failure(format!("edit_moment_date failed: {err}")),
    }
}

/// Saves a time edit for the record at `index`.
///
/// # FFI contract
/// - Sync call, store-backed execution.
/// - Never panics; an invalid clock value is rejected in the envelope.
/// - The capture date is untouched; the display string is recomputed.
#[flutter_rust_bridge::frb(sync)]
pub fn edit_moment_time(index: u32, hour: u32, minute: u32) -> MomentActionResponse {
    let Some(new_time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
        return MomentActionResponse::failure(format!(
            "edit_moment_time failed: {hour:02}:{minute:02} is not a valid clock time"
        ));
    };
    match with_moment_service(|service| service.edit_time(index as usize, new_time)) {
        Ok(moment) => {
            MomentActionResponse::success("Time updated.", Some(to_moment_view(&moment)))
        }
        Err(err) => MomentActionResponse::failure(format!("edit_moment_time failed: {err}")),
    }
}

/// Saves a location edit for the record at `index`.
///
/// Coordinate inputs are the raw text typed into the edit fields; parsing
/// and finiteness checks happen in the core field editor.
///
/// # FFI contract
/// - Sync call, store-backed execution.
/// - Never panics; a malformed coordinate is rejected in the envelope and
///   the record stays unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn edit_moment_location(
    index: u32,
    latitude_input: String,
    longitude_input: String,
) -> MomentActionResponse {
    match with_moment_service(|service| {
        service.edit_location(index as usize, &latitude_input, &longitude_input)
    }) {
        Ok(moment) => {
            MomentActionResponse::success("Location updated.", Some(to_moment_view(&moment)))
        }
        Err(err) => MomentActionResponse::failure(format!("edit_moment_location failed: {err}")),
    }
}

/// Deletes the record at `index` and persists the remainder.
///
/// # FFI contract
/// - Sync call, store-backed execution.
/// - Never panics.
/// - Deletion is permanent; there is no tombstone state.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_moment(index: u32) -> MomentActionResponse {
    match with_moment_service(|service| service.delete_moment(index as usize)) {
        Ok(()) => MomentActionResponse::success("Moment deleted.", None),
        Err(err) => MomentActionResponse::failure(format!("delete_moment failed: {err}")),
    }
}

fn resolve_moments_db_path() -> PathBuf {
    MOMENTS_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("PHOTOMOMENTS_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(MOMENTS_DB_FILE_NAME)
        })
        .clone()
}

fn with_moment_service<T>(
    f: impl FnOnce(&MomentService<SqliteMomentRepository<'_>>) -> Result<T, ServiceError>,
) -> Result<T, String> {
    let db_path = resolve_moments_db_path();
    let conn = open_store(&db_path).map_err(|err| format!("moments store open failed: {err}"))?;
    let repo = SqliteMomentRepository::new(&conn);
    let service = MomentService::new(repo);
    f(&service).map_err(|err| {
        error!("event=ffi_call module=ffi status=error error={err}");
        err.to_string()
    })
}

fn to_moment_view(moment: &Moment) -> MomentView {
    MomentView {
        id: moment.id.clone(),
        photo_ref: moment.photo_ref.clone(),
        capture_date_iso: moment.capture_date.format("%Y-%m-%d").to_string(),
        capture_time: moment
            .capture_time
            .map(|time| time.format("%H:%M").to_string()),
        display_text: moment.display_text.clone(),
        latitude: moment.latitude,
        longitude: moment.longitude,
    }
}
