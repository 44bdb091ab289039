//! Core domain logic for PhotoMoments.
//! This crate is the single source of truth for the moment collection and
//! its field-editing invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::moment::{compose_display, Moment, MomentId, MomentValidationError};
pub use repo::moment_repo::{
    MomentRepository, RepoError, RepoResult, SqliteMomentRepository, MOMENTS_KEY,
};
pub use service::edit_session::{EditDraft, EditSession};
pub use service::field_edit::{
    parse_coordinate, set_date, set_location, set_time, CoordinateField, FieldEditError,
};
pub use service::moment_service::{CaptureRequest, MomentService, ServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
