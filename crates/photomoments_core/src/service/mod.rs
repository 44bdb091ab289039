//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Keep UI/FFI layers decoupled from storage and codec details.
//!
//! # Invariants
//! - Field edits go through the pure editor in `field_edit`; services never
//!   mutate canonical fields or the display string directly.

pub mod edit_session;
pub mod field_edit;
pub mod moment_service;
