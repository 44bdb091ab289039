//! Domain model for captured photo moments.
//!
//! # Responsibility
//! - Define the canonical record shape shared by store, editor and FFI.
//! - Keep the derived display string consistent with canonical fields.
//!
//! # Invariants
//! - Every moment is identified by a stable, immutable `MomentId`.
//! - `display_text` is a write-only cache over canonical date/time
//!   components; it is never re-parsed.

pub mod moment;
