//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the moment-collection access contract.
//! - Isolate key-value blob codec details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `Moment::validate()` before persistence.
//! - Every mutation rewrites the entire serialized collection; the blob is
//!   the unit of atomicity.
//! - Repository APIs return semantic errors (`OutOfRange`, `Corrupt`) in
//!   addition to DB transport errors.

pub mod moment_repo;
