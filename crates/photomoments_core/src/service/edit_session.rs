//! Per-record edit session state machine.
//!
//! # Responsibility
//! - Track the draft value of the single open field edit.
//! - Guarantee that cancel has no persistence side effect.
//!
//! # Invariants
//! - At most one edit session is open at a time; beginning a new session
//!   replaces the prior draft, discarding it unsaved.
//! - A draft only reaches storage through `take()`, whose result the caller
//!   routes to the field editor and store.

use chrono::{NaiveDate, NaiveTime};

/// Draft value held while one field of one record is being edited.
///
/// Location drafts keep the raw text exactly as typed; parsing happens at
/// save time so the user can correct one coordinate and resubmit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditDraft {
    Date(NaiveDate),
    Time(NaiveTime),
    Location {
        latitude: String,
        longitude: String,
    },
}

/// Edit lifecycle of the browsing screen: viewing, or editing one field of
/// the record at `index`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditSession {
    #[default]
    Viewing,
    Editing { index: usize, draft: EditDraft },
}

impl EditSession {
    /// Opens an edit for one field of the record at `index`.
    ///
    /// Any previously open draft is replaced and discarded unsaved.
    pub fn begin(&mut self, index: usize, draft: EditDraft) {
        *self = Self::Editing { index, draft };
    }

    /// Discards the open draft, if any. Never touches storage.
    pub fn cancel(&mut self) {
        *self = Self::Viewing;
    }

    /// Closes the session and yields the draft for the save path.
    ///
    /// Returns `None` when no edit is open.
    pub fn take(&mut self) -> Option<(usize, EditDraft)> {
        match std::mem::take(self) {
            Self::Viewing => None,
            Self::Editing { index, draft } => Some((index, draft)),
        }
    }

    /// Returns whether an edit is currently open.
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }
}
