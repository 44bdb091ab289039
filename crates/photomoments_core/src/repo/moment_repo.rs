//! Moment store contracts and SQLite key-value implementation.
//!
//! # Responsibility
//! - Provide ordered-collection CRUD over the single persisted blob.
//! - Keep blob codec and SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - The full collection lives under one fixed key; every mutation is a
//!   whole-collection read-modify-write.
//! - Insertion order is preserved across load/save cycles.
//! - Write paths call `Moment::validate()` before touching storage; the
//!   load path rejects invalid persisted records instead of masking them.
//! - An absent blob is a valid empty state; an undecodable blob is fatal.

use crate::db::DbError;
use crate::model::moment::{Moment, MomentId, MomentValidationError};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed key of the collection blob inside `kv_entries`.
pub const MOMENTS_KEY: &str = "moments";

pub type RepoResult<T> = Result<T, RepoError>;

/// Store error for moment persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(MomentValidationError),
    Db(DbError),
    /// The persisted blob exists but cannot be decoded. Fatal for the load;
    /// no field-by-field salvage is attempted.
    Corrupt(String),
    /// Index outside `[0, len)` on replace/remove. A caller contract
    /// violation, not an expected runtime condition.
    OutOfRange { index: usize, len: usize },
    /// An append would reuse an id already present in the collection.
    DuplicateId(MomentId),
    /// A replace tried to change the immutable id at its slot.
    IdMismatch {
        index: usize,
        stored: MomentId,
        incoming: MomentId,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Corrupt(reason) => {
                write!(f, "moment collection is unreadable: {reason}")
            }
            Self::OutOfRange { index, len } => {
                write!(f, "index {index} out of range for collection of length {len}")
            }
            Self::DuplicateId(id) => write!(f, "moment id already exists: {id}"),
            Self::IdMismatch {
                index,
                stored,
                incoming,
            } => write!(
                f,
                "moment id is immutable: slot {index} holds `{stored}`, got `{incoming}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MomentValidationError> for RepoError {
    fn from(value: MomentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Store interface for the ordered moment collection.
pub trait MomentRepository {
    /// Loads the full collection; an absent blob yields an empty vec.
    fn load_all(&self) -> RepoResult<Vec<Moment>>;
    /// Appends at the end and persists the whole collection.
    fn append(&self, moment: &Moment) -> RepoResult<()>;
    /// Replaces the record at `index` and persists the whole collection.
    fn replace_at(&self, index: usize, moment: &Moment) -> RepoResult<()>;
    /// Removes the record at `index`, shifting the tail down one position,
    /// and persists the remainder.
    fn remove_at(&self, index: usize) -> RepoResult<()>;
}

/// SQLite key-value backed moment store.
pub struct SqliteMomentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMomentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn read_blob(&self) -> RepoResult<Option<String>> {
        let blob = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [MOMENTS_KEY],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(blob)
    }

    fn decode(&self, blob: &str) -> RepoResult<Vec<Moment>> {
        let moments: Vec<Moment> = serde_json::from_str(blob).map_err(|err| {
            error!(
                "event=store_load module=repo status=error error_code=blob_undecodable error={err}"
            );
            RepoError::Corrupt(err.to_string())
        })?;

        for moment in &moments {
            if let Err(err) = moment.validate() {
                error!(
                    "event=store_load module=repo status=error error_code=blob_invalid_record error={err}"
                );
                return Err(RepoError::Corrupt(err.to_string()));
            }
        }

        Ok(moments)
    }

    fn persist(&self, moments: &[Moment]) -> RepoResult<()> {
        // Single upsert of the whole collection; SQLite makes the statement
        // atomic, so a failed write leaves the prior blob authoritative.
        let blob = serde_json::to_string(moments)
            .map_err(|err| RepoError::Corrupt(err.to_string()))?;
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value;",
            params![MOMENTS_KEY, blob],
        )?;
        Ok(())
    }
}

impl MomentRepository for SqliteMomentRepository<'_> {
    fn load_all(&self) -> RepoResult<Vec<Moment>> {
        match self.read_blob()? {
            Some(blob) => self.decode(&blob),
            None => Ok(Vec::new()),
        }
    }

    fn append(&self, moment: &Moment) -> RepoResult<()> {
        moment.validate()?;

        let mut moments = self.load_all()?;
        if moments.iter().any(|existing| existing.id == moment.id) {
            return Err(RepoError::DuplicateId(moment.id.clone()));
        }

        moments.push(moment.clone());
        self.persist(&moments)?;
        info!(
            "event=moment_append module=repo status=ok id={} count={}",
            moment.id,
            moments.len()
        );
        Ok(())
    }

    fn replace_at(&self, index: usize, moment: &Moment) -> RepoResult<()> {
        moment.validate()?;

        let mut moments = self.load_all()?;
        let len = moments.len();
        let slot = moments
            .get_mut(index)
            .ok_or(RepoError::OutOfRange { index, len })?;

        if slot.id != moment.id {
            return Err(RepoError::IdMismatch {
                index,
                stored: slot.id.clone(),
                incoming: moment.id.clone(),
            });
        }

        *slot = moment.clone();
        self.persist(&moments)?;
        info!(
            "event=moment_replace module=repo status=ok id={} index={index}",
            moment.id
        );
        Ok(())
    }

    fn remove_at(&self, index: usize) -> RepoResult<()> {
        let mut moments = self.load_all()?;
        let len = moments.len();
        if index >= len {
            return Err(RepoError::OutOfRange { index, len });
        }

        let removed = moments.remove(index);
        self.persist(&moments)?;
        info!(
            "event=moment_remove module=repo status=ok id={} index={index} count={}",
            removed.id,
            moments.len()
        );
        Ok(())
    }
}
