//! Daily routine completion storage.
//!
//! # Responsibility
//! - Persist per-day routine check-offs keyed by owner × day × routine id.
//!
//! # Invariants
//! - A missing key reads as "not completed".
//! - `day` is already validated as `YYYY-MM-DD` by the service layer.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RoutineStoreResult<T> = Result<T, RoutineStoreError>;

#[derive(Debug)]
pub enum RoutineStoreError {
    Db(DbError),
}

impl Display for RoutineStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RoutineStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for RoutineStoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Composite key for one routine check-off.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoutineKey {
    pub owner_id: String,
    pub day: String,
    pub routine_id: String,
}

impl RoutineKey {
    pub fn new(
        owner_id: impl Into<String>,
        day: impl Into<String>,
        routine_id: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            day: day.into(),
            routine_id: routine_id.into(),
        }
    }
}

/// Keyed completion store injected into routine services.
pub trait RoutineCompletionStore {
    fn is_completed(&self, key: &RoutineKey) -> RoutineStoreResult<bool>;
    fn set_completed(&self, key: &RoutineKey, completed: bool) -> RoutineStoreResult<()>;
    /// Routine ids completed by `owner_id` on `day`, sorted.
    fn completed_on(&self, owner_id: &str, day: &str) -> RoutineStoreResult<Vec<String>>;
}

/// SQLite-backed completion store.
pub struct SqliteRoutineStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRoutineStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RoutineCompletionStore for SqliteRoutineStore<'_> {
    fn is_completed(&self, key: &RoutineKey) -> RoutineStoreResult<bool> {
        let completed: Option<i64> = self
            .conn
            .query_row(
                "SELECT completed
                 FROM routine_completions
                 WHERE owner_id = ?1
                   AND day = ?2
                   AND routine_id = ?3;",
                params![key.owner_id, key.day, key.routine_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(completed == Some(1))
    }

    fn set_completed(&self, key: &RoutineKey, completed: bool) -> RoutineStoreResult<()> {
        self.conn.execute(
            "INSERT INTO routine_completions (owner_id, day, routine_id, completed)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (owner_id, day, routine_id) DO UPDATE
             SET completed = excluded.completed,
                 updated_at = (strftime('%s', 'now') * 1000);",
            params![key.owner_id, key.day, key.routine_id, i64::from(completed)],
        )?;
        Ok(())
    }

    fn completed_on(&self, owner_id: &str, day: &str) -> RoutineStoreResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT routine_id
             FROM routine_completions
             WHERE owner_id = ?1
               AND day = ?2
               AND completed = 1
             ORDER BY routine_id ASC;",
        )?;
        let mut rows = stmt.query(params![owner_id, day])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            ids.push(row.get(0)?);
        }
        Ok(ids)
    }
}

/// In-memory completion store for hosts without a database.
#[derive(Debug, Default)]
pub struct MemoryRoutineStore {
    entries: RefCell<BTreeMap<RoutineKey, bool>>,
}

impl MemoryRoutineStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoutineCompletionStore for MemoryRoutineStore {
    fn is_completed(&self, key: &RoutineKey) -> RoutineStoreResult<bool> {
        Ok(self.entries.borrow().get(key).copied().unwrap_or(false))
    }

    fn set_completed(&self, key: &RoutineKey, completed: bool) -> RoutineStoreResult<()> {
        self.entries.borrow_mut().insert(key.clone(), completed);
        Ok(())
    }

    fn completed_on(&self, owner_id: &str, day: &str) -> RoutineStoreResult<Vec<String>> {
        Ok(self
            .entries
            .borrow()
            .iter()
            .filter(|(key, completed)| **completed && key.owner_id == owner_id && key.day == day)
            .map(|(key, _)| key.routine_id.clone())
            .collect())
    }
}
