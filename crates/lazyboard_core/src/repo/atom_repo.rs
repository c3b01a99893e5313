//! Linked content item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over the `atoms` table so items hosted by board nodes stay
//!   addressable and editable outside any board.
//!
//! # Invariants
//! - Write paths call `Atom::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Deletion is a tombstone (`is_deleted = 1`), never a row removal.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::atom::{Atom, AtomId, AtomType, AtomValidationError, TaskStatus};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ATOM_SELECT_SQL: &str = "SELECT
    uuid,
    type,
    content,
    task_status,
    event_start,
    event_end,
    is_deleted
FROM atoms";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for content item persistence and queries.
#[derive(Debug)]
pub enum RepoError {
    Validation(AtomValidationError),
    Db(DbError),
    NotFound(AtomId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "atom not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "atom repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted atom data: {message}"),
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

impl From<AtomValidationError> for RepoError {
    fn from(value: AtomValidationError) -> Self {
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

/// Query options for listing atoms.
#[derive(Debug, Clone, Default)]
pub struct AtomListQuery {
    pub kind: Option<AtomType>,
    pub include_deleted: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for content item CRUD.
pub trait AtomRepository {
    fn create_atom(&self, atom: &Atom) -> RepoResult<AtomId>;
    fn update_atom(&self, atom: &Atom) -> RepoResult<()>;
    fn get_atom(&self, id: AtomId, include_deleted: bool) -> RepoResult<Option<Atom>>;
    fn list_atoms(&self, query: &AtomListQuery) -> RepoResult<Vec<Atom>>;
    fn soft_delete_atom(&self, id: AtomId) -> RepoResult<()>;
    /// Subset of `ids` that exist and are not deleted, in input order.
    fn filter_active(&self, ids: &[AtomId]) -> RepoResult<Vec<AtomId>>;
}

/// SQLite-backed atom repository.
pub struct SqliteAtomRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAtomRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl AtomRepository for SqliteAtomRepository<'_> {
    fn create_atom(&self, atom: &Atom) -> RepoResult<AtomId> {
        atom.validate()?;

        self.conn.execute(
            "INSERT INTO atoms (
                uuid,
                type,
                content,
                task_status,
                event_start,
                event_end,
                is_deleted
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                atom.uuid.to_string(),
                atom.kind.as_str(),
                atom.content.as_str(),
                atom.task_status.map(TaskStatus::as_str),
                atom.event_start,
                atom.event_end,
                i64::from(atom.is_deleted),
            ],
        )?;

        Ok(atom.uuid)
    }

    fn update_atom(&self, atom: &Atom) -> RepoResult<()> {
        atom.validate()?;

        let changed = self.conn.execute(
            "UPDATE atoms
             SET
                type = ?1,
                content = ?2,
                task_status = ?3,
                event_start = ?4,
                event_end = ?5,
                is_deleted = ?6,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?7;",
            params![
                atom.kind.as_str(),
                atom.content.as_str(),
                atom.task_status.map(TaskStatus::as_str),
                atom.event_start,
                atom.event_end,
                i64::from(atom.is_deleted),
                atom.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(atom.uuid));
        }
        Ok(())
    }

    fn get_atom(&self, id: AtomId, include_deleted: bool) -> RepoResult<Option<Atom>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ATOM_SELECT_SQL}
             WHERE uuid = ?1
               AND (?2 = 1 OR is_deleted = 0);"
        ))?;

        let mut rows = stmt.query(params![id.to_string(), i64::from(include_deleted)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_atom_row(row)?));
        }
        Ok(None)
    }

    fn list_atoms(&self, query: &AtomListQuery) -> RepoResult<Vec<Atom>> {
        let mut sql = format!("{ATOM_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_deleted {
            sql.push_str(" AND is_deleted = 0");
        }
        if let Some(kind) = query.kind {
            sql.push_str(" AND type = ?");
            bind_values.push(Value::Text(kind.as_str().to_string()));
        }

        sql.push_str(" ORDER BY updated_at DESC, uuid ASC");

        match (query.limit, query.offset) {
            (Some(limit), offset) => {
                sql.push_str(" LIMIT ? OFFSET ?");
                bind_values.push(Value::Integer(i64::from(limit)));
                bind_values.push(Value::Integer(i64::from(offset)));
            }
            (None, 0) => {}
            (None, offset) => {
                sql.push_str(" LIMIT -1 OFFSET ?");
                bind_values.push(Value::Integer(i64::from(offset)));
            }
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut atoms = Vec::new();
        while let Some(row) = rows.next()? {
            atoms.push(parse_atom_row(row)?);
        }
        Ok(atoms)
    }

    fn soft_delete_atom(&self, id: AtomId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE atoms
             SET
                is_deleted = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?1
               AND is_deleted = 0;",
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn filter_active(&self, ids: &[AtomId]) -> RepoResult<Vec<AtomId>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let mut stmt = self.conn.prepare(&format!(
            "SELECT uuid
             FROM atoms
             WHERE is_deleted = 0
               AND uuid IN ({placeholders});"
        ))?;
        let mut rows = stmt.query(params_from_iter(ids.iter().map(Uuid::to_string)))?;
        let mut active = HashSet::new();
        while let Some(row) = rows.next()? {
            active.insert(row.get::<_, String>(0)?);
        }
        Ok(ids
            .iter()
            .copied()
            .filter(|id| active.contains(&id.to_string()))
            .collect())
    }
}

fn parse_atom_row(row: &Row<'_>) -> RepoResult<Atom> {
    let uuid_text: String = row.get("uuid")?;
    let uuid = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in atoms.uuid"))
    })?;

    let type_text: String = row.get("type")?;
    let kind = AtomType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid atom type `{type_text}` in atoms.type"))
    })?;

    let task_status = row
        .get::<_, Option<String>>("task_status")?
        .map(|value| {
            TaskStatus::parse(&value).ok_or_else(|| {
                RepoError::InvalidData(format!(
                    "invalid task status `{value}` in atoms.task_status"
                ))
            })
        })
        .transpose()?;

    let is_deleted = match row.get::<_, i64>("is_deleted")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_deleted value `{other}` in atoms.is_deleted"
            )));
        }
    };

    let atom = Atom {
        uuid,
        kind,
        content: row.get("content")?,
        task_status,
        event_start: row.get("event_start")?,
        event_end: row.get("event_end")?,
        is_deleted,
    };
    atom.validate()?;
    Ok(atom)
}
