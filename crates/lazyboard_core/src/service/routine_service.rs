//! Daily routine check-offs.
//!
//! # Invariants
//! - Days are `YYYY-MM-DD` with month 01-12 and day 01-31.
//! - Routine ids and owner ids are non-blank.

use crate::repo::routine_repo::{RoutineCompletionStore, RoutineKey, RoutineStoreError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$").expect("valid day regex")
});

#[derive(Debug)]
pub enum RoutineError {
    InvalidDay(String),
    BlankId(&'static str),
    Store(RoutineStoreError),
}

impl Display for RoutineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDay(day) => write!(f, "day must be YYYY-MM-DD: `{day}`"),
            Self::BlankId(field) => write!(f, "{field} must not be blank"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RoutineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RoutineStoreError> for RoutineError {
    fn from(value: RoutineStoreError) -> Self {
        Self::Store(value)
    }
}

/// Completed share of a routine list on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutineProgress {
    pub completed: usize,
    pub total: usize,
}

impl RoutineProgress {
    /// `0.0` for an empty list.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }
}

pub struct RoutineService<R: RoutineCompletionStore> {
    store: R,
}

impl<R: RoutineCompletionStore> RoutineService<R> {
    pub fn new(store: R) -> Self {
        Self { store }
    }

    /// Flips completion for one routine and returns the new state.
    pub fn toggle(
        &self,
        owner_id: &str,
        day: &str,
        routine_id: &str,
    ) -> Result<bool, RoutineError> {
        let key = routine_key(owner_id, day, routine_id)?;
        let completed = !self.store.is_completed(&key)?;
        self.store.set_completed(&key, completed)?;
        Ok(completed)
    }

    pub fn is_completed(
        &self,
        owner_id: &str,
        day: &str,
        routine_id: &str,
    ) -> Result<bool, RoutineError> {
        let key = routine_key(owner_id, day, routine_id)?;
        Ok(self.store.is_completed(&key)?)
    }

    /// Counts how many of `routine_ids` are done on `day`.
    pub fn progress(
        &self,
        owner_id: &str,
        day: &str,
        routine_ids: &[&str],
    ) -> Result<RoutineProgress, RoutineError> {
        validate_owner(owner_id)?;
        validate_day(day)?;
        let done = self.store.completed_on(owner_id, day)?;
        let completed = routine_ids
            .iter()
            .filter(|id| done.iter().any(|done_id| done_id == *id))
            .count();
        Ok(RoutineProgress {
            completed,
            total: routine_ids.len(),
        })
    }
}

fn routine_key(owner_id: &str, day: &str, routine_id: &str) -> Result<RoutineKey, RoutineError> {
    validate_owner(owner_id)?;
    validate_day(day)?;
    if routine_id.trim().is_empty() {
        return Err(RoutineError::BlankId("routine_id"));
    }
    Ok(RoutineKey::new(owner_id, day, routine_id))
}

fn validate_owner(owner_id: &str) -> Result<(), RoutineError> {
    if owner_id.trim().is_empty() {
        return Err(RoutineError::BlankId("owner_id"));
    }
    Ok(())
}

fn validate_day(day: &str) -> Result<(), RoutineError> {
    if !DAY_RE.is_match(day) {
        return Err(RoutineError::InvalidDay(day.to_string()));
    }
    Ok(())
}
