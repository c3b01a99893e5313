//! Board domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by board storage and canvas code.
//! - Keep linked content items (`Atom`) independent from the boards hosting them.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Content items are soft-deleted; board records are hard-deleted.

pub mod atom;
pub mod board;
