//! Repository layer: storage collaborator contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the data access contracts the board engine depends on.
//! - Isolate SQLite query details from service and canvas orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound` variants) in addition
//!   to DB transport errors.
//! - Repositories never cascade; they touch exactly the record named.

pub mod atom_repo;
pub mod board_repo;
pub mod routine_repo;
