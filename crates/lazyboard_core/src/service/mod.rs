//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate storage calls into board use cases.
//! - Keep canvas and host layers decoupled from storage details.

pub mod board_service;
pub mod project_service;
pub mod routine_service;
pub mod template_service;
pub mod templates;
