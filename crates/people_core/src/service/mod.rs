//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, conflict checks, and store calls.
//! - Keep transport layers decoupled from storage details.

pub mod person_service;
