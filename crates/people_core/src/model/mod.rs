//! Person domain model and field validation.
//!
//! # Responsibility
//! - Define the canonical `Person` record and its inbound draft/patch shapes.
//! - Own the per-field format rules and the aggregate validation report.
//!
//! # Invariants
//! - A `Person` written to the store has passed `verify_all` at write time.
//! - Validation never stops at the first failing field.

pub mod person;
pub mod validation;
