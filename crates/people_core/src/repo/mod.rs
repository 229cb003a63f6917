//! Record store for person rows.
//!
//! # Responsibility
//! - Define the person data access contract.
//! - Keep SQL details inside the persistence boundary.
//! - Serialize all access to the shared connection.
//!
//! # Invariants
//! - The store performs no validation; callers validate before writing.
//! - A lookup miss is `Ok(None)` or `Ok(false)`, never an error.

pub mod people_store;
pub mod person_repo;
