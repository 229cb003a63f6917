//! Core domain logic for the people directory.
//! This crate owns every rule deciding which person records may be stored.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::person::{Person, PersonDraft, PersonField, PersonPatch};
pub use model::validation::{
    verify_all, verify_all_on, verify_birthday, verify_birthday_on, verify_email,
    verify_first_name, verify_id, verify_last_name, FieldError, ValidationReport,
};
pub use repo::people_store::PeopleStore;
pub use repo::person_repo::{PersonRepository, RepoError, RepoResult, SqlitePersonRepository};
pub use service::person_service::{
    seed_people, Conflict, ErrorKind, PersonService, ServiceError, ServiceResult, SEED_PEOPLE,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
