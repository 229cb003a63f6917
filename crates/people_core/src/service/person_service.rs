//! Person use-case service.
//!
//! # Responsibility
//! - Provide the create/update/delete/read/age entry points for the HTTP layer.
//! - Run validation and uniqueness checks before any store mutation.
//!
//! # Invariants
//! - Conflict checks and the write they guard run under one store lock.
//! - A rejected request leaves the store unchanged.
//! - Names and emails never reach the logs; ids do.

use crate::model::person::{Person, PersonDraft, PersonPatch};
use crate::model::validation::{self, ValidationReport};
use crate::repo::people_store::PeopleStore;
use crate::repo::person_repo::{PersonRepository, RepoError, RepoResult};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Records loaded into a freshly seeded store, in insertion order.
pub const SEED_PEOPLE: [(&str, &str, &str, &str, &str); 4] = [
    (
        "bf552a1c-fd73-4bd0-b64a-d3f69a9ff9de",
        "John",
        "Doe",
        "johndoe@example.com",
        "1997-01-01",
    ),
    (
        "d5356358-b39f-4c6e-9690-2c965a607702",
        "Jane",
        "Doe",
        "janedoe@example.com",
        "1991-07-28",
    ),
    (
        "cb2bfa60-e2ae-46ec-ad77-60cf7e8979fd",
        "Brian",
        "Smith",
        "briansmith@example.com",
        "2000-05-10",
    ),
    (
        "d82fc695-5ac2-4fed-9387-a7d9c0fb0c4f",
        "Ashley",
        "Yu",
        "ashleyyu@example.com",
        "2003-12-24",
    ),
];

/// Returns the seed records as `Person` values.
pub fn seed_people() -> Vec<Person> {
    SEED_PEOPLE
        .iter()
        .map(|&(id, first_name, last_name, email, birthday)| {
            Person::new(id, first_name, last_name, email, birthday)
        })
        .collect()
}

/// Uniqueness or identity rule broken by a write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    DuplicateId(String),
    DuplicateEmail,
    /// Update tried to replace the stored id.
    IdImmutable { id: String },
}

impl Display for Conflict {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "Person with id `{id}` already exists."),
            Self::DuplicateEmail => f.write_str("Person with this email already exists."),
            Self::IdImmutable { id } => write!(f, "Id of person `{id}` can not be changed."),
        }
    }
}

/// Coarse failure class for transport layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Invalid,
    Conflict,
    NotFound,
    Internal,
}

/// Service error for person use-cases.
#[derive(Debug)]
pub enum ServiceError {
    /// One or more fields failed validation.
    Invalid(ValidationReport),
    Conflict(Conflict),
    /// Target person does not exist.
    NotFound(String),
    /// Storage failure; never retried.
    Storage(RepoError),
}

impl ErrorKind {
    /// Stable code used as `error_code=` in log lines.
    pub fn code(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Conflict => "conflict",
            Self::NotFound => "not_found",
            Self::Internal => "internal",
        }
    }
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Invalid(_) => ErrorKind::Invalid,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Storage(_) => ErrorKind::Internal,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(report) => write!(f, "{report}"),
            Self::Conflict(conflict) => write!(f, "{conflict}"),
            Self::NotFound(id) => write!(f, "person not found: {id}"),
            Self::Storage(err) => write!(f, "storage failure: {err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(report) => Some(report),
            Self::Storage(err) => Some(err),
            Self::Conflict(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Storage(value)
    }
}

impl From<ValidationReport> for ServiceError {
    fn from(value: ValidationReport) -> Self {
        Self::Invalid(value)
    }
}

impl From<Conflict> for ServiceError {
    fn from(value: Conflict) -> Self {
        Self::Conflict(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Use-case facade over one `PeopleStore`.
pub struct PersonService {
    store: PeopleStore,
}

impl PersonService {
    pub fn new(store: PeopleStore) -> Self {
        Self { store }
    }

    /// Opens an empty in-memory store.
    pub fn open_empty() -> ServiceResult<Self> {
        Ok(Self::new(PeopleStore::open_in_memory()?))
    }

    /// Opens an in-memory store holding `seed_people()`.
    ///
    /// Seeds go through `create`, so they obey the same rules as requests.
    pub fn open_seeded() -> ServiceResult<Self> {
        let service = Self::open_empty()?;
        for person in seed_people() {
            service.create(person.into())?;
        }
        info!(
            "event=store_seed module=service status=ok count={}",
            SEED_PEOPLE.len()
        );
        Ok(service)
    }

    /// Read access to the underlying store.
    pub fn store(&self) -> &PeopleStore {
        &self.store
    }

    /// Lists every person, or those whose first or last name starts with
    /// `name_prefix` when given.
    pub fn list(&self, name_prefix: Option<&str>) -> ServiceResult<Vec<Person>> {
        let people = match name_prefix {
            Some(prefix) => self.store.find_by_name_prefix(prefix)?,
            None => self.store.all()?,
        };
        Ok(people)
    }

    pub fn get(&self, id: &str) -> ServiceResult<Option<Person>> {
        Ok(self.store.find_by_id(id)?)
    }

    /// Age in completed years as of today's local date.
    pub fn age(&self, id: &str) -> ServiceResult<Option<u32>> {
        self.age_on(id, validation::today())
    }

    /// Age in completed years as of `today`; `None` for unknown ids.
    pub fn age_on(&self, id: &str, today: NaiveDate) -> ServiceResult<Option<u32>> {
        let Some(person) = self.store.find_by_id(id)? else {
            return Ok(None);
        };
        Ok(person.age_on(today))
    }

    /// Validates and inserts a new person.
    ///
    /// # Errors
    /// - `Invalid` with every failing field.
    /// - `Conflict::DuplicateId` / `Conflict::DuplicateEmail` when taken.
    pub fn create(&self, draft: PersonDraft) -> ServiceResult<Person> {
        self.create_on(draft, validation::today())
    }

    /// Same as `create`, using `today` for birthday rules.
    pub fn create_on(&self, draft: PersonDraft, today: NaiveDate) -> ServiceResult<Person> {
        let id = draft.id.clone().unwrap_or_default();
        let created: ServiceResult<Person> = draft
            .into_person_on(today)
            .map_err(ServiceError::from)
            .and_then(|person| {
                self.store.with_repo(|repo| {
                    ensure_unique(repo, &person)?;
                    repo.insert(&person)?;
                    Ok(person)
                })
            });

        log_outcome("person_create", &id, &created);
        created
    }

    /// Applies a partial update to an existing person.
    ///
    /// # Errors
    /// - `NotFound` when `id` is unknown.
    /// - `Conflict::IdImmutable` when the patch carries a different id.
    /// - `Conflict::DuplicateEmail` when the new email belongs to someone else.
    /// - `Invalid` when the merged record fails validation.
    pub fn update(&self, id: &str, patch: PersonPatch) -> ServiceResult<Person> {
        self.update_on(id, patch, validation::today())
    }

    /// Same as `update`, using `today` for birthday rules.
    pub fn update_on(
        &self,
        id: &str,
        patch: PersonPatch,
        today: NaiveDate,
    ) -> ServiceResult<Person> {
        let updated: ServiceResult<Person> = self.store.with_repo(|repo| {
            let mut person = repo
                .find_by_id(id)?
                .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;

            if let Some(new_id) = patch.id.as_deref() {
                if new_id != person.id {
                    return Err(Conflict::IdImmutable {
                        id: person.id.clone(),
                    }
                    .into());
                }
            }
            if let Some(email) = patch.email.as_deref() {
                if email_taken_by_other(repo, email, &person.id)? {
                    return Err(Conflict::DuplicateEmail.into());
                }
            }

            person.apply_patch(patch);
            person.verify_on(today).into_result()?;

            if !repo.update(&person)? {
                return Err(ServiceError::NotFound(id.to_string()));
            }
            Ok(person)
        });

        log_outcome("person_update", id, &updated);
        updated
    }

    /// Removes a person and returns the removed record.
    pub fn delete(&self, id: &str) -> ServiceResult<Person> {
        let removed = self.store.with_repo(|repo| {
            let person = repo
                .find_by_id(id)?
                .ok_or_else(|| ServiceError::NotFound(id.to_string()))?;
            repo.delete(&person.id)?;
            Ok::<_, ServiceError>(person)
        })?;

        info!("event=person_delete module=service status=ok id={}", removed.id);
        Ok(removed)
    }
}

/// Uniqueness is textual: ids and emails are compared exactly as submitted,
/// so an uppercase or compact spelling of a stored UUID is a different id.
fn ensure_unique(repo: &impl PersonRepository, person: &Person) -> ServiceResult<()> {
    if repo.find_by_id(&person.id)?.is_some() {
        return Err(Conflict::DuplicateId(person.id.clone()).into());
    }
    if repo.find_by_email(&person.email)?.is_some() {
        return Err(Conflict::DuplicateEmail.into());
    }
    Ok(())
}

fn email_taken_by_other(repo: &impl PersonRepository, email: &str, id: &str) -> RepoResult<bool> {
    Ok(repo
        .find_by_email(email)?
        .is_some_and(|owner| owner.id != id))
}

fn log_outcome(event: &str, id: &str, outcome: &ServiceResult<Person>) {
    match outcome {
        Ok(_) => info!("event={event} module=service status=ok id={id}"),
        Err(err) => warn!("{}", error_line(event, id, err)),
    }
}

fn error_line(event: &str, id: &str, err: &ServiceError) -> String {
    let mut line = format!(
        "event={event} module=service status=error id={id} error_code={}",
        err.kind().code()
    );
    if let ServiceError::Invalid(report) = err {
        line.push_str(&format!(" fields={}", report.errors().len()));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::{error_line, seed_people, Conflict, ErrorKind, ServiceError};
    use crate::model::person::PersonDraft;
    use crate::model::validation::{verify_all, ValidationReport};
    use chrono::NaiveDate;

    #[test]
    fn seed_people_are_valid_and_distinct() {
        let people = seed_people();
        assert_eq!(people.len(), 4);
        let today = NaiveDate::from_ymd_opt(2026, 10, 15).expect("valid test date");
        for person in &people {
            assert!(person.verify_on(today).is_valid(), "seed {} is invalid", person.id);
        }
        let mut emails: Vec<_> = people.iter().map(|p| p.email.as_str()).collect();
        emails.sort_unstable();
        emails.dedup();
        assert_eq!(emails.len(), 4);
    }

    #[test]
    fn error_kinds_map_one_to_one() {
        assert_eq!(
            ServiceError::Invalid(ValidationReport::default()).kind(),
            ErrorKind::Invalid
        );
        assert_eq!(
            ServiceError::Conflict(Conflict::DuplicateEmail).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ServiceError::NotFound("x".to_string()).kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn error_lines_use_error_status_and_kind_code() {
        let conflict = ServiceError::Conflict(Conflict::DuplicateEmail);
        assert_eq!(
            error_line("person_create", "abc", &conflict),
            "event=person_create module=service status=error id=abc error_code=conflict"
        );

        let report = verify_all(&PersonDraft::default());
        let invalid = ServiceError::Invalid(report);
        let line = error_line("person_update", "abc", &invalid);
        assert!(line.contains("status=error"));
        assert!(line.ends_with("error_code=invalid fields=5"));
        assert!(!line.contains("rejected"));
    }

    #[test]
    fn error_kind_codes_are_distinct() {
        let codes = [
            ErrorKind::Invalid.code(),
            ErrorKind::Conflict.code(),
            ErrorKind::NotFound.code(),
            ErrorKind::Internal.code(),
        ];
        assert_eq!(codes, ["invalid", "conflict", "not_found", "internal"]);
    }
}
