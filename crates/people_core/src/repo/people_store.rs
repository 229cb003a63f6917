//! Thread-safe owner of the in-memory people table.
//!
//! # Responsibility
//! - Own the single connection holding the `persons` table.
//! - Serialize every read and write behind one lock.
//! - Let orchestration run check-then-write sequences as one critical section.
//!
//! # Invariants
//! - The connection is never reachable without holding the lock.
//! - Dropping the store discards every row.

use crate::db::open_db_in_memory;
use crate::model::person::Person;
use crate::repo::person_repo::{PersonRepository, RepoError, RepoResult, SqlitePersonRepository};
use log::error;
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

/// The record store shared by request handlers for the lifetime of a server.
pub struct PeopleStore {
    conn: Mutex<Connection>,
}

impl PeopleStore {
    /// Opens an empty store on a fresh in-memory database.
    pub fn open_in_memory() -> RepoResult<Self> {
        let conn = open_db_in_memory()?;
        Self::from_connection(conn)
    }

    /// Takes ownership of an already migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema is not current.
    pub fn from_connection(conn: Connection) -> RepoResult<Self> {
        SqlitePersonRepository::try_new(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Runs `f` with exclusive access to the table.
    ///
    /// The lock is held for the whole of `f`, so a check-then-write sequence
    /// inside it cannot interleave with any other store call. The schema was
    /// checked once in `from_connection` and is not re-read here.
    pub fn with_repo<T, E>(
        &self,
        f: impl FnOnce(&SqlitePersonRepository<'_>) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<RepoError>,
    {
        let guard = self.lock()?;
        f(&SqlitePersonRepository::from_checked(&guard))
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            error!("event=store_lock module=repo status=error error_code=lock_poisoned");
            RepoError::LockPoisoned
        })
    }
}

impl PersonRepository for PeopleStore {
    fn insert(&self, person: &Person) -> RepoResult<()> {
        self.with_repo(|repo| repo.insert(person))
    }

    fn all(&self) -> RepoResult<Vec<Person>> {
        self.with_repo(|repo| repo.all())
    }

    fn find_by_id(&self, id: &str) -> RepoResult<Option<Person>> {
        self.with_repo(|repo| repo.find_by_id(id))
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<Person>> {
        self.with_repo(|repo| repo.find_by_email(email))
    }

    fn find_by_name_prefix(&self, prefix: &str) -> RepoResult<Vec<Person>> {
        self.with_repo(|repo| repo.find_by_name_prefix(prefix))
    }

    fn update(&self, person: &Person) -> RepoResult<bool> {
        self.with_repo(|repo| repo.update(person))
    }

    fn delete(&self, id: &str) -> RepoResult<bool> {
        self.with_repo(|repo| repo.delete(id))
    }
}
