//! Person repository contract and SQLite implementation.
//!
//! # Invariants
//! - Callers guarantee `id` and `email` uniqueness before `insert`.
//! - `update` never changes `id`; it only targets the row holding it.
//! - `all` and `find_by_name_prefix` return rows in insertion order.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::person::Person;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const PERSON_SELECT_SQL: &str = "SELECT
    id,
    firstName,
    lastName,
    email,
    birthday
FROM persons";

pub type RepoResult<T> = Result<T, RepoError>;

/// Storage-level failure. Lookup misses are not errors.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection was not bootstrapped through `open_db_in_memory`.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// A thread panicked while holding the store lock.
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::LockPoisoned => write!(f, "people store lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::UninitializedConnection { .. } | Self::LockPoisoned => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Data access contract for person rows.
pub trait PersonRepository {
    fn insert(&self, person: &Person) -> RepoResult<()>;
    fn all(&self) -> RepoResult<Vec<Person>>;
    fn find_by_id(&self, id: &str) -> RepoResult<Option<Person>>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<Person>>;
    /// Rows whose first or last name starts with `prefix` (ASCII
    /// case-insensitive). An empty prefix matches every row.
    fn find_by_name_prefix(&self, prefix: &str) -> RepoResult<Vec<Person>>;
    /// Replaces the mutable fields of the row matching `person.id`.
    /// Returns `false` when no such row exists.
    fn update(&self, person: &Person) -> RepoResult<bool>;
    /// Removes the row matching `id`. Returns `false` when no such row exists.
    fn delete(&self, id: &str) -> RepoResult<bool>;
}

/// SQLite-backed person repository borrowing a migrated connection.
pub struct SqlitePersonRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePersonRepository<'conn> {
    /// Wraps a connection after checking its schema is current.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let actual_version = current_version(conn)?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(RepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }

    /// Wraps a connection whose schema the caller has already checked.
    pub(crate) fn from_checked(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_people(&self, sql: &str, params: impl rusqlite::Params) -> RepoResult<Vec<Person>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, parse_person_row)?;
        let people = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(people)
    }

    fn query_one(&self, column: &str, value: &str) -> RepoResult<Option<Person>> {
        let person = self
            .conn
            .query_row(
                &format!("{PERSON_SELECT_SQL} WHERE {column} = ?1 ORDER BY rowid LIMIT 1;"),
                [value],
                parse_person_row,
            )
            .optional()?;
        Ok(person)
    }
}

impl PersonRepository for SqlitePersonRepository<'_> {
    fn insert(&self, person: &Person) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO persons (id, firstName, lastName, email, birthday)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                person.id,
                person.first_name,
                person.last_name,
                person.email,
                person.birthday,
            ],
        )?;
        Ok(())
    }

    fn all(&self) -> RepoResult<Vec<Person>> {
        self.query_people(&format!("{PERSON_SELECT_SQL} ORDER BY rowid;"), [])
    }

    fn find_by_id(&self, id: &str) -> RepoResult<Option<Person>> {
        self.query_one("id", id)
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<Person>> {
        self.query_one("email", email)
    }

    fn find_by_name_prefix(&self, prefix: &str) -> RepoResult<Vec<Person>> {
        let pattern = like_prefix_pattern(prefix);
        self.query_people(
            &format!(
                "{PERSON_SELECT_SQL}
                 WHERE firstName LIKE ?1 ESCAPE '\\'
                    OR lastName LIKE ?1 ESCAPE '\\'
                 ORDER BY rowid;"
            ),
            [pattern],
        )
    }

    fn update(&self, person: &Person) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE persons
             SET
                firstName = ?1,
                lastName = ?2,
                email = ?3,
                birthday = ?4
             WHERE id = ?5;",
            params![
                person.first_name,
                person.last_name,
                person.email,
                person.birthday,
                person.id,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete(&self, id: &str) -> RepoResult<bool> {
        let changed = self.conn.execute("DELETE FROM persons WHERE id = ?1;", [id])?;
        Ok(changed > 0)
    }
}

fn parse_person_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        id: row.get("id")?,
        first_name: row.get("firstName")?,
        last_name: row.get("lastName")?,
        email: row.get("email")?,
        birthday: row.get("birthday")?,
    })
}

/// Builds a `LIKE` pattern matching `prefix` literally at the start.
fn like_prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
