//! Person record and its inbound shapes.
//!
//! # Invariants
//! - Wire order is `id, firstName, lastName, email, birthday`.
//! - `id` never changes once a person is stored; patches cannot carry it
//!   through `Person::apply_patch`.

use crate::model::validation::{self, ValidationReport};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Wire format for birthdays.
pub const BIRTHDAY_FORMAT: &str = "%Y-%m-%d";

/// Canonical stored record.
///
/// Fields are kept as validated text so the store layout and the wire shape
/// stay identical to what callers submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    /// UUID v4 text, hyphenated or compact.
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Calendar date as `YYYY-MM-DD`.
    pub birthday: String,
}

/// Field names as they appear on the wire and in the `persons` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PersonField {
    Id,
    FirstName,
    LastName,
    Email,
    Birthday,
}

impl PersonField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Birthday => "birthday",
        }
    }
}

impl Display for PersonField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Create input. Every field may be absent; absence is a validation error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonDraft {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<String>,
}

/// Partial update input. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonPatch {
    /// Accepted on input only so an id change can be reported as a conflict.
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<String>,
}

impl Person {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        birthday: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            birthday: birthday.into(),
        }
    }

    /// Runs every field rule against the given date.
    pub fn verify_on(&self, today: NaiveDate) -> ValidationReport {
        validation::verify_fields_on(
            Some(self.id.as_str()),
            Some(self.first_name.as_str()),
            Some(self.last_name.as_str()),
            Some(self.email.as_str()),
            Some(self.birthday.as_str()),
            today,
        )
    }

    /// Overwrites the mutable fields present in `patch`.
    ///
    /// `patch.id` is ignored here; callers decide how an id change is treated.
    pub fn apply_patch(&mut self, patch: PersonPatch) {
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(birthday) = patch.birthday {
            self.birthday = birthday;
        }
    }

    /// Parses the stored birthday.
    pub fn birth_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.birthday, BIRTHDAY_FORMAT).ok()
    }

    /// Completed years of age on `today`.
    ///
    /// Returns `None` when the birthday cannot be parsed or lies after `today`.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let born = self.birth_date()?;
        let mut years = today.year() - born.year();
        if (today.month(), today.day()) < (born.month(), born.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }
}

impl PersonDraft {
    /// Validates every field and, when all pass, yields the storable record.
    ///
    /// # Errors
    /// Returns the full report when at least one field is invalid.
    pub fn into_person(self) -> Result<Person, ValidationReport> {
        self.into_person_on(validation::today())
    }

    /// Same as `into_person`, using `today` for birthday rules.
    pub fn into_person_on(self, today: NaiveDate) -> Result<Person, ValidationReport> {
        validation::verify_all_on(&self, today).into_result()?;
        Ok(Person {
            id: self.id.unwrap_or_default(),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            birthday: self.birthday.unwrap_or_default(),
        })
    }
}

impl From<Person> for PersonDraft {
    fn from(value: Person) -> Self {
        Self {
            id: Some(value.id),
            first_name: Some(value.first_name),
            last_name: Some(value.last_name),
            email: Some(value.email),
            birthday: Some(value.birthday),
        }
    }
}
