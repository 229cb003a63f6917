//! Field-format rules for person records.
//!
//! # Responsibility
//! - Check each person field in isolation.
//! - Aggregate every failing field into one `ValidationReport`.
//!
//! # Invariants
//! - All functions are pure; the only ambient input is "today", which every
//!   rule also accepts explicitly through its `*_on` variant.
//! - Aggregation runs all five rules regardless of earlier failures.
//! - Uniqueness is not checked here; see `service::person_service`.

use crate::model::person::{PersonDraft, PersonField, BIRTHDAY_FORMAT};
use chrono::{Datelike, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Oldest accepted age, computed as a plain year difference.
pub const MAX_AGE_YEARS: i32 = 150;

static UUID_V4_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-?[0-9a-f]{4}-?4[0-9a-f]{3}-?[89ab][0-9a-f]{3}-?[0-9a-f]{12}$")
        .expect("valid uuid regex")
});
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2,50}$").expect("valid name regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9]+[._-])*[A-Za-z0-9]+@(?:[A-Za-z0-9-]+\.)+[A-Za-z]{2,}$")
        .expect("valid email regex")
});
static DATE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date shape regex"));

/// A single rejected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// Field absent from the input.
    Missing(PersonField),
    /// Field present but empty.
    Empty(PersonField),
    /// Field does not match its format rule.
    BadFormat(PersonField),
    /// Birthday implies an age above `MAX_AGE_YEARS`.
    TooOld { years: i32 },
    /// Birthday lies after today.
    BornInFuture,
}

impl FieldError {
    /// Field this error is about.
    pub fn field(&self) -> PersonField {
        match self {
            Self::Missing(field) | Self::Empty(field) | Self::BadFormat(field) => *field,
            Self::TooOld { .. } | Self::BornInFuture => PersonField::Birthday,
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing(PersonField::Id) => f.write_str("Id is missing."),
            Self::Missing(PersonField::Email) => f.write_str("Email address is missing."),
            Self::Missing(PersonField::Birthday) => f.write_str("Birthday is missing."),
            Self::Missing(name) => write!(f, "{name} is missing."),
            Self::Empty(PersonField::Id) => f.write_str("Invalid id: empty."),
            Self::Empty(PersonField::Email) => f.write_str("Invalid email address: empty."),
            Self::Empty(name) => write!(f, "{name} is empty."),
            Self::BadFormat(PersonField::Id) => {
                f.write_str("Invalid id: not compliant with uuid v4 format.")
            }
            Self::BadFormat(PersonField::Email) => f.write_str(
                "Invalid email address: not compliant with email address format.",
            ),
            Self::BadFormat(PersonField::Birthday) => {
                f.write_str("Invalid birthday: Bad format. Try YYYY-MM-DD.")
            }
            Self::BadFormat(name) => write!(f, "Invalid {name}: Bad format."),
            Self::TooOld { years } => {
                write!(f, "Invalid birthday: {years} years old is humanly too old.")
            }
            Self::BornInFuture => f.write_str("Invalid birthday: You can not be born in the future."),
        }
    }
}

impl Error for FieldError {}

/// Every field error found on one record, in field order.
///
/// Renders as one line per error, each terminated by `\n`; an empty report
/// renders as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns whether any error concerns `field`.
    pub fn has_error_for(&self, field: PersonField) -> bool {
        self.errors.iter().any(|err| err.field() == field)
    }

    /// `Ok(())` for an empty report, otherwise the report itself.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(self)
        }
    }

    fn record(&mut self, outcome: Result<(), FieldError>) {
        if let Err(err) = outcome {
            self.errors.push(err);
        }
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for err in &self.errors {
            writeln!(f, "{err}")?;
        }
        Ok(())
    }
}

impl Error for ValidationReport {}

/// Local calendar date used by the default rule variants.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Checks a UUID v4 in hyphenated or compact text form.
pub fn verify_id(value: Option<&str>) -> Result<(), FieldError> {
    let id = present(PersonField::Id, value)?;
    if !UUID_V4_RE.is_match(id) {
        return Err(FieldError::BadFormat(PersonField::Id));
    }
    Ok(())
}

pub fn verify_first_name(value: Option<&str>) -> Result<(), FieldError> {
    verify_name(PersonField::FirstName, value)
}

pub fn verify_last_name(value: Option<&str>) -> Result<(), FieldError> {
    verify_name(PersonField::LastName, value)
}

pub fn verify_email(value: Option<&str>) -> Result<(), FieldError> {
    let email = present(PersonField::Email, value)?;
    if !EMAIL_RE.is_match(email) {
        return Err(FieldError::BadFormat(PersonField::Email));
    }
    Ok(())
}

/// Checks a birthday against today's local date.
pub fn verify_birthday(value: Option<&str>) -> Result<(), FieldError> {
    verify_birthday_on(value, today())
}

/// Checks a birthday against `today`.
///
/// An empty string is a format error, like any other unparsable text.
pub fn verify_birthday_on(value: Option<&str>, today: NaiveDate) -> Result<(), FieldError> {
    let text = value.ok_or(FieldError::Missing(PersonField::Birthday))?;
    if !DATE_SHAPE_RE.is_match(text) {
        return Err(FieldError::BadFormat(PersonField::Birthday));
    }
    let born = NaiveDate::parse_from_str(text, BIRTHDAY_FORMAT)
        .map_err(|_| FieldError::BadFormat(PersonField::Birthday))?;

    let years = today.year() - born.year();
    if years > MAX_AGE_YEARS {
        return Err(FieldError::TooOld { years });
    }
    if born > today {
        return Err(FieldError::BornInFuture);
    }
    Ok(())
}

/// Validates every field of a draft against today's local date.
pub fn verify_all(draft: &PersonDraft) -> ValidationReport {
    verify_all_on(draft, today())
}

/// Validates every field of a draft against `today`.
pub fn verify_all_on(draft: &PersonDraft, today: NaiveDate) -> ValidationReport {
    verify_fields_on(
        draft.id.as_deref(),
        draft.first_name.as_deref(),
        draft.last_name.as_deref(),
        draft.email.as_deref(),
        draft.birthday.as_deref(),
        today,
    )
}

pub(crate) fn verify_fields_on(
    id: Option<&str>,
    first_name: Option<&str>,
    last_name: Option<&str>,
    email: Option<&str>,
    birthday: Option<&str>,
    today: NaiveDate,
) -> ValidationReport {
    let mut report = ValidationReport::default();
    report.record(verify_id(id));
    report.record(verify_first_name(first_name));
    report.record(verify_last_name(last_name));
    report.record(verify_email(email));
    report.record(verify_birthday_on(birthday, today));
    report
}

fn verify_name(field: PersonField, value: Option<&str>) -> Result<(), FieldError> {
    let name = present(field, value)?;
    if !NAME_RE.is_match(name) {
        return Err(FieldError::BadFormat(field));
    }
    Ok(())
}

fn present(field: PersonField, value: Option<&str>) -> Result<&str, FieldError> {
    match value {
        None => Err(FieldError::Missing(field)),
        Some("") => Err(FieldError::Empty(field)),
        Some(text) => Ok(text),
    }
}
