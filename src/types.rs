//! CABINET - Core Type Definitions
//! Defines the record model shared by every store backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::error::{CabinetError, Result};
use crate::salary::Salary;

/// Identifier type for records (4-byte signed integer on disk).
pub type RecordId = i32;

/// The closed set of record fields.
///
/// Used to cite the offending field in validation errors and to resolve
/// field names typed by a user without any runtime reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    FirstName,
    LastName,
    DateOfBirth,
    Access,
    Age,
    Salary,
}

impl Field {
    /// Canonical camelCase name, as used in CSV/XML headers and messages.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::DateOfBirth => "dateOfBirth",
            Field::Access => "access",
            Field::Age => "age",
            Field::Salary => "salary",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = CabinetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "id" => Ok(Field::Id),
            "firstname" => Ok(Field::FirstName),
            "lastname" => Ok(Field::LastName),
            "dateofbirth" => Ok(Field::DateOfBirth),
            "access" => Ok(Field::Access),
            "age" => Ok(Field::Age),
            "salary" => Ok(Field::Salary),
            _ => Err(CabinetError::Parse(format!("unknown field '{}'", s))),
        }
    }
}

/// Uncommitted payload for create and edit requests.
///
/// `id` is ignored by `create` and names the target record for `edit_by_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRecord {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Date,
    pub access: char,
    pub salary: Salary,
}

impl DataRecord {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        date_of_birth: Date,
        access: char,
        salary: Salary,
    ) -> Self {
        Self {
            id: 0,
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth,
            access,
            salary,
        }
    }

    /// Target a specific record id (for `edit_by_id`).
    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = id;
        self
    }
}

/// A committed person record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Date,
    pub access: char,
    pub age: i16,
    pub salary: Salary,
}

impl Record {
    /// Materialize a record from an already validated payload.
    /// Age is derived from the date of birth as of `today`.
    pub(crate) fn from_data(id: RecordId, data: &DataRecord, today: Date) -> Self {
        Self {
            id,
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            date_of_birth: data.date_of_birth,
            access: data.access,
            age: age_on(data.date_of_birth, today),
            salary: data.salary,
        }
    }
}

/// Current UTC calendar date.
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Whole years between `date_of_birth` and `today`, one less when this
/// year's birthday is still ahead.
pub fn age_on(date_of_birth: Date, today: Date) -> i16 {
    let mut age = today.year() - date_of_birth.year();
    let birthday = (u8::from(date_of_birth.month()), date_of_birth.day());
    if (u8::from(today.month()), today.day()) < birthday {
        age -= 1;
    }
    age.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Format a date as `dd/MM/yyyy`.
pub fn format_date(date: Date) -> String {
    format!(
        "{:02}/{:02}/{:04}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

/// Parse a `dd/MM/yyyy` (or `d/M/yyyy`) date.
pub fn parse_date(text: &str) -> Result<Date> {
    let format = format_description!("[day padding:none]/[month padding:none]/[year]");
    Date::parse(text.trim(), &format)
        .map_err(|err| CabinetError::Parse(format!("'{}' is not a dd/MM/yyyy date: {}", text, err)))
}

/// Parse a single access-level character.
pub fn parse_access(text: &str) -> Result<char> {
    let mut chars = text.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(CabinetError::Parse(format!(
            "'{}' is not a single access character",
            text
        ))),
    }
}
