//! CABINET - Record Validation
//! Pluggable validation policies applied before a record is committed.
//!
//! A policy is a `CompositeValidator`: an ordered list of single-field
//! validators assembled by `ValidatorBuilder`. Steps always run in the
//! order first name, last name, date of birth, access, salary, and the
//! first failure is the only one reported.

pub mod fields;

use std::fmt;
use std::str::FromStr;

use time::macros::date;
use time::Date;

use crate::error::{CabinetError, Result};
use crate::salary::Salary;
use crate::types::DataRecord;

use self::fields::{
    AccessValidator, DateOfBirthValidator, FirstNameValidator, LastNameValidator,
    SalaryValidator,
};

/// Capability shared by every validator: accept or reject a whole record.
pub trait RecordValidator: fmt::Debug {
    fn validate(&self, record: &DataRecord) -> Result<()>;
}

/// An ordered chain of field validators. Only `ValidatorBuilder` creates one.
#[derive(Debug)]
pub struct CompositeValidator {
    name: String,
    steps: Vec<Box<dyn RecordValidator>>,
}

impl CompositeValidator {
    /// Profile name this validator was built for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of validation steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl RecordValidator for CompositeValidator {
    fn validate(&self, record: &DataRecord) -> Result<()> {
        self.steps.iter().try_for_each(|step| step.validate(record))
    }
}

/// Assembles field validators into a `CompositeValidator`.
///
/// Each field has one slot; setting it twice replaces the earlier bounds.
/// `build` emits the steps in the fixed field order regardless of the
/// order the setters were called in.
#[derive(Debug, Default)]
pub struct ValidatorBuilder {
    name: String,
    first_name: Option<FirstNameValidator>,
    last_name: Option<LastNameValidator>,
    date_of_birth: Option<DateOfBirthValidator>,
    access: Option<AccessValidator>,
    salary: Option<SalaryValidator>,
}

impl ValidatorBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate_first_name(mut self, min_length: usize, max_length: usize) -> Self {
        self.first_name = Some(FirstNameValidator {
            min_length,
            max_length,
        });
        self
    }

    pub fn validate_last_name(mut self, min_length: usize, max_length: usize) -> Self {
        self.last_name = Some(LastNameValidator {
            min_length,
            max_length,
        });
        self
    }

    /// `to = None` bounds the date by the current day.
    pub fn validate_date_of_birth(mut self, from: Date, to: Option<Date>) -> Self {
        self.date_of_birth = Some(DateOfBirthValidator { from, to });
        self
    }

    pub fn validate_access(mut self, from: char, to: char) -> Self {
        self.access = Some(AccessValidator { from, to });
        self
    }

    pub fn validate_salary(mut self, min: Salary, max: Salary) -> Self {
        self.salary = Some(SalaryValidator { min, max });
        self
    }

    pub fn build(self) -> CompositeValidator {
        let mut steps: Vec<Box<dyn RecordValidator>> = Vec::with_capacity(5);
        if let Some(v) = self.first_name {
            steps.push(Box::new(v));
        }
        if let Some(v) = self.last_name {
            steps.push(Box::new(v));
        }
        if let Some(v) = self.date_of_birth {
            steps.push(Box::new(v));
        }
        if let Some(v) = self.access {
            steps.push(Box::new(v));
        }
        if let Some(v) = self.salary {
            steps.push(Box::new(v));
        }
        CompositeValidator {
            name: self.name,
            steps,
        }
    }
}

/// Built-in validation profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ValidationProfile {
    #[default]
    Default,
    Custom,
}

impl ValidationProfile {
    pub fn build(self) -> CompositeValidator {
        match self {
            ValidationProfile::Default => build_default_validator(),
            ValidationProfile::Custom => build_custom_validator(),
        }
    }
}

impl fmt::Display for ValidationProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationProfile::Default => f.write_str("default"),
            ValidationProfile::Custom => f.write_str("custom"),
        }
    }
}

impl FromStr for ValidationProfile {
    type Err = CabinetError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(ValidationProfile::Default),
            "custom" => Ok(ValidationProfile::Custom),
            _ => Err(CabinetError::Config(format!(
                "unknown validation rules '{}'",
                s
            ))),
        }
    }
}

/// Names 2..=60, born 1950-01-01..=today, access A..=G, salary 0..=100000.
pub fn build_default_validator() -> CompositeValidator {
    ValidatorBuilder::new("default")
        .validate_first_name(2, 60)
        .validate_last_name(2, 60)
        .validate_date_of_birth(date!(1950 - 01 - 01), None)
        .validate_access('A', 'G')
        .validate_salary(Salary::from_int(0), Salary::from_int(100_000))
        .build()
}

/// Names 1..=100, born 1920-01-01..=today, access a..=g, salary 0..=10000000.
pub fn build_custom_validator() -> CompositeValidator {
    ValidatorBuilder::new("custom")
        .validate_first_name(1, 100)
        .validate_last_name(1, 100)
        .validate_date_of_birth(date!(1920 - 01 - 01), None)
        .validate_access('a', 'g')
        .validate_salary(Salary::from_int(0), Salary::from_int(10_000_000))
        .build()
}
