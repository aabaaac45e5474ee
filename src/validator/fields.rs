//! CABINET - Single-Field Validators
//! Each validator checks one field of a `DataRecord` against fixed bounds.

use time::Date;

use super::RecordValidator;
use crate::error::{CabinetError, Result};
use crate::salary::Salary;
use crate::types::{self, DataRecord, Field};

fn check_name_length(field: Field, value: &str, min: usize, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CabinetError::validation(field, "must not be empty"));
    }
    let len = value.chars().count();
    if len < min || len > max {
        return Err(CabinetError::validation(
            field,
            format!(
                "length {} is outside {}..={} characters",
                len, min, max
            ),
        ));
    }
    Ok(())
}

/// Bounds the character count of the first name.
#[derive(Debug, Clone)]
pub struct FirstNameValidator {
    pub min_length: usize,
    pub max_length: usize,
}

impl RecordValidator for FirstNameValidator {
    fn validate(&self, record: &DataRecord) -> Result<()> {
        check_name_length(
            Field::FirstName,
            &record.first_name,
            self.min_length,
            self.max_length,
        )
    }
}

/// Bounds the character count of the last name.
#[derive(Debug, Clone)]
pub struct LastNameValidator {
    pub min_length: usize,
    pub max_length: usize,
}

impl RecordValidator for LastNameValidator {
    fn validate(&self, record: &DataRecord) -> Result<()> {
        check_name_length(
            Field::LastName,
            &record.last_name,
            self.min_length,
            self.max_length,
        )
    }
}

/// Bounds the date of birth. A missing upper bound means "today",
/// evaluated at validation time.
#[derive(Debug, Clone)]
pub struct DateOfBirthValidator {
    pub from: Date,
    pub to: Option<Date>,
}

impl RecordValidator for DateOfBirthValidator {
    fn validate(&self, record: &DataRecord) -> Result<()> {
        let to = self.to.unwrap_or_else(types::today);
        let dob = record.date_of_birth;
        if dob < self.from || dob > to {
            return Err(CabinetError::validation(
                Field::DateOfBirth,
                format!(
                    "{} is outside {}..={}",
                    types::format_date(dob),
                    types::format_date(self.from),
                    types::format_date(to)
                ),
            ));
        }
        Ok(())
    }
}

/// Restricts the access level to an inclusive character range.
#[derive(Debug, Clone)]
pub struct AccessValidator {
    pub from: char,
    pub to: char,
}

impl RecordValidator for AccessValidator {
    fn validate(&self, record: &DataRecord) -> Result<()> {
        if !(self.from..=self.to).contains(&record.access) {
            return Err(CabinetError::validation(
                Field::Access,
                format!(
                    "'{}' is outside '{}'..='{}'",
                    record.access, self.from, self.to
                ),
            ));
        }
        Ok(())
    }
}

/// Restricts the salary to an inclusive numeric range.
#[derive(Debug, Clone)]
pub struct SalaryValidator {
    pub min: Salary,
    pub max: Salary,
}

impl RecordValidator for SalaryValidator {
    fn validate(&self, record: &DataRecord) -> Result<()> {
        if record.salary < self.min || record.salary > self.max {
            return Err(CabinetError::validation(
                Field::Salary,
                format!("{} is outside {}..={}", record.salary, self.min, self.max),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Month;

    fn sample() -> DataRecord {
        DataRecord::new(
            "Ann",
            "Lee",
            Date::from_calendar_date(1990, Month::May, 4).unwrap(),
            'B',
            Salary::from_int(5000),
        )
    }

    #[test]
    fn test_name_bounds() {
        let v = FirstNameValidator { min_length: 2, max_length: 3 };
        assert!(v.validate(&sample()).is_ok());

        let mut r = sample();
        r.first_name = "A".into();
        assert!(v.validate(&r).is_err());
        r.first_name = "Anna".into();
        assert!(v.validate(&r).is_err());
        r.first_name = "   ".into();
        let err = v.validate(&r).unwrap_err();
        assert!(err.to_string().contains("firstName"));
    }

    #[test]
    fn test_name_counts_characters_not_bytes() {
        let v = LastNameValidator { min_length: 2, max_length: 3 };
        let mut r = sample();
        r.last_name = "Ñño".into();
        assert!(v.validate(&r).is_ok());
    }

    #[test]
    fn test_date_bounds() {
        let v = DateOfBirthValidator {
            from: Date::from_calendar_date(1950, Month::January, 1).unwrap(),
            to: None,
        };
        assert!(v.validate(&sample()).is_ok());

        let mut r = sample();
        r.date_of_birth = Date::from_calendar_date(1949, Month::December, 31).unwrap();
        assert!(v.validate(&r).is_err());
        r.date_of_birth = types::today().next_day().unwrap();
        assert!(v.validate(&r).is_err());
    }

    #[test]
    fn test_access_and_salary_bounds() {
        let access = AccessValidator { from: 'A', to: 'G' };
        let salary = SalaryValidator {
            min: Salary::from_int(0),
            max: Salary::from_int(100000),
        };
        let mut r = sample();
        assert!(access.validate(&r).is_ok());
        assert!(salary.validate(&r).is_ok());

        r.access = 'b';
        assert!(access.validate(&r).is_err());
        r.salary = "100000.01".parse().unwrap();
        assert!(salary.validate(&r).is_err());
        r.salary = "-0.01".parse().unwrap();
        assert!(salary.validate(&r).is_err());
    }
}
