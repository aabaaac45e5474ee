//! CABINET - Custom Error Types
//! Defines the error hierarchy for the record stores.

use thiserror::Error;

use crate::types::Field;

/// Custom Result type for the cabinet.
pub type Result<T> = std::result::Result<T, CabinetError>;

/// Error types for the cabinet record stores.
///
/// Absence is not an error: lookups report misses through `Option`,
/// empty result sets or `false`.
#[derive(Error, Debug)]
pub enum CabinetError {
    /// I/O errors from file operations (data file, exports, backups).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record field violates the active validation policy.
    #[error("invalid {field}: {reason}")]
    Validation { field: Field, reason: String },

    /// Edit target position is out of range or refers to a removed slot.
    #[error("position {0} does not hold a record")]
    InvalidPosition(usize),

    /// No live record carries this identifier.
    #[error("record #{0} does not exist")]
    UnknownId(i32),

    /// Every identifier up to `i32::MAX` has been handed out.
    #[error("record ids are exhausted")]
    IdExhausted,

    /// Data corruption detected in the data file or a backup.
    #[error("Data corruption detected: {0}")]
    Corruption(String),

    /// Serialization errors (CSV, XML, backup, slot encoding).
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Text could not be converted into a typed value.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CabinetError {
    /// Build a validation error for `field`.
    pub fn validation(field: Field, reason: impl Into<String>) -> Self {
        CabinetError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// Returns true if this error came from a validation policy.
    pub fn is_validation(&self) -> bool {
        matches!(self, CabinetError::Validation { .. })
    }
}

impl From<csv::Error> for CabinetError {
    fn from(err: csv::Error) -> Self {
        CabinetError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for CabinetError {
    fn from(err: bincode::Error) -> Self {
        CabinetError::Serialization(err.to_string())
    }
}

impl From<quick_xml::Error> for CabinetError {
    fn from(err: quick_xml::Error) -> Self {
        CabinetError::Serialization(err.to_string())
    }
}
