//! CABINET - Personal Record Store
//!
//! Create, edit, remove and look up person records held in memory or in a
//! fixed-slot binary file.
//!
//! ## Features
//! - **Validation**: ordered, builder-assembled field policies (`default`, `custom`)
//! - **In-memory store**: record list plus first name / last name / birthday indexes
//! - **File store**: 277-byte slots, soft delete, explicit purge
//! - **Snapshots**: CSV and XML export and import, checksummed binary backup
//! - **Decorators**: timing and logging wrappers over the same `RecordStore` trait
//!
//! ## Example
//! ```no_run
//! use cabinet::{config::Config, engine::{self, RecordStore}, salary::Salary, types::DataRecord};
//! use time::macros::date;
//!
//! let mut store = engine::open(&Config::default()).unwrap();
//! let ann = DataRecord::new("Ann", "Lee", date!(1990 - 05 - 04), 'B', Salary::from_int(5000));
//! let id = store.create(&ann).unwrap();
//! assert_eq!(store.find_by_id(id).unwrap(), Some(0));
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod salary;
pub mod snapshot;
pub mod types;
pub mod validator;
