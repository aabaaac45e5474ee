//! CABINET - Secondary Indexes
//! First name, last name and date of birth lookups for the in-memory store.
//!
//! Name keys are lowercased so lookups are case-insensitive. Each bucket
//! keeps its records in insertion order; emptied buckets are left in place.

use std::collections::HashMap;

use time::Date;

use crate::types::Record;

/// Derived key -> records mappings, repaired on every mutation.
#[derive(Debug, Default)]
pub struct RecordIndex {
    by_first_name: HashMap<String, Vec<Record>>,
    by_last_name: HashMap<String, Vec<Record>>,
    by_date_of_birth: HashMap<Date, Vec<Record>>,
}

fn name_key(name: &str) -> String {
    name.to_lowercase()
}

impl RecordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `record` to all three indexes.
    pub fn insert(&mut self, record: &Record) {
        self.by_first_name
            .entry(name_key(&record.first_name))
            .or_default()
            .push(record.clone());
        self.by_last_name
            .entry(name_key(&record.last_name))
            .or_default()
            .push(record.clone());
        self.by_date_of_birth
            .entry(record.date_of_birth)
            .or_default()
            .push(record.clone());
    }

    /// Drop `record` (matched by id under its own keys) from all three indexes.
    pub fn remove(&mut self, record: &Record) {
        let id = record.id;
        if let Some(bucket) = self.by_first_name.get_mut(&name_key(&record.first_name)) {
            bucket.retain(|r| r.id != id);
        }
        if let Some(bucket) = self.by_last_name.get_mut(&name_key(&record.last_name)) {
            bucket.retain(|r| r.id != id);
        }
        if let Some(bucket) = self.by_date_of_birth.get_mut(&record.date_of_birth) {
            bucket.retain(|r| r.id != id);
        }
    }

    /// Replace `old` by `new` in every index.
    pub fn replace(&mut self, old: &Record, new: &Record) {
        self.remove(old);
        self.insert(new);
    }

    pub fn by_first_name(&self, first_name: &str) -> Vec<Record> {
        self.by_first_name
            .get(&name_key(first_name))
            .cloned()
            .unwrap_or_default()
    }

    pub fn by_last_name(&self, last_name: &str) -> Vec<Record> {
        self.by_last_name
            .get(&name_key(last_name))
            .cloned()
            .unwrap_or_default()
    }

    pub fn by_date_of_birth(&self, date_of_birth: Date) -> Vec<Record> {
        self.by_date_of_birth
            .get(&date_of_birth)
            .cloned()
            .unwrap_or_default()
    }
}
