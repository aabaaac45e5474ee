//! CABINET - In-Memory Store
//! A growable list of records with three secondary indexes.
//!
//! Removal is physical (no tombstones), so `purge` has nothing to reclaim.

use time::Date;

use super::index::RecordIndex;
use super::{advance_past, RecordStore};
use crate::error::{CabinetError, Result};
use crate::snapshot::Snapshot;
use crate::types::{self, DataRecord, Record, RecordId};
use crate::validator::{CompositeValidator, RecordValidator};

/// Record store held entirely in memory.
#[derive(Debug)]
pub struct MemoryStore {
    /// Live records in creation order.
    records: Vec<Record>,
    /// Name and date-of-birth lookups.
    index: RecordIndex,
    validator: CompositeValidator,
    /// Id handed to the next created record, `None` once ids are exhausted.
    next_id: Option<RecordId>,
}

impl MemoryStore {
    /// Create an empty store whose first record gets id 1.
    pub fn new(validator: CompositeValidator) -> Self {
        Self::with_start_id(validator, 1)
    }

    pub fn with_start_id(validator: CompositeValidator, start_id: RecordId) -> Self {
        Self {
            records: Vec::new(),
            index: RecordIndex::new(),
            validator,
            next_id: Some(start_id.max(0)),
        }
    }

    fn position_of(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }
}

impl RecordStore for MemoryStore {
    fn create(&mut self, data: &DataRecord) -> Result<RecordId> {
        self.validator.validate(data)?;
        let id = self.next_id.ok_or(CabinetError::IdExhausted)?;

        let record = Record::from_data(id, data, types::today());
        self.index.insert(&record);
        self.records.push(record);
        self.next_id = id.checked_add(1);

        log::debug!("Created record #{}", id);
        Ok(id)
    }

    fn edit(&mut self, data: &DataRecord, position: usize) -> Result<()> {
        let id = self
            .records
            .get(position)
            .map(|r| r.id)
            .ok_or(CabinetError::InvalidPosition(position))?;
        self.validator.validate(data)?;

        let record = Record::from_data(id, data, types::today());
        let old = std::mem::replace(&mut self.records[position], record);
        self.index.replace(&old, &self.records[position]);

        log::debug!("Edited record #{} at position {}", id, position);
        Ok(())
    }

    fn remove(&mut self, id: RecordId) -> Result<bool> {
        let Some(position) = self.position_of(id) else {
            return Ok(false);
        };
        let record = self.records.remove(position);
        self.index.remove(&record);

        log::debug!("Removed record #{}", id);
        Ok(true)
    }

    fn purge(&mut self) -> Result<usize> {
        Ok(0)
    }

    fn find_by_id(&self, id: RecordId) -> Result<Option<usize>> {
        Ok(self.position_of(id))
    }

    fn find_by_first_name(&self, first_name: &str) -> Result<Vec<Record>> {
        Ok(self.index.by_first_name(first_name))
    }

    fn find_by_last_name(&self, last_name: &str) -> Result<Vec<Record>> {
        Ok(self.index.by_last_name(last_name))
    }

    fn find_by_date_of_birth(&self, date_of_birth: Date) -> Result<Vec<Record>> {
        Ok(self.index.by_date_of_birth(date_of_birth))
    }

    fn get_all(&self) -> Result<Vec<Record>> {
        Ok(self.records.clone())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }

    fn removed_count(&self) -> Result<usize> {
        Ok(0)
    }

    fn make_snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::new(self.records.clone()))
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<usize> {
        for record in snapshot.records() {
            match self.position_of(record.id) {
                Some(position) => {
                    let old = std::mem::replace(&mut self.records[position], record.clone());
                    self.index.replace(&old, record);
                }
                None => {
                    self.records.push(record.clone());
                    self.index.insert(record);
                }
            }
            self.next_id = advance_past(self.next_id, record.id);
        }

        log::info!(
            "Restored {} records ({} total)",
            snapshot.len(),
            self.records.len()
        );
        Ok(snapshot.len())
    }

    fn validator(&self) -> &CompositeValidator {
        &self.validator
    }
}
