//! CABINET - Logging Store
//! Decorator that writes every call and its outcome to the log.

use std::fmt;

use time::Date;

use super::RecordStore;
use crate::error::Result;
use crate::snapshot::Snapshot;
use crate::types::{self, DataRecord, Record, RecordId};
use crate::validator::CompositeValidator;

/// Wraps a store and logs each call through `log::info!`.
pub struct LoggingStore<S> {
    inner: S,
}

impl<S: RecordStore> LoggingStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

struct Args<'a>(&'a DataRecord);

impl fmt::Display for Args<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.0;
        write!(
            f,
            "firstName = '{}', lastName = '{}', dateOfBirth = '{}', access = '{}', salary = '{}'",
            d.first_name,
            d.last_name,
            types::format_date(d.date_of_birth),
            d.access,
            d.salary
        )
    }
}

fn outcome<T: fmt::Debug>(name: &str, result: &Result<T>) {
    match result {
        Ok(value) => log::info!("{}() returned {:?}", name, value),
        Err(err) => log::info!("{}() failed: {}", name, err),
    }
}

fn listed(name: &str, result: &Result<Vec<Record>>) {
    match result {
        Ok(records) => log::info!("{}() returned {} records", name, records.len()),
        Err(err) => log::info!("{}() failed: {}", name, err),
    }
}

impl<S: RecordStore> RecordStore for LoggingStore<S> {
    fn create(&mut self, data: &DataRecord) -> Result<RecordId> {
        log::info!("Calling create() with {}", Args(data));
        let result = self.inner.create(data);
        outcome("create", &result);
        result
    }

    fn edit(&mut self, data: &DataRecord, position: usize) -> Result<()> {
        log::info!("Calling edit() at position {} with {}", position, Args(data));
        let result = self.inner.edit(data, position);
        outcome("edit", &result);
        result
    }

    fn edit_by_id(&mut self, data: &DataRecord) -> Result<()> {
        log::info!("Calling edit_by_id() for #{} with {}", data.id, Args(data));
        let result = self.inner.edit_by_id(data);
        outcome("edit_by_id", &result);
        result
    }

    fn remove(&mut self, id: RecordId) -> Result<bool> {
        log::info!("Calling remove() with id = {}", id);
        let result = self.inner.remove(id);
        outcome("remove", &result);
        result
    }

    fn purge(&mut self) -> Result<usize> {
        log::info!("Calling purge()");
        let result = self.inner.purge();
        outcome("purge", &result);
        result
    }

    fn find_by_id(&self, id: RecordId) -> Result<Option<usize>> {
        log::info!("Calling find_by_id() with id = {}", id);
        let result = self.inner.find_by_id(id);
        outcome("find_by_id", &result);
        result
    }

    fn find_by_first_name(&self, first_name: &str) -> Result<Vec<Record>> {
        log::info!("Calling find_by_first_name() with '{}'", first_name);
        let result = self.inner.find_by_first_name(first_name);
        listed("find_by_first_name", &result);
        result
    }

    fn find_by_last_name(&self, last_name: &str) -> Result<Vec<Record>> {
        log::info!("Calling find_by_last_name() with '{}'", last_name);
        let result = self.inner.find_by_last_name(last_name);
        listed("find_by_last_name", &result);
        result
    }

    fn find_by_date_of_birth(&self, date_of_birth: Date) -> Result<Vec<Record>> {
        log::info!(
            "Calling find_by_date_of_birth() with '{}'",
            types::format_date(date_of_birth)
        );
        let result = self.inner.find_by_date_of_birth(date_of_birth);
        listed("find_by_date_of_birth", &result);
        result
    }

    fn get_all(&self) -> Result<Vec<Record>> {
        log::info!("Calling get_all()");
        let result = self.inner.get_all();
        listed("get_all", &result);
        result
    }

    fn count(&self) -> Result<usize> {
        log::info!("Calling count()");
        let result = self.inner.count();
        outcome("count", &result);
        result
    }

    fn removed_count(&self) -> Result<usize> {
        log::info!("Calling removed_count()");
        let result = self.inner.removed_count();
        outcome("removed_count", &result);
        result
    }

    fn make_snapshot(&self) -> Result<Snapshot> {
        log::info!("Calling make_snapshot()");
        let result = self.inner.make_snapshot();
        match &result {
            Ok(snapshot) => log::info!("make_snapshot() returned {} records", snapshot.len()),
            Err(err) => log::info!("make_snapshot() failed: {}", err),
        }
        result
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<usize> {
        log::info!("Calling restore() with {} records", snapshot.len());
        let result = self.inner.restore(snapshot);
        outcome("restore", &result);
        result
    }

    fn validator(&self) -> &CompositeValidator {
        self.inner.validator()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::memory::MemoryStore;
    use crate::salary::Salary;
    use crate::validator::build_default_validator;
    use time::macros::date;

    #[test]
    fn test_passes_results_through() {
        let mut store = LoggingStore::new(MemoryStore::new(build_default_validator()));
        let data = DataRecord::new("Ann", "Lee", date!(1990 - 05 - 04), 'B', Salary::from_int(5000));

        let id = store.create(&data).unwrap();
        store.edit_by_id(&data.clone().with_id(id)).unwrap();
        assert_eq!(store.find_by_id(id).unwrap(), Some(0));
        let mut bad = data.clone();
        bad.first_name.clear();
        assert!(store.create(&bad).is_err());
        assert_eq!(store.into_inner().count().unwrap(), 1);
    }

    #[test]
    fn test_args_display() {
        let data = DataRecord::new("Ann", "Lee", date!(1990 - 05 - 04), 'B', Salary::from_int(5000));
        let text = Args(&data).to_string();
        assert!(text.contains("dateOfBirth = '04/05/1990'"));
        assert!(text.contains("salary = '5000'"));
    }
}
