//! CABINET - Metered Store
//! Decorator that times every call into the wrapped store.

use std::time::Instant;

use time::Date;

use super::metrics::{Operation, StoreMetrics};
use super::RecordStore;
use crate::error::Result;
use crate::snapshot::Snapshot;
use crate::types::{DataRecord, Record, RecordId};
use crate::validator::CompositeValidator;

/// Wraps a store, logging the duration of each call and keeping totals.
pub struct MeteredStore<S> {
    inner: S,
    metrics: StoreMetrics,
}

impl<S: RecordStore> MeteredStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            metrics: StoreMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &StoreMetrics {
        &self.metrics
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: RecordStore> RecordStore for MeteredStore<S> {
    fn create(&mut self, data: &DataRecord) -> Result<RecordId> {
        let started = Instant::now();
        let result = self.inner.create(data);
        self.finish("create", Operation::Create, started);
        result
    }

    fn edit(&mut self, data: &DataRecord, position: usize) -> Result<()> {
        let started = Instant::now();
        let result = self.inner.edit(data, position);
        self.finish("edit", Operation::Edit, started);
        result
    }

    fn edit_by_id(&mut self, data: &DataRecord) -> Result<()> {
        let started = Instant::now();
        let result = self.inner.edit_by_id(data);
        self.finish("edit_by_id", Operation::Edit, started);
        result
    }

    fn remove(&mut self, id: RecordId) -> Result<bool> {
        let started = Instant::now();
        let result = self.inner.remove(id);
        self.finish("remove", Operation::Remove, started);
        result
    }

    fn purge(&mut self) -> Result<usize> {
        let started = Instant::now();
        let result = self.inner.purge();
        self.finish("purge", Operation::Purge, started);
        result
    }

    fn find_by_id(&self, id: RecordId) -> Result<Option<usize>> {
        self.timed("find_by_id", Operation::Find, || self.inner.find_by_id(id))
    }

    fn find_by_first_name(&self, first_name: &str) -> Result<Vec<Record>> {
        self.timed("find_by_first_name", Operation::Find, || {
            self.inner.find_by_first_name(first_name)
        })
    }

    fn find_by_last_name(&self, last_name: &str) -> Result<Vec<Record>> {
        self.timed("find_by_last_name", Operation::Find, || {
            self.inner.find_by_last_name(last_name)
        })
    }

    fn find_by_date_of_birth(&self, date_of_birth: Date) -> Result<Vec<Record>> {
        self.timed("find_by_date_of_birth", Operation::Find, || {
            self.inner.find_by_date_of_birth(date_of_birth)
        })
    }

    fn get_all(&self) -> Result<Vec<Record>> {
        self.timed("get_all", Operation::List, || self.inner.get_all())
    }

    fn count(&self) -> Result<usize> {
        self.timed("count", Operation::List, || self.inner.count())
    }

    fn removed_count(&self) -> Result<usize> {
        self.timed("removed_count", Operation::List, || self.inner.removed_count())
    }

    fn make_snapshot(&self) -> Result<Snapshot> {
        self.timed("make_snapshot", Operation::Snapshot, || {
            self.inner.make_snapshot()
        })
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<usize> {
        let started = Instant::now();
        let result = self.inner.restore(snapshot);
        self.finish("restore", Operation::Restore, started);
        result
    }

    fn validator(&self) -> &CompositeValidator {
        self.inner.validator()
    }
}

impl<S> MeteredStore<S> {
    fn timed<T>(&self, name: &str, op: Operation, f: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let result = f();
        self.finish(name, op, started);
        result
    }

    fn finish(&self, name: &str, op: Operation, started: Instant) {
        let elapsed = started.elapsed();
        self.metrics.record(op, elapsed);
        log::info!("{} method execution duration is {:?}", name, elapsed);
    }
}
