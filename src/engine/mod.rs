//! CABINET - Record Store Engine
//! The `RecordStore` capability and its backends and decorators.

pub mod cursor;
pub mod file;
pub mod index;
pub mod logger;
pub mod memory;
pub mod meter;
pub mod metrics;
pub mod slot;

use time::Date;

use crate::config::{Config, StorageKind};
use crate::error::{CabinetError, Result};
use crate::snapshot::Snapshot;
use crate::types::{DataRecord, Record, RecordId};
use crate::validator::CompositeValidator;

use self::file::FileStore;
use self::logger::LoggingStore;
use self::memory::MemoryStore;
use self::meter::MeteredStore;

/// Operations a record store exposes to its callers.
///
/// Backends and decorators implement this same interface, so wrappers can
/// be stacked around any store without touching it.
pub trait RecordStore {
    /// Validate `data`, assign the next id and store the record.
    fn create(&mut self, data: &DataRecord) -> Result<RecordId>;

    /// Replace the record stored at `position`, keeping its id.
    fn edit(&mut self, data: &DataRecord, position: usize) -> Result<()>;

    /// Replace the record whose id is `data.id`.
    fn edit_by_id(&mut self, data: &DataRecord) -> Result<()> {
        let position = self
            .find_by_id(data.id)?
            .ok_or(CabinetError::UnknownId(data.id))?;
        self.edit(data, position)
    }

    /// Remove the record with `id`. Returns false if there was none.
    fn remove(&mut self, id: RecordId) -> Result<bool>;

    /// Reclaim the space of removed records. Returns how many were dropped.
    fn purge(&mut self) -> Result<usize>;

    /// Storage position of the record with `id`, if it exists.
    fn find_by_id(&self, id: RecordId) -> Result<Option<usize>>;

    fn find_by_first_name(&self, first_name: &str) -> Result<Vec<Record>>;

    fn find_by_last_name(&self, last_name: &str) -> Result<Vec<Record>>;

    fn find_by_date_of_birth(&self, date_of_birth: Date) -> Result<Vec<Record>>;

    /// All live records in storage order.
    fn get_all(&self) -> Result<Vec<Record>>;

    /// Number of live records.
    fn count(&self) -> Result<usize>;

    /// Number of removed records still occupying space.
    fn removed_count(&self) -> Result<usize>;

    fn make_snapshot(&self) -> Result<Snapshot>;

    /// Overwrite records with matching ids and append the rest.
    /// Returns how many records were applied.
    fn restore(&mut self, snapshot: &Snapshot) -> Result<usize>;

    fn validator(&self) -> &CompositeValidator;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn create(&mut self, data: &DataRecord) -> Result<RecordId> {
        (**self).create(data)
    }

    fn edit(&mut self, data: &DataRecord, position: usize) -> Result<()> {
        (**self).edit(data, position)
    }

    fn edit_by_id(&mut self, data: &DataRecord) -> Result<()> {
        (**self).edit_by_id(data)
    }

    fn remove(&mut self, id: RecordId) -> Result<bool> {
        (**self).remove(id)
    }

    fn purge(&mut self) -> Result<usize> {
        (**self).purge()
    }

    fn find_by_id(&self, id: RecordId) -> Result<Option<usize>> {
        (**self).find_by_id(id)
    }

    fn find_by_first_name(&self, first_name: &str) -> Result<Vec<Record>> {
        (**self).find_by_first_name(first_name)
    }

    fn find_by_last_name(&self, last_name: &str) -> Result<Vec<Record>> {
        (**self).find_by_last_name(last_name)
    }

    fn find_by_date_of_birth(&self, date_of_birth: Date) -> Result<Vec<Record>> {
        (**self).find_by_date_of_birth(date_of_birth)
    }

    fn get_all(&self) -> Result<Vec<Record>> {
        (**self).get_all()
    }

    fn count(&self) -> Result<usize> {
        (**self).count()
    }

    fn removed_count(&self) -> Result<usize> {
        (**self).removed_count()
    }

    fn make_snapshot(&self) -> Result<Snapshot> {
        (**self).make_snapshot()
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<usize> {
        (**self).restore(snapshot)
    }

    fn validator(&self) -> &CompositeValidator {
        (**self).validator()
    }
}

/// Id counter after `id` has been stored. `None` once `i32::MAX` is taken.
pub(crate) fn advance_past(next_id: Option<RecordId>, id: RecordId) -> Option<RecordId> {
    match next_id {
        Some(next) if id >= next => id.checked_add(1),
        other => other,
    }
}

/// Open the backend selected by `config`, wrapped in the configured decorators.
pub fn open(config: &Config) -> Result<Box<dyn RecordStore>> {
    let validator = config.validation.build();
    let mut store: Box<dyn RecordStore> = match config.storage {
        StorageKind::Memory => Box::new(MemoryStore::with_start_id(validator, config.start_id)),
        StorageKind::File => {
            config.ensure_dirs()?;
            Box::new(FileStore::open(
                &config.data_file,
                validator,
                config.start_id,
                config.sync_writes,
            )?)
        }
    };

    if config.use_stopwatch {
        store = Box::new(MeteredStore::new(store));
    }
    if config.use_logger {
        store = Box::new(LoggingStore::new(store));
    }

    log::info!(
        "Opened {} store with '{}' validation",
        config.storage,
        config.validation
    );
    Ok(store)
}
