//! CABINET - File-Backed Store
//! Records persisted as fixed 277-byte slots in a single data file.
//!
//! ## Layout
//! Slot `n` starts at byte `n * SLOT_SIZE`. `remove` only flips the delete
//! flag of one slot; the space comes back through `purge`, which writes the
//! live slots to a sibling file and renames it over the original.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use time::Date;

use super::cursor::SlotCursor;
use super::slot::{self, Slot, DELETED_OFFSET, SLOT_SIZE};
use super::{advance_past, RecordStore};
use crate::error::{CabinetError, Result};
use crate::snapshot::Snapshot;
use crate::types::{self, DataRecord, Record, RecordId};
use crate::validator::{CompositeValidator, RecordValidator};

/// Record store backed by a fixed-slot binary file.
pub struct FileStore {
    /// Path to the data file.
    path: PathBuf,
    /// Open handle, owned for the lifetime of the store.
    file: File,
    validator: CompositeValidator,
    /// Id handed to the next created record, `None` once ids are exhausted.
    next_id: Option<RecordId>,
    /// Whether to sync the file after every write.
    sync_writes: bool,
}

impl FileStore {
    /// Open or create the data file at `path`.
    ///
    /// Existing slots are kept. Ids continue from `start_id` or from one past
    /// the largest id already in the file, whichever is larger.
    pub fn open(
        path: impl AsRef<Path>,
        validator: CompositeValidator,
        start_id: RecordId,
        sync_writes: bool,
    ) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let mut store = Self {
            path,
            file,
            validator,
            next_id: Some(start_id.max(0)),
            sync_writes,
        };

        let slots = store.slot_count()?;
        let mut max_id = None;
        {
            let mut cursor = store.cursor()?;
            while let Some((_, raw)) = cursor.next_raw()? {
                let (id, _) = slot::decode_header(&raw)?;
                max_id = max_id.max(Some(id));
            }
        }
        if let Some(max_id) = max_id {
            store.next_id = advance_past(store.next_id, max_id);
        }

        log::info!(
            "File store opened at {:?} ({} slots, next id {:?})",
            store.path,
            slots,
            store.next_id
        );
        Ok(store)
    }

    /// Path to the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of physical slots, tombstones included.
    pub fn slot_count(&self) -> Result<usize> {
        let len = self.file.metadata()?.len() as usize;
        if len % SLOT_SIZE != 0 {
            return Err(CabinetError::Corruption(format!(
                "{:?} is {} bytes, not a multiple of {}",
                self.path, len, SLOT_SIZE
            )));
        }
        Ok(len / SLOT_SIZE)
    }

    /// Cursor over the slots, starting at the first one.
    pub fn cursor(&self) -> Result<SlotCursor<'_>> {
        self.slot_count()?;
        SlotCursor::new(&self.file)
    }

    fn read_slot(&self, position: usize) -> Result<Option<Slot>> {
        if position >= self.slot_count()? {
            return Ok(None);
        }
        let mut buf = [0u8; SLOT_SIZE];
        let mut file = &self.file;
        file.seek(SeekFrom::Start((position * SLOT_SIZE) as u64))?;
        file.read_exact(&mut buf)?;
        Ok(Some(Slot::decode(&buf)?))
    }

    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(bytes)?;
        if self.sync_writes {
            self.file.sync_data()?;
        }
        Ok(())
    }

    fn write_slot(&mut self, position: usize, slot: &Slot) -> Result<()> {
        let bytes = slot.encode()?;
        self.write_at((position * SLOT_SIZE) as u64, &bytes)
    }

    /// Live records matching `filter`, in slot order.
    fn scan<F>(&self, mut filter: F) -> Result<Vec<Record>>
    where
        F: FnMut(&Record) -> bool,
    {
        let mut found = Vec::new();
        for record in self.cursor()? {
            let record = record?;
            if filter(&record) {
                found.push(record);
            }
        }
        Ok(found)
    }

    /// Count slots by delete flag: (live, removed).
    fn tally(&self) -> Result<(usize, usize)> {
        let mut cursor = self.cursor()?;
        let (mut live, mut removed) = (0, 0);
        while let Some((_, raw)) = cursor.next_raw()? {
            match slot::decode_header(&raw)? {
                (_, true) => removed += 1,
                (_, false) => live += 1,
            }
        }
        Ok((live, removed))
    }
}

/// Sibling of `path` that purge writes to: the full file name plus `.purge`,
/// so it never equals `path` itself.
fn purge_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".purge");
    path.with_file_name(name)
}

/// Make a rename in the parent directory durable.
#[cfg(unix)]
fn sync_parent(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()?;
    Ok(())
}

#[cfg(not(unix))]
fn sync_parent(_path: &Path) -> Result<()> {
    Ok(())
}

impl RecordStore for FileStore {
    fn create(&mut self, data: &DataRecord) -> Result<RecordId> {
        self.validator.validate(data)?;
        let id = self.next_id.ok_or(CabinetError::IdExhausted)?;

        let record = Record::from_data(id, data, types::today());
        let position = self.slot_count()?;
        self.write_slot(position, &Slot::live(record))?;
        self.next_id = id.checked_add(1);

        log::debug!("Created record #{} in slot {}", id, position);
        Ok(id)
    }

    fn edit(&mut self, data: &DataRecord, position: usize) -> Result<()> {
        let current = match self.read_slot(position)? {
            Some(slot) if !slot.deleted => slot.record,
            _ => return Err(CabinetError::InvalidPosition(position)),
        };
        self.validator.validate(data)?;

        let record = Record::from_data(current.id, data, types::today());
        self.write_slot(position, &Slot::live(record))?;

        log::debug!("Edited record #{} in slot {}", current.id, position);
        Ok(())
    }

    fn remove(&mut self, id: RecordId) -> Result<bool> {
        let Some(position) = self.find_by_id(id)? else {
            return Ok(false);
        };
        let offset = (position * SLOT_SIZE + DELETED_OFFSET) as u64;
        self.write_at(offset, &slot::deleted_flag())?;

        log::debug!("Removed record #{} from slot {}", id, position);
        Ok(true)
    }

    fn purge(&mut self) -> Result<usize> {
        // Every live slot is buffered before the original file is touched.
        let mut live: Vec<[u8; SLOT_SIZE]> = Vec::new();
        let mut total = 0;
        {
            let mut cursor = self.cursor()?;
            while let Some((_, raw)) = cursor.next_raw()? {
                total += 1;
                if !slot::decode_header(&raw)?.1 {
                    live.push(raw);
                }
            }
        }
        let dropped = total - live.len();
        if dropped == 0 {
            return Ok(0);
        }

        let tmp_path = purge_path(&self.path);
        {
            let mut tmp = File::create(&tmp_path)?;
            for raw in &live {
                tmp.write_all(raw)?;
            }
            tmp.sync_all()?;
        }
        std::fs::rename(&tmp_path, &self.path)?;
        sync_parent(&self.path)?;
        self.file = OpenOptions::new().read(true).write(true).open(&self.path)?;

        log::info!(
            "Purged {:?}: {} of {} slots reclaimed",
            self.path,
            dropped,
            total
        );
        Ok(dropped)
    }

    fn find_by_id(&self, id: RecordId) -> Result<Option<usize>> {
        let mut cursor = self.cursor()?;
        while let Some((position, raw)) = cursor.next_raw()? {
            if slot::decode_header(&raw)? == (id, false) {
                return Ok(Some(position));
            }
        }
        Ok(None)
    }

    fn find_by_first_name(&self, first_name: &str) -> Result<Vec<Record>> {
        let key = first_name.to_lowercase();
        self.scan(|r| r.first_name.to_lowercase() == key)
    }

    fn find_by_last_name(&self, last_name: &str) -> Result<Vec<Record>> {
        let key = last_name.to_lowercase();
        self.scan(|r| r.last_name.to_lowercase() == key)
    }

    fn find_by_date_of_birth(&self, date_of_birth: Date) -> Result<Vec<Record>> {
        self.scan(|r| r.date_of_birth == date_of_birth)
    }

    fn get_all(&self) -> Result<Vec<Record>> {
        self.scan(|_| true)
    }

    fn count(&self) -> Result<usize> {
        Ok(self.tally()?.0)
    }

    fn removed_count(&self) -> Result<usize> {
        Ok(self.tally()?.1)
    }

    fn make_snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot::new(self.get_all()?))
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<usize> {
        for record in snapshot.records() {
            let position = match self.find_by_id(record.id)? {
                Some(position) => position,
                None => self.slot_count()?,
            };
            self.write_slot(position, &Slot::live(record.clone()))?;
            self.next_id = advance_past(self.next_id, record.id);
        }

        log::info!("Restored {} records into {:?}", snapshot.len(), self.path);
        Ok(snapshot.len())
    }

    fn validator(&self) -> &CompositeValidator {
        &self.validator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::salary::Salary;
    use crate::validator::{build_custom_validator, build_default_validator};
    use time::macros::date;

    fn open(dir: &Path) -> FileStore {
        FileStore::open(dir.join("cabinet.db"), build_default_validator(), 1, false).unwrap()
    }

    fn data(first: &str) -> DataRecord {
        DataRecord::new(first, "Lee", date!(1990 - 05 - 04), 'B', Salary::from_int(5000))
    }

    #[test]
    fn test_create_appends_slots() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        assert_eq!(store.create(&data("Ann")).unwrap(), 1);
        assert_eq!(store.create(&data("Bob")).unwrap(), 2);

        let len = std::fs::metadata(store.path()).unwrap().len();
        assert_eq!(len, 2 * SLOT_SIZE as u64);
        assert_eq!(store.find_by_id(2).unwrap(), Some(1));
        assert_eq!(store.get_all().unwrap()[0].first_name, "Ann");
    }

    #[test]
    fn test_remove_is_soft() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        store.create(&data("Ann")).unwrap();
        store.create(&data("Bob")).unwrap();

        assert!(store.remove(1).unwrap());
        assert!(!store.remove(1).unwrap());
        assert_eq!(store.find_by_id(1).unwrap(), None);
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.removed_count().unwrap(), 1);
        assert_eq!(store.slot_count().unwrap(), 2);
        assert!(store.find_by_first_name("ann").unwrap().is_empty());
    }

    #[test]
    fn test_edit_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        store.create(&data("Ann")).unwrap();
        store.create(&data("Bob")).unwrap();

        let position = store.find_by_id(2).unwrap().unwrap();
        store.edit(&data("Rob"), position).unwrap();

        let all = store.get_all().unwrap();
        assert_eq!(all[1].id, 2);
        assert_eq!(all[1].first_name, "Rob");
        assert_eq!(store.slot_count().unwrap(), 2);
    }

    #[test]
    fn test_edit_rejects_tombstone_and_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        store.create(&data("Ann")).unwrap();
        store.remove(1).unwrap();

        assert!(matches!(
            store.edit(&data("Bob"), 0),
            Err(CabinetError::InvalidPosition(0))
        ));
        assert!(matches!(
            store.edit(&data("Bob"), 5),
            Err(CabinetError::InvalidPosition(5))
        ));
    }

    #[test]
    fn test_purge_drops_tombstones_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        for name in ["Ann", "Bob", "Cat"] {
            store.create(&data(name)).unwrap();
        }
        store.remove(2).unwrap();

        assert_eq!(store.purge().unwrap(), 1);
        let ids: Vec<_> = store.get_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(store.slot_count().unwrap(), 2);
        assert_eq!(store.removed_count().unwrap(), 0);
        assert_eq!(store.find_by_id(3).unwrap(), Some(1));

        assert_eq!(store.purge().unwrap(), 0);
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_reopen_continues_ids() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = open(dir.path());
            store.create(&data("Ann")).unwrap();
            store.create(&data("Bob")).unwrap();
        }
        let mut store = open(dir.path());
        assert_eq!(store.count().unwrap(), 2);
        assert_eq!(store.create(&data("Cat")).unwrap(), 3);
    }

    #[test]
    fn test_start_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut store =
            FileStore::open(dir.path().join("gen.db"), build_default_validator(), 500, false)
                .unwrap();
        assert_eq!(store.create(&data("Ann")).unwrap(), 500);
    }

    #[test]
    fn test_truncated_file_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cabinet.db");
        std::fs::write(&path, vec![0u8; SLOT_SIZE + 10]).unwrap();
        let result = FileStore::open(&path, build_default_validator(), 1, false);
        assert!(matches!(result, Err(CabinetError::Corruption(_))));
    }

    #[test]
    fn test_cursor_reset() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        store.create(&data("Ann")).unwrap();
        store.create(&data("Bob")).unwrap();
        store.remove(1).unwrap();

        let mut cursor = store.cursor().unwrap();
        let first: Vec<_> = cursor.by_ref().map(|r| r.unwrap().id).collect();
        assert_eq!(first, vec![2]);
        assert_eq!(cursor.position(), 2);

        cursor.reset().unwrap();
        let (position, slot) = cursor.next_slot().unwrap().unwrap();
        assert_eq!(position, 0);
        assert!(slot.deleted);
    }

    #[test]
    fn test_ids_exhausted_after_max() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = open(dir.path());
        store.create(&data("Ann")).unwrap();
        let mut last = store.get_all().unwrap()[0].clone();
        last.id = i32::MAX;
        store.restore(&Snapshot::new(vec![last])).unwrap();
        let slots = store.slot_count().unwrap();

        assert!(matches!(
            store.create(&data("Bob")),
            Err(CabinetError::IdExhausted)
        ));
        assert_eq!(store.slot_count().unwrap(), slots);
        let ids: Vec<_> = store.get_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, i32::MAX]);

        // Reopening sees the same exhausted counter.
        drop(store);
        let mut store = open(dir.path());
        assert!(matches!(
            store.create(&data("Bob")),
            Err(CabinetError::IdExhausted)
        ));
    }

    #[test]
    fn test_purge_data_file_with_purge_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cabinet.purge");
        let mut store = FileStore::open(&path, build_default_validator(), 1, false).unwrap();
        for name in ["Ann", "Bob", "Cat"] {
            store.create(&data(name)).unwrap();
        }
        store.remove(1).unwrap();

        assert_eq!(purge_path(&path), dir.path().join("cabinet.purge.purge"));
        assert_eq!(store.purge().unwrap(), 1);
        let ids: Vec<_> = store.get_all().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(!purge_path(&path).exists());
    }

    #[test]
    fn test_unknown_delete_flag_is_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cabinet.db");
        {
            let mut store = FileStore::open(&path, build_default_validator(), 1, false).unwrap();
            store.create(&data("Ann")).unwrap();
            store.create(&data("Bob")).unwrap();
        }
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[SLOT_SIZE + DELETED_OFFSET] = 7;
        std::fs::write(&path, bytes).unwrap();

        assert!(matches!(
            FileStore::open(&path, build_default_validator(), 1, false),
            Err(CabinetError::Corruption(_))
        ));
    }

    #[test]
    fn test_wide_multibyte_name_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cabinet.db");
        let mut store = FileStore::open(&path, build_custom_validator(), 1, false).unwrap();
        let mut wide = data("Ann");
        wide.access = 'b';
        wide.first_name = "é".repeat(100);

        let err = store.create(&wide).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.slot_count().unwrap(), 0);

        // The counter is untouched and a fitting name still goes in.
        wide.first_name = "é".repeat(60);
        assert_eq!(store.create(&wide).unwrap(), 1);
        assert_eq!(store.get_all().unwrap()[0].first_name, "é".repeat(60));
    }
}
