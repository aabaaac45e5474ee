//! CABINET - Snapshots
//! Immutable point-in-time copies of a store's live records, with
//! CSV/XML export and import and a checksummed binary backup.

mod backup;
mod csv_io;
mod xml_io;

use std::io::{Read, Write};

use crate::error::Result;
use crate::types::Record;

/// A frozen copy of the live record set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    records: Vec<Record>,
}

impl Snapshot {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write one `id,firstName,lastName,dd/MM/yyyy,age,access,salary` line per record.
    pub fn save_to_csv<W: Write>(&self, writer: W) -> Result<()> {
        csv_io::write_records(writer, &self.records)
    }

    /// Write the records as a `<records>` XML document.
    pub fn save_to_xml<W: Write>(&self, writer: W) -> Result<()> {
        xml_io::write_records(writer, &self.records)
    }

    /// Read CSV lines written by `save_to_csv`, skipping lines that fail to
    /// parse. Only a failure of the underlying reader aborts the import.
    pub fn load_from_csv<R: Read>(reader: R) -> Result<Self> {
        csv_io::read_records(reader).map(Self::new)
    }

    /// Read an XML document written by `save_to_xml`, skipping `<record>`
    /// elements with missing or unparsable values.
    pub fn load_from_xml<R: Read>(reader: R) -> Result<Self> {
        xml_io::read_records(reader).map(Self::new)
    }

    /// Write a checksummed binary backup.
    pub fn save_backup<W: Write>(&self, writer: W) -> Result<()> {
        backup::write_backup(writer, &self.records)
    }

    /// Read a backup written by `save_backup`.
    pub fn load_backup<R: Read>(reader: R) -> Result<Self> {
        backup::read_backup(reader).map(Self::new)
    }
}
