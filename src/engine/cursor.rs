//! CABINET - Slot Cursor
//! Forward-only iteration over the slots of a data file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek, SeekFrom};

use super::slot::{Slot, SLOT_SIZE};
use crate::error::{CabinetError, Result};
use crate::types::Record;

/// Walks slot positions from the start of the file.
///
/// The cursor drives the shared file position while it is alive; the
/// store hands one out only through `&self`, so no write can interleave.
/// As an `Iterator` it yields live records and skips tombstones.
pub struct SlotCursor<'a> {
    reader: BufReader<&'a File>,
    position: usize,
}

impl<'a> SlotCursor<'a> {
    pub(crate) fn new(file: &'a File) -> Result<Self> {
        let mut reader = BufReader::with_capacity(SLOT_SIZE * 64, file);
        reader.seek(SeekFrom::Start(0))?;
        Ok(Self {
            reader,
            position: 0,
        })
    }

    /// Physical position of the next slot to be read.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Rewind to the first slot.
    pub fn reset(&mut self) -> Result<()> {
        self.reader.seek(SeekFrom::Start(0))?;
        self.position = 0;
        Ok(())
    }

    /// Raw bytes of the next slot with its position, tombstones included.
    pub fn next_raw(&mut self) -> Result<Option<(usize, [u8; SLOT_SIZE])>> {
        let mut buf = [0u8; SLOT_SIZE];
        let mut filled = 0;
        while filled < SLOT_SIZE {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
        if filled == 0 {
            return Ok(None);
        }
        if filled < SLOT_SIZE {
            return Err(CabinetError::Corruption(format!(
                "slot {} is truncated to {} bytes",
                self.position, filled
            )));
        }
        let position = self.position;
        self.position += 1;
        Ok(Some((position, buf)))
    }

    /// The next decoded slot with its position, tombstones included.
    pub fn next_slot(&mut self) -> Result<Option<(usize, Slot)>> {
        match self.next_raw()? {
            Some((position, buf)) => Ok(Some((position, Slot::decode(&buf)?))),
            None => Ok(None),
        }
    }
}

impl Iterator for SlotCursor<'_> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.next_slot() {
                Ok(Some((_, slot))) if slot.deleted => continue,
                Ok(Some((_, slot))) => return Some(Ok(slot.record)),
                Ok(None) => return None,
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
