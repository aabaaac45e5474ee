//! Binary backups.
//!
//! ## Format
//! ```text
//! [magic: "CBAK"][version: u32 LE][payload_len: u64 LE][crc: u32 LE][payload]
//! ```
//! The payload is the `bincode` encoding of the record list; the CRC32
//! covers the payload only.

use std::io::{Read, Write};

use crate::error::{CabinetError, Result};
use crate::types::Record;

const MAGIC: &[u8; 4] = b"CBAK";
const VERSION: u32 = 1;
const HEADER_LEN: usize = 4 + 4 + 8 + 4;

pub(super) fn write_backup<W: Write>(mut writer: W, records: &[Record]) -> Result<()> {
    let payload = bincode::serialize(records)?;
    let crc = crc32fast::hash(&payload);

    let mut header = Vec::with_capacity(HEADER_LEN);
    header.extend_from_slice(MAGIC);
    header.extend_from_slice(&VERSION.to_le_bytes());
    header.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    header.extend_from_slice(&crc.to_le_bytes());

    writer.write_all(&header)?;
    writer.write_all(&payload)?;
    writer.flush()?;
    log::info!("Wrote backup of {} records ({} bytes)", records.len(), payload.len());
    Ok(())
}

pub(super) fn read_backup<R: Read>(mut reader: R) -> Result<Vec<Record>> {
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header).map_err(|err| {
        CabinetError::Corruption(format!("backup header unreadable: {}", err))
    })?;
    if &header[0..4] != MAGIC {
        return Err(CabinetError::Corruption("not a cabinet backup".into()));
    }
    let version = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);
    if version != VERSION {
        return Err(CabinetError::Corruption(format!(
            "unsupported backup version {}",
            version
        )));
    }
    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&header[8..16]);
    let payload_len = u64::from_le_bytes(len_bytes);
    let expected_crc = u32::from_le_bytes([header[16], header[17], header[18], header[19]]);

    let mut payload = Vec::new();
    reader.take(payload_len).read_to_end(&mut payload)?;
    if payload.len() as u64 != payload_len {
        return Err(CabinetError::Corruption(format!(
            "backup payload is {} bytes, expected {}",
            payload.len(),
            payload_len
        )));
    }
    let actual_crc = crc32fast::hash(&payload);
    if actual_crc != expected_crc {
        return Err(CabinetError::Corruption(format!(
            "backup CRC mismatch: expected {:#010x}, got {:#010x}",
            expected_crc, actual_crc
        )));
    }

    Ok(bincode::deserialize(&payload)?)
}
