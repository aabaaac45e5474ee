//! CABINET - Fixed-Width Record Slot
//! Binary codec for the 277-byte slots of the file-backed store.
//!
//! ## Binary Format (little-endian)
//! ```text
//! [id: i32][deleted: u8][first_name: 120 bytes][last_name: 120 bytes]
//! [year: i32][month: i32][day: i32][access: u16][age: i16]
//! [salary: lo i32, mid i32, hi i32, flags i32]
//! ```
//! Text fields are UTF-8, zero-padded on write and trimmed of padding on
//! read; text wider than the field is rejected, never cut. Slot offsets are
//! implicit: `position * SLOT_SIZE`.

use bytes::{Buf, BufMut, BytesMut};
use time::{Date, Month};

use crate::error::{CabinetError, Result};
use crate::salary::Salary;
use crate::types::{Field, Record};

/// Width of each text field in bytes.
pub const NAME_SIZE: usize = 120;

/// Offset of the soft-delete flag inside a slot.
pub const DELETED_OFFSET: usize = 4;

/// Total size of one slot in bytes.
pub const SLOT_SIZE: usize = 4 + 1 + NAME_SIZE * 2 + 4 * 3 + 2 + 2 + 16;

const DELETED: u8 = 1;
const LIVE: u8 = 0;

/// One decoded slot. Tombstones keep their payload until purge.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub deleted: bool,
    pub record: Record,
}

impl Slot {
    pub fn live(record: Record) -> Self {
        Self {
            deleted: false,
            record,
        }
    }

    /// Encode the slot into exactly `SLOT_SIZE` bytes.
    ///
    /// Names wider than `NAME_SIZE` bytes and access characters outside the
    /// 16-bit range are rejected before anything is encoded.
    pub fn encode(&self) -> Result<BytesMut> {
        let record = &self.record;
        let access = u16::try_from(record.access as u32).map_err(|_| {
            CabinetError::Serialization(format!(
                "access '{}' does not fit in a 16-bit code unit",
                record.access
            ))
        })?;
        check_width(Field::FirstName, &record.first_name)?;
        check_width(Field::LastName, &record.last_name)?;

        let mut buf = BytesMut::with_capacity(SLOT_SIZE);
        buf.put_i32_le(record.id);
        buf.put_u8(if self.deleted { DELETED } else { LIVE });
        put_text(&mut buf, &record.first_name);
        put_text(&mut buf, &record.last_name);
        buf.put_i32_le(record.date_of_birth.year());
        buf.put_i32_le(u8::from(record.date_of_birth.month()) as i32);
        buf.put_i32_le(record.date_of_birth.day() as i32);
        buf.put_u16_le(access);
        buf.put_i16_le(record.age);
        for part in record.salary.to_parts() {
            buf.put_i32_le(part);
        }
        debug_assert_eq!(buf.len(), SLOT_SIZE);
        Ok(buf)
    }

    /// Decode one slot from exactly `SLOT_SIZE` bytes.
    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        if buf.len() != SLOT_SIZE {
            return Err(CabinetError::Corruption(format!(
                "slot is {} bytes, expected {}",
                buf.len(),
                SLOT_SIZE
            )));
        }

        let id = buf.get_i32_le();
        let deleted = match buf.get_u8() {
            LIVE => false,
            DELETED => true,
            other => {
                return Err(CabinetError::Corruption(format!(
                    "slot #{} has delete flag {}",
                    id, other
                )))
            }
        };
        let first_name = get_text(&mut buf, id)?;
        let last_name = get_text(&mut buf, id)?;
        let year = buf.get_i32_le();
        let month = buf.get_i32_le();
        let day = buf.get_i32_le();
        let date_of_birth = decode_date(id, year, month, day)?;
        let access_unit = buf.get_u16_le();
        let access = char::decode_utf16([access_unit])
            .next()
            .and_then(|c| c.ok())
            .ok_or_else(|| {
                CabinetError::Corruption(format!(
                    "slot #{} has access code {:#06x}",
                    id, access_unit
                ))
            })?;
        let age = buf.get_i16_le();
        let parts = [
            buf.get_i32_le(),
            buf.get_i32_le(),
            buf.get_i32_le(),
            buf.get_i32_le(),
        ];
        let salary = Salary::from_parts(parts)?;

        Ok(Self {
            deleted,
            record: Record {
                id,
                first_name,
                last_name,
                date_of_birth,
                access,
                age,
                salary,
            },
        })
    }
}

/// Read only the id and delete flag from the head of a slot.
pub fn decode_header(mut buf: &[u8]) -> Result<(i32, bool)> {
    if buf.len() < DELETED_OFFSET + 1 {
        return Err(CabinetError::Corruption("slot header is truncated".into()));
    }
    let id = buf.get_i32_le();
    match buf.get_u8() {
        LIVE => Ok((id, false)),
        DELETED => Ok((id, true)),
        other => Err(CabinetError::Corruption(format!(
            "slot #{} has delete flag {}",
            id, other
        ))),
    }
}

/// The single byte written by a soft delete.
pub fn deleted_flag() -> [u8; 1] {
    [DELETED]
}

fn check_width(field: Field, text: &str) -> Result<()> {
    if text.len() > NAME_SIZE {
        return Err(CabinetError::validation(
            field,
            format!(
                "{} bytes of UTF-8 do not fit the {}-byte slot field",
                text.len(),
                NAME_SIZE
            ),
        ));
    }
    Ok(())
}

fn put_text(buf: &mut BytesMut, text: &str) {
    buf.put_slice(text.as_bytes());
    buf.put_bytes(0, NAME_SIZE - text.len());
}

fn get_text(buf: &mut &[u8], id: i32) -> Result<String> {
    let field = &buf[..NAME_SIZE];
    let len = field.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    let text = String::from_utf8(field[..len].to_vec()).map_err(|err| {
        CabinetError::Corruption(format!("slot #{} has invalid UTF-8 text: {}", id, err))
    })?;
    buf.advance(NAME_SIZE);
    Ok(text)
}

fn decode_date(id: i32, year: i32, month: i32, day: i32) -> Result<Date> {
    let corrupt = || {
        CabinetError::Corruption(format!(
            "slot #{} has invalid date {}-{}-{}",
            id, year, month, day
        ))
    };
    let month = u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(corrupt)?;
    let day = u8::try_from(day).map_err(|_| corrupt())?;
    Date::from_calendar_date(year, month, day).map_err(|_| corrupt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn sample() -> Record {
        Record {
            id: 42,
            first_name: "Ann".into(),
            last_name: "Lee".into(),
            date_of_birth: date!(1990 - 05 - 04),
            access: 'B',
            age: 36,
            salary: "5000.75".parse().unwrap(),
        }
    }

    #[test]
    fn test_slot_size() {
        assert_eq!(SLOT_SIZE, 277);
        assert_eq!(Slot::live(sample()).encode().unwrap().len(), 277);
    }

    #[test]
    fn test_byte_layout() {
        let bytes = Slot::live(sample()).encode().unwrap();
        assert_eq!(&bytes[0..4], &42i32.to_le_bytes());
        assert_eq!(bytes[4], 0);
        assert_eq!(&bytes[5..8], b"Ann");
        assert!(bytes[8..125].iter().all(|&b| b == 0));
        assert_eq!(&bytes[125..128], b"Lee");
        assert_eq!(&bytes[245..249], &1990i32.to_le_bytes());
        assert_eq!(&bytes[249..253], &5i32.to_le_bytes());
        assert_eq!(&bytes[253..257], &4i32.to_le_bytes());
        assert_eq!(&bytes[257..259], &(b'B' as u16).to_le_bytes());
        assert_eq!(&bytes[259..261], &36i16.to_le_bytes());
        assert_eq!(&bytes[261..265], &500075i32.to_le_bytes());
        assert_eq!(&bytes[273..277], &(2i32 << 16).to_le_bytes());
    }

    #[test]
    fn test_decode_reproduces_fields() {
        let mut slot = Slot::live(sample());
        slot.record.salary = Salary::new(-79_228_162_514_264_337_593_543_950_335, 28).unwrap();
        slot.record.first_name = "Zoë".into();
        slot.deleted = true;

        let bytes = slot.encode().unwrap();
        let back = Slot::decode(&bytes).unwrap();
        assert_eq!(back, slot);
        assert_eq!(back.record.salary.mantissa(), slot.record.salary.mantissa());
        assert_eq!(back.record.salary.scale(), 28);
        assert_eq!(decode_header(&bytes).unwrap(), (42, true));
    }

    #[test]
    fn test_wide_names_are_rejected() {
        let mut record = sample();
        record.first_name = "é".repeat(60); // exactly 120 bytes
        let bytes = Slot::live(record.clone()).encode().unwrap();
        assert_eq!(Slot::decode(&bytes).unwrap().record.first_name, "é".repeat(60));

        record.last_name = "é".repeat(61);
        match Slot::live(record).encode() {
            Err(CabinetError::Validation { field, .. }) => assert_eq!(field, Field::LastName),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_wide_access() {
        let mut record = sample();
        record.access = '🦀';
        assert!(Slot::live(record).encode().is_err());
    }

    #[test]
    fn test_decode_corruption() {
        let bytes = Slot::live(sample()).encode().unwrap();
        assert!(Slot::decode(&bytes[..200]).is_err());

        let mut bad_date = bytes.clone();
        bad_date[249..253].copy_from_slice(&13i32.to_le_bytes());
        assert!(matches!(
            Slot::decode(&bad_date),
            Err(CabinetError::Corruption(_))
        ));

        let mut bad_flag = bytes;
        bad_flag[4] = 7;
        assert!(Slot::decode(&bad_flag).is_err());
        assert!(matches!(
            decode_header(&bad_flag),
            Err(CabinetError::Corruption(_))
        ));
    }
}
