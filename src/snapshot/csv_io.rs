//! CSV export and import. No header row and no quoting: fields are split
//! on every comma, so names containing commas or line breaks are not
//! representable. Export writes them anyway and warns that re-import will
//! skip the line.

use std::io::{Read, Write};

use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};

use crate::error::{CabinetError, Result};
use crate::types::{self, Field, Record};

const FIELD_COUNT: usize = 7;

pub(super) fn write_records<W: Write>(writer: W, records: &[Record]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .from_writer(writer);
    for record in records {
        for (field, text) in [
            (Field::FirstName, &record.first_name),
            (Field::LastName, &record.last_name),
        ] {
            if text.contains([',', '\n', '\r']) {
                log::warn!(
                    "Record #{}: {} '{}' contains a separator; the CSV line will not import back",
                    record.id,
                    field,
                    text.escape_debug()
                );
            }
        }
        writer.write_record([
            record.id.to_string(),
            record.first_name.clone(),
            record.last_name.clone(),
            types::format_date(record.date_of_birth),
            record.age.to_string(),
            record.access.to_string(),
            record.salary.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub(super) fn read_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0;
    let mut row = StringRecord::new();
    loop {
        let line = reader.position().line();
        match reader.read_record(&mut row) {
            Ok(true) => match parse_row(&row) {
                Ok(record) => records.push(record),
                Err(err) => {
                    log::warn!("Skipping CSV line {}: {}", line, err);
                    skipped += 1;
                }
            },
            Ok(false) => break,
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => {
                log::warn!("Skipping CSV line {}: {}", line, err);
                skipped += 1;
            }
        }
    }

    log::info!(
        "Read {} records from CSV ({} lines skipped)",
        records.len(),
        skipped
    );
    Ok(records)
}

fn parse_row(row: &StringRecord) -> Result<Record> {
    if row.len() != FIELD_COUNT {
        return Err(CabinetError::Parse(format!(
            "expected {} fields, found {}",
            FIELD_COUNT,
            row.len()
        )));
    }
    let field = |i: usize| row.get(i).unwrap_or_default();
    let typed = |f: Field, err: CabinetError| CabinetError::Parse(format!("{}: {}", f, err));

    Ok(Record {
        id: field(0)
            .trim()
            .parse()
            .map_err(|_| CabinetError::Parse(format!("{}: '{}' is not an integer", Field::Id, field(0))))?,
        first_name: field(1).to_string(),
        last_name: field(2).to_string(),
        date_of_birth: types::parse_date(field(3)).map_err(|e| typed(Field::DateOfBirth, e))?,
        age: field(4)
            .trim()
            .parse()
            .map_err(|_| CabinetError::Parse(format!("{}: '{}' is not an integer", Field::Age, field(4))))?,
        access: types::parse_access(field(5)).map_err(|e| typed(Field::Access, e))?,
        salary: field(6).parse().map_err(|e| typed(Field::Salary, e))?,
    })
}
