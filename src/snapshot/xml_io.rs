//! XML export and import.
//!
//! ```text
//! <records>
//!   <record id="1">
//!     <name first="Ann" last="Lee"/>
//!     <dateOfBirth age="36">04/05/1990</dateOfBirth>
//!     <salary>5000</salary>
//!     <access>B</access>
//!   </record>
//! </records>
//! ```

use std::io::{BufReader, BufWriter, Read, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{CabinetError, Result};
use crate::types::{self, Field, Record};

pub(super) fn write_records<W: Write>(writer: W, records: &[Record]) -> Result<()> {
    let mut xml = Writer::new_with_indent(BufWriter::new(writer), b' ', 2);
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    xml.write_event(Event::Start(BytesStart::new("records")))?;
    for record in records {
        let id = record.id.to_string();
        xml.write_event(Event::Start(
            BytesStart::new("record").with_attributes([("id", id.as_str())]),
        ))?;
        xml.write_event(Event::Empty(BytesStart::new("name").with_attributes([
            ("first", record.first_name.as_str()),
            ("last", record.last_name.as_str()),
        ])))?;

        let age = record.age.to_string();
        xml.write_event(Event::Start(
            BytesStart::new("dateOfBirth").with_attributes([("age", age.as_str())]),
        ))?;
        xml.write_event(Event::Text(BytesText::new(&types::format_date(
            record.date_of_birth,
        ))))?;
        xml.write_event(Event::End(BytesEnd::new("dateOfBirth")))?;

        text_element(&mut xml, "salary", &record.salary.to_string())?;
        text_element(&mut xml, "access", &record.access.to_string())?;
        xml.write_event(Event::End(BytesEnd::new("record")))?;
    }
    xml.write_event(Event::End(BytesEnd::new("records")))?;
    xml.into_inner().flush()?;
    Ok(())
}

fn text_element<W: Write>(xml: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// Element whose text content is being read.
#[derive(Debug, Clone, Copy)]
enum TextField {
    DateOfBirth,
    Salary,
    Access,
}

/// Raw values collected for one `<record>` before conversion.
#[derive(Debug, Default)]
struct RecordDraft {
    id: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    date_of_birth: Option<String>,
    age: Option<String>,
    salary: Option<String>,
    access: Option<String>,
}

impl RecordDraft {
    fn set_text(&mut self, field: TextField, text: String) {
        match field {
            TextField::DateOfBirth => self.date_of_birth = Some(text),
            TextField::Salary => self.salary = Some(text),
            TextField::Access => self.access = Some(text),
        }
    }

    fn finish(self) -> Result<Record> {
        let id = required(Field::Id, self.id)?;
        let age = required(Field::Age, self.age)?;
        Ok(Record {
            id: id
                .trim()
                .parse()
                .map_err(|_| CabinetError::Parse(format!("{}: '{}' is not an integer", Field::Id, id)))?,
            first_name: required(Field::FirstName, self.first_name)?,
            last_name: required(Field::LastName, self.last_name)?,
            date_of_birth: types::parse_date(&required(Field::DateOfBirth, self.date_of_birth)?)?,
            age: age
                .trim()
                .parse()
                .map_err(|_| CabinetError::Parse(format!("{}: '{}' is not an integer", Field::Age, age)))?,
            access: types::parse_access(&required(Field::Access, self.access)?)?,
            salary: required(Field::Salary, self.salary)?.parse()?,
        })
    }
}

fn push_finished(draft: RecordDraft, seen: usize, records: &mut Vec<Record>) {
    match draft.finish() {
        Ok(record) => records.push(record),
        Err(err) => log::warn!("Skipping XML record {}: {}", seen, err),
    }
}

fn required(field: Field, value: Option<String>) -> Result<String> {
    value.ok_or_else(|| CabinetError::Parse(format!("{} is missing", field)))
}

fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>> {
    match element.try_get_attribute(name)? {
        Some(attr) => Ok(Some(attr.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

/// Read records written by `write_records`. A `<record>` with a missing or
/// unparsable value is skipped and logged; a document that is not
/// well-formed XML aborts the import.
pub(super) fn read_records<R: Read>(reader: R) -> Result<Vec<Record>> {
    let mut xml = Reader::from_reader(BufReader::new(reader));
    xml.trim_text(true);

    let mut records = Vec::new();
    let mut seen = 0;
    let mut draft: Option<RecordDraft> = None;
    let mut text_field: Option<TextField> = None;
    let mut buf = Vec::new();

    loop {
        let event = xml.read_event_into(&mut buf)?;
        let empty = matches!(event, Event::Empty(_));
        match event {
            Event::Start(element) | Event::Empty(element) => match element.name().as_ref() {
                b"record" => {
                    if let Some(open) = draft.take() {
                        push_finished(open, seen, &mut records);
                    }
                    seen += 1;
                    let next = RecordDraft {
                        id: attribute(&element, "id")?,
                        ..RecordDraft::default()
                    };
                    if empty {
                        push_finished(next, seen, &mut records);
                    } else {
                        draft = Some(next);
                    }
                }
                b"name" => {
                    if let Some(draft) = draft.as_mut() {
                        draft.first_name = attribute(&element, "first")?;
                        draft.last_name = attribute(&element, "last")?;
                    }
                }
                b"dateOfBirth" => {
                    if let Some(draft) = draft.as_mut() {
                        draft.age = attribute(&element, "age")?;
                    }
                    text_field = (!empty).then_some(TextField::DateOfBirth);
                }
                b"salary" if !empty => text_field = Some(TextField::Salary),
                b"access" if !empty => text_field = Some(TextField::Access),
                _ => {}
            },
            Event::Text(text) => {
                if let (Some(draft), Some(field)) = (draft.as_mut(), text_field) {
                    draft.set_text(field, text.unescape()?.into_owned());
                }
            }
            Event::End(element) => {
                text_field = None;
                if element.name().as_ref() == b"record" {
                    if let Some(done) = draft.take() {
                        push_finished(done, seen, &mut records);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    if let Some(open) = draft.take() {
        push_finished(open, seen, &mut records);
    }

    log::info!(
        "Read {} records from XML ({} records skipped)",
        records.len(),
        seen - records.len()
    );
    Ok(records)
}
