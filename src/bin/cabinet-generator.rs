//! CABINET - Bulk Record Generator
//! Writes random records accepted by the default validation rules.
//!
//! ```text
//! cabinet-generator --output-type csv --output records.csv --records-amount 1000 --start-id 30
//! ```

use std::fs::File;
use std::path::PathBuf;

use clap::{Parser, ValueEnum, ValueHint};
use rand::Rng;
use time::macros::date;
use time::{Date, Duration};

use cabinet::engine::memory::MemoryStore;
use cabinet::engine::RecordStore;
use cabinet::error::Result;
use cabinet::salary::Salary;
use cabinet::types::{self, DataRecord};
use cabinet::validator::build_default_validator;

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum OutputType {
    Csv,
    Xml,
}

/// Writes random records accepted by the default validation rules.
#[derive(Debug, Parser)]
#[command(name = "cabinet-generator", version, about)]
struct Options {
    /// Export format.
    #[arg(short = 't', long, value_enum, ignore_case = true)]
    output_type: OutputType,

    /// File the records are written to.
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Number of records to generate.
    #[arg(short = 'a', long = "records-amount")]
    amount: usize,

    /// Id of the first generated record.
    #[arg(short = 'i', long, default_value_t = 1, value_parser = clap::value_parser!(i32).range(0..))]
    start_id: i32,
}

fn random_name<R: Rng>(rng: &mut R) -> String {
    let len = rng.gen_range(2..=12);
    let mut name = String::with_capacity(len);
    name.push(rng.gen_range(b'A'..=b'Z') as char);
    for _ in 1..len {
        name.push(rng.gen_range(b'a'..=b'z') as char);
    }
    name
}

fn random_record<R: Rng>(rng: &mut R, earliest: Date, today: Date) -> DataRecord {
    let span = (today - earliest).whole_days();
    let date_of_birth = earliest + Duration::days(rng.gen_range(0..=span));
    let access = rng.gen_range(b'A'..=b'G') as char;
    let cents = rng.gen_range(0..=10_000_000i128);
    let salary = Salary::new(cents, 2).unwrap_or_default();
    DataRecord::new(
        random_name(rng),
        random_name(rng),
        date_of_birth,
        access,
        salary,
    )
}

fn generate(options: &Options) -> Result<()> {
    let mut store = MemoryStore::with_start_id(build_default_validator(), options.start_id);
    let mut rng = rand::thread_rng();
    let today = types::today();

    for _ in 0..options.amount {
        store.create(&random_record(&mut rng, date!(1950 - 01 - 01), today))?;
    }

    let snapshot = store.make_snapshot()?;
    let file = File::create(&options.output)?;
    match options.output_type {
        OutputType::Csv => snapshot.save_to_csv(file)?,
        OutputType::Xml => snapshot.save_to_xml(file)?,
    }
    println!(
        "{} records were written to {}.",
        snapshot.len(),
        options.output.display()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    let options = Options::parse();
    if let Err(err) = generate(&options) {
        eprintln!("[ERROR] {}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cabinet::validator::RecordValidator;

    #[test]
    fn test_options() {
        let options = Options::try_parse_from([
            "cabinet-generator",
            "--output-type",
            "XML",
            "--output",
            "records.xml",
            "--records-amount",
            "25",
            "--start-id",
            "30",
        ])
        .unwrap();
        assert_eq!(options.output_type, OutputType::Xml);
        assert_eq!(options.output, PathBuf::from("records.xml"));
        assert_eq!(options.amount, 25);
        assert_eq!(options.start_id, 30);

        let defaults =
            Options::try_parse_from(["cabinet-generator", "-t", "csv", "-o", "a.csv", "-a", "1"])
                .unwrap();
        assert_eq!(defaults.start_id, 1);

        assert!(Options::try_parse_from(["cabinet-generator", "-t", "json", "-o", "a", "-a", "1"]).is_err());
        assert!(Options::try_parse_from(["cabinet-generator", "-t", "csv", "-o", "a"]).is_err());
    }

    #[test]
    fn test_generated_records_pass_default_rules() {
        let validator = build_default_validator();
        let mut rng = rand::thread_rng();
        let today = types::today();
        for _ in 0..200 {
            let data = random_record(&mut rng, date!(1950 - 01 - 01), today);
            validator.validate(&data).unwrap();
        }
    }
}
