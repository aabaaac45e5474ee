//! CABINET - Interactive Record Prompt
//! A thin command loop over the `RecordStore` interface.

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, ValueHint};

use cabinet::config::{Config, StorageKind};
use cabinet::engine::{self, RecordStore};
use cabinet::error::{CabinetError, Result};
use cabinet::snapshot::Snapshot;
use cabinet::types::{self, DataRecord, Field, Record};
use cabinet::validator::ValidationProfile;

const HELP: &str = "\
  Commands:
    create <first> <last> <dd/mm/yyyy> <access> <salary>
    edit <id> <first> <last> <dd/mm/yyyy> <access> <salary>
    remove <id>
    find firstname|lastname|dateofbirth <value>
    list                       - List all records
    stat                       - Show record counts
    purge                      - Reclaim space of removed records
    export csv|xml|backup <path>
    import csv|xml|backup <path>
    exit                       - Quit";

/// Interactive prompt over an in-memory or file-backed record cabinet.
#[derive(Debug, Parser)]
#[command(name = "cabinet", version, about)]
struct Cli {
    /// Backend holding the records.
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = StorageKind::Memory)]
    storage: StorageKind,

    /// Validation profile applied to created and edited records.
    #[arg(
        short = 'v',
        long = "validation-rules",
        value_enum,
        ignore_case = true,
        default_value_t = ValidationProfile::Default
    )]
    validation: ValidationProfile,

    /// Data file used by the file backend.
    #[arg(long, value_hint = ValueHint::FilePath)]
    data_file: Option<PathBuf>,

    /// Log the execution time of every store operation.
    #[arg(long)]
    use_stopwatch: bool,

    /// Log every store call with its arguments and result.
    #[arg(long)]
    use_logger: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        let mut config = Config::default()
            .with_storage(self.storage)
            .with_validation(self.validation)
            .with_stopwatch(self.use_stopwatch)
            .with_logger(self.use_logger);
        if let Some(path) = self.data_file {
            config = config.with_data_file(path);
        }
        config
    }
}

fn parse_data(parts: &[&str]) -> Result<DataRecord> {
    let [first, last, dob, access, salary] = parts else {
        return Err(CabinetError::Parse(
            "expected <first> <last> <dd/mm/yyyy> <access> <salary>".into(),
        ));
    };
    Ok(DataRecord::new(
        *first,
        *last,
        types::parse_date(dob)?,
        types::parse_access(access)?,
        salary.parse()?,
    ))
}

fn print_records(records: &[Record]) {
    if records.is_empty() {
        println!("  (empty)");
        return;
    }
    for r in records {
        println!(
            "  #{}, {}, {}, {}, age {}, access {}, salary {}",
            r.id,
            r.first_name,
            r.last_name,
            types::format_date(r.date_of_birth),
            r.age,
            r.access,
            r.salary
        );
    }
    println!("  ({} records)", records.len());
}

fn run(store: &mut dyn RecordStore, parts: &[&str]) -> Result<()> {
    match parts[0].to_lowercase().as_str() {
        "create" => {
            let id = store.create(&parse_data(&parts[1..])?)?;
            println!("  Record #{} is created.", id);
        }
        "edit" => {
            let id: i32 = parts
                .get(1)
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| CabinetError::Parse("edit needs a numeric id".into()))?;
            store.edit_by_id(&parse_data(&parts[2..])?.with_id(id))?;
            println!("  Record #{} is updated.", id);
        }
        "remove" | "delete" => {
            let id: i32 = parts
                .get(1)
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| CabinetError::Parse("remove needs a numeric id".into()))?;
            if store.remove(id)? {
                println!("  Record #{} is removed.", id);
            } else {
                println!("  Record #{} doesn't exist.", id);
            }
        }
        "find" => {
            let (Some(field), Some(value)) = (parts.get(1), parts.get(2)) else {
                return Err(CabinetError::Parse("usage: find <field> <value>".into()));
            };
            let records = match field.parse::<Field>()? {
                Field::FirstName => store.find_by_first_name(value)?,
                Field::LastName => store.find_by_last_name(value)?,
                Field::DateOfBirth => store.find_by_date_of_birth(types::parse_date(value)?)?,
                other => {
                    return Err(CabinetError::Parse(format!("cannot find by {}", other)));
                }
            };
            print_records(&records);
        }
        "list" => print_records(&store.get_all()?),
        "stat" | "info" => {
            println!("  Records:    {}", store.count()?);
            println!("  Removed:    {}", store.removed_count()?);
            println!("  Validation: {}", store.validator().name());
        }
        "purge" => {
            let purged = store.purge()?;
            println!("  {} records were purged.", purged);
        }
        "export" => {
            let (Some(format), Some(path)) = (parts.get(1), parts.get(2)) else {
                return Err(CabinetError::Parse("usage: export csv|xml|backup <path>".into()));
            };
            let snapshot = store.make_snapshot()?;
            let file = File::create(path)?;
            match format.to_lowercase().as_str() {
                "csv" => snapshot.save_to_csv(file)?,
                "xml" => snapshot.save_to_xml(file)?,
                "backup" => snapshot.save_backup(file)?,
                other => return Err(CabinetError::Parse(format!("unknown format '{}'", other))),
            }
            println!("  {} records were exported to {}.", snapshot.len(), path);
        }
        "import" => {
            let (Some(format), Some(path)) = (parts.get(1), parts.get(2)) else {
                return Err(CabinetError::Parse("usage: import csv|xml|backup <path>".into()));
            };
            let file = File::open(path)?;
            let snapshot = match format.to_lowercase().as_str() {
                "csv" => Snapshot::load_from_csv(file)?,
                "xml" => Snapshot::load_from_xml(file)?,
                "backup" => Snapshot::load_backup(file)?,
                other => return Err(CabinetError::Parse(format!("unknown format '{}'", other))),
            };
            let applied = store.restore(&snapshot)?;
            println!("  {} records were imported from {}.", applied, path);
        }
        "help" => println!("{}", HELP),
        other => println!("  Unknown command: '{}'. Type 'help' for commands.", other),
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let config = Cli::parse().into_config();

    let mut store = match engine::open(&config) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("[ERROR] Failed to open store: {}", err);
            std::process::exit(1);
        }
    };

    println!();
    println!("  Cabinet ({} storage, {} validation rules)", config.storage, config.validation);
    if config.storage == StorageKind::File {
        println!("  Data file: {}", config.data_file.display());
    }
    println!("{}", HELP);
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        let _ = stdout.flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(err) => {
                eprintln!("[ERROR] {}", err);
                break;
            }
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        if matches!(parts[0].to_lowercase().as_str(), "exit" | "quit" | "q") {
            println!("  Exiting...");
            break;
        }

        if let Err(err) = run(store.as_mut(), &parts) {
            println!("  ERROR: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let config = Cli::try_parse_from(["cabinet"]).unwrap().into_config();
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.validation, ValidationProfile::Default);
        assert_eq!(config.data_file, Config::default().data_file);
        assert!(!config.use_stopwatch);
        assert!(!config.use_logger);
    }

    #[test]
    fn test_cli_options() {
        let config = Cli::try_parse_from([
            "cabinet",
            "-s",
            "FILE",
            "--validation-rules",
            "custom",
            "--data-file",
            "people.db",
            "--use-stopwatch",
            "--use-logger",
        ])
        .unwrap()
        .into_config();
        assert_eq!(config.storage, StorageKind::File);
        assert_eq!(config.validation, ValidationProfile::Custom);
        assert_eq!(config.data_file, PathBuf::from("people.db"));
        assert!(config.use_stopwatch);
        assert!(config.use_logger);

        assert!(Cli::try_parse_from(["cabinet", "--storage", "disk"]).is_err());
    }

    #[test]
    fn test_import_xml_command() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("people.xml");
        let path = path.to_str().unwrap();

        let mut source = engine::open(&Config::default()).unwrap();
        run(source.as_mut(), &["create", "Ann", "Lee", "04/05/1990", "B", "5000"]).unwrap();
        run(source.as_mut(), &["export", "xml", path]).unwrap();

        let mut target = engine::open(&Config::default()).unwrap();
        run(target.as_mut(), &["import", "xml", path]).unwrap();
        let all = target.get_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].first_name, "Ann");
        assert_eq!(all[0].salary.to_string(), "5000");
    }
}
