//! Export and import command implementations.
//!
//! A dump is a JSON object mapping logical table names to arrays of records.
//! Export reads every table inside one transaction so the dump is a single
//! snapshot. Import adds every record inside one transaction.

use super::StoreOptions;
use blogstore_core::{CoreError, PageCount, Query, Record, Repository, Store};
use std::io::Write;
use std::path::Path;

fn repositories(store: &Store) -> Result<Vec<(String, Repository)>, CoreError> {
    store
        .schema()
        .table_names()
        .into_iter()
        .map(|name| {
            let repository = store.repository(&name)?;
            Ok((name, repository))
        })
        .collect()
}

/// Collects every record of every described table.
pub fn dump(store: &Store) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let repositories = repositories(store)?;

    let tables = store.transaction(|| {
        let mut tables = serde_json::Map::new();
        for (name, repository) in &repositories {
            let result = repository.query(&Query::new().page_count(PageCount::Known(1)))?;
            tracing::debug!(table = %name, records = result.records.len(), "exported table");
            let records = result.records.iter().map(Record::to_json).collect();
            tables.insert(name.clone(), serde_json::Value::Array(records));
        }
        Ok(tables)
    })?;
    Ok(serde_json::Value::Object(tables))
}

/// Loads a dump in one transaction and returns the number of records added.
pub fn load(
    store: &Store,
    document: &serde_json::Value,
) -> Result<usize, Box<dyn std::error::Error>> {
    let serde_json::Value::Object(tables) = document else {
        return Err("A dump must be a JSON object of tables".into());
    };
    let targets = tables
        .iter()
        .map(|(name, records)| Ok((store.repository(name)?, records)))
        .collect::<Result<Vec<_>, CoreError>>()?;

    let added = store.transaction(|| {
        let mut added = 0;
        for (repository, records) in &targets {
            let Some(records) = records.as_array() else {
                return Err(CoreError::invalid_operation(format!(
                    "records of {} must be an array",
                    repository.name()
                )));
            };
            for record in records {
                repository.add(Record::from_json(record)?)?;
                added += 1;
            }
        }
        Ok(added)
    })?;
    Ok(added)
}

/// Runs the export command.
pub fn export(
    options: &StoreOptions,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    let document = serde_json::to_string_pretty(&dump(&store)?)?;

    match output {
        Some(path) => {
            std::fs::write(path, document)?;
            tracing::info!(path = %path.display(), "export written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{document}")?;
        }
    }
    Ok(())
}

/// Runs the import command.
pub fn import(options: &StoreOptions, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    let document: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(input)?)?;
    let added = load(&store, &document)?;
    println!("Imported {added} records");
    Ok(())
}
