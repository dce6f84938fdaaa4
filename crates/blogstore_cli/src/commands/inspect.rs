//! Inspect command implementation.

use super::StoreOptions;
use blogstore_core::Store;
use serde::Serialize;

/// Store inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Connection target.
    pub source: String,
    /// Active dialect.
    pub dialect: String,
    /// Table prefix, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// One entry per described table.
    pub tables: Vec<TableStats>,
    /// Tables in the database that the schema does not describe.
    pub undescribed: Vec<String>,
}

/// Statistics for a single table.
#[derive(Debug, Serialize)]
pub struct TableStats {
    /// Physical name.
    pub name: String,
    /// Whether the table exists in the database.
    pub exists: bool,
    /// Number of rows, when the table exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<u64>,
    /// Whether ordinary writes are admitted.
    pub writable: bool,
}

/// Runs the inspect command.
pub fn run(options: &StoreOptions, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    let result = inspect(&store)?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text_output(&result),
    }
    Ok(())
}

/// Gathers table statistics.
pub fn inspect(store: &Store) -> Result<InspectResult, Box<dyn std::error::Error>> {
    let existing = store.table_names()?;
    let schema = store.schema();

    let mut tables = Vec::new();
    for logical in schema.table_names() {
        let repository = store.repository(&logical)?;
        let name = repository.table_name().to_string();
        let exists = existing.contains(&name);
        let rows = if exists {
            Some(repository.count()?)
        } else {
            None
        };
        tables.push(TableStats {
            writable: repository.is_writable(),
            name,
            exists,
            rows,
        });
    }

    let undescribed = existing
        .into_iter()
        .filter(|name| !tables.iter().any(|t| &t.name == name))
        .collect();

    Ok(InspectResult {
        source: store.transactions().source().describe(),
        dialect: store.dialect().id().to_string(),
        prefix: schema.prefix().map(String::from),
        tables,
        undescribed,
    })
}

fn print_text_output(result: &InspectResult) {
    println!("Blogstore Inspection");
    println!("====================");
    println!();
    println!("Source:  {}", result.source);
    println!("Dialect: {}", result.dialect);
    if let Some(prefix) = &result.prefix {
        println!("Prefix:  {prefix}");
    }
    println!();
    println!("Tables:");
    for table in &result.tables {
        let rows = match table.rows {
            Some(rows) => rows.to_string(),
            None => "missing".to_string(),
        };
        let frozen = if table.writable { "" } else { " (frozen)" };
        println!("  {:<32} {rows:>10}{frozen}", table.name);
    }
    if !result.undescribed.is_empty() {
        println!();
        println!("Undescribed tables:");
        for name in &result.undescribed {
            println!("  {name}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogstore_core::Record;

    #[test]
    fn counts_rows_and_flags_missing_tables() {
        let dir = tempfile::tempdir().unwrap();
        let options = StoreOptions {
            path: Some(dir.path().join("blog.db")),
            ..StoreOptions::default()
        };
        let store = options.open().unwrap();
        store.init_tables();
        store
            .repository("tag")
            .unwrap()
            .add(
                Record::new()
                    .with("tag_title", "rust")
                    .with("tag_reference_count", 1)
                    .with("tag_published_reference_count", 1),
            )
            .unwrap();
        store.clear_table("plugin", true).unwrap();

        let result = inspect(&store).unwrap();
        let tag = result.tables.iter().find(|t| t.name == "tag").unwrap();
        assert_eq!(tag.rows, Some(1));
        let plugin = result.tables.iter().find(|t| t.name == "plugin").unwrap();
        assert!(!plugin.exists);
        assert!(result.undescribed.is_empty());
        assert_eq!(result.dialect, "sqlite");
    }
}
