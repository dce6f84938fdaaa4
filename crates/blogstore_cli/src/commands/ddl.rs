//! DDL command implementation.

use super::StoreOptions;
use blogstore_core::DialectId;

/// Runs the ddl command. No database is opened.
pub fn run(options: &StoreOptions, dialect: &str) -> Result<(), Box<dyn std::error::Error>> {
    for statement in render(options, dialect)? {
        println!("{statement};");
    }
    Ok(())
}

/// Renders one `create table` statement per described table.
pub fn render(
    options: &StoreOptions,
    dialect: &str,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let dialect = dialect.parse::<DialectId>()?.create();
    let schema = options.schema()?;
    if schema.is_permissive() {
        return Err("No schema found; nothing to render".into());
    }
    Ok(schema
        .tables()
        .map(|table| dialect.create_table_sql(&schema.physical_name(&table.name), table))
        .collect())
}
