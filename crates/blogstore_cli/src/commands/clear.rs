//! Clear command implementation.

use super::StoreOptions;

/// Runs the clear command.
pub fn run(
    options: &StoreOptions,
    table: &str,
    drop: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    store.clear_table(table, drop)?;
    let action = if drop { "Dropped" } else { "Cleared" };
    println!("{action} {}", store.config().physical_table_name(table));
    Ok(())
}
