//! Init command implementation.

use super::StoreOptions;

/// Runs the init command.
pub fn run(options: &StoreOptions) -> Result<(), Box<dyn std::error::Error>> {
    let store = options.open()?;
    let results = store.init_tables();
    let failed = results.iter().filter(|r| !r.success).count();

    for result in &results {
        let mark = if result.success { "ok" } else { "FAILED" };
        println!("  {:<32} {mark}", result.name);
    }
    println!();
    println!("{} tables, {failed} failed", results.len());

    if failed > 0 {
        return Err(format!("{failed} tables could not be created").into());
    }
    Ok(())
}
