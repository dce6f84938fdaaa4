//! Blogstore CLI
//!
//! Command-line tools for Blogstore database maintenance.
//!
//! # Commands
//!
//! - `init` - Create every described table
//! - `inspect` - Display tables, row counts, and writability
//! - `ddl` - Print `create table` statements for a dialect
//! - `export` - Dump every table as JSON
//! - `import` - Load a JSON dump
//! - `clear` - Empty or drop a table

mod commands;

use clap::{Parser, Subcommand};
use commands::StoreOptions;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Blogstore command-line database tools.
#[derive(Parser)]
#[command(name = "blogstore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Store configuration file (JSON)
    #[arg(global = true, short, long)]
    config: Option<PathBuf>,

    /// Table name prefix
    #[arg(global = true, long)]
    prefix: Option<String>,

    /// Schema document; the bundled blog schema when absent
    #[arg(global = true, short, long)]
    schema: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create every described table
    Init,

    /// Display tables, row counts, and writability
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print create table statements
    Ddl {
        /// SQL dialect (mysql, sqlite)
        #[arg(short, long, default_value = "sqlite")]
        dialect: String,
    },

    /// Dump every table as JSON
    Export {
        /// Output file; stdout when absent
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a JSON dump produced by export
    Import {
        /// Dump file
        input: PathBuf,
    },

    /// Empty a table
    Clear {
        /// Logical table name
        table: String,

        /// Drop the table instead of deleting its rows
        #[arg(long)]
        drop: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let options = StoreOptions {
        path: cli.path,
        config: cli.config,
        prefix: cli.prefix,
        schema: cli.schema,
    };

    match cli.command {
        Commands::Init => commands::init::run(&options)?,
        Commands::Inspect { format } => commands::inspect::run(&options, &format)?,
        Commands::Ddl { dialect } => commands::ddl::run(&options, &dialect)?,
        Commands::Export { output } => commands::transfer::export(&options, output.as_deref())?,
        Commands::Import { input } => commands::transfer::import(&options, &input)?,
        Commands::Clear { table, drop } => commands::clear::run(&options, &table, drop)?,
        Commands::Version => {
            println!("Blogstore CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Blogstore Core v{}", blogstore_core::VERSION);
        }
    }

    Ok(())
}
