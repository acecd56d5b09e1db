// ABOUTME: CLI entry point for mysql-superdump
// ABOUTME: Parses arguments, sets up logging and runs the dump command

use clap::Parser;
use mysql_superdump::commands::{self, DumpOptions};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mysql-superdump")]
#[command(version, about = "Dump a MySQL database as SQL with per-table rewrite rules", long_about = None)]
struct Cli {
    /// TOML config file with [mysql], [select], [where] and [filter] sections
    config: PathBuf,
    /// Write the dump here instead of stdout ("-" means stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Do not lock tables while reading them
    #[arg(long)]
    no_table_lock: bool,
    /// Skip these tables entirely (comma-separated)
    #[arg(long, value_delimiter = ',')]
    ignore_table: Vec<String>,
    /// Dump only the structure of these tables (comma-separated)
    #[arg(long, value_delimiter = ',')]
    nodata_table: Vec<String>,
    /// Only dump rows matching a predicate (format: table:predicate)
    #[arg(long = "where")]
    where_clause: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so a dump on stdout stays clean; RUST_LOG wins over -v
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    commands::dump(DumpOptions {
        config_path: cli.config,
        output: cli.output,
        no_table_lock: cli.no_table_lock,
        ignore_tables: cli.ignore_table,
        nodata_tables: cli.nodata_table,
        where_clauses: cli.where_clause,
    })
    .await?;
    Ok(())
}
