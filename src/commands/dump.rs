// ABOUTME: Dump command implementation wiring config, connection and output
// ABOUTME: Merges CLI rules over the config file before running the export

use crate::config::{load_config_from_file, DumpConfig};
use crate::dump::{DumpSummary, Dumper};
use crate::mysql::connect_mysql;
use crate::output::OutputTarget;
use crate::table_rules::DumpRules;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Everything the `mysql-superdump` command line can say about one run
#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    pub config_path: PathBuf,
    pub output: Option<PathBuf>,
    pub no_table_lock: bool,
    pub ignore_tables: Vec<String>,
    pub nodata_tables: Vec<String>,
    pub where_clauses: Vec<String>,
}

impl DumpOptions {
    /// Load the config file and overlay the command-line rules on it
    pub fn resolve_config(&self) -> Result<DumpConfig> {
        let mut config = load_config_from_file(&self.config_path)?;

        let mut cli_rules = DumpRules::default();
        cli_rules
            .apply_ignore_cli(&self.ignore_tables)
            .context("Invalid --ignore-table")?;
        cli_rules
            .apply_nodata_cli(&self.nodata_tables)
            .context("Invalid --nodata-table")?;
        cli_rules
            .apply_where_cli(&self.where_clauses)
            .context("Invalid --where")?;
        config.rules.merge(cli_rules);

        if self.no_table_lock {
            config.use_table_lock = false;
        }
        Ok(config)
    }
}

/// Export the configured database as a SQL script
///
/// On failure the destination holds a truncated script without the closing
/// `SET FOREIGN_KEY_CHECKS = 1;` and must not be replayed.
pub async fn dump(options: DumpOptions) -> Result<DumpSummary> {
    let config = options.resolve_config()?;
    let target = OutputTarget::from_arg(options.output.as_deref());

    tracing::info!(
        "Dumping to {} ({} rows per INSERT, table locks {})",
        target,
        config.extended_insert_rows,
        if config.use_table_lock { "on" } else { "off" }
    );
    if !config.rules.is_empty() {
        tracing::info!(
            "Rules configured for tables: {}",
            config
                .rules
                .tables()
                .into_iter()
                .collect::<Vec<_>>()
                .join(", ")
        );
    }

    let mut source = connect_mysql(&config.dsn, config.max_open_conns).await?;
    let mut sink = target.open().await?;

    let summary = Dumper::new(&mut source, &config)
        .dump(&mut sink)
        .await
        .context("Dump aborted")?;
    sink.flush()
        .await
        .with_context(|| format!("Failed to flush output to {}", target))?;

    if let Err(e) = source.disconnect().await {
        tracing::warn!("Error while disconnecting from MySQL: {}", e);
    }

    tracing::info!(
        "Dump complete: {} tables ({} with data, {} ignored), {} rows in {} INSERT statements",
        summary.structures,
        summary.data_tables,
        summary.ignored,
        summary.rows,
        summary.inserts
    );
    Ok(summary)
}
