// ABOUTME: Full-database export driver writing one ordered SQL script
// ABOUTME: Sequences enumeration, locking, DDL, row counts and batched data per table

pub mod batch;
pub mod escape;
pub mod lock;
pub mod projection;
pub mod query;
pub mod tables;

use crate::config::DumpConfig;
use crate::error::{DumpError, Result, SourceError};
use crate::source::SourceConnection;
use crate::table_rules::TablePolicy;
use crate::utils::{quote_ident, sanitize_identifier};
use batch::BatchStats;
use lock::TableLock;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

/// Written before any table
pub const PREAMBLE: &str = "SET NAMES utf8;\nSET FOREIGN_KEY_CHECKS = 0;\n";

/// Written once every table has been exported
pub const TRAILER: &str = "SET FOREIGN_KEY_CHECKS = 1;\n";

/// What one successful run produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpSummary {
    /// Tables whose structure was written
    pub structures: usize,
    /// Tables whose data section was written (including empty ones)
    pub data_tables: usize,
    /// Tables skipped by an `ignore` policy
    pub ignored: usize,
    pub rows: u64,
    pub inserts: u64,
}

/// Exports every base table reachable through `conn` according to `config`.
///
/// The connection must be a single session: read locks taken on it are only
/// released by `UNLOCK TABLES` on the same session.
pub struct Dumper<'a, C: ?Sized> {
    conn: &'a mut C,
    config: &'a DumpConfig,
}

impl<'a, C> Dumper<'a, C>
where
    C: SourceConnection + ?Sized,
{
    pub fn new(conn: &'a mut C, config: &'a DumpConfig) -> Self {
        Self { conn, config }
    }

    /// Write the complete script to `writer`
    ///
    /// Any error aborts the run. Whatever was written before it is a truncated
    /// script without the trailer and must be discarded by the caller.
    pub async fn dump<W>(&mut self, writer: &mut W) -> Result<DumpSummary>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        writer.write_all(PREAMBLE.as_bytes()).await?;

        let tables = tables::list_tables(&mut *self.conn).await?;
        info!("Dumping {} tables", tables.len());

        let mut summary = DumpSummary::default();
        for table in &tables {
            self.dump_table(table, writer, &mut summary).await?;
        }

        writer.write_all(TRAILER.as_bytes()).await?;
        Ok(summary)
    }

    async fn dump_table<W>(
        &mut self,
        table: &str,
        writer: &mut W,
        summary: &mut DumpSummary,
    ) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let policy = self.config.rules.policy(table);
        if policy == TablePolicy::Ignore {
            info!("Skipping table {} (ignored)", sanitize_identifier(table));
            summary.ignored += 1;
            return Ok(());
        }
        let skip_data = policy.skips_data();

        let lock = if self.config.use_table_lock && !skip_data {
            Some(TableLock::acquire(&mut *self.conn, table).await?)
        } else {
            None
        };

        self.dump_create_table(table, writer).await?;
        summary.structures += 1;

        if !skip_data {
            let count = self.count_rows(table).await?;
            info!(
                "Dumping table {} ({} rows)",
                sanitize_identifier(table),
                count
            );
            writer
                .write_all(data_header(table, count).as_bytes())
                .await?;

            if count > 0 {
                lock::write_lock_line(writer, table).await?;
                let stats = self.dump_table_data(table, writer).await?;
                writer.write_all(b"\n").await?;
                lock::write_unlock_line(writer).await?;
                summary.rows += stats.rows;
                summary.inserts += stats.statements;
            }
            summary.data_tables += 1;
        } else {
            info!("Dumping structure of {} only", sanitize_identifier(table));
        }

        if let Some(lock) = lock {
            lock.release(&mut *self.conn).await?;
        }
        Ok(())
    }

    /// `DROP TABLE IF EXISTS` followed by the server's own `CREATE TABLE`
    async fn dump_create_table<W>(&mut self, table: &str, writer: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let sql = query::show_create_table(table);
        let row = self
            .conn
            .query_row(&sql)
            .await
            .map_err(|e| DumpError::schema(table, e))?
            .ok_or_else(|| {
                DumpError::schema(table, SourceError::message("no CREATE statement returned"))
            })?;
        let ddl = row.get(1).ok_or_else(|| {
            DumpError::schema(table, SourceError::message("CREATE statement is NULL"))
        })?;

        let mut block = structure_header(table).into_bytes();
        block.extend_from_slice(query::drop_table_if_exists(table).as_bytes());
        block.extend_from_slice(b";\n");
        block.extend_from_slice(ddl);
        block.extend_from_slice(b";\n");
        writer.write_all(&block).await?;
        Ok(())
    }

    async fn count_rows(&mut self, table: &str) -> Result<u64> {
        let sql = query::count_rows(table, self.config.rules.where_clause(table));
        let row = self
            .conn
            .query_row(&sql)
            .await
            .map_err(|e| DumpError::query(sql.as_str(), e))?;
        let raw = row
            .as_ref()
            .and_then(|row| row.get(0))
            .ok_or_else(|| {
                DumpError::query(sql.as_str(), SourceError::message("no row count returned"))
            })?;

        std::str::from_utf8(raw)
            .ok()
            .and_then(|text| text.trim().parse::<u64>().ok())
            .ok_or_else(|| {
                DumpError::query(
                    sql.as_str(),
                    SourceError::message(format!(
                        "invalid row count '{}'",
                        String::from_utf8_lossy(raw)
                    )),
                )
            })
    }

    async fn dump_table_data<W>(&mut self, table: &str, writer: &mut W) -> Result<BatchStats>
    where
        W: AsyncWrite + Unpin + Send + ?Sized,
    {
        let rules = &self.config.rules;
        let columns = projection::columns_for_select(&mut *self.conn, table, rules).await?;
        let sql = query::select_rows(table, &columns, rules.where_clause(table));

        let mut cursor = self
            .conn
            .query(&sql)
            .await
            .map_err(|e| DumpError::query(sql.as_str(), e))?;
        let stats = batch::write_rows(
            cursor.as_mut(),
            table,
            self.config.extended_insert_rows,
            writer,
        )
        .await?;
        debug!(
            "Wrote {} rows of {} in {} statements",
            stats.rows,
            sanitize_identifier(table),
            stats.statements
        );
        Ok(stats)
    }
}

fn structure_header(table: &str) -> String {
    format!("\n--\n-- Structure for table {}\n--\n\n", quote_ident(table))
}

fn data_header(table: &str, count: u64) -> String {
    format!(
        "\n--\n-- Data for table {} -- {} rows\n--\n\n",
        quote_ident(table),
        count
    )
}
