// ABOUTME: Turns a row cursor into bounded multi-row INSERT statements
// ABOUTME: Rows are escaped, grouped and flushed in cursor order, never held across tables

use super::escape::quote_value;
use super::query;
use crate::error::{DumpError, Result};
use crate::source::{Row, RowCursor};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Upper bound on tuples reserved up front; larger batches grow on demand
const INITIAL_BATCH_CAPACITY: usize = 1024;

/// Counters for the data written for one table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub rows: u64,
    pub statements: u64,
}

/// Accumulates rendered row tuples for one table and writes them as extended
/// inserts of at most `limit` tuples each.
///
/// Dropping a batcher without calling [`finish`](Self::finish) discards the
/// partial batch, which is what a failed cursor must do.
pub struct InsertBatcher<'w, W: ?Sized> {
    writer: &'w mut W,
    head: String,
    limit: usize,
    batch: Vec<Vec<u8>>,
    stats: BatchStats,
}

impl<'w, W> InsertBatcher<'w, W>
where
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    pub fn new(writer: &'w mut W, table: &str, limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            writer,
            head: query::insert_into(table),
            limit,
            batch: Vec::with_capacity(limit.min(INITIAL_BATCH_CAPACITY)),
            stats: BatchStats::default(),
        }
    }

    /// Render `row` into the current batch, flushing once the batch is full
    pub async fn push(&mut self, row: &Row) -> Result<()> {
        self.batch.push(render_row(row));
        if self.batch.len() >= self.limit {
            self.flush().await?;
        }
        Ok(())
    }

    /// Flush the remaining partial batch and return the counters
    pub async fn finish(mut self) -> Result<BatchStats> {
        if !self.batch.is_empty() {
            self.flush().await?;
        }
        Ok(self.stats)
    }

    async fn flush(&mut self) -> Result<()> {
        let mut statement = Vec::with_capacity(
            self.head.len() + self.batch.iter().map(|t| t.len() + 2).sum::<usize>() + 2,
        );
        statement.extend_from_slice(self.head.as_bytes());
        statement.push(b'\n');
        for (i, tuple) in self.batch.iter().enumerate() {
            if i > 0 {
                statement.extend_from_slice(b",\n");
            }
            statement.extend_from_slice(tuple);
        }
        statement.extend_from_slice(b";\n");

        self.writer.write_all(&statement).await?;
        self.stats.rows += self.batch.len() as u64;
        self.stats.statements += 1;
        self.batch.clear();
        Ok(())
    }
}

/// `( v1, v2, ... )` with each value quoted or `NULL`
pub fn render_row(row: &Row) -> Vec<u8> {
    let mut tuple = Vec::from(&b"( "[..]);
    for (i, value) in row.values().iter().enumerate() {
        if i > 0 {
            tuple.extend_from_slice(b", ");
        }
        tuple.extend_from_slice(&quote_value(value.as_deref()));
    }
    tuple.extend_from_slice(b" )");
    tuple
}

/// Drain `cursor` into extended inserts for `table`
///
/// A scan failure aborts immediately; rows buffered since the last flush are
/// not written.
pub async fn write_rows<W>(
    cursor: &mut (dyn RowCursor + '_),
    table: &str,
    limit: usize,
    writer: &mut W,
) -> Result<BatchStats>
where
    W: AsyncWrite + Unpin + Send + ?Sized,
{
    let mut batcher = InsertBatcher::new(writer, table, limit);
    while let Some(row) = cursor
        .next_row()
        .await
        .map_err(|e| DumpError::row_scan(table, e))?
    {
        batcher.push(&row).await?;
    }
    batcher.finish().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::testing::{text_row, ScriptedConnection};
    use crate::source::SourceConnection;

    fn numbered_rows(n: usize) -> Vec<Row> {
        (1..=n)
            .map(|i| text_row(&[Some(i.to_string().as_str()), Some("x")]))
            .collect()
    }

    async fn run(rows: Vec<Row>, limit: usize) -> (String, BatchStats) {
        let mut conn = ScriptedConnection::new();
        conn.expect_query("SELECT `id`, `v` FROM `t`", &["id", "v"], rows);
        let mut out: Vec<u8> = Vec::new();
        let mut cursor = conn.query("SELECT `id`, `v` FROM `t`").await.unwrap();
        let stats = write_rows(cursor.as_mut(), "t", limit, &mut out)
            .await
            .unwrap();
        (String::from_utf8(out).unwrap(), stats)
    }

    #[test]
    fn test_render_row_with_nulls() {
        let row = text_row(&[Some("1"), None, Some("O'Brien")]);
        assert_eq!(render_row(&row), b"( '1', NULL, 'O\\'Brien' )".to_vec());
    }

    #[tokio::test]
    async fn test_exact_statement_layout() {
        let (out, stats) = run(numbered_rows(3), 2).await;
        assert_eq!(
            out,
            "INSERT INTO `t` VALUES\n( '1', 'x' ),\n( '2', 'x' );\n\
             INSERT INTO `t` VALUES\n( '3', 'x' );\n"
        );
        assert_eq!(stats, BatchStats { rows: 3, statements: 2 });
    }

    #[tokio::test]
    async fn test_statement_count_is_ceiling() {
        for (n, k) in [(0, 3), (1, 1), (5, 5), (6, 5), (10, 3), (7, 100)] {
            let (out, stats) = run(numbered_rows(n), k).await;
            let expected = n.div_ceil(k) as u64;
            assert_eq!(stats.statements, expected, "n={} k={}", n, k);
            assert_eq!(out.matches("INSERT INTO `t` VALUES").count() as u64, expected);
            assert_eq!(stats.rows, n as u64);
        }
    }

    #[tokio::test]
    async fn test_rows_appear_once_in_cursor_order() {
        let (out, _) = run(numbered_rows(7), 3).await;
        let ids: Vec<String> = out
            .lines()
            .filter(|line| line.starts_with("( "))
            .map(|line| line.split('\'').nth(1).unwrap().to_string())
            .collect();
        let expected: Vec<String> = (1..=7).map(|i| i.to_string()).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn test_scan_error_drops_partial_batch() {
        let mut conn = ScriptedConnection::new();
        conn.expect_query_stream(
            "SELECT `id` FROM `t`",
            &["id"],
            vec![
                Ok(text_row(&[Some("1")])),
                Ok(text_row(&[Some("2")])),
                Ok(text_row(&[Some("3")])),
                Err("connection reset".to_string()),
            ],
        );
        let mut out: Vec<u8> = Vec::new();
        let mut cursor = conn.query("SELECT `id` FROM `t`").await.unwrap();
        let err = write_rows(cursor.as_mut(), "t", 2, &mut out)
            .await
            .unwrap_err();

        assert!(matches!(err, DumpError::RowScan { ref table, .. } if table == "t"));
        let out = String::from_utf8(out).unwrap();
        assert_eq!(out, "INSERT INTO `t` VALUES\n( '1' ),\n( '2' );\n");
        assert!(!out.contains("'3'"));
    }

    #[tokio::test]
    async fn test_huge_limit_does_not_reserve_the_bound() {
        let (out, stats) = run(numbered_rows(1), usize::MAX / 64).await;
        assert_eq!(stats, BatchStats { rows: 1, statements: 1 });
        assert_eq!(out, "INSERT INTO `t` VALUES\n( '1', 'x' );\n");
    }

    #[tokio::test]
    async fn test_zero_limit_is_treated_as_one() {
        let (_, stats) = run(numbered_rows(2), 0).await;
        assert_eq!(stats.statements, 2);
    }
}
