// ABOUTME: MySQL-backed source connection for the dump engine
// ABOUTME: Streams text-protocol result sets row by row over one session

use super::converter::mysql_row_to_row;
use crate::error::SourceError;
use crate::source::{Row, RowCursor, SourceConnection};
use async_trait::async_trait;
use mysql_async::{prelude::*, Conn, Pool, QueryResult, TextProtocol};

/// The single MySQL session an export runs on, plus the pool that owns it.
pub struct MysqlSource {
    pool: Pool,
    conn: Conn,
}

impl MysqlSource {
    pub(crate) fn new(pool: Pool, conn: Conn) -> Self {
        Self { pool, conn }
    }

    /// Close the session and shut the pool down
    pub async fn disconnect(self) -> Result<(), SourceError> {
        self.conn.disconnect().await?;
        self.pool.disconnect().await?;
        tracing::debug!("Disconnected from MySQL");
        Ok(())
    }
}

#[async_trait]
impl SourceConnection for MysqlSource {
    async fn exec(&mut self, sql: &str) -> Result<(), SourceError> {
        tracing::debug!("Exec: {}", sql);
        self.conn.query_drop(sql).await?;
        Ok(())
    }

    async fn query_row(&mut self, sql: &str) -> Result<Option<Row>, SourceError> {
        tracing::debug!("QueryRow: {}", sql);
        let row: Option<mysql_async::Row> = self.conn.query_first(sql).await?;
        Ok(row.map(mysql_row_to_row))
    }

    async fn query<'a>(&'a mut self, sql: &str) -> Result<Box<dyn RowCursor + 'a>, SourceError> {
        tracing::debug!("Query: {}", sql);
        let result = self.conn.query_iter(sql.to_owned()).await?;
        let columns = result
            .columns_ref()
            .iter()
            .map(|column| column.name_str().into_owned())
            .collect();
        Ok(Box::new(MysqlCursor { result, columns }))
    }
}

/// Forward-only cursor over one text-protocol result set
struct MysqlCursor<'a> {
    result: QueryResult<'a, 'static, TextProtocol>,
    columns: Vec<String>,
}

#[async_trait]
impl RowCursor for MysqlCursor<'_> {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next_row(&mut self) -> Result<Option<Row>, SourceError> {
        let row = self.result.next().await?;
        Ok(row.map(mysql_row_to_row))
    }
}
