// ABOUTME: Scripted in-memory connection for engine unit tests
// ABOUTME: Plays back expected statements in order, like a SQL mock

use super::{Row, RowCursor, SourceConnection};
use crate::error::SourceError;
use async_trait::async_trait;
use std::collections::VecDeque;

enum Reply {
    Exec(Result<(), String>),
    Rows {
        columns: Vec<String>,
        rows: Vec<Result<Row, String>>,
    },
    Fail(String),
}

struct Expectation {
    sql: String,
    reply: Reply,
}

/// Connection that answers a fixed script of statements.
///
/// Every statement must match the next expectation exactly; anything else is
/// reported as a `SourceError` naming both statements.
#[derive(Default)]
pub(crate) struct ScriptedConnection {
    script: VecDeque<Expectation>,
    executed: Vec<String>,
}

impl ScriptedConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_exec(&mut self, sql: &str) -> &mut Self {
        self.push(sql, Reply::Exec(Ok(())))
    }

    pub fn expect_exec_error(&mut self, sql: &str, message: &str) -> &mut Self {
        self.push(sql, Reply::Exec(Err(message.to_string())))
    }

    pub fn expect_query(&mut self, sql: &str, columns: &[&str], rows: Vec<Row>) -> &mut Self {
        self.push(
            sql,
            Reply::Rows {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows: rows.into_iter().map(Ok).collect(),
            },
        )
    }

    /// Rows are delivered until the first `Err`, which surfaces as a scan failure
    pub fn expect_query_stream(
        &mut self,
        sql: &str,
        columns: &[&str],
        rows: Vec<Result<Row, String>>,
    ) -> &mut Self {
        self.push(
            sql,
            Reply::Rows {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
            },
        )
    }

    pub fn expect_query_error(&mut self, sql: &str, message: &str) -> &mut Self {
        self.push(sql, Reply::Fail(message.to_string()))
    }

    /// Statements received so far, in order
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    pub fn is_exhausted(&self) -> bool {
        self.script.is_empty()
    }

    fn push(&mut self, sql: &str, reply: Reply) -> &mut Self {
        self.script.push_back(Expectation {
            sql: sql.to_string(),
            reply,
        });
        self
    }

    fn next_reply(&mut self, sql: &str) -> Result<Reply, SourceError> {
        self.executed.push(sql.to_string());
        let expectation = self
            .script
            .pop_front()
            .ok_or_else(|| SourceError::message(format!("unexpected statement: {}", sql)))?;
        if expectation.sql != sql {
            return Err(SourceError::message(format!(
                "expected statement `{}`, got `{}`",
                expectation.sql, sql
            )));
        }
        Ok(expectation.reply)
    }
}

pub(crate) struct ScriptedCursor {
    columns: Vec<String>,
    rows: VecDeque<Result<Row, String>>,
}

#[async_trait]
impl RowCursor for ScriptedCursor {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn next_row(&mut self) -> Result<Option<Row>, SourceError> {
        match self.rows.pop_front() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(message)) => Err(SourceError::Message(message)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl SourceConnection for ScriptedConnection {
    async fn exec(&mut self, sql: &str) -> Result<(), SourceError> {
        match self.next_reply(sql)? {
            Reply::Exec(result) => result.map_err(SourceError::Message),
            Reply::Fail(message) => Err(SourceError::Message(message)),
            Reply::Rows { .. } => Ok(()),
        }
    }

    async fn query_row(&mut self, sql: &str) -> Result<Option<Row>, SourceError> {
        match self.next_reply(sql)? {
            Reply::Rows { rows, .. } => rows
                .into_iter()
                .next()
                .transpose()
                .map_err(SourceError::Message),
            Reply::Fail(message) | Reply::Exec(Err(message)) => Err(SourceError::Message(message)),
            Reply::Exec(Ok(())) => Ok(None),
        }
    }

    async fn query<'a>(&'a mut self, sql: &str) -> Result<Box<dyn RowCursor + 'a>, SourceError> {
        match self.next_reply(sql)? {
            Reply::Rows { columns, rows } => Ok(Box::new(ScriptedCursor {
                columns,
                rows: rows.into(),
            })),
            Reply::Fail(message) | Reply::Exec(Err(message)) => Err(SourceError::Message(message)),
            Reply::Exec(Ok(())) => Ok(Box::new(ScriptedCursor {
                columns: Vec::new(),
                rows: VecDeque::new(),
            })),
        }
    }
}

/// Build a row of text values, `None` meaning NULL
pub(crate) fn text_row(values: &[Option<&str>]) -> Row {
    values.iter().copied().collect()
}
