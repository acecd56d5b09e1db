// ABOUTME: Database connection seam consumed by the export engine
// ABOUTME: Defines rows as nullable byte buffers and forward-only row cursors

#[cfg(test)]
pub(crate) mod testing;

use crate::error::SourceError;
use async_trait::async_trait;

/// One fetched record: a nullable byte buffer per projected column.
///
/// Values are positionally aligned with the column list of the query that
/// produced them. `None` is SQL `NULL`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<Option<Vec<u8>>>,
}

impl Row {
    pub fn new(values: Vec<Option<Vec<u8>>>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[Option<Vec<u8>>] {
        &self.values
    }

    /// Raw bytes of column `index`, `None` when out of range or NULL
    pub fn get(&self, index: usize) -> Option<&[u8]> {
        self.values.get(index).and_then(|value| value.as_deref())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<T: Into<Vec<u8>>> FromIterator<Option<T>> for Row {
    fn from_iter<I: IntoIterator<Item = Option<T>>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(|value| value.map(Into::into)).collect())
    }
}

/// Lazy, single-pass, forward-only sequence of rows for one query execution.
///
/// A cursor borrows its connection, so no other statement can be sent until it
/// is dropped.
#[async_trait]
pub trait RowCursor: Send {
    /// Column names reported by the server, in select order
    fn columns(&self) -> &[String];

    /// Fetch the next row, `None` once the result set is exhausted
    async fn next_row(&mut self) -> Result<Option<Row>, SourceError>;
}

/// A single database session.
///
/// All statements of one export travel over the same session because table
/// locks are session scoped.
#[async_trait]
pub trait SourceConnection: Send {
    /// Run a statement and discard whatever it returns
    async fn exec(&mut self, sql: &str) -> Result<(), SourceError>;

    /// Run a query and return its first row, if any
    async fn query_row(&mut self, sql: &str) -> Result<Option<Row>, SourceError>;

    /// Run a query and stream its rows
    async fn query<'a>(&'a mut self, sql: &str) -> Result<Box<dyn RowCursor + 'a>, SourceError>;
}
