// ABOUTME: Error taxonomy for the table export engine
// ABOUTME: Every failure is fatal to the run; variants say which phase failed

use thiserror::Error;

/// Failure reported by a [`SourceConnection`](crate::source::SourceConnection).
#[derive(Error, Debug)]
pub enum SourceError {
    /// Error raised by the MySQL driver
    #[error(transparent)]
    Mysql(#[from] mysql_async::Error),

    /// Error described only by a message (value decoding, scripted sources)
    #[error("{0}")]
    Message(String),
}

impl SourceError {
    pub fn message(message: impl Into<String>) -> Self {
        SourceError::Message(message.into())
    }
}

/// Main error type for dump operations.
///
/// There is no recoverable variant: whatever is returned aborts the run and the
/// script written so far must be discarded by the caller.
#[derive(Error, Debug)]
pub enum DumpError {
    /// Could not establish the database session
    #[error("Failed to connect to MySQL: {source}")]
    Connection {
        #[source]
        source: SourceError,
    },

    /// Could not list the tables of the source database
    #[error("Failed to list tables: {source}")]
    TableList {
        #[source]
        source: SourceError,
    },

    /// Could not determine structure or columns of a table
    #[error("Failed to introspect table `{table}`: {source}")]
    SchemaIntrospection {
        table: String,
        #[source]
        source: SourceError,
    },

    /// A statement was rejected by the server
    #[error("Query failed: {query}: {source}")]
    QueryExecution {
        query: String,
        #[source]
        source: SourceError,
    },

    /// Reading a result row failed mid-stream
    #[error("Failed to read rows of table `{table}`: {source}")]
    RowScan {
        table: String,
        #[source]
        source: SourceError,
    },

    /// Writing to the output sink failed
    #[error("Failed to write dump output: {0}")]
    Output(#[from] std::io::Error),
}

impl DumpError {
    pub fn connection(source: impl Into<SourceError>) -> Self {
        DumpError::Connection {
            source: source.into(),
        }
    }

    pub fn table_list(source: impl Into<SourceError>) -> Self {
        DumpError::TableList {
            source: source.into(),
        }
    }

    pub fn schema(table: impl Into<String>, source: impl Into<SourceError>) -> Self {
        DumpError::SchemaIntrospection {
            table: table.into(),
            source: source.into(),
        }
    }

    pub fn query(query: impl Into<String>, source: impl Into<SourceError>) -> Self {
        DumpError::QueryExecution {
            query: query.into(),
            source: source.into(),
        }
    }

    pub fn row_scan(table: impl Into<String>, source: impl Into<SourceError>) -> Self {
        DumpError::RowScan {
            table: table.into(),
            source: source.into(),
        }
    }
}

/// Result type alias for dump operations.
pub type Result<T> = std::result::Result<T, DumpError>;
