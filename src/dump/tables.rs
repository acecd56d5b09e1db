// ABOUTME: Enumerates the tables of the connected database
// ABOUTME: Only base tables are dumped; views and other objects are skipped

use super::query;
use crate::error::{DumpError, Result, SourceError};
use crate::source::{Row, SourceConnection};
use std::fmt;
use tracing::debug;

/// Object type as reported by `SHOW FULL TABLES`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableKind {
    BaseTable,
    View,
    Other(String),
}

impl TableKind {
    pub fn from_server(kind: &str) -> Self {
        match kind {
            "BASE TABLE" => TableKind::BaseTable,
            "VIEW" => TableKind::View,
            other => TableKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::BaseTable => write!(f, "BASE TABLE"),
            TableKind::View => write!(f, "VIEW"),
            TableKind::Other(kind) => write!(f, "{}", kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInfo {
    pub name: String,
    pub kind: TableKind,
}

/// Every object in the current database, in server order
pub async fn list_all<C>(conn: &mut C) -> Result<Vec<TableInfo>>
where
    C: SourceConnection + ?Sized,
{
    let mut cursor = conn
        .query(query::SHOW_FULL_TABLES)
        .await
        .map_err(DumpError::table_list)?;

    let mut tables = Vec::new();
    while let Some(row) = cursor.next_row().await.map_err(DumpError::table_list)? {
        tables.push(table_info(&row).map_err(DumpError::table_list)?);
    }
    Ok(tables)
}

/// Names of the base tables, in server order
pub async fn list_tables<C>(conn: &mut C) -> Result<Vec<String>>
where
    C: SourceConnection + ?Sized,
{
    let tables = list_all(conn).await?;
    let total = tables.len();
    let names: Vec<String> = tables
        .into_iter()
        .filter(|t| t.kind == TableKind::BaseTable)
        .map(|t| t.name)
        .collect();
    debug!("Found {} base tables ({} objects total)", names.len(), total);
    Ok(names)
}

fn table_info(row: &Row) -> std::result::Result<TableInfo, SourceError> {
    let name = row
        .get(0)
        .ok_or_else(|| SourceError::message("table name is NULL"))?;
    let kind = row
        .get(1)
        .ok_or_else(|| SourceError::message("table type is missing"))?;
    Ok(TableInfo {
        name: String::from_utf8_lossy(name).into_owned(),
        kind: TableKind::from_server(&String::from_utf8_lossy(kind)),
    })
}
