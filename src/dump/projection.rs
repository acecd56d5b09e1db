// ABOUTME: Computes the effective SELECT column list for a table
// ABOUTME: Applies configured replacement expressions per table.column

use super::query;
use crate::error::{DumpError, Result, SourceError};
use crate::source::SourceConnection;
use crate::table_rules::DumpRules;
use crate::utils::quote_ident;

/// Render one projection term per column, in input order
///
/// A column with an override renders as `<expression> AS `column``, the
/// expression inserted unmodified; any other column renders as `` `column` ``.
pub fn project_columns(table: &str, columns: &[String], rules: &DumpRules) -> Vec<String> {
    columns
        .iter()
        .map(|column| match rules.column_override(table, column) {
            Some(expression) => format!("{} AS {}", expression, quote_ident(column)),
            None => quote_ident(column),
        })
        .collect()
}

/// Ask the server for the live column list of `table`
///
/// Uses an empty-result probe so no data is transferred.
pub async fn introspect_columns<C>(conn: &mut C, table: &str) -> Result<Vec<String>>
where
    C: SourceConnection + ?Sized,
{
    let sql = query::column_probe(table);
    let mut cursor = conn
        .query(&sql)
        .await
        .map_err(|e| DumpError::schema(table, e))?;
    let columns = cursor.columns().to_vec();
    while cursor
        .next_row()
        .await
        .map_err(|e| DumpError::schema(table, e))?
        .is_some()
    {}

    if columns.is_empty() {
        return Err(DumpError::schema(
            table,
            SourceError::message("no columns reported"),
        ));
    }

    Ok(columns)
}

/// Introspect `table` and apply the column overrides to it
pub async fn columns_for_select<C>(conn: &mut C, table: &str, rules: &DumpRules) -> Result<Vec<String>>
where
    C: SourceConnection + ?Sized,
{
    let columns = introspect_columns(conn, table).await?;
    Ok(project_columns(table, &columns, rules))
}
