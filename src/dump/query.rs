// ABOUTME: Composes the SQL text the dump sends to the server or writes to the script
// ABOUTME: Identifiers are always quoted; WHERE fragments are inserted verbatim

use crate::utils::quote_ident;

/// Lists every table with its type (`BASE TABLE`, `VIEW`, ...)
pub const SHOW_FULL_TABLES: &str = "SHOW FULL TABLES";

/// Releases every table lock held by the session
pub const UNLOCK_TABLES: &str = "UNLOCK TABLES";

pub fn show_create_table(table: &str) -> String {
    format!("SHOW CREATE TABLE {}", quote_ident(table))
}

/// Empty-result probe used to learn a table's live column list
pub fn column_probe(table: &str) -> String {
    format!("SELECT * FROM {} LIMIT 0", quote_ident(table))
}

pub fn count_rows(table: &str, where_clause: Option<&str>) -> String {
    with_where(
        format!("SELECT COUNT(*) FROM {}", quote_ident(table)),
        where_clause,
    )
}

/// `SELECT <projection> FROM <table> [WHERE ...]`
///
/// `columns` are already rendered projection terms.
pub fn select_rows(table: &str, columns: &[String], where_clause: Option<&str>) -> String {
    with_where(
        format!("SELECT {} FROM {}", columns.join(", "), quote_ident(table)),
        where_clause,
    )
}

pub fn lock_table_read(table: &str) -> String {
    format!("LOCK TABLES {} READ", quote_ident(table))
}

pub fn lock_table_write(table: &str) -> String {
    format!("LOCK TABLES {} WRITE", quote_ident(table))
}

pub fn flush_table(table: &str) -> String {
    format!("FLUSH TABLES {}", quote_ident(table))
}

/// Head of an extended insert; row tuples follow on the next lines
pub fn insert_into(table: &str) -> String {
    format!("INSERT INTO {} VALUES", quote_ident(table))
}

pub fn drop_table_if_exists(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(table))
}

fn with_where(query: String, where_clause: Option<&str>) -> String {
    match where_clause {
        Some(predicate) => format!("{} WHERE {}", query, predicate),
        None => query,
    }
}
