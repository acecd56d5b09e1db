// ABOUTME: Table-level dump rules: column rewrites, row predicates and filter policies
// ABOUTME: Supports CLI/config inputs and resolves the effective rule per table

use crate::utils;
use anyhow::{bail, Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// What to export for a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TablePolicy {
    /// Structure and data
    #[default]
    Full,
    /// Structure only
    NoData,
    /// Nothing at all
    Ignore,
}

impl TablePolicy {
    pub fn skips_data(self) -> bool {
        self != TablePolicy::Full
    }
}

impl FromStr for TablePolicy {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "full" => Ok(TablePolicy::Full),
            "nodata" => Ok(TablePolicy::NoData),
            "ignore" => Ok(TablePolicy::Ignore),
            other => bail!(
                "Unknown filter '{}'. Use one of: full, nodata, ignore",
                other
            ),
        }
    }
}

impl fmt::Display for TablePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TablePolicy::Full => "full",
            TablePolicy::NoData => "nodata",
            TablePolicy::Ignore => "ignore",
        };
        f.write_str(name)
    }
}

/// Column overrides, row predicates and filter policies keyed by table name.
///
/// Built once before the run and only read afterwards. A table or column with
/// no entry is exported as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DumpRules {
    column_overrides: BTreeMap<String, BTreeMap<String, String>>,
    where_clauses: BTreeMap<String, String>,
    policies: BTreeMap<String, TablePolicy>,
}

impl DumpRules {
    /// Replace `column` of `table` by `expression` in the SELECT list.
    ///
    /// The expression is operator-trusted SQL and is never escaped.
    pub fn add_column_override(
        &mut self,
        table: String,
        column: String,
        expression: String,
    ) -> Result<()> {
        utils::validate_mysql_identifier(&table)?;
        utils::validate_mysql_identifier(&column)?;
        if expression.trim().is_empty() {
            bail!(
                "Replacement expression cannot be empty for '{}.{}'",
                table,
                column
            );
        }
        self.column_overrides
            .entry(table)
            .or_default()
            .insert(column, expression);
        Ok(())
    }

    pub fn add_where_clause(&mut self, table: String, predicate: String) -> Result<()> {
        utils::validate_mysql_identifier(&table)?;
        if predicate.trim().is_empty() {
            bail!("WHERE predicate cannot be empty for '{}'", table);
        }
        self.where_clauses.insert(table, predicate);
        Ok(())
    }

    pub fn set_policy(&mut self, table: String, policy: TablePolicy) -> Result<()> {
        utils::validate_mysql_identifier(&table)?;
        self.policies.insert(table, policy);
        Ok(())
    }

    /// Accepts `table.column` and returns its two halves
    pub fn parse_table_column(spec: &str) -> Result<(String, String)> {
        let parts: Vec<&str> = spec.split('.').collect();
        if parts.len() != 2 {
            bail!("Expected 'table.column' format. Got wrong one: {}", spec);
        }
        let table = non_empty(parts[0], "table")?;
        let column = non_empty(parts[1], "column")?;
        Ok((table, column))
    }

    pub fn apply_ignore_cli(&mut self, tables: &[String]) -> Result<()> {
        for table in tables {
            self.set_policy(non_empty(table, "table")?, TablePolicy::Ignore)?;
        }
        Ok(())
    }

    pub fn apply_nodata_cli(&mut self, tables: &[String]) -> Result<()> {
        for table in tables {
            self.set_policy(non_empty(table, "table")?, TablePolicy::NoData)?;
        }
        Ok(())
    }

    /// Parses `table:predicate` specs
    pub fn apply_where_cli(&mut self, specs: &[String]) -> Result<()> {
        for spec in specs {
            let (table, predicate) = spec
                .split_once(':')
                .with_context(|| format!("WHERE rule '{}' missing ':' separator", spec))?;
            if predicate.trim().is_empty() {
                bail!("WHERE rule '{}' must include a predicate after ':'", spec);
            }
            self.add_where_clause(non_empty(table, "table")?, predicate.trim().to_string())?;
        }
        Ok(())
    }

    /// Replacement expression configured for `table.column`
    pub fn column_override(&self, table: &str, column: &str) -> Option<&str> {
        self.column_overrides
            .get(table)
            .and_then(|columns| columns.get(column))
            .map(String::as_str)
    }

    pub fn where_clause(&self, table: &str) -> Option<&str> {
        self.where_clauses.get(table).map(String::as_str)
    }

    /// Filter policy for a table; tables without an entry are exported fully
    pub fn policy(&self, table: &str) -> TablePolicy {
        self.policies.get(table).copied().unwrap_or_default()
    }

    /// Tables named by any rule, for diagnostics
    pub fn tables(&self) -> BTreeSet<&str> {
        self.column_overrides
            .keys()
            .chain(self.where_clauses.keys())
            .chain(self.policies.keys())
            .map(String::as_str)
            .collect()
    }

    /// Overlay `other` on top of these rules; entries in `other` win
    pub fn merge(&mut self, other: DumpRules) {
        for (table, columns) in other.column_overrides {
            self.column_overrides.entry(table).or_default().extend(columns);
        }
        self.where_clauses.extend(other.where_clauses);
        self.policies.extend(other.policies);
    }

    pub fn is_empty(&self) -> bool {
        self.column_overrides.is_empty() && self.where_clauses.is_empty() && self.policies.is_empty()
    }
}

fn non_empty(value: &str, label: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        bail!("{} name cannot be empty", label);
    }
    Ok(trimmed.to_string())
}
