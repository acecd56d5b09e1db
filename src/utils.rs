// ABOUTME: Identifier quoting and validation helpers plus retry logic
// ABOUTME: Shared by config loading, query building and connection setup

use anyhow::{bail, Result};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Maximum identifier length accepted by MySQL
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Quote a MySQL identifier with backticks
///
/// Embedded backticks are doubled, which is the only escaping MySQL applies
/// inside a quoted identifier.
///
/// # Examples
///
/// ```
/// # use mysql_superdump::utils::quote_ident;
/// assert_eq!(quote_ident("users"), "`users`");
/// assert_eq!(quote_ident("odd`name"), "`odd``name`");
/// ```
pub fn quote_ident(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Validate a table or column name taken from configuration
///
/// MySQL accepts almost any character in a quoted identifier, so this only
/// rejects what can never name a real object:
/// - empty or whitespace-only names
/// - names longer than 64 characters
/// - control characters (including NUL)
///
/// # Examples
///
/// ```
/// # use mysql_superdump::utils::validate_mysql_identifier;
/// assert!(validate_mysql_identifier("users").is_ok());
/// assert!(validate_mysql_identifier("order items").is_ok());
/// assert!(validate_mysql_identifier("").is_err());
/// assert!(validate_mysql_identifier("bad\nname").is_err());
/// ```
pub fn validate_mysql_identifier(identifier: &str) -> Result<()> {
    if identifier.trim().is_empty() {
        bail!("Identifier cannot be empty or whitespace-only");
    }

    let length = identifier.chars().count();
    if length > MAX_IDENTIFIER_LEN {
        bail!(
            "Identifier '{}' exceeds maximum length of {} characters (got {})",
            sanitize_identifier(identifier),
            MAX_IDENTIFIER_LEN,
            length
        );
    }

    if let Some((position, c)) = identifier.chars().enumerate().find(|(_, c)| c.is_control()) {
        bail!(
            "Identifier '{}' contains control character '\\x{:02x}' at position {}",
            sanitize_identifier(identifier),
            c as u32,
            position
        );
    }

    Ok(())
}

/// Sanitize an identifier for display
///
/// Removes control characters and limits length to prevent log injection.
/// This is for display only; SQL text always goes through [`quote_ident`].
///
/// # Examples
///
/// ```
/// # use mysql_superdump::utils::sanitize_identifier;
/// assert_eq!(sanitize_identifier("normal_table"), "normal_table");
/// assert_eq!(sanitize_identifier("table\x00name"), "tablename");
/// assert_eq!(sanitize_identifier(&"a".repeat(200)).len(), 100);
/// ```
pub fn sanitize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| !c.is_control())
        .take(100)
        .collect()
}

/// Retry an async operation with exponential backoff
///
/// Each retry doubles the delay. Returns the first success or the last error
/// after `max_retries` additional attempts.
pub async fn retry_with_backoff<F, Fut, T, E>(
    mut operation: F,
    max_retries: u32,
    initial_delay: Duration,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Display,
{
    let mut delay = initial_delay;
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt < max_retries => {
                tracing::warn!(
                    "Operation failed (attempt {}/{}): {}, retrying in {:?}...",
                    attempt + 1,
                    max_retries + 1,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
