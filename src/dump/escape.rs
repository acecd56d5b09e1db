// ABOUTME: Escapes raw column bytes for embedding in single-quoted SQL literals
// ABOUTME: Byte-oriented so NUL and non-UTF-8 data survive unchanged

/// Replacement for a byte that cannot appear verbatim inside `'...'`
fn escape_for(byte: u8) -> Option<&'static [u8]> {
    match byte {
        0x00 => Some(b"\\0"),
        b'\n' => Some(b"\\n"),
        b'\r' => Some(b"\\r"),
        b'\\' => Some(b"\\\\"),
        b'\'' => Some(b"\\'"),
        b'"' => Some(b"\\\""),
        0x1a => Some(b"\\Z"),
        _ => None,
    }
}

/// Escape `value` in one left-to-right pass
///
/// Unaffected runs are copied as slices; every byte is looked at once, so an
/// escape sequence that is already present in the data is escaped again
/// rather than recognised.
///
/// # Examples
///
/// ```
/// # use mysql_superdump::dump::escape::escape;
/// assert_eq!(escape(b"it's"), b"it\\'s".to_vec());
/// assert_eq!(escape(b"plain"), b"plain".to_vec());
/// ```
pub fn escape(value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    let mut last = 0;
    for (i, &byte) in value.iter().enumerate() {
        if let Some(replacement) = escape_for(byte) {
            out.extend_from_slice(&value[last..i]);
            out.extend_from_slice(replacement);
            last = i + 1;
        }
    }
    out.extend_from_slice(&value[last..]);
    out
}

/// Render a column value as a SQL literal: `NULL` or `'<escaped>'`
pub fn quote_value(value: Option<&[u8]>) -> Vec<u8> {
    match value {
        None => b"NULL".to_vec(),
        Some(bytes) => {
            let escaped = escape(bytes);
            let mut out = Vec::with_capacity(escaped.len() + 2);
            out.push(b'\'');
            out.extend_from_slice(&escaped);
            out.push(b'\'');
            out
        }
    }
}
