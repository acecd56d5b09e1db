// ABOUTME: MySQL value to raw byte conversion for dump rendering
// ABOUTME: Produces the textual form MySQL would send for typed protocol values

use crate::source::Row;
use mysql_async::Value;

/// Convert a MySQL value to the bytes that represent it in a text result set
///
/// Text-protocol queries only ever yield `Bytes` and `NULL`; typed values are
/// rendered the way the server prints them so the dump is identical either way.
///
/// # Examples
///
/// ```
/// # use mysql_async::Value;
/// # use mysql_superdump::mysql::converter::mysql_value_to_bytes;
/// assert_eq!(mysql_value_to_bytes(Value::NULL), None);
/// assert_eq!(mysql_value_to_bytes(Value::Int(-7)), Some(b"-7".to_vec()));
/// ```
pub fn mysql_value_to_bytes(value: Value) -> Option<Vec<u8>> {
    let text = match value {
        Value::NULL => return None,
        Value::Bytes(bytes) => return Some(bytes),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            let mut text = format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            );
            if micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            text
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let total_hours = u64::from(days) * 24 + u64::from(hours);
            let mut text = format!(
                "{}{:02}:{:02}:{:02}",
                if negative { "-" } else { "" },
                total_hours,
                minutes,
                seconds
            );
            if micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            text
        }
    };
    Some(text.into_bytes())
}

/// Convert a driver row into a [`Row`] of nullable byte buffers
pub fn mysql_row_to_row(mut row: mysql_async::Row) -> Row {
    (0..row.len())
        .map(|idx| row.take::<Value, _>(idx).and_then(mysql_value_to_bytes))
        .collect()
}
