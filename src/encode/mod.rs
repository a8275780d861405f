mod writer;

use serde::Serialize;
use tracing::trace;

use crate::types::Value;
use crate::Result;

use writer::Writer;

/// Flattens `value` into `key=value` pairs joined by `&`.
///
/// Nested keys use bracket notation, `null` becomes a bare key, booleans
/// become `1`/`0` and `undefined` entries are left out entirely (array
/// positions keep their original index).
///
/// ```
/// use serde_json::json;
/// use serde_qstree::{stringify, Value};
///
/// let value = Value::from(json!({"a": {"b": [1, null]}, "ok": true}));
/// assert_eq!(stringify(&value), "a[b][0]=1&a[b][1]&ok=1");
/// ```
pub fn stringify(value: &Value) -> String {
    let mut writer = Writer::new();
    write_value(&mut writer, value);
    trace!(pairs = writer.pairs(), "stringified value");
    writer.finish()
}

pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    let value = crate::serde::to_value(value)?;
    Ok(stringify(&value))
}

fn write_value(writer: &mut Writer, value: &Value) {
    match value {
        Value::Undefined => {}
        Value::Null => writer.write_bare_key(),
        Value::Bool(b) => writer.write_raw(if *b { "1" } else { "0" }),
        Value::Number(n) => writer.write_number(n),
        Value::String(s) => writer.write_text(s),
        Value::Array(items) => {
            let mark = writer.prefix_len();
            for (index, item) in items.iter().enumerate() {
                writer.push_index(index);
                write_value(writer, item);
                writer.truncate_prefix(mark);
            }
        }
        Value::Object(map) => {
            let mark = writer.prefix_len();
            for (key, item) in map {
                writer.push_key(key);
                write_value(writer, item);
                writer.truncate_prefix(mark);
            }
        }
    }
}
