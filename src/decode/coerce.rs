use crate::constants::{KEYWORD_NULL, KEYWORD_UNDEFINED};
use crate::options::{ValueType, ValueTypes};
use crate::types::{Number, Value};

/// Maps a decoded string onto a scalar when its type is enabled in `types`.
/// Anything that matches no enabled rule comes back as a string.
pub(crate) fn coerce(raw: String, types: ValueTypes) -> Value {
    if types.is_empty() {
        return Value::String(raw);
    }
    match raw.as_str() {
        KEYWORD_NULL if types.contains(ValueType::Null) => return Value::Null,
        KEYWORD_UNDEFINED if types.contains(ValueType::Undefined) => return Value::Undefined,
        "true" if types.contains(ValueType::Boolean) => return Value::Bool(true),
        "false" if types.contains(ValueType::Boolean) => return Value::Bool(false),
        _ => {}
    }
    if types.contains(ValueType::Number) {
        if let Some(number) = parse_number(&raw) {
            return Value::Number(number);
        }
    }
    Value::String(raw)
}

fn parse_number(text: &str) -> Option<Number> {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned.is_empty() {
        return None;
    }
    let bytes = unsigned.as_bytes();
    if bytes.iter().all(u8::is_ascii_digit) {
        return match text.parse::<i64>() {
            Ok(i) => Some(Number::from(i)),
            Err(_) => text.parse::<f64>().ok().map(Number::Float),
        };
    }
    // Decimal: optional integer part, a dot, at least one fractional digit.
    let dot = memchr::memchr(b'.', bytes)?;
    let (int_part, frac_part) = (&bytes[..dot], &bytes[dot + 1..]);
    if frac_part.is_empty()
        || !int_part.iter().all(u8::is_ascii_digit)
        || !frac_part.iter().all(u8::is_ascii_digit)
    {
        return None;
    }
    text.parse::<f64>().ok().map(Number::Float)
}
