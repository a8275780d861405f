pub(crate) mod builder;
pub(crate) mod coerce;
pub mod cookie;
pub mod path;
pub(crate) mod scan;

use std::io::Read;

use serde::de::DeserializeOwned;
use tracing::trace;

use crate::constants::PAIR_SEPARATOR;
use crate::text::percent::decode_form_component;
use crate::types::Value;
use crate::{Error, ParseOptions, Result};

pub use builder::Query;

pub fn parse_query(input: &str, options: &ParseOptions) -> Query {
    let mut query = Query::with_array_limit(options.array_limit);
    let mut pairs = 0usize;
    for pair in scan::Pairs::new(input, PAIR_SEPARATOR) {
        let key = decode_form_component(pair.key);
        if key.is_empty() {
            continue;
        }
        let value = pair.value.map(decode_form_component);
        query.assign(&key, value.as_deref(), options.types);
        pairs += 1;
    }
    trace!(len = input.len(), pairs, "parsed query string");
    query
}

pub fn from_str<T: DeserializeOwned>(input: &str, options: &ParseOptions) -> Result<T> {
    crate::serde::from_value(&parse_value(input, options))
}

pub fn from_slice<T: DeserializeOwned>(input: &[u8], options: &ParseOptions) -> Result<T> {
    let text =
        std::str::from_utf8(input).map_err(|err| Error::decode(format!("invalid utf-8: {err}")))?;
    from_str(text, options)
}

pub fn from_reader<T: DeserializeOwned, R: Read>(mut reader: R, options: &ParseOptions) -> Result<T> {
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .map_err(|err| Error::decode(format!("read failed: {err}")))?;
    from_str(&buf, options)
}

pub(crate) fn parse_value(input: &str, options: &ParseOptions) -> Value {
    parse_query(input, options).into_value()
}
