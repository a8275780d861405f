pub mod constants;
pub mod decode;
pub mod encode;
pub mod error;
pub mod options;
mod serde;
mod text;
pub mod types;

use std::io::Read;

use ::serde::de::DeserializeOwned;
use ::serde::Serialize;

pub use crate::decode::cookie::{parse_cookies, Cookies};
pub use crate::decode::path::{parse_key_path, KeyPath, PathSegment};
pub use crate::decode::{parse_query, Query};
pub use crate::encode::stringify;
pub use crate::error::{Error, ErrorKind};
pub use crate::options::{ParseOptions, ValueType, ValueTypes};
pub use crate::types::{Map, Number, Value};

pub type Result<T> = std::result::Result<T, Error>;

/// Parses a query string into a [`Value`] tree, keeping every value a string.
///
/// ```
/// use serde_qstree::parse;
///
/// let value = parse("user[name]=ada&tags[]=a&tags[]=b");
/// assert_eq!(value["user"]["name"].as_str(), Some("ada"));
/// assert_eq!(value["tags"][1].as_str(), Some("b"));
/// ```
pub fn parse(input: &str) -> Value {
    parse_with_options(input, &ParseOptions::default())
}

pub fn parse_with_options(input: &str, options: &ParseOptions) -> Value {
    decode::parse_value(input, options)
}

pub fn to_string<T: Serialize>(value: &T) -> Result<String> {
    encode::to_string(value)
}

pub fn to_value<T: Serialize>(value: &T) -> Result<Value> {
    crate::serde::to_value(value)
}

pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T> {
    crate::serde::from_value(value)
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T> {
    from_str_with_options(input, &ParseOptions::default())
}

pub fn from_str_with_options<T: DeserializeOwned>(
    input: &str,
    options: &ParseOptions,
) -> Result<T> {
    decode::from_str(input, options)
}

pub fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T> {
    from_slice_with_options(input, &ParseOptions::default())
}

pub fn from_slice_with_options<T: DeserializeOwned>(
    input: &[u8],
    options: &ParseOptions,
) -> Result<T> {
    decode::from_slice(input, options)
}

pub fn from_reader<T: DeserializeOwned, R: Read>(reader: R) -> Result<T> {
    from_reader_with_options(reader, &ParseOptions::default())
}

pub fn from_reader_with_options<T: DeserializeOwned, R: Read>(
    reader: R,
    options: &ParseOptions,
) -> Result<T> {
    decode::from_reader(reader, options)
}
