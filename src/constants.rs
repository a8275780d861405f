pub const PAIR_SEPARATOR: u8 = b'&';

pub const KEY_VALUE_SEPARATOR: u8 = b'=';

pub const COOKIE_SEPARATOR: u8 = b';';

/// Largest sequence index honored positionally; anything above turns the
/// sequence into a mapping.
pub const DEFAULT_ARRAY_LIMIT: usize = 1000;

pub(crate) const KEYWORD_NULL: &str = "null";

pub(crate) const KEYWORD_UNDEFINED: &str = "undefined";
