use smallvec::SmallVec;
use smol_str::SmolStr;

pub(crate) fn is_numeric_key(key: &str) -> bool {
    !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a key made only of ASCII digits. `usize::MAX` is left to the
/// caller as a plain name so that the slot after any index still exists.
pub(crate) fn numeric_key(key: &str) -> Option<usize> {
    if !is_numeric_key(key) {
        return None;
    }
    key.parse().ok().filter(|index| *index < usize::MAX)
}

/// One bracket-delimited component of a key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    Literal(SmolStr),
    Index(usize),
    /// `[]`: the next free index of the container.
    Append,
}

impl PathSegment {
    fn classify(part: &str) -> Self {
        if part.is_empty() {
            PathSegment::Append
        } else if let Some(index) = numeric_key(part) {
            PathSegment::Index(index)
        } else {
            PathSegment::Literal(SmolStr::new(part))
        }
    }

    pub fn is_sequence_key(&self) -> bool {
        matches!(self, PathSegment::Index(_) | PathSegment::Append)
    }
}

pub type KeyPath = SmallVec<[PathSegment; 4]>;

/// Splits `a[b][0][]` into `a`, `b`, `0`, append.
///
/// Matches collapsing every `][` into `[`, dropping one trailing `]` and
/// splitting on `[`, without building the intermediate string.
pub fn parse_key_path(key: &str) -> KeyPath {
    let trimmed = key.strip_suffix(']').unwrap_or(key);
    let mut parts = trimmed.split('[').peekable();
    let mut path = KeyPath::new();
    while let Some(part) = parts.next() {
        let part = if parts.peek().is_some() {
            part.strip_suffix(']').unwrap_or(part)
        } else {
            part
        };
        path.push(PathSegment::classify(part));
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_is_numeric_key() {
        assert!(is_numeric_key("0"));
        assert!(is_numeric_key("0042"));
        assert!(!is_numeric_key(""));
        assert!(!is_numeric_key("-1"));
        assert!(!is_numeric_key("+1"));
        assert!(!is_numeric_key("1a"));
    }

    #[rstest::rstest]
    fn test_numeric_key_range() {
        assert_eq!(numeric_key("7"), Some(7));
        assert_eq!(numeric_key("007"), Some(7));
        assert_eq!(numeric_key("99999999999999999999999999"), None);
        assert_eq!(numeric_key(&usize::MAX.to_string()), None);
        assert_eq!(
            numeric_key(&(usize::MAX - 1).to_string()),
            Some(usize::MAX - 1)
        );
        assert_eq!(numeric_key("bar"), None);
    }

    #[rstest::rstest]
    fn test_max_index_is_a_literal() {
        let key = format!("a[{}]", usize::MAX);
        assert_eq!(
            parse_key_path(&key).as_slice(),
            &[lit("a"), lit(&usize::MAX.to_string())]
        );
    }

    fn lit(s: &str) -> PathSegment {
        PathSegment::Literal(SmolStr::new(s))
    }

    #[rstest::rstest]
    fn test_plain_key() {
        assert_eq!(parse_key_path("foo").as_slice(), &[lit("foo")]);
    }

    #[rstest::rstest]
    fn test_nested_segments() {
        assert_eq!(
            parse_key_path("foo[bar][0][]").as_slice(),
            &[
                lit("foo"),
                lit("bar"),
                PathSegment::Index(0),
                PathSegment::Append
            ]
        );
    }

    #[rstest::rstest]
    fn test_index_normalizes_leading_zeros() {
        assert_eq!(
            parse_key_path("a[007]").as_slice(),
            &[lit("a"), PathSegment::Index(7)]
        );
    }

    #[rstest::rstest]
    fn test_overflowing_index_is_literal() {
        let path = parse_key_path("a[99999999999999999999999]");
        assert_eq!(path[1], lit("99999999999999999999999"));
    }

    #[rstest::rstest]
    fn test_bare_brackets_at_root() {
        assert_eq!(
            parse_key_path("[]").as_slice(),
            &[PathSegment::Append, PathSegment::Append]
        );
    }

    #[rstest::rstest]
    fn test_unbalanced_brackets() {
        assert_eq!(parse_key_path("a]").as_slice(), &[lit("a")]);
        assert_eq!(parse_key_path("a][").as_slice(), &[lit("a"), PathSegment::Append]);
        assert_eq!(parse_key_path("a]][b]").as_slice(), &[lit("a]"), lit("b")]);
        assert_eq!(parse_key_path("a[b").as_slice(), &[lit("a"), lit("b")]);
    }

    #[rstest::rstest]
    fn test_numeric_root_key() {
        assert_eq!(parse_key_path("0").as_slice(), &[PathSegment::Index(0)]);
    }

    #[rstest::rstest]
    fn test_sequence_keys() {
        assert!(PathSegment::Append.is_sequence_key());
        assert!(PathSegment::Index(3).is_sequence_key());
        assert!(!lit("x").is_sequence_key());
    }
}
