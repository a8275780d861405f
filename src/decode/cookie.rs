use indexmap::IndexMap;
use tracing::trace;

use crate::constants::COOKIE_SEPARATOR;
use crate::decode::scan::Pairs;
use crate::text::percent::decode_component;

/// Cookie names to values, in header order.
pub type Cookies = IndexMap<String, String>;

/// Parses a `Cookie` header into a flat mapping.
///
/// Pairs without `=` or with an empty name are skipped. Names and values are
/// trimmed, then percent-decoded (`+` is kept). A repeated name keeps the last
/// value.
///
/// ```
/// use serde_qstree::parse_cookies;
///
/// let cookies = parse_cookies("  session = abc%20def ; theme=dark; flag");
/// assert_eq!(cookies["session"], "abc def");
/// assert_eq!(cookies.len(), 2);
/// assert!(parse_cookies(None).is_empty());
/// ```
pub fn parse_cookies<'a>(header: impl Into<Option<&'a str>>) -> Cookies {
    let mut cookies = Cookies::new();
    let Some(header) = header.into() else {
        return cookies;
    };
    for pair in Pairs::new(header, COOKIE_SEPARATOR) {
        let Some(value) = pair.value else {
            continue;
        };
        let name = pair.key.trim();
        if name.is_empty() {
            continue;
        }
        cookies.insert(
            decode_component(name).into_owned(),
            decode_component(value.trim()).into_owned(),
        );
    }
    trace!(cookies = cookies.len(), "parsed cookie header");
    cookies
}

#[cfg(test)]
mod tests {
    use super::parse_cookies;

    #[rstest::rstest]
    fn test_plus_is_not_a_space() {
        assert_eq!(parse_cookies("a=1+2")["a"], "1+2");
    }

    #[rstest::rstest]
    fn test_last_write_wins() {
        let cookies = parse_cookies("a=1; a=2");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies["a"], "2");
    }

    #[rstest::rstest]
    fn test_empty_name_is_skipped() {
        assert!(parse_cookies(" = x; =").is_empty());
    }

    #[rstest::rstest]
    fn test_value_may_contain_equals() {
        assert_eq!(parse_cookies("token=a=b")["token"], "a=b");
    }

    #[rstest::rstest]
    fn test_brackets_are_not_paths() {
        assert_eq!(parse_cookies("a[b]=1")["a[b]"], "1");
    }
}
