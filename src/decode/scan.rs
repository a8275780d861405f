use memchr::memchr;

use crate::constants::KEY_VALUE_SEPARATOR;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RawPair<'a> {
    pub key: &'a str,
    /// `None` when the pair has no `=`.
    pub value: Option<&'a str>,
}

/// Lazily splits `input` on `separator`, skipping zero-length records.
#[derive(Clone, Debug)]
pub(crate) struct Pairs<'a> {
    input: &'a str,
    pos: usize,
    separator: u8,
}

impl<'a> Pairs<'a> {
    pub fn new(input: &'a str, separator: u8) -> Self {
        Self {
            input,
            pos: 0,
            separator,
        }
    }
}

impl<'a> Iterator for Pairs<'a> {
    type Item = RawPair<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.input.as_bytes();
        while self.pos <= bytes.len() {
            let start = self.pos;
            let end = memchr(self.separator, &bytes[start..])
                .map(|offset| start + offset)
                .unwrap_or(bytes.len());
            self.pos = end + 1;
            if end == start {
                continue;
            }
            // Both separators are ASCII, so every split lands on a char boundary.
            let record = &self.input[start..end];
            let pair = match memchr(KEY_VALUE_SEPARATOR, record.as_bytes()) {
                Some(eq) => RawPair {
                    key: &record[..eq],
                    value: Some(&record[eq + 1..]),
                },
                None => RawPair {
                    key: record,
                    value: None,
                },
            };
            return Some(pair);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{Pairs, RawPair};
    use crate::constants::{COOKIE_SEPARATOR, PAIR_SEPARATOR};

    fn collect(input: &str) -> Vec<RawPair<'_>> {
        Pairs::new(input, PAIR_SEPARATOR).collect()
    }

    #[rstest::rstest]
    fn test_splits_pairs_in_order() {
        let pairs = collect("foo=bar&bar=&baz");
        assert_eq!(
            pairs,
            vec![
                RawPair {
                    key: "foo",
                    value: Some("bar")
                },
                RawPair {
                    key: "bar",
                    value: Some("")
                },
                RawPair {
                    key: "baz",
                    value: None
                },
            ]
        );
    }

    #[rstest::rstest]
    #[case("")]
    #[case("&")]
    #[case("&&&")]
    fn test_empty_records_are_skipped(#[case] input: &str) {
        assert!(collect(input).is_empty());
    }

    #[rstest::rstest]
    fn test_leading_and_trailing_separators() {
        let pairs = collect("&a=1&&b=2&");
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].key, "a");
        assert_eq!(pairs[1].value, Some("2"));
    }

    #[rstest::rstest]
    fn test_first_equals_splits() {
        let pairs = collect("a=b=c");
        assert_eq!(pairs[0].key, "a");
        assert_eq!(pairs[0].value, Some("b=c"));
    }

    #[rstest::rstest]
    fn test_lone_equals_is_an_empty_pair() {
        let pairs = collect("=");
        assert_eq!(
            pairs,
            vec![RawPair {
                key: "",
                value: Some("")
            }]
        );
    }

    #[rstest::rstest]
    fn test_custom_separator() {
        let pairs: Vec<_> = Pairs::new("a=1; b=2", COOKIE_SEPARATOR).collect();
        assert_eq!(pairs[1].key, " b");
        assert_eq!(pairs[1].value, Some("2"));
    }

    #[rstest::rstest]
    fn test_multibyte_text() {
        let pairs = collect("ключ=значение&é");
        assert_eq!(pairs[0].key, "ключ");
        assert_eq!(pairs[0].value, Some("значение"));
        assert_eq!(pairs[1].key, "é");
    }
}
