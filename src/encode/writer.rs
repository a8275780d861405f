use crate::constants::{KEY_VALUE_SEPARATOR, PAIR_SEPARATOR};
use crate::text::number::number_to_string;
use crate::text::percent::encode_component_into;
use crate::types::Number;

/// Output buffer plus the bracketed key prefix of the value being written.
pub(crate) struct Writer {
    buffer: String,
    prefix: String,
    pairs: usize,
}

impl Writer {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            prefix: String::new(),
            pairs: 0,
        }
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    pub fn pairs(&self) -> usize {
        self.pairs
    }

    pub fn prefix_len(&self) -> usize {
        self.prefix.len()
    }

    pub fn truncate_prefix(&mut self, len: usize) {
        self.prefix.truncate(len);
    }

    /// `[key]` below the root, bare `key` at the root.
    pub fn push_key(&mut self, key: &str) {
        if self.prefix.is_empty() {
            self.prefix.push_str(key);
        } else {
            self.prefix.push('[');
            self.prefix.push_str(key);
            self.prefix.push(']');
        }
    }

    pub fn push_index(&mut self, index: usize) {
        self.prefix.push('[');
        self.prefix.push_str(itoa::Buffer::new().format(index));
        self.prefix.push(']');
    }

    fn begin_pair(&mut self) {
        if self.pairs > 0 {
            self.buffer.push(PAIR_SEPARATOR as char);
        }
        self.pairs += 1;
        self.buffer.push_str(&self.prefix);
    }

    pub fn write_bare_key(&mut self) {
        self.begin_pair();
    }

    pub fn write_raw(&mut self, text: &str) {
        self.begin_pair();
        self.buffer.push(KEY_VALUE_SEPARATOR as char);
        self.buffer.push_str(text);
    }

    pub fn write_text(&mut self, text: &str) {
        self.begin_pair();
        self.buffer.push(KEY_VALUE_SEPARATOR as char);
        encode_component_into(&mut self.buffer, text);
    }

    /// Integers go out as-is; float text may carry `+` (`1e+21`), so it is
    /// encoded like any other value.
    pub fn write_number(&mut self, number: &Number) {
        let text = number_to_string(number);
        match number {
            Number::Float(_) => self.write_text(&text),
            _ => self.write_raw(&text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Writer;
    use crate::types::Number;

    #[rstest::rstest]
    fn test_prefix_building() {
        let mut writer = Writer::new();
        writer.push_key("a");
        let depth_one = writer.prefix_len();
        writer.push_key("b");
        writer.push_index(3);
        writer.write_raw("1");
        writer.truncate_prefix(depth_one);
        writer.write_bare_key();
        assert_eq!(writer.pairs(), 2);
        assert_eq!(writer.finish(), "a[b][3]=1&a");
    }

    #[rstest::rstest]
    fn test_numbers_and_text() {
        let mut writer = Writer::new();
        writer.push_key("n");
        writer.write_number(&Number::NegInt(-4));
        writer.write_number(&Number::Float(0.5));
        writer.write_number(&Number::Float(1e21));
        writer.write_text("a b");
        assert_eq!(writer.finish(), "n=-4&n=0.5&n=1e%2B21&n=a%20b");
    }
}
