use std::borrow::Cow;

use percent_encoding::{percent_decode, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Bytes left alone by `encodeURIComponent`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Decodes a form-encoded component: `+` becomes a space first, then
/// percent-escapes are resolved. Broken escapes are kept verbatim and invalid
/// UTF-8 is replaced.
pub(crate) fn decode_form_component(raw: &str) -> Cow<'_, str> {
    let has_plus = memchr::memchr(b'+', raw.as_bytes()).is_some();
    if !has_plus {
        return decode_component(raw);
    }
    let spaced: Vec<u8> = raw
        .bytes()
        .map(|b| if b == b'+' { b' ' } else { b })
        .collect();
    Cow::Owned(percent_decode(&spaced).decode_utf8_lossy().into_owned())
}

/// Percent-decodes without touching `+`.
pub(crate) fn decode_component(raw: &str) -> Cow<'_, str> {
    if memchr::memchr(b'%', raw.as_bytes()).is_none() {
        return Cow::Borrowed(raw);
    }
    percent_decode(raw.as_bytes()).decode_utf8_lossy()
}

pub(crate) fn encode_component_into(out: &mut String, text: &str) {
    for chunk in utf8_percent_encode(text, COMPONENT) {
        out.push_str(chunk);
    }
}
