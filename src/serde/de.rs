use serde::de::{
    self, DeserializeOwned, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess,
    Visitor,
};
use serde::forward_to_deserialize_any;

use crate::decode::path::numeric_key;
use crate::text::number::number_to_string;
use crate::types::{Map, Number, Value};
use crate::Error;

pub(crate) fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T, Error> {
    T::deserialize(value)
}

fn mismatch(expected: &str, found: &Value) -> Error {
    Error::deserialize(format!(
        "expected {expected}, found {}",
        found.type_name()
    ))
}

/// Decoded values are strings unless coercion was requested, so scalars are
/// also accepted in their textual form.
fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => parse_bool(s),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        _ => None,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => Some(n.as_f64()),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Elements a value contributes to a sequence: holes are skipped, a mapping
/// with only numeric keys is read in index order and a lone scalar is a
/// one-element sequence.
fn sequence_items(value: &Value) -> Option<Vec<&Value>> {
    match value {
        Value::Undefined => Some(Vec::new()),
        Value::Array(items) => Some(items.iter().filter(|v| !v.is_undefined()).collect()),
        Value::Object(map) => {
            let mut indexed = map
                .iter()
                .map(|(key, value)| numeric_key(key).map(|index| (index, value)))
                .collect::<Option<Vec<_>>>()?;
            indexed.sort_by_key(|(index, _)| *index);
            Some(indexed.into_iter().map(|(_, value)| value).collect())
        }
        scalar => Some(vec![scalar]),
    }
}

impl<'de> de::Deserializer<'de> for &'de Value {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null | Value::Undefined => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Number(n) => visit_number(visitor, n),
            Value::String(s) => visitor.visit_borrowed_str(s),
            Value::Array(_) => self.deserialize_seq(visitor),
            Value::Object(obj) => visitor.visit_map(MapDeserializer::new(obj)),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match as_bool(self) {
            Some(b) => visitor.visit_bool(b),
            None => Err(mismatch("bool", self)),
        }
    }

    fn deserialize_i8<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i16<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match as_i64(self) {
            Some(i) => visitor.visit_i64(i),
            None => Err(mismatch("i64", self)),
        }
    }

    fn deserialize_i128<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match as_i64(self) {
            Some(i) => visitor.visit_i128(i as i128),
            None => Err(mismatch("i128", self)),
        }
    }

    fn deserialize_u8<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_u64(visitor)
    }

    fn deserialize_u16<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_u64(visitor)
    }

    fn deserialize_u32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_u64(visitor)
    }

    fn deserialize_u64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match as_u64(self) {
            Some(u) => visitor.visit_u64(u),
            None => Err(mismatch("u64", self)),
        }
    }

    fn deserialize_u128<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match as_u64(self) {
            Some(u) => visitor.visit_u128(u as u128),
            None => Err(mismatch("u128", self)),
        }
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_f64(visitor)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match as_f64(self) {
            Some(f) => visitor.visit_f64(f),
            None => Err(mismatch("f64", self)),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::String(s) => {
                let mut chars = s.chars();
                let first = chars.next().ok_or_else(|| de::Error::custom("empty char"))?;
                if chars.next().is_some() {
                    return Err(de::Error::custom("expected single character"));
                }
                visitor.visit_char(first)
            }
            _ => Err(mismatch("char", self)),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::String(s) => visitor.visit_borrowed_str(s),
            // `key` without `=` reads as an empty string.
            Value::Null => visitor.visit_borrowed_str(""),
            Value::Bool(b) => visitor.visit_borrowed_str(if *b { "true" } else { "false" }),
            Value::Number(n) => visitor.visit_string(number_to_string(n)),
            _ => Err(mismatch("string", self)),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::String(s) => visitor.visit_borrowed_bytes(s.as_bytes()),
            Value::Array(arr) => visitor.visit_byte_buf(values_to_bytes(arr)?),
            _ => Err(mismatch("bytes", self)),
        }
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null | Value::Undefined => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Null | Value::Undefined => visitor.visit_unit(),
            Value::String(s) if s.is_empty() => visitor.visit_unit(),
            _ => Err(mismatch("unit", self)),
        }
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match sequence_items(self) {
            Some(items) => visitor.visit_seq(SeqDeserializer::new(items)),
            None => Err(mismatch("sequence", self)),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::Object(obj) => visitor.visit_map(MapDeserializer::new(obj)),
            _ => Err(mismatch("map", self)),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self {
            Value::String(s) => visitor.visit_enum(EnumDeserializer::new(s, None)),
            Value::Object(map) => {
                let mut entries = map.iter().filter(|(_, v)| !v.is_undefined());
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => {
                        visitor.visit_enum(EnumDeserializer::new(variant, Some(value)))
                    }
                    _ => Err(de::Error::custom("expected single-key enum map")),
                }
            }
            _ => Err(mismatch("enum", self)),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

fn visit_number<'de, V>(visitor: V, n: &Number) -> Result<V::Value, Error>
where
    V: Visitor<'de>,
{
    match n {
        Number::PosInt(u) => visitor.visit_u64(*u),
        Number::NegInt(i) => visitor.visit_i64(*i),
        Number::Float(f) => visitor.visit_f64(*f),
    }
}

fn values_to_bytes(values: &[Value]) -> Result<Vec<u8>, Error> {
    values
        .iter()
        .map(|value| {
            as_u64(value)
                .and_then(|u| u8::try_from(u).ok())
                .ok_or_else(|| de::Error::custom("byte value out of range"))
        })
        .collect()
}

struct SeqDeserializer<'de> {
    iter: std::vec::IntoIter<&'de Value>,
}

impl<'de> SeqDeserializer<'de> {
    fn new(values: Vec<&'de Value>) -> Self {
        SeqDeserializer {
            iter: values.into_iter(),
        }
    }
}

impl<'de> SeqAccess<'de> for SeqDeserializer<'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(value).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer<'de> {
    iter: indexmap::map::Iter<'de, String, Value>,
    value: Option<&'de Value>,
}

impl<'de> MapDeserializer<'de> {
    fn new(map: &'de Map) -> Self {
        MapDeserializer {
            iter: map.iter(),
            value: None,
        }
    }
}

impl<'de> MapAccess<'de> for MapDeserializer<'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: de::DeserializeSeed<'de>,
    {
        for (key, value) in self.iter.by_ref() {
            if value.is_undefined() {
                continue;
            }
            self.value = Some(value);
            return seed.deserialize(KeyDeserializer(key)).map(Some);
        }
        Ok(None)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(value),
            None => Err(de::Error::custom("value is missing for key")),
        }
    }
}

/// Mapping keys are always text; integer and bool keys are parsed from it.
struct KeyDeserializer<'de>(&'de str);

macro_rules! deserialize_parsed_key {
    ($($method:ident => $visit:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                match self.0.parse::<$ty>() {
                    Ok(parsed) => visitor.$visit(parsed),
                    Err(_) => Err(Error::deserialize(format!(
                        "invalid {} map key `{}`",
                        stringify!($ty),
                        self.0
                    ))),
                }
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for KeyDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.0)
    }

    deserialize_parsed_key! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match parse_bool(self.0) {
            Some(b) => visitor.visit_bool(b),
            None => Err(Error::deserialize(format!("invalid bool map key `{}`", self.0))),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_enum(EnumDeserializer::new(self.0, None))
    }

    forward_to_deserialize_any! {
        i128 u128 char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct EnumDeserializer<'de> {
    variant: &'de str,
    value: Option<&'de Value>,
}

impl<'de> EnumDeserializer<'de> {
    fn new(variant: &'de str, value: Option<&'de Value>) -> Self {
        EnumDeserializer { variant, value }
    }
}

impl<'de> EnumAccess<'de> for EnumDeserializer<'de> {
    type Error = Error;
    type Variant = VariantDeserializer<'de>;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: de::DeserializeSeed<'de>,
    {
        let deserializer = de::value::BorrowedStrDeserializer::<Error>::new(self.variant);
        let val = seed.deserialize(deserializer)?;
        Ok((val, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer<'de> {
    value: Option<&'de Value>,
}

impl<'de> VariantAccess<'de> for VariantDeserializer<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Self::Error> {
        match self.value {
            None => Ok(()),
            Some(value) if value.is_vacant() => Ok(()),
            _ => Err(de::Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(value),
            None => Err(de::Error::custom("expected newtype variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(value) => value.deserialize_seq(visitor),
            None => Err(de::Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Some(value) => value.deserialize_map(visitor),
            None => Err(de::Error::custom("expected struct variant")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::Deserialize;
    use serde_json::json;

    use super::from_value;
    use crate::types::{Map, Value};
    use crate::ErrorKind;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Filter {
        page: u32,
        active: bool,
        ratio: f64,
        tags: Vec<String>,
        sort: Option<String>,
    }

    #[rstest::rstest]
    fn test_string_scalars_are_parsed() {
        let value = Value::from(json!({
            "page": "2", "active": "1", "ratio": "0.5", "tags": ["a", "b"]
        }));
        let filter: Filter = from_value(&value).unwrap();
        assert_eq!(
            filter,
            Filter {
                page: 2,
                active: true,
                ratio: 0.5,
                tags: vec!["a".into(), "b".into()],
                sort: None,
            }
        );
    }

    #[rstest::rstest]
    fn test_lone_scalar_is_a_sequence() {
        let value = Value::from(json!({"tags": "solo"}));
        let tags: BTreeMap<String, Vec<String>> = from_value(&value).unwrap();
        assert_eq!(tags["tags"], vec!["solo".to_string()]);
    }

    #[rstest::rstest]
    fn test_numeric_mapping_reads_as_sequence_in_index_order() {
        let value = Value::from(json!({"2": "c", "0": "a", "1": "b"}));
        let items: Vec<String> = from_value(&value).unwrap();
        assert_eq!(items, vec!["a", "b", "c"]);
    }

    #[rstest::rstest]
    fn test_mixed_mapping_is_not_a_sequence() {
        let value = Value::from(json!({"0": "a", "x": "b"}));
        let err = from_value::<Vec<String>>(&value).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Deserialize);
    }

    #[rstest::rstest]
    fn test_holes_are_skipped() {
        let value = Value::Array(vec![Value::Undefined, Value::from("a")]);
        let items: Vec<String> = from_value(&value).unwrap();
        assert_eq!(items, vec!["a"]);
    }

    #[rstest::rstest]
    fn test_null_reads_as_empty_string_or_none() {
        let mut map = Map::new();
        map.insert("flag".to_string(), Value::Null);
        let value = Value::Object(map);
        let as_string: BTreeMap<String, String> = from_value(&value).unwrap();
        assert_eq!(as_string["flag"], "");
        let as_option: BTreeMap<String, Option<u8>> = from_value(&value).unwrap();
        assert_eq!(as_option["flag"], None);
    }

    #[rstest::rstest]
    fn test_integer_map_keys() {
        let value = Value::from(json!({"10": "a", "2": "b"}));
        let map: BTreeMap<u32, String> = from_value(&value).unwrap();
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![2, 10]);
    }

    #[rstest::rstest]
    fn test_bad_number_reports_found_type() {
        let value = Value::from(json!({"page": "two"}));
        let err = from_value::<BTreeMap<String, u32>>(&value).unwrap_err();
        assert!(err.message.contains("expected u64"), "{}", err.message);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    enum Mode {
        Fast,
        Limit(u8),
    }

    #[rstest::rstest]
    fn test_enums() {
        assert_eq!(from_value::<Mode>(&Value::from("Fast")).unwrap(), Mode::Fast);
        assert_eq!(
            from_value::<Mode>(&Value::from(json!({"Limit": "3"}))).unwrap(),
            Mode::Limit(3)
        );
    }

    #[rstest::rstest]
    fn test_out_of_range_integer() {
        let err = from_value::<u8>(&Value::from("300")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Deserialize);
    }
}
