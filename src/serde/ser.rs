//! `Serialize` into a [`Value`] shaped for query output.
//!
//! `None` becomes `Undefined`, so an absent optional field emits no pair and
//! an absent sequence element leaves a gap in the indices. `()` becomes
//! `Null`, which is written as a bare flag key. Bytes must be UTF-8 text.
//! Enum payloads nest one level under the variant name, like
//! `shape[Circle]=3`.

use serde::ser::{self, Impossible, Serialize};

use crate::text::number::number_to_string;
use crate::types::{Map, Number, Value};
use crate::Error;

pub(crate) fn to_value<T: ?Sized + Serialize>(value: &T) -> Result<Value, Error> {
    value.serialize(ValueSerializer)
}

fn tagged(variant: Option<&'static str>, value: Value) -> Value {
    match variant {
        Some(name) => Value::Object(Map::from_iter([(name.to_owned(), value)])),
        None => value,
    }
}

struct ValueSerializer;

macro_rules! serialize_numbers {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<Value, Error> {
                Ok(Value::Number(Number::from(v)))
            }
        )*
    };
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = SeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = MapBuilder;

    serialize_numbers! {
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_f32: f32,
        serialize_f64: f64,
    }

    fn serialize_i128(self, v: i128) -> Result<Value, Error> {
        if let Ok(v) = i64::try_from(v) {
            return self.serialize_i64(v);
        }
        u64::try_from(v)
            .map(|v| Value::Number(Number::from(v)))
            .map_err(|_| Error::serialize(format!("integer {v} does not fit in 64 bits")))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, Error> {
        u64::try_from(v)
            .map(|v| Value::Number(Number::from(v)))
            .map_err(|_| Error::serialize(format!("integer {v} does not fit in 64 bits")))
    }

    fn serialize_bool(self, v: bool) -> Result<Value, Error> {
        Ok(Value::Bool(v))
    }

    fn serialize_char(self, v: char) -> Result<Value, Error> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value, Error> {
        Ok(Value::String(v.to_owned()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, Error> {
        std::str::from_utf8(v)
            .map(|text| Value::String(text.to_owned()))
            .map_err(|err| Error::serialize(format!("bytes are not valid utf-8: {err}")))
    }

    fn serialize_none(self) -> Result<Value, Error> {
        Ok(Value::Undefined)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value, Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, Error> {
        Ok(Value::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value, Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, Error>
    where
        T: ?Sized + Serialize,
    {
        Ok(tagged(Some(variant), value.serialize(ValueSerializer)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, Error> {
        Ok(SeqBuilder::new(None, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, Error> {
        Ok(SeqBuilder::new(None, len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqBuilder, Error> {
        Ok(SeqBuilder::new(None, len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, Error> {
        Ok(SeqBuilder::new(Some(variant), len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, Error> {
        Ok(MapBuilder::new(None, len.unwrap_or(0)))
    }

    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<MapBuilder, Error> {
        Ok(MapBuilder::new(None, len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<MapBuilder, Error> {
        Ok(MapBuilder::new(Some(variant), len))
    }
}

/// Elements of every sequence shape. `Undefined` elements are kept so the
/// remaining ones keep their index.
struct SeqBuilder {
    variant: Option<&'static str>,
    items: Vec<Value>,
}

impl SeqBuilder {
    fn new(variant: Option<&'static str>, len: usize) -> Self {
        Self {
            variant,
            items: Vec::with_capacity(len),
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn finish(self) -> Value {
        tagged(self.variant, Value::Array(self.items))
    }
}

macro_rules! seq_builder_impl {
    ($($trait:ident::$method:ident),* $(,)?) => {
        $(
            impl ser::$trait for SeqBuilder {
                type Ok = Value;
                type Error = Error;

                fn $method<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
                    self.push(value)
                }

                fn end(self) -> Result<Value, Error> {
                    Ok(self.finish())
                }
            }
        )*
    };
}

seq_builder_impl! {
    SerializeSeq::serialize_element,
    SerializeTuple::serialize_element,
    SerializeTupleStruct::serialize_field,
    SerializeTupleVariant::serialize_field,
}

/// Entries of every mapping shape. `Undefined` entries are dropped, since
/// they would never be written anyway.
struct MapBuilder {
    variant: Option<&'static str>,
    map: Map,
    pending_key: Option<String>,
}

impl MapBuilder {
    fn new(variant: Option<&'static str>, len: usize) -> Self {
        Self {
            variant,
            map: Map::with_capacity(len),
            pending_key: None,
        }
    }

    fn put<T: ?Sized + Serialize>(&mut self, key: String, value: &T) -> Result<(), Error> {
        let value = value.serialize(ValueSerializer)?;
        if !value.is_undefined() {
            self.map.insert(key, value);
        }
        Ok(())
    }

    fn finish(self) -> Value {
        tagged(self.variant, Value::Object(self.map))
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Error> {
        self.pending_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| Error::serialize("map value serialized before its key"))?;
        self.put(key, value)
    }

    fn end(self) -> Result<Value, Error> {
        Ok(self.finish())
    }
}

macro_rules! struct_builder_impl {
    ($($trait:ident),* $(,)?) => {
        $(
            impl ser::$trait for MapBuilder {
                type Ok = Value;
                type Error = Error;

                fn serialize_field<T: ?Sized + Serialize>(
                    &mut self,
                    key: &'static str,
                    value: &T,
                ) -> Result<(), Error> {
                    self.put(key.to_owned(), value)
                }

                fn end(self) -> Result<Value, Error> {
                    Ok(self.finish())
                }
            }
        )*
    };
}

struct_builder_impl!(SerializeStruct, SerializeStructVariant);

/// Renders a map key as one bracket segment.
///
/// Keys are written unencoded, so a key that would read back as a different
/// path (empty, or containing `[`, `]`, `&` or `=`) is rejected.
struct KeySerializer;

fn checked_key(key: String) -> Result<String, Error> {
    if key.is_empty() {
        return Err(Error::serialize("empty map key cannot be written to a query"));
    }
    if key.contains(['[', ']', '&', '=']) {
        return Err(Error::serialize(format!(
            "map key `{key}` would not read back as a single key"
        )));
    }
    Ok(key)
}

macro_rules! integer_keys {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<String, Error> {
                Ok(itoa::Buffer::new().format(v).to_owned())
            }
        )*
    };
}

macro_rules! rejected_keys {
    ($($method:ident($($arg:ty),*) -> $ret:ty: $what:literal),* $(,)?) => {
        $(
            fn $method(self, $(_: $arg),*) -> Result<$ret, Error> {
                Err(Error::serialize(concat!($what, " cannot be a query key")))
            }
        )*
    };
}

impl ser::Serializer for KeySerializer {
    type Ok = String;
    type Error = Error;

    type SerializeSeq = Impossible<String, Error>;
    type SerializeTuple = Impossible<String, Error>;
    type SerializeTupleStruct = Impossible<String, Error>;
    type SerializeTupleVariant = Impossible<String, Error>;
    type SerializeMap = Impossible<String, Error>;
    type SerializeStruct = Impossible<String, Error>;
    type SerializeStructVariant = Impossible<String, Error>;

    integer_keys! {
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
    }

    rejected_keys! {
        serialize_bytes(&[u8]) -> String: "a byte string",
        serialize_none() -> String: "`None`",
        serialize_unit() -> String: "`()`",
        serialize_unit_struct(&'static str) -> String: "a unit struct",
        serialize_seq(Option<usize>) -> Self::SerializeSeq: "a sequence",
        serialize_tuple(usize) -> Self::SerializeTuple: "a tuple",
        serialize_tuple_struct(&'static str, usize) -> Self::SerializeTupleStruct: "a tuple struct",
        serialize_tuple_variant(&'static str, u32, &'static str, usize)
            -> Self::SerializeTupleVariant: "a tuple variant",
        serialize_map(Option<usize>) -> Self::SerializeMap: "a map",
        serialize_struct(&'static str, usize) -> Self::SerializeStruct: "a struct",
        serialize_struct_variant(&'static str, u32, &'static str, usize)
            -> Self::SerializeStructVariant: "a struct variant",
    }

    fn serialize_bool(self, v: bool) -> Result<String, Error> {
        Ok(if v { "true" } else { "false" }.to_owned())
    }

    fn serialize_f32(self, v: f32) -> Result<String, Error> {
        Ok(number_to_string(&Number::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<String, Error> {
        Ok(number_to_string(&Number::from(v)))
    }

    fn serialize_char(self, v: char) -> Result<String, Error> {
        checked_key(v.to_string())
    }

    fn serialize_str(self, v: &str) -> Result<String, Error> {
        checked_key(v.to_owned())
    }

    fn serialize_some<T>(self, value: &T) -> Result<String, Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<String, Error> {
        Ok(variant.to_owned())
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<String, Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<String, Error>
    where
        T: ?Sized + Serialize,
    {
        Err(Error::serialize("a newtype variant cannot be a query key"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::{Serialize, Serializer};

    use super::to_value;
    use crate::encode::stringify;
    use crate::types::{Number, Value};
    use crate::ErrorKind;

    #[derive(Serialize)]
    enum Shape {
        Dot,
        Circle(u32),
        Line(u8, u8),
        Rect { w: u32, h: u32 },
    }

    #[derive(Serialize)]
    struct Search {
        q: &'static str,
        cursor: Option<u32>,
        debug: (),
    }

    struct Raw(&'static [u8]);

    impl Serialize for Raw {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_bytes(self.0)
        }
    }

    fn query<T: Serialize>(value: &T) -> String {
        stringify(&to_value(value).unwrap())
    }

    #[rstest::rstest]
    fn test_absent_option_field_emits_nothing() {
        let search = Search {
            q: "x",
            cursor: None,
            debug: (),
        };
        let value = to_value(&search).unwrap();
        assert!(value.get("cursor").is_none());
        assert_eq!(query(&search), "q=x&debug");
    }

    #[rstest::rstest]
    fn test_absent_elements_keep_indices() {
        let items = vec![Some(1u8), None, Some(3)];
        assert_eq!(
            to_value(&items).unwrap(),
            Value::Array(vec![Value::from(1i64), Value::Undefined, Value::from(3i64)])
        );
        assert_eq!(query(&BTreeMap::from([("n", items)])), "n[0]=1&n[2]=3");
    }

    #[rstest::rstest]
    #[case(Shape::Dot, "shape=Dot")]
    #[case(Shape::Circle(3), "shape[Circle]=3")]
    #[case(Shape::Line(1, 2), "shape[Line][0]=1&shape[Line][1]=2")]
    #[case(Shape::Rect { w: 1, h: 2 }, "shape[Rect][w]=1&shape[Rect][h]=2")]
    fn test_enum_variants(#[case] shape: Shape, #[case] expected: &str) {
        assert_eq!(query(&BTreeMap::from([("shape", shape)])), expected);
    }

    #[rstest::rstest]
    fn test_bytes_are_text() {
        assert_eq!(to_value(&Raw(b"a b")).unwrap(), Value::from("a b"));
        let err = to_value(&Raw(&[0xff, 0x00])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialize);
    }

    #[rstest::rstest]
    fn test_scalar_map_keys() {
        let ints = BTreeMap::from([(1u8, "a"), (20u8, "b")]);
        assert_eq!(query(&ints), "1=a&20=b");
        let floats = to_value(&BTreeMap::from([("k", BTreeMap::from([(true, 1.5f64)]))]))
            .unwrap();
        assert_eq!(floats["k"]["true"], Value::Number(Number::Float(1.5)));
    }

    #[rstest::rstest]
    #[case("")]
    #[case("a[b]")]
    #[case("x=y")]
    #[case("p&q")]
    fn test_keys_that_change_the_path_are_rejected(#[case] key: &str) {
        let err = to_value(&BTreeMap::from([(key, 1)])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialize);
    }

    #[rstest::rstest]
    fn test_composite_map_keys_are_rejected() {
        let err = to_value(&BTreeMap::from([((1, 2), "a")])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialize);
        assert!(err.message.contains("tuple"), "{}", err.message);
    }

    #[rstest::rstest]
    fn test_wide_integers() {
        assert_eq!(
            to_value(&(u64::MAX as i128)).unwrap(),
            Value::Number(Number::PosInt(u64::MAX))
        );
        assert_eq!(to_value(&-5i128).unwrap(), Value::from(-5i64));
        assert!(to_value(&i128::MIN).is_err());
        assert!(to_value(&u128::MAX).is_err());
    }
}
