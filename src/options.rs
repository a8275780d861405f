use std::fmt;
use std::str::FromStr;

use crate::constants::DEFAULT_ARRAY_LIMIT;
use crate::Error;

/// Scalar type a decoded value may be coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Null,
    Undefined,
    Boolean,
    Number,
}

impl ValueType {
    pub const ALL: [ValueType; 4] = [
        ValueType::Null,
        ValueType::Undefined,
        ValueType::Boolean,
        ValueType::Number,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Null => "null",
            ValueType::Undefined => "undefined",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            ValueType::Null => 1,
            ValueType::Undefined => 1 << 1,
            ValueType::Boolean => 1 << 2,
            ValueType::Number => 1 << 3,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValueType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "null" => Ok(ValueType::Null),
            "undefined" => Ok(ValueType::Undefined),
            "boolean" => Ok(ValueType::Boolean),
            "number" => Ok(ValueType::Number),
            other => Err(Error::invalid_option(format!(
                "unknown value type `{other}`"
            ))),
        }
    }
}

/// Set of [`ValueType`]s enabled for coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ValueTypes(u8);

impl ValueTypes {
    pub const fn empty() -> Self {
        ValueTypes(0)
    }

    pub const fn all() -> Self {
        ValueTypes(0b1111)
    }

    pub const fn with(self, ty: ValueType) -> Self {
        ValueTypes(self.0 | ty.bit())
    }

    pub fn insert(&mut self, ty: ValueType) {
        self.0 |= ty.bit();
    }

    pub const fn contains(self, ty: ValueType) -> bool {
        self.0 & ty.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Builds a set from type names such as `"number"` or `"boolean"`.
    pub fn from_names<'a, I>(names: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .map(ValueType::from_str)
            .collect::<crate::Result<ValueTypes>>()
    }

    pub fn iter(self) -> impl Iterator<Item = ValueType> {
        ValueType::ALL.into_iter().filter(move |ty| self.contains(*ty))
    }
}

impl FromIterator<ValueType> for ValueTypes {
    fn from_iter<I: IntoIterator<Item = ValueType>>(iter: I) -> Self {
        let mut types = ValueTypes::empty();
        for ty in iter {
            types.insert(ty);
        }
        types
    }
}

impl From<ValueType> for ValueTypes {
    fn from(ty: ValueType) -> Self {
        ValueTypes::empty().with(ty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    pub types: ValueTypes,
    pub array_limit: usize,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with every [`ValueType`] enabled.
    pub fn typed() -> Self {
        Self::default().with_types(ValueTypes::all())
    }

    pub fn with_types(mut self, types: impl Into<ValueTypes>) -> Self {
        self.types = types.into();
        self
    }

    pub fn with_type(mut self, ty: ValueType) -> Self {
        self.types.insert(ty);
        self
    }

    pub fn with_array_limit(mut self, array_limit: usize) -> Self {
        self.array_limit = array_limit;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            types: ValueTypes::empty(),
            array_limit: DEFAULT_ARRAY_LIMIT,
        }
    }
}
