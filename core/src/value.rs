//! Scalar values exchanged with storage providers.
//!
//! [`Value`] mirrors the storage classes of an embedded SQL engine. The
//! [`ToValue`] and [`FromValue`] traits convert model fields to and from
//! it, applying the coercions of each semantic type: booleans travel as
//! `0`/`1` integers, URIs as text, and `Option<T>` as `NULL` when empty.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MappingError;

/// A single cell or bound argument.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for values an auto-increment key treats as "not yet assigned".
    pub fn is_unset_key(&self) -> bool {
        matches!(self, Self::Null | Self::Integer(0))
    }

    /// Storage class name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Integer(i64::from(v))
    }
}

macro_rules! integer_from {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::Integer(i64::from(v))
            }
        })*
    };
}

integer_from!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Real(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Self::Blob(v.to_vec())
    }
}

impl From<Uri> for Value {
    fn from(v: Uri) -> Self {
        Self::Text(v.0)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// A resource identifier stored as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Uri(String);

impl Uri {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uri {
    fn from(v: &str) -> Self {
        Self(v.to_string())
    }
}

impl From<String> for Uri {
    fn from(v: String) -> Self {
        Self(v)
    }
}

/// Converts a model field into a storage value.
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Coerces a storage value into a model field.
///
/// `column` is only used to name the cell in a [`MappingError`].
pub trait FromValue: Sized {
    fn from_value(column: &str, value: &Value) -> Result<Self, MappingError>;
}

fn mismatch(column: &str, expected: &'static str, found: &Value) -> MappingError {
    MappingError::TypeMismatch {
        column: column.to_string(),
        expected,
        found: found.type_name(),
    }
}

macro_rules! integer_conversions {
    ($($ty:ty),*) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::from(*self)
                }
            }

            impl FromValue for $ty {
                fn from_value(column: &str, value: &Value) -> Result<Self, MappingError> {
                    match value {
                        Value::Integer(v) => <$ty>::try_from(*v).map_err(|_| MappingError::OutOfRange {
                            column: column.to_string(),
                            expected: stringify!($ty),
                            value: *v,
                        }),
                        other => Err(mismatch(column, stringify!($ty), other)),
                    }
                }
            }
        )*
    };
}

integer_conversions!(i8, i16, i32, i64, u8, u16, u32);

impl ToValue for isize {
    fn to_value(&self) -> Value {
        // isize is at most 64 bits on every supported target
        Value::Integer(*self as i64)
    }
}

impl FromValue for isize {
    fn from_value(column: &str, value: &Value) -> Result<Self, MappingError> {
        match value {
            Value::Integer(v) => isize::try_from(*v).map_err(|_| MappingError::OutOfRange {
                column: column.to_string(),
                expected: "isize",
                value: *v,
            }),
            other => Err(mismatch(column, "isize", other)),
        }
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl FromValue for bool {
    fn from_value(column: &str, value: &Value) -> Result<Self, MappingError> {
        match value {
            Value::Integer(v) => Ok(*v != 0),
            other => Err(mismatch(column, "bool", other)),
        }
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

impl FromValue for f64 {
    fn from_value(column: &str, value: &Value) -> Result<Self, MappingError> {
        match value {
            Value::Real(v) => Ok(*v),
            // REAL affinity may hand back whole numbers as integers
            Value::Integer(v) => Ok(*v as f64),
            other => Err(mismatch(column, "f64", other)),
        }
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl FromValue for f32 {
    fn from_value(column: &str, value: &Value) -> Result<Self, MappingError> {
        f64::from_value(column, value)
            .map(|v| v as f32)
            .map_err(|_| mismatch(column, "f32", value))
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FromValue for String {
    fn from_value(column: &str, value: &Value) -> Result<Self, MappingError> {
        match value {
            Value::Text(v) => Ok(v.clone()),
            other => Err(mismatch(column, "String", other)),
        }
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }
}

impl FromValue for Vec<u8> {
    fn from_value(column: &str, value: &Value) -> Result<Self, MappingError> {
        match value {
            Value::Blob(v) => Ok(v.clone()),
            other => Err(mismatch(column, "Vec<u8>", other)),
        }
    }
}

impl ToValue for Uri {
    fn to_value(&self) -> Value {
        Value::Text(self.0.clone())
    }
}

impl FromValue for Uri {
    fn from_value(column: &str, value: &Value) -> Result<Self, MappingError> {
        match value {
            Value::Text(v) => Ok(Self(v.clone())),
            other => Err(mismatch(column, "Uri", other)),
        }
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToValue::to_value)
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(column: &str, value: &Value) -> Result<Self, MappingError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(column, other).map(Some),
        }
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(_column: &str, value: &Value) -> Result<Self, MappingError> {
        Ok(value.clone())
    }
}
