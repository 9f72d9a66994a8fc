//! Dynamic representation of parsed values.
//!
//! Every parser produces a [`Value`]. Typed callers never see it directly:
//! [`TypeParser::parse`](crate::TypeParser::parse) converts it into the
//! requested Rust type through serde. Working with [`Value`] is useful when
//! the target type is only known at runtime (for example a type expression
//! read from a config file).
//!
//! ## Core Types
//!
//! - [`Value`]: null, bool, number, string, array, object, date, datetime, time, range, bigint
//! - [`Number`]: a 64-bit integer or a float
//! - [`StepRange`]: the `start:stop:step` range produced by the `range` parser
//! - [`SliceBounds`]: the optional bounds produced by the `slice` parser
//!
//! ## Examples
//!
//! ```rust
//! use strto::{TypeDesc, TypeParser, Value};
//!
//! let parser = TypeParser::new();
//! let value = parser.parse_value("1,2,3", &TypeDesc::parse_expr("list[int]")).unwrap();
//! assert_eq!(value, Value::Array(vec![1.into(), 2.into(), 3.into()]));
//! ```

use crate::ValueMap;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use num_bigint::BigInt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A dynamically-typed parse result.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(ValueMap),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Time(NaiveTime),
    Range(StepRange),
    BigInt(BigInt),
}

/// A numeric value: a 64-bit integer or a float.
///
/// # Examples
///
/// ```rust
/// use strto::Number;
///
/// assert_eq!(Number::Integer(42).as_i64(), Some(42));
/// assert_eq!(Number::Float(42.0).as_i64(), Some(42));
/// assert_eq!(Number::Float(3.5).as_f64(), 3.5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    #[inline]
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_float(&self) -> bool {
        matches!(self, Number::Float(_))
    }

    /// Converts this number to an `i64` if it has no fractional part and fits.
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Number::Integer(i) => Some(*i),
            Number::Float(f) => {
                if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match self {
            Number::Integer(i) => *i as f64,
            Number::Float(f) => *f,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            Number::Float(fl) => write!(f, "{}", fl),
        }
    }
}

/// An integer range with an explicit step, as written `start:stop[:step]`.
///
/// Like a half-open `start..stop`, `stop` is excluded. A negative step walks
/// downwards.
///
/// # Examples
///
/// ```rust
/// use strto::StepRange;
///
/// let range = StepRange::new(0, 10, 3);
/// assert_eq!(range.iter().collect::<Vec<_>>(), vec![0, 3, 6, 9]);
/// assert_eq!(StepRange::new(5, 0, -2).iter().collect::<Vec<_>>(), vec![5, 3, 1]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StepRange {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl StepRange {
    #[must_use]
    pub const fn new(start: i64, stop: i64, step: i64) -> Self {
        StepRange { start, stop, step }
    }

    /// Iterates the values of the range. A zero step yields nothing.
    pub fn iter(&self) -> impl Iterator<Item = i64> {
        let StepRange { start, stop, step } = *self;
        std::iter::successors(Some(start), move |x| x.checked_add(step))
            .take_while(move |x| match step {
                s if s > 0 => *x < stop,
                s if s < 0 => *x > stop,
                _ => false,
            })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// Bounds read by the `slice` parser. Every part may be left out, so `::2`
/// and `3:` are both valid.
///
/// # Examples
///
/// ```rust
/// use strto::SliceBounds;
///
/// let half: SliceBounds = strto::parse("0.5:").unwrap();
/// assert_eq!(half, SliceBounds { start: Some(0.5), stop: None, step: None });
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SliceBounds {
    pub start: Option<f64>,
    pub stop: Option<f64>,
    pub step: Option<f64>,
}

impl Value {
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an i64 integer or a whole-number float, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strto::{Value, Number};
    ///
    /// assert_eq!(Value::Number(Number::Integer(42)).as_i64(), Some(42));
    /// assert_eq!(Value::Number(Number::Float(42.5)).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            Value::BigInt(bi) => i64::try_from(bi).ok(),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.as_f64()),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(arr) => Some(arr),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&ValueMap> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_range(&self) -> Option<&StepRange> {
        match self {
            Value::Range(range) => Some(range),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Time(_) => "time",
            Value::Range(_) => "range",
            Value::BigInt(_) => "bigint",
        }
    }

    /// Canonical text of a scalar, used as a mapping key.
    ///
    /// Returns `None` for values that cannot be keys (null, arrays, objects,
    /// ranges).
    #[must_use]
    pub fn key_string(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::Date(d) => Some(d.to_string()),
            Value::DateTime(dt) => Some(dt.to_rfc3339()),
            Value::Time(t) => Some(t.to_string()),
            Value::BigInt(bi) => Some(bi.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) | Value::Range(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(arr) => {
                write!(
                    f,
                    "[{}]",
                    arr.iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            Value::Object(obj) => {
                write!(
                    f,
                    "{{{}}}",
                    obj.iter()
                        .map(|(k, v)| format!("{}: {}", k, v))
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            }
            Value::Date(d) => write!(f, "{}", d),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Time(t) => write!(f, "{}", t),
            Value::Range(r) => write!(f, "{}:{}:{}", r.start, r.stop, r.step),
            Value::BigInt(bi) => write!(f, "{}", bi),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(Number::Integer(i)) => serializer.serialize_i64(*i),
            Value::Number(Number::Float(f)) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(arr.len()))?;
                for element in arr {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Object(obj) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(obj.len()))?;
                for (k, v) in obj.iter() {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Date(d) => serializer.collect_str(d),
            Value::DateTime(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            Value::Time(t) => serializer.collect_str(t),
            Value::Range(r) => r.serialize(serializer),
            Value::BigInt(bi) => {
                if let Ok(i) = i64::try_from(bi) {
                    serializer.serialize_i64(i)
                } else if let Ok(u) = u64::try_from(bi) {
                    serializer.serialize_u64(u)
                } else {
                    serializer.collect_str(bi)
                }
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any JSON-like value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(Value::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Integer(value)))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                match i64::try_from(value) {
                    Ok(i) => Ok(Value::Number(Number::Integer(i))),
                    Err(_) => Ok(Value::BigInt(BigInt::from(value))),
                }
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(Value::Number(Number::Float(value)))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Value::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(Value::String(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(Value::Null)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut vec = Vec::new();
                while let Some(elem) = seq.next_element()? {
                    vec.push(elem);
                }
                Ok(Value::Array(vec))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut values = ValueMap::new();
                while let Some((key, value)) = map.next_entry()? {
                    values.insert(key, value);
                }
                Ok(Value::Object(values))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

// TryFrom implementations for extracting values from Value
impl TryFrom<Value> for i64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_i64()
            .ok_or_else(|| crate::Error::decode(format!("expected integer, found {}", value)))
    }
}

impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        value
            .as_f64()
            .ok_or_else(|| crate::Error::decode(format!("expected number, found {}", value)))
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            _ => Err(crate::Error::decode(format!("expected bool, found {}", value))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            _ => Err(crate::Error::decode(format!(
                "expected string, found {}",
                value
            ))),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::Integer(i64::from(value)))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Number(Number::Float(f64::from(value)))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(Number::Float(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::Array(value)
    }
}

impl From<ValueMap> for Value {
    fn from(value: ValueMap) -> Self {
        Value::Object(value)
    }
}

impl From<StepRange> for Value {
    fn from(value: StepRange) -> Self {
        Value::Range(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Value::DateTime(value)
    }
}

impl From<NaiveTime> for Value {
    fn from(value: NaiveTime) -> Self {
        Value::Time(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn test_tryfrom_i64() {
        let value = Value::Number(Number::Integer(42));
        let result: i64 = TryFrom::try_from(value).unwrap();
        assert_eq!(result, 42);

        let value = Value::Number(Number::Float(42.0));
        let result: i64 = TryFrom::try_from(value).unwrap();
        assert_eq!(result, 42);

        let value = Value::String("test".to_string());
        assert!(i64::try_from(value).is_err());
    }

    #[test]
    fn test_tryfrom_bool_and_string() {
        assert!(bool::try_from(Value::Bool(true)).unwrap());
        assert!(bool::try_from(Value::from(1)).is_err());
        assert_eq!(String::try_from(Value::from("hi")).unwrap(), "hi");
        assert!(String::try_from(Value::from(42)).is_err());
    }

    #[test]
    fn test_key_string() {
        assert_eq!(Value::from(7).key_string().as_deref(), Some("7"));
        assert_eq!(Value::from(true).key_string().as_deref(), Some("true"));
        assert_eq!(Value::Array(vec![]).key_string(), None);
        assert_eq!(Value::Null.key_string(), None);
    }

    #[test]
    fn test_serialize_to_json() {
        let mut obj = ValueMap::new();
        obj.insert("range".to_string(), Value::Range(StepRange::new(0, 5, 1)));
        obj.insert(
            "day".to_string(),
            Value::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
        );
        obj.insert("big".to_string(), Value::BigInt(BigInt::from(u64::MAX)));
        let json = serde_json::to_value(Value::Object(obj)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "range": {"start": 0, "stop": 5, "step": 1},
                "day": "2024-01-15",
                "big": u64::MAX
            })
        );
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = serde_json::json!({"a": [1, 2.5, "x", null], "b": u64::MAX});
        let value: Value = serde_json::from_value(json).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(
            obj.get("a"),
            Some(&Value::Array(vec![
                Value::from(1),
                Value::from(2.5),
                Value::from("x"),
                Value::Null
            ]))
        );
        assert_eq!(obj.get("b"), Some(&Value::BigInt(BigInt::from(u64::MAX))));
    }

    #[test]
    fn test_step_range_iteration() {
        assert_eq!(StepRange::new(0, 5, 1).iter().count(), 5);
        assert!(StepRange::new(5, 0, 1).is_empty());
        assert!(StepRange::new(0, 5, 0).is_empty());
    }
}
