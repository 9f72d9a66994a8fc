//! # strto
//!
//! Type-directed parsing of strings into strongly-typed values.
//!
//! Give `strto` a target type and a piece of text (a plain literal, a JSON
//! literal, `key=value` pairs or an `@file` reference) and it produces a
//! value of that type, or an error that names the field path where the
//! input went wrong.
//!
//! ## Key Features
//!
//! - **Type-directed**: the target type decides how text is read; `"1,2,3"`
//!   is a list for `Vec<u8>` and an error for `u8`
//! - **Generic decomposition**: `HashMap<String, Vec<Option<u16>>>` is parsed
//!   by combining the map, list, optional and integer parsers
//! - **Unions**: members are tried in declaration order, and a failure
//!   reports every member's cause
//! - **Records**: structs are built from JSON, from `key=value` text with
//!   dotted keys for nesting, or from JSON/YAML files
//! - **Literal choices**: `TypeDesc::literal` or `Literal['a', 1]` restricts
//!   input to a fixed set of values
//! - **Overridable**: any built-in parser can be replaced per type
//! - **Serde compatible**: typed results are produced through `Deserialize`
//!
//! ## Quick Start
//!
//! ```rust
//! use strto::TypeParser;
//!
//! let parser = TypeParser::new();
//!
//! let n: i64 = parser.parse("5").unwrap();
//! assert_eq!(n, 5);
//!
//! let list: Vec<i64> = parser.parse("1,2,3,4,5").unwrap();
//! assert_eq!(list, vec![1, 2, 3, 4, 5]);
//!
//! let range: strto::StepRange = parser.parse("0:5:1").unwrap();
//! assert_eq!(range.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
//! ```
//!
//! ### Records
//!
//! ```rust
//! use serde::Deserialize;
//! use strto::{record, TypeParser};
//!
//! #[derive(Debug, Deserialize, PartialEq)]
//! struct NetworkAddress {
//!     host: String,
//!     port: u16,
//! }
//!
//! #[derive(Debug, Deserialize, PartialEq)]
//! struct AppConfig {
//!     debug: bool,
//!     network: Option<NetworkAddress>,
//! }
//!
//! record!(NetworkAddress { host: String, port: u16 });
//! record!(AppConfig { debug: bool, network: Option<NetworkAddress> });
//!
//! let parser = TypeParser::new();
//! let from_kv: AppConfig = parser
//!     .parse("debug=true network.host=db network.port=5433")
//!     .unwrap();
//! let from_json: AppConfig = parser
//!     .parse(r#"{"debug": true, "network": {"host": "db", "port": 5433}}"#)
//!     .unwrap();
//! assert_eq!(from_kv, from_json);
//! ```
//!
//! ### Runtime types
//!
//! ```rust
//! use strto::{TypeDesc, TypeParser};
//!
//! let parser = TypeParser::new();
//! let ty = TypeDesc::parse_expr("dict[str, list[int]]");
//! let value = parser.parse_value(r#"{"a": "1,2", "b": [3]}"#, &ty).unwrap();
//! assert_eq!(value.to_string(), "{a: [1, 2], b: [3]}");
//! ```
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Numeric expressions are evaluated by a closed arithmetic grammar; input
//!   is never executed
//! - No panics in the public API

mod builtins;
pub mod describe;
pub mod descriptor;
pub mod error;
mod file;
pub mod input;
pub mod macros;
pub mod map;
pub mod model;
pub mod options;
pub mod parser;
pub mod registry;
mod type_expr;
pub mod value;

pub use describe::{describe, descriptor_of, Describe};
pub use descriptor::{EnumDesc, ExactType, FieldDesc, LiteralDesc, Origin, RecordDesc, TypeDesc};
pub use error::{Error, ErrorKind, Rejection, Result};
pub use input::{Envelope, FieldPath, Input, Segment};
pub use map::ValueMap;
pub use model::ModelBuilder;
pub use options::{Delimiter, ParserOptions};
pub use parser::TypeParser;
pub use registry::{Capability, ContainerParser, Registry, Resolved, ValueParser};
pub use value::{Number, SliceBounds, StepRange, Value};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Parses `raw` into `T` with a fresh default [`TypeParser`].
///
/// Build a [`TypeParser`] once and reuse it when parsing repeatedly or when
/// custom parsers are needed.
///
/// # Examples
///
/// ```rust
/// let flags: Vec<bool> = strto::parse("yes,no,1").unwrap();
/// assert_eq!(flags, vec![true, false, true]);
/// ```
///
/// # Errors
///
/// Returns an error if the text does not parse as `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse<T>(raw: &str) -> Result<T>
where
    T: Describe + DeserializeOwned + 'static,
{
    TypeParser::new().parse(raw)
}

/// Converts a parsed [`Value`] into any `T: Deserialize`.
///
/// # Examples
///
/// ```rust
/// use strto::{from_value, Value};
///
/// let n: u16 = from_value(Value::from(8080)).unwrap();
/// assert_eq!(n, 8080);
/// assert!(from_value::<u8>(Value::from(300)).is_err());
/// ```
///
/// # Errors
///
/// Returns [`Error::Decode`] when the value does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    let json = serde_json::to_value(&value).map_err(Error::decode)?;
    serde_json::from_value(json).map_err(Error::decode)
}

/// Converts any `T: Serialize` into a [`Value`].
///
/// # Examples
///
/// ```rust
/// use strto::{to_value, Value};
///
/// let value = to_value(&vec![1, 2]).unwrap();
/// assert_eq!(value, Value::Array(vec![Value::from(1), Value::from(2)]));
/// ```
///
/// # Errors
///
/// Returns [`Error::Decode`] if the value cannot be represented.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Serialize,
{
    let json = serde_json::to_value(value).map_err(Error::decode)?;
    Value::deserialize(json).map_err(Error::decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    record!(Point { x: i32, y: i32 = 0 });

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse::<i64>("5").unwrap(), 5);
        assert_eq!(parse::<f64>("2.5").unwrap(), 2.5);
        assert!(parse::<bool>("TRUE").unwrap());
        assert_eq!(parse::<String>("  keep spaces ").unwrap(), "  keep spaces ");
        assert_eq!(parse::<char>("x").unwrap(), 'x');
    }

    #[test]
    fn test_parse_record_with_default() {
        assert_eq!(parse::<Point>("x=3").unwrap(), Point { x: 3, y: 0 });
        assert_eq!(parse::<Point>(r#"{"x": 1, "y": 2}"#).unwrap(), Point { x: 1, y: 2 });
    }

    #[test]
    fn test_to_value_roundtrip() {
        let point = Point { x: 1, y: 2 };
        let value = to_value(&point).unwrap();
        match &value {
            Value::Object(obj) => {
                assert_eq!(obj.get("x"), Some(&Value::Number(Number::Integer(1))));
                assert_eq!(obj.get("y"), Some(&Value::Number(Number::Integer(2))));
            }
            _ => panic!("Expected object"),
        }
        assert_eq!(from_value::<Point>(value).unwrap(), point);
    }

    #[test]
    fn test_ordered_map_output() {
        let map: BTreeMap<String, Vec<u8>> = parse(r#"{"b": "1,2", "a": [3]}"#).unwrap();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(map["b"], vec![1, 2]);
    }

    #[test]
    fn test_unsupported_type_is_reported_at_parse_time() {
        struct Opaque;
        impl Describe for Opaque {
            fn describe() -> TypeDesc {
                TypeDesc::exact("Opaque")
            }
        }
        let parser = TypeParser::new();
        assert!(!parser.is_supported(&describe::<Opaque>()));
        let err = parser.parse_value("x", &describe::<Opaque>()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }
}
