//! The [`TypeParser`] facade.

use crate::describe::{descriptor_of, Describe};
use crate::descriptor::{RecordDesc, TypeDesc};
use crate::input::{Envelope, Input};
use crate::{from_value, Capability, ParserOptions, Registry, Result, Value, ValueParser};
use serde::de::DeserializeOwned;

/// Parses text into typed values.
///
/// Built-in parsers are registered on construction. [`add`](Self::add)
/// overrides or extends them and needs `&mut self`; parsing only needs
/// `&self`, so a configured parser can be shared across threads.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
/// use strto::TypeParser;
///
/// let parser = TypeParser::new();
/// assert_eq!(parser.parse::<i32>("5").unwrap(), 5);
/// assert_eq!(parser.parse::<Vec<u8>>("1,2,3").unwrap(), vec![1, 2, 3]);
///
/// let scores: HashMap<String, i64> = parser.parse(r#"{"a": 1, "b": 2}"#).unwrap();
/// assert_eq!(scores["b"], 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeParser {
    registry: Registry,
}

impl TypeParser {
    /// A parser with every built-in capability and default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(options: ParserOptions) -> Self {
        TypeParser {
            registry: Registry::with_builtins(options),
        }
    }

    /// Wraps a caller-built registry as is.
    #[must_use]
    pub fn from_registry(registry: Registry) -> Self {
        TypeParser { registry }
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parses `raw` into `T`.
    ///
    /// # Errors
    ///
    /// Any [`Error`](crate::Error) raised while parsing, or
    /// [`Error::Decode`](crate::Error::Decode) when the parsed value does
    /// not fit `T`.
    pub fn parse<T>(&self, raw: &str) -> Result<T>
    where
        T: Describe + DeserializeOwned + 'static,
    {
        let desc = descriptor_of::<T>();
        let value = self.parse_value(raw, &desc)?;
        from_value(value)
    }

    /// Parses `raw` against a runtime descriptor.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strto::{TypeDesc, TypeParser, Value};
    ///
    /// let parser = TypeParser::new();
    /// let ty = TypeDesc::parse_expr("int | float");
    /// assert_eq!(parser.parse_value("3", &ty).unwrap(), Value::from(3));
    /// assert_eq!(parser.parse_value("3.5", &ty).unwrap(), Value::from(3.5));
    /// ```
    pub fn parse_value(&self, raw: &str, ty: &TypeDesc) -> Result<Value> {
        self.registry.parse(&Envelope::root(Input::Text(raw)), ty)
    }

    /// Parses an already-decoded JSON value against a runtime descriptor.
    pub fn parse_json(&self, json: &serde_json::Value, ty: &TypeDesc) -> Result<Value> {
        self.registry.parse(&Envelope::root(Input::Json(json)), ty)
    }

    /// Registers `parser` for `T`, replacing the built-in one if any.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strto::{Rejection, TypeParser, Value};
    ///
    /// let mut parser = TypeParser::new();
    /// parser.add::<bool>(|raw: &str| -> Result<Value, Rejection> {
    ///     Ok(Value::Bool(raw == "si"))
    /// });
    /// assert!(parser.parse::<bool>("si").unwrap());
    /// assert!(!parser.parse::<bool>("true").unwrap());
    /// ```
    pub fn add<T>(&mut self, parser: impl ValueParser + 'static)
    where
        T: Describe + ?Sized + 'static,
    {
        self.registry
            .register(&descriptor_of::<T>(), Capability::leaf(parser));
    }

    /// Registers any capability for a runtime descriptor.
    pub fn add_capability(&mut self, ty: &TypeDesc, capability: Capability) {
        self.registry.register(ty, capability);
    }

    /// Declares the field list of an opaque type for the opt-in constructor
    /// mode.
    pub fn declare_constructor(&mut self, record: RecordDesc) {
        self.registry.declare_constructor(record);
    }

    #[must_use]
    pub fn is_supported(&self, ty: &TypeDesc) -> bool {
        self.registry.is_supported(ty)
    }

    /// Returns a closure that parses into `T`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strto::TypeParser;
    ///
    /// let parser = TypeParser::new();
    /// let port = parser.parse_fn::<u16>();
    /// assert_eq!(port("8080").unwrap(), 8080);
    /// assert!(port("http").is_err());
    /// ```
    pub fn parse_fn<T>(&self) -> impl Fn(&str) -> Result<T> + '_
    where
        T: Describe + DeserializeOwned + 'static,
    {
        move |raw: &str| self.parse::<T>(raw)
    }

    /// Number of registered capabilities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Rejection};

    #[test]
    fn test_parser_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TypeParser>();
    }

    #[test]
    fn test_override_only_affects_exact_type() {
        let mut parser = TypeParser::new();
        let before = parser.len();
        parser.add::<i64>(|_: &str| -> std::result::Result<Value, Rejection> { Ok(Value::from(-1)) });
        assert_eq!(parser.len(), before);
        assert_eq!(parser.parse::<i64>("5").unwrap(), -1);
        assert_eq!(parser.parse::<i32>("5").unwrap(), 5);
        assert_eq!(parser.parse::<Vec<i64>>("1,2").unwrap(), vec![-1, -1]);
    }

    #[test]
    fn test_decode_error_for_mismatched_capability() {
        let mut parser = TypeParser::new();
        parser.add::<u8>(|_: &str| -> std::result::Result<Value, Rejection> { Ok(Value::from("text")) });
        assert_eq!(parser.parse::<u8>("1").unwrap_err().kind(), ErrorKind::Decode);
    }

    #[test]
    fn test_parse_json_node() {
        let parser = TypeParser::new();
        let node = serde_json::json!(["1", 2, "3"]);
        let value = parser.parse_json(&node, &crate::describe::<Vec<u8>>()).unwrap();
        assert_eq!(value, Value::Array(vec![1.into(), 2.into(), 3.into()]));
    }
}
