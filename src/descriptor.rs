//! Canonical type descriptors.
//!
//! A [`TypeDesc`] is the decomposed form of a target type that every other
//! component works on: an exact type, a generic container with its
//! arguments, a union, a record with its field list, an enumeration or a
//! literal choice list.
//! Descriptors are immutable values; build them with the constructors here,
//! derive them from Rust types with [`Describe`](crate::Describe), or parse
//! them from text with [`TypeDesc::parse_expr`].

use crate::{to_value, Value};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Name of the null-like exact type used for optional values.
pub const NULL: &str = "null";

/// Name of the exact type that accepts any JSON value.
pub const ANY: &str = "json";

/// A concrete type identified by name.
///
/// Supertypes stand in for inheritance: when no parser is registered for the
/// type itself, the registry falls back to the first registered supertype.
///
/// # Examples
///
/// ```rust
/// use strto::ExactType;
///
/// let port = ExactType::new("Port").with_supertype("u16");
/// assert_eq!(port.name(), "Port");
/// assert_eq!(port.supertypes().collect::<Vec<_>>(), vec!["u16"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExactType {
    name: Cow<'static, str>,
    supertypes: Vec<Cow<'static, str>>,
}

impl ExactType {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        ExactType {
            name: name.into(),
            supertypes: Vec::new(),
        }
    }

    /// Appends a supertype. Earlier supertypes take precedence.
    #[must_use]
    pub fn with_supertype(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.supertypes.push(name.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.supertypes.iter().map(|s| s.as_ref())
    }
}

/// Container kind of a generic type, independent of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    List,
    Set,
    Tuple,
    Map,
}

impl Origin {
    /// Registry key of the origin.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Origin::List => "list",
            Origin::Set => "set",
            Origin::Tuple => "tuple",
            Origin::Map => "map",
        }
    }

    /// Number of type arguments the origin takes, `None` for any non-zero
    /// count.
    #[must_use]
    pub const fn arity(self) -> Option<usize> {
        match self {
            Origin::List | Origin::Set => Some(1),
            Origin::Map => Some(2),
            Origin::Tuple => None,
        }
    }
}

/// Canonical representation of a target type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDesc {
    Exact(ExactType),
    Generic { origin: Origin, args: Vec<TypeDesc> },
    Union(Vec<TypeDesc>),
    Record(Arc<RecordDesc>),
    Enum(Arc<EnumDesc>),
    Literal(Arc<LiteralDesc>),
    /// A shape nothing can parse. Reported only when a parse needs it.
    Unresolvable(String),
}

impl TypeDesc {
    pub fn exact(name: impl Into<Cow<'static, str>>) -> Self {
        TypeDesc::Exact(ExactType::new(name))
    }

    #[must_use]
    pub fn null() -> Self {
        TypeDesc::exact(NULL)
    }

    #[must_use]
    pub fn any() -> Self {
        TypeDesc::exact(ANY)
    }

    /// Builds a generic descriptor, checking the argument count.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strto::{Origin, TypeDesc};
    ///
    /// let ok = TypeDesc::generic(Origin::Map, vec![TypeDesc::exact("str"), TypeDesc::exact("i64")]);
    /// assert_eq!(ok.to_string(), "map<str, i64>");
    ///
    /// let bad = TypeDesc::generic(Origin::Map, vec![TypeDesc::exact("str")]);
    /// assert!(matches!(bad, TypeDesc::Unresolvable(_)));
    /// ```
    #[must_use]
    pub fn generic(origin: Origin, args: Vec<TypeDesc>) -> Self {
        let arity_ok = match origin.arity() {
            Some(n) => args.len() == n,
            None => !args.is_empty(),
        };
        if arity_ok {
            TypeDesc::Generic { origin, args }
        } else {
            TypeDesc::Unresolvable(format!(
                "{} takes {} type argument(s), found {}",
                origin.name(),
                origin.arity().map_or_else(|| "1 or more".to_string(), |n| n.to_string()),
                args.len()
            ))
        }
    }

    #[must_use]
    pub fn list(item: TypeDesc) -> Self {
        TypeDesc::generic(Origin::List, vec![item])
    }

    #[must_use]
    pub fn set(item: TypeDesc) -> Self {
        TypeDesc::generic(Origin::Set, vec![item])
    }

    #[must_use]
    pub fn map(key: TypeDesc, value: TypeDesc) -> Self {
        TypeDesc::generic(Origin::Map, vec![key, value])
    }

    #[must_use]
    pub fn tuple(items: Vec<TypeDesc>) -> Self {
        TypeDesc::generic(Origin::Tuple, items)
    }

    /// Builds a union, flattening nested unions and dropping duplicates while
    /// keeping declaration order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strto::TypeDesc;
    ///
    /// let inner = TypeDesc::union([TypeDesc::exact("i64"), TypeDesc::exact("str")]);
    /// let outer = TypeDesc::union([inner, TypeDesc::exact("i64"), TypeDesc::null()]);
    /// assert_eq!(outer.to_string(), "i64 | str | null");
    /// ```
    pub fn union(members: impl IntoIterator<Item = TypeDesc>) -> Self {
        let mut flat: Vec<TypeDesc> = Vec::new();
        for member in members {
            let nested = match member {
                TypeDesc::Union(inner) => inner,
                other => vec![other],
            };
            for m in nested {
                if !flat.contains(&m) {
                    flat.push(m);
                }
            }
        }
        match flat.len() {
            0 => TypeDesc::Unresolvable("empty union".to_string()),
            1 => flat.remove(0),
            _ => TypeDesc::Union(flat),
        }
    }

    /// `inner | null`.
    #[must_use]
    pub fn optional(inner: TypeDesc) -> Self {
        TypeDesc::union([inner, TypeDesc::null()])
    }

    #[must_use]
    pub fn record(record: RecordDesc) -> Self {
        TypeDesc::Record(Arc::new(record))
    }

    #[must_use]
    pub fn enumeration(desc: EnumDesc) -> Self {
        TypeDesc::Enum(Arc::new(desc))
    }

    /// A closed set of allowed scalar values.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strto::{TypeDesc, Value};
    ///
    /// let mode = TypeDesc::literal([Value::from("fast"), Value::from(3)]);
    /// assert_eq!(mode.to_string(), r#"literal["fast", 3]"#);
    /// ```
    pub fn literal(choices: impl IntoIterator<Item = Value>) -> Self {
        TypeDesc::Literal(Arc::new(LiteralDesc::new(choices)))
    }

    /// Returns `true` for the null type and unions containing it.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        match self {
            TypeDesc::Exact(exact) => exact.name() == NULL,
            TypeDesc::Union(members) => members.iter().any(TypeDesc::is_nullable),
            TypeDesc::Literal(desc) => desc.choices().contains(&Value::Null),
            _ => false,
        }
    }

    /// Returns `true` if a JSON `null` is a valid input: nullable types and
    /// the `json` type.
    #[must_use]
    pub fn accepts_null(&self) -> bool {
        match self {
            TypeDesc::Exact(exact) => exact.name() == NULL || exact.name() == ANY,
            TypeDesc::Union(members) => members.iter().any(TypeDesc::accepts_null),
            TypeDesc::Literal(desc) => desc.choices().contains(&Value::Null),
            _ => false,
        }
    }

    /// Registry key: the canonical display form.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Exact(exact) => f.write_str(exact.name()),
            TypeDesc::Generic { origin, args } => {
                write!(f, "{}<", origin.name())?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(">")
            }
            TypeDesc::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
            TypeDesc::Record(record) => f.write_str(record.name()),
            TypeDesc::Enum(desc) => f.write_str(desc.name()),
            TypeDesc::Literal(desc) => write!(f, "literal[{}]", desc.listing()),
            TypeDesc::Unresolvable(reason) => write!(f, "<unresolvable: {}>", reason),
        }
    }
}

/// Field list of a record type.
///
/// # Examples
///
/// ```rust
/// use strto::{FieldDesc, RecordDesc, TypeDesc, Value};
///
/// let record = RecordDesc::new("NetworkAddress")
///     .field(FieldDesc::new("host", TypeDesc::exact("str")))
///     .field(FieldDesc::new("port", TypeDesc::exact("u16")).with_default(Value::from(5432)));
/// assert_eq!(record.fields().len(), 2);
/// assert!(record.get("port").unwrap().fallback().is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDesc {
    name: Cow<'static, str>,
    fields: Vec<FieldDesc>,
}

impl RecordDesc {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        RecordDesc {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Adds a field, replacing any earlier field of the same name.
    #[must_use]
    pub fn field(mut self, field: FieldDesc) -> Self {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDesc] {
        &self.fields
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldDesc> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One declared field of a record.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDesc {
    name: Cow<'static, str>,
    ty: TypeDesc,
    default: Option<Value>,
}

impl FieldDesc {
    pub fn new(name: impl Into<Cow<'static, str>>, ty: TypeDesc) -> Self {
        FieldDesc {
            name: name.into(),
            ty,
            default: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the default from any serializable Rust value.
    ///
    /// A value that cannot be represented leaves the field required.
    #[must_use]
    pub fn with_default_of<T: Serialize + ?Sized>(self, value: &T) -> Self {
        match to_value(value) {
            Ok(value) => self.with_default(value),
            Err(err) => {
                tracing::warn!(field = %self.name, error = %err, "ignoring unrepresentable default");
                self
            }
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    /// Value used when the field is absent: the declared default, else
    /// `Null` for nullable fields.
    #[must_use]
    pub fn fallback(&self) -> Option<Value> {
        match &self.default {
            Some(value) => Some(value.clone()),
            None if self.ty.is_nullable() => Some(Value::Null),
            None => None,
        }
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.ty.is_nullable()
    }
}

/// Member names of an enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDesc {
    name: Cow<'static, str>,
    members: Vec<Cow<'static, str>>,
}

impl EnumDesc {
    pub fn new<I, M>(name: impl Into<Cow<'static, str>>, members: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<Cow<'static, str>>,
    {
        EnumDesc {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.as_ref())
    }

    /// Finds a member by name: exact match first, then case-insensitive.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strto::EnumDesc;
    ///
    /// let color = EnumDesc::new("Color", ["Red", "Blue"]);
    /// assert_eq!(color.lookup("blue"), Some("Blue"));
    /// assert_eq!(color.lookup("green"), None);
    /// ```
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.members()
            .find(|m| *m == name)
            .or_else(|| {
                let wanted = name.to_lowercase();
                self.members().find(|m| m.to_lowercase() == wanted)
            })
    }
}

/// Allowed values of a literal type, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralDesc {
    choices: Vec<Value>,
}

impl LiteralDesc {
    pub fn new(choices: impl IntoIterator<Item = Value>) -> Self {
        LiteralDesc {
            choices: choices.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn choices(&self) -> &[Value] {
        &self.choices
    }

    /// Finds the first choice spelled by `raw`.
    ///
    /// Strings must match exactly. Numbers match by value and booleans
    /// case-insensitively, so `"1.0"` selects `1.0` and `"TRUE"` selects
    /// `true`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strto::{LiteralDesc, Value};
    ///
    /// let choice = LiteralDesc::new([Value::from(1), Value::from("two"), Value::from(true)]);
    /// assert_eq!(choice.lookup("1"), Some(&Value::from(1)));
    /// assert_eq!(choice.lookup("True"), Some(&Value::from(true)));
    /// assert_eq!(choice.lookup("Two"), None);
    /// ```
    #[must_use]
    pub fn lookup(&self, raw: &str) -> Option<&Value> {
        let text = raw.trim();
        self.choices.iter().find(|choice| match choice {
            Value::String(s) => s == raw || s == text,
            Value::Bool(b) => text.eq_ignore_ascii_case(if *b { "true" } else { "false" }),
            Value::Number(n) => text.parse::<f64>().map_or(false, |f| f == n.as_f64()),
            Value::Null => text.is_empty() || text.eq_ignore_ascii_case("null") || text.eq_ignore_ascii_case("none"),
            other => other.key_string().as_deref() == Some(text),
        })
    }

    /// Comma-separated display of every choice.
    #[must_use]
    pub fn listing(&self) -> String {
        self.choices
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_is_nullable() {
        let opt = TypeDesc::optional(TypeDesc::exact("i64"));
        assert!(opt.is_nullable());
        assert!(opt.accepts_null());
        assert!(!TypeDesc::exact("i64").is_nullable());
        assert!(TypeDesc::any().accepts_null());
        assert!(!TypeDesc::any().is_nullable());
    }

    #[test]
    fn test_single_member_union_collapses() {
        let u = TypeDesc::union([TypeDesc::exact("str"), TypeDesc::exact("str")]);
        assert_eq!(u, TypeDesc::exact("str"));
        assert!(matches!(
            TypeDesc::union(Vec::new()),
            TypeDesc::Unresolvable(_)
        ));
    }

    #[test]
    fn test_tuple_needs_arguments() {
        assert!(matches!(TypeDesc::tuple(vec![]), TypeDesc::Unresolvable(_)));
        let pair = TypeDesc::tuple(vec![TypeDesc::exact("i64"), TypeDesc::exact("str")]);
        assert_eq!(pair.key(), "tuple<i64, str>");
    }

    #[test]
    fn test_nullable_field_defaults_to_null() {
        let field = FieldDesc::new("username", TypeDesc::optional(TypeDesc::exact("str")));
        assert_eq!(field.fallback(), Some(Value::Null));
        assert!(!field.is_required());

        let required = FieldDesc::new("host", TypeDesc::exact("str"));
        assert!(required.is_required());
        assert_eq!(required.fallback(), None);
    }

    #[test]
    fn test_literal_lookup_follows_declaration_order() {
        let choice = LiteralDesc::new([Value::from("1"), Value::from(1), Value::Null]);
        assert_eq!(choice.lookup("1"), Some(&Value::from("1")));
        assert_eq!(choice.lookup("1.0"), Some(&Value::from(1)));
        assert_eq!(choice.lookup("none"), Some(&Value::Null));
        assert_eq!(LiteralDesc::new([]).lookup("anything"), None);

        let nullable = TypeDesc::literal([Value::from("a"), Value::Null]);
        assert!(nullable.is_nullable());
        assert!(nullable.accepts_null());
        assert!(!TypeDesc::literal([Value::from("a")]).accepts_null());
    }

    #[test]
    fn test_record_field_replaces_same_name() {
        let record = RecordDesc::new("R")
            .field(FieldDesc::new("a", TypeDesc::exact("i64")))
            .field(FieldDesc::new("a", TypeDesc::exact("str")));
        assert_eq!(record.fields().len(), 1);
        assert_eq!(record.get("a").unwrap().ty(), &TypeDesc::exact("str"));
    }
}
