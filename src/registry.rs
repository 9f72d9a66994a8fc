//! Type → capability mapping and the resolution algorithm.
//!
//! A [`Registry`] stores one [`Capability`] per canonical key (the
//! [`Display`](std::fmt::Display) form of a [`TypeDesc`]). Resolving a
//! descriptor walks these steps, first match wins:
//!
//! 1. a capability registered for the exact key (`u16`, `list<i64>`, `Color`)
//! 2. for a generic, the capability of its origin (`list`), bound to the
//!    recursively resolved arguments
//! 3. for an exact type, the capability of its first registered supertype
//! 4. for an exact type with a declared constructor field list, the model
//!    builder (only with [`ParserOptions::allow_constructor_fields`])
//! 5. for a union, every member that resolves, tried in declaration order
//! 6. for a record, the model builder
//! 7. for an enumeration, member lookup by name
//! 8. for a literal, a match against its choices
//!
//! Resolution borrows the registry immutably and never changes it.
//!
//! ## Examples
//!
//! ```rust
//! use strto::{Capability, Input, Envelope, Rejection, Registry, ParserOptions, TypeDesc, Value};
//!
//! let mut registry = Registry::with_builtins(ParserOptions::default());
//! let shout = |raw: &str| -> Result<Value, Rejection> { Ok(Value::from(raw.to_uppercase())) };
//! registry.register(&TypeDesc::exact("str"), Capability::leaf(shout));
//!
//! let value = registry
//!     .parse(&Envelope::root(Input::Text("hi")), &TypeDesc::exact("str"))
//!     .unwrap();
//! assert_eq!(value, Value::from("HI"));
//! ```

use crate::builtins;
use crate::descriptor::{EnumDesc, LiteralDesc, Origin, RecordDesc, TypeDesc};
use crate::input::Envelope;
use crate::model::ModelBuilder;
use crate::{Error, ParserOptions, Rejection, Result, Value};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// A leaf capability: turns one literal into a value.
///
/// Implemented for every `Fn(&str) -> Result<Value, Rejection>` closure, so a
/// plain function or a stateful struct both qualify.
pub trait ValueParser: Send + Sync {
    fn parse(&self, raw: &str) -> std::result::Result<Value, Rejection>;
}

impl<F> ValueParser for F
where
    F: Fn(&str) -> std::result::Result<Value, Rejection> + Send + Sync,
{
    fn parse(&self, raw: &str) -> std::result::Result<Value, Rejection> {
        self(raw)
    }
}

/// A capability registered for a container origin or any type that needs the
/// whole [`Envelope`] (JSON nodes, field paths) rather than flat text.
///
/// `args` holds the resolved type arguments in declaration order.
pub trait ContainerParser: Send + Sync {
    fn parse(&self, ty: &TypeDesc, env: &Envelope<'_>, args: &[Resolved<'_>]) -> Result<Value>;
}

/// A registered parsing capability.
#[derive(Clone)]
pub enum Capability {
    Leaf(Arc<dyn ValueParser>),
    Container(Arc<dyn ContainerParser>),
}

impl Capability {
    pub fn leaf(parser: impl ValueParser + 'static) -> Self {
        Capability::Leaf(Arc::new(parser))
    }

    pub fn container(parser: impl ContainerParser + 'static) -> Self {
        Capability::Container(Arc::new(parser))
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Leaf(_) => f.write_str("Capability::Leaf"),
            Capability::Container(_) => f.write_str("Capability::Container"),
        }
    }
}

/// A descriptor bound to the capabilities that will parse it.
pub enum Resolved<'r> {
    Leaf {
        ty: TypeDesc,
        parser: &'r dyn ValueParser,
    },
    Container {
        ty: TypeDesc,
        parser: &'r dyn ContainerParser,
        args: Vec<Resolved<'r>>,
    },
    Union {
        ty: TypeDesc,
        members: Vec<Resolved<'r>>,
    },
    Record {
        ty: TypeDesc,
        registry: &'r Registry,
        record: Arc<RecordDesc>,
    },
    Enum {
        ty: TypeDesc,
        desc: Arc<EnumDesc>,
    },
    Literal {
        ty: TypeDesc,
        desc: Arc<LiteralDesc>,
    },
}

impl<'r> Resolved<'r> {
    /// The descriptor this resolution was made for.
    #[must_use]
    pub fn ty(&self) -> &TypeDesc {
        match self {
            Resolved::Leaf { ty, .. }
            | Resolved::Container { ty, .. }
            | Resolved::Union { ty, .. }
            | Resolved::Record { ty, .. }
            | Resolved::Enum { ty, .. }
            | Resolved::Literal { ty, .. } => ty,
        }
    }

    /// Parses one input.
    ///
    /// A JSON `null` short-circuits: it is `Null` for types that accept
    /// null and a [`Error::ParseValue`] for everything else.
    pub fn parse(&self, env: &Envelope<'_>) -> Result<Value> {
        if env.input.is_null() {
            return if self.ty().accepts_null() {
                Ok(Value::Null)
            } else {
                Err(Error::parse_value(
                    env.path.clone(),
                    self.ty(),
                    "null",
                    "null is not allowed here",
                ))
            };
        }

        match self {
            Resolved::Leaf { ty, parser } => {
                let raw = env.input.text();
                parser
                    .parse(&raw)
                    .map_err(|rejection| Error::parse_value(env.path.clone(), ty, raw, rejection))
            }
            Resolved::Container { ty, parser, args } => parser.parse(ty, env, args),
            Resolved::Union { ty, members } => parse_union(ty, members, env),
            Resolved::Record {
                registry, record, ..
            } => ModelBuilder::new(registry).build(env, record),
            Resolved::Enum { ty, desc } => {
                let raw = env.input.text();
                builtins::enums::lookup(desc, &raw)
                    .map_err(|rejection| Error::parse_value(env.path.clone(), ty, raw, rejection))
            }
            Resolved::Literal { ty, desc } => {
                let raw = env.input.text();
                builtins::enums::choose(desc, &raw)
                    .map_err(|rejection| Error::parse_value(env.path.clone(), ty, raw, rejection))
            }
        }
    }
}

fn parse_union(ty: &TypeDesc, members: &[Resolved<'_>], env: &Envelope<'_>) -> Result<Value> {
    let mut causes = Vec::with_capacity(members.len());
    for member in members {
        match member.parse(env) {
            Ok(value) => return Ok(value),
            Err(err) => {
                tracing::trace!(path = %env.path, member = %member.ty(), error = %err, "union member rejected input");
                causes.push(err);
            }
        }
    }
    // An unreadable @file is the same failure for every member.
    if let Some(pos) = causes
        .iter()
        .position(|cause| matches!(cause, Error::FileIndirection { .. }))
    {
        return Err(causes.swap_remove(pos));
    }
    Err(Error::AmbiguousUnion {
        path: env.path.clone(),
        ty: ty.to_string(),
        input: env.input.text().into_owned(),
        causes,
    })
}

/// Insertion-ordered store of parsing capabilities.
#[derive(Clone)]
pub struct Registry {
    parsers: IndexMap<String, Capability>,
    constructors: IndexMap<String, Arc<RecordDesc>>,
    options: ParserOptions,
}

impl Registry {
    /// An empty registry. Nothing resolves until capabilities are registered.
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        Registry {
            parsers: IndexMap::new(),
            constructors: IndexMap::new(),
            options,
        }
    }

    /// A registry holding every built-in capability.
    #[must_use]
    pub fn with_builtins(options: ParserOptions) -> Self {
        let mut registry = Registry::new(options);
        builtins::register(&mut registry);
        registry
    }

    #[must_use]
    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Registers a capability for the exact key of `ty`, replacing any
    /// earlier one.
    pub fn register(&mut self, ty: &TypeDesc, capability: Capability) {
        let key = ty.key();
        if self.parsers.insert(key.clone(), capability).is_some() {
            tracing::debug!(ty = %key, "replaced registered parser");
        }
    }

    /// Registers a capability for a container origin such as `list`.
    pub fn register_origin(&mut self, origin: Origin, parser: impl ContainerParser + 'static) {
        if self
            .parsers
            .insert(origin.name().to_string(), Capability::container(parser))
            .is_some()
        {
            tracing::debug!(origin = origin.name(), "replaced registered origin parser");
        }
    }

    /// Declares the field list used to build the exact type of the same name
    /// when constructor fields are enabled.
    pub fn declare_constructor(&mut self, record: RecordDesc) {
        self.constructors
            .insert(record.name().to_string(), Arc::new(record));
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Capability> {
        self.parsers.get(key)
    }

    /// Registered keys, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    #[must_use]
    pub fn is_supported(&self, ty: &TypeDesc) -> bool {
        self.resolve(ty).is_some()
    }

    /// Binds a descriptor to capabilities, or `None` when nothing can parse
    /// it.
    pub fn resolve(&self, ty: &TypeDesc) -> Option<Resolved<'_>> {
        if let TypeDesc::Unresolvable(_) = ty {
            return None;
        }
        if let Some(capability) = self.parsers.get(&ty.key()) {
            let args: &[TypeDesc] = match ty {
                TypeDesc::Generic { args, .. } => args,
                _ => &[],
            };
            return self.bind(ty, capability, args);
        }

        match ty {
            TypeDesc::Generic { origin, args } => {
                let capability = self.parsers.get(origin.name())?;
                self.bind(ty, capability, args)
            }
            TypeDesc::Exact(exact) => {
                for parent in exact.supertypes() {
                    if let Some(capability) = self.parsers.get(parent) {
                        tracing::debug!(ty = exact.name(), parent, "using supertype parser");
                        return self.bind(ty, capability, &[]);
                    }
                }
                if self.options.allow_constructor_fields {
                    if let Some(record) = self.constructors.get(exact.name()) {
                        tracing::debug!(ty = exact.name(), "building from declared constructor fields");
                        return Some(Resolved::Record {
                            ty: ty.clone(),
                            registry: self,
                            record: Arc::clone(record),
                        });
                    }
                }
                None
            }
            TypeDesc::Union(members) => {
                let members: Vec<_> = members.iter().filter_map(|m| self.resolve(m)).collect();
                if members.is_empty() {
                    None
                } else {
                    Some(Resolved::Union {
                        ty: ty.clone(),
                        members,
                    })
                }
            }
            TypeDesc::Record(record) => Some(Resolved::Record {
                ty: ty.clone(),
                registry: self,
                record: Arc::clone(record),
            }),
            TypeDesc::Enum(desc) => Some(Resolved::Enum {
                ty: ty.clone(),
                desc: Arc::clone(desc),
            }),
            TypeDesc::Literal(desc) => Some(Resolved::Literal {
                ty: ty.clone(),
                desc: Arc::clone(desc),
            }),
            TypeDesc::Unresolvable(_) => None,
        }
    }

    fn bind<'a>(
        &'a self,
        ty: &TypeDesc,
        capability: &'a Capability,
        args: &[TypeDesc],
    ) -> Option<Resolved<'a>> {
        match capability {
            Capability::Leaf(parser) => Some(Resolved::Leaf {
                ty: ty.clone(),
                parser: parser.as_ref(),
            }),
            Capability::Container(parser) => {
                let args = args
                    .iter()
                    .map(|arg| self.resolve(arg))
                    .collect::<Option<Vec<_>>>()?;
                Some(Resolved::Container {
                    ty: ty.clone(),
                    parser: parser.as_ref(),
                    args,
                })
            }
        }
    }

    /// Resolves `ty` and parses the envelope with it.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedType`] when `ty` does not resolve, otherwise
    /// whatever the bound capability reports.
    pub fn parse(&self, env: &Envelope<'_>, ty: &TypeDesc) -> Result<Value> {
        match self.resolve(ty) {
            Some(resolved) => resolved.parse(env),
            None => Err(Error::unsupported(env.path.clone(), ty)),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::with_builtins(ParserOptions::default())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("parsers", &self.parsers.keys().collect::<Vec<_>>())
            .field("constructors", &self.constructors.keys().collect::<Vec<_>>())
            .field("options", &self.options)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ExactType, FieldDesc};
    use crate::input::Input;
    use crate::ErrorKind;

    fn parse(registry: &Registry, raw: &str, ty: &TypeDesc) -> Result<Value> {
        registry.parse(&Envelope::root(Input::Text(raw)), ty)
    }

    #[test]
    fn test_empty_registry_supports_nothing() {
        let registry = Registry::new(ParserOptions::default());
        assert!(registry.is_empty());
        let err = parse(&registry, "5", &TypeDesc::exact("i64")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
    }

    #[test]
    fn test_exact_key_beats_origin() {
        let mut registry = Registry::default();
        let list_of_i64 = TypeDesc::list(TypeDesc::exact("i64"));
        let fixed = |_: &str| -> std::result::Result<Value, Rejection> { Ok(Value::from("custom")) };
        registry.register(&list_of_i64, Capability::leaf(fixed));

        assert_eq!(parse(&registry, "1,2", &list_of_i64).unwrap(), Value::from("custom"));
        let list_of_u8 = TypeDesc::list(TypeDesc::exact("u8"));
        assert_eq!(
            parse(&registry, "1,2", &list_of_u8).unwrap(),
            Value::Array(vec![Value::from(1), Value::from(2)])
        );
    }

    #[test]
    fn test_supertype_fallback() {
        let registry = Registry::default();
        let port = TypeDesc::Exact(ExactType::new("Port").with_supertype("Missing").with_supertype("u16"));
        assert_eq!(parse(&registry, "8080", &port).unwrap(), Value::from(8080));
        let err = parse(&registry, "70000", &port).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseValue);
        assert!(err.to_string().contains("Port"));
    }

    #[test]
    fn test_union_drops_unresolvable_members() {
        let registry = Registry::default();
        let ty = TypeDesc::union([TypeDesc::exact("Nope"), TypeDesc::exact("i64")]);
        assert_eq!(parse(&registry, "3", &ty).unwrap(), Value::from(3));

        let none = TypeDesc::union([TypeDesc::exact("Nope"), TypeDesc::exact("Nada")]);
        assert!(!registry.is_supported(&none));
    }

    #[test]
    fn test_union_collects_every_cause() {
        let registry = Registry::default();
        let ty = TypeDesc::union([TypeDesc::exact("i64"), TypeDesc::exact("bool")]);
        let err = parse(&registry, "maybe", &ty).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AmbiguousUnion);
        assert_eq!(err.causes().len(), 2);
        assert!(err.to_string().contains("tried types"));
    }

    #[test]
    fn test_constructor_fields_are_opt_in() {
        let fields = RecordDesc::new("Endpoint")
            .field(FieldDesc::new("host", TypeDesc::exact("str")))
            .field(FieldDesc::new("port", TypeDesc::exact("u16")));
        let ty = TypeDesc::exact("Endpoint");

        let mut closed = Registry::default();
        closed.declare_constructor(fields.clone());
        assert_eq!(
            parse(&closed, "host=a port=1", &ty).unwrap_err().kind(),
            ErrorKind::UnsupportedType
        );

        let mut open = Registry::with_builtins(ParserOptions::new().with_constructor_fields(true));
        open.declare_constructor(fields);
        let value = parse(&open, "host=a port=1", &ty).unwrap();
        assert_eq!(value.as_object().and_then(|o| o.get("port")), Some(&Value::from(1)));
    }

    #[test]
    fn test_container_binds_resolved_arguments() {
        let registry = Registry::default();
        let ty = TypeDesc::map(TypeDesc::exact("str"), TypeDesc::list(TypeDesc::exact("i64")));
        let resolved = registry.resolve(&ty).unwrap();
        match &resolved {
            Resolved::Container { args, .. } => {
                assert!(matches!(args[0], Resolved::Leaf { .. }));
                match &args[1] {
                    Resolved::Container { ty, args, .. } => {
                        assert_eq!(ty.key(), "list<i64>");
                        assert_eq!(args.len(), 1);
                    }
                    _ => panic!("expected a container for list<i64>"),
                }
            }
            _ => panic!("expected a container for {ty}"),
        }
        let value = resolved
            .parse(&Envelope::root(Input::Text(r#"{"a": "1,2"}"#)))
            .unwrap();
        assert_eq!(value.to_string(), "{a: [1, 2]}");
    }

    #[test]
    fn test_literal_names_valid_choices() {
        let registry = Registry::new(ParserOptions::default());
        let ty = TypeDesc::literal([Value::from(1), Value::from("two"), Value::from(true)]);
        assert_eq!(parse(&registry, "1", &ty).unwrap(), Value::from(1));
        assert_eq!(parse(&registry, "two", &ty).unwrap(), Value::from("two"));
        assert_eq!(parse(&registry, "true", &ty).unwrap(), Value::from(true));

        let err = parse(&registry, "missing", &ty).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseValue);
        assert!(err.to_string().contains(r#"valid choices: 1, "two", true"#), "{err}");
    }

    #[test]
    fn test_unresolvable_argument_makes_container_unsupported() {
        let registry = Registry::default();
        let ty = TypeDesc::list(TypeDesc::exact("Unknown"));
        let err = parse(&registry, "a,b", &ty).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedType);
        assert!(err.to_string().contains("list<Unknown>"));
    }
}
