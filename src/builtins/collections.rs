//! Sequence, set, tuple and mapping parsers.
//!
//! Each one is registered for a container origin and receives the resolved
//! element parsers as arguments.

use crate::descriptor::{Origin, TypeDesc};
use crate::file::{self, SequenceSource};
use crate::input::{Envelope, Input};
use crate::{ContainerParser, Error, ParserOptions, Registry, Resolved, Result, Value, ValueMap};
use serde_json::{Map, Value as Json};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SeqKind {
    List,
    Set,
    Tuple,
}

impl SeqKind {
    fn origin(self) -> Origin {
        match self {
            SeqKind::List => Origin::List,
            SeqKind::Set => Origin::Set,
            SeqKind::Tuple => Origin::Tuple,
        }
    }
}

enum Items<'a> {
    Borrowed(&'a [Json]),
    Json(Vec<Json>),
    Text(Vec<String>),
}

/// Parses delimited text, JSON arrays and `@file` references into arrays.
#[derive(Debug, Clone)]
pub(crate) struct SequenceParser {
    kind: SeqKind,
    delimiter: char,
    from_file: bool,
}

impl SequenceParser {
    fn items<'a>(&self, ty: &TypeDesc, env: &Envelope<'a>) -> Result<Items<'a>> {
        match env.input {
            Input::Json(Json::Array(items)) => Ok(Items::Borrowed(items.as_slice())),
            Input::Json(Json::String(text)) => self.split(ty, env, text),
            Input::Text(text) => self.split(ty, env, text),
            Input::Json(other) => Ok(Items::Text(vec![other.to_string()])),
        }
    }

    fn split<'a>(&self, ty: &TypeDesc, env: &Envelope<'_>, text: &str) -> Result<Items<'a>> {
        let text = text.trim();
        if self.from_file {
            if let Some(reference) = file::reference(text) {
                return Ok(match file::read_sequence(reference, &env.path, self.delimiter)? {
                    SequenceSource::Json(items) => Items::Json(items),
                    SequenceSource::Lines(lines) => Items::Text(lines),
                });
            }
        }
        if text.starts_with('[') {
            return serde_json::from_str::<Vec<Json>>(text)
                .map(Items::Json)
                .map_err(|err| Error::parse_value(env.path.clone(), ty, text, err));
        }
        if text.is_empty() {
            return Ok(Items::Text(Vec::new()));
        }
        Ok(Items::Text(
            text.split(self.delimiter)
                .map(|part| part.trim().to_string())
                .collect(),
        ))
    }
}

impl ContainerParser for SequenceParser {
    fn parse(&self, ty: &TypeDesc, env: &Envelope<'_>, args: &[Resolved<'_>]) -> Result<Value> {
        let items = self.items(ty, env)?;
        let inputs: Vec<Input<'_>> = match &items {
            Items::Borrowed(items) => items.iter().map(Input::Json).collect(),
            Items::Json(items) => items.iter().map(Input::Json).collect(),
            Items::Text(items) => items.iter().map(|s| Input::Text(s.as_str())).collect(),
        };

        if self.kind == SeqKind::Tuple && inputs.len() != args.len() {
            return Err(Error::parse_value(
                env.path.clone(),
                ty,
                env.input.text(),
                format!("expected {} items, found {}", args.len(), inputs.len()),
            ));
        }

        let mut values = Vec::with_capacity(inputs.len());
        // Value is not Hash; its Debug form identifies it exactly.
        let mut seen = HashSet::new();
        for (index, input) in inputs.into_iter().enumerate() {
            let item = match self.kind {
                SeqKind::Tuple => args.get(index),
                SeqKind::List | SeqKind::Set => args.first(),
            }
            .ok_or_else(|| Error::unsupported(env.path.clone(), ty))?;
            let value = item.parse(&env.element(index, input))?;
            if self.kind == SeqKind::Set && !seen.insert(format!("{:?}", value)) {
                continue;
            }
            values.push(value);
        }
        Ok(Value::Array(values))
    }
}

/// Parses JSON objects and `@file` references into maps, coercing keys and
/// values.
#[derive(Debug, Clone)]
pub(crate) struct MappingParser {
    from_file: bool,
}

impl MappingParser {
    fn decode(&self, ty: &TypeDesc, env: &Envelope<'_>, text: &str) -> Result<Map<String, Json>> {
        let text = text.trim();
        if self.from_file {
            if let Some(reference) = file::reference(text) {
                return file::read_object(reference, &env.path);
            }
        }
        serde_json::from_str(text).map_err(|err| {
            Error::parse_value(
                env.path.clone(),
                ty,
                text,
                format!("expected a JSON object: {}", err),
            )
        })
    }
}

impl ContainerParser for MappingParser {
    fn parse(&self, ty: &TypeDesc, env: &Envelope<'_>, args: &[Resolved<'_>]) -> Result<Value> {
        let (key_ty, value_ty) = match args {
            [key, value] => (key, value),
            _ => return Err(Error::unsupported(env.path.clone(), ty)),
        };

        let owned;
        let object = match env.input {
            Input::Json(Json::Object(map)) => map,
            Input::Json(Json::String(text)) => {
                owned = self.decode(ty, env, text)?;
                &owned
            }
            Input::Text(text) => {
                owned = self.decode(ty, env, text)?;
                &owned
            }
            Input::Json(other) => {
                return Err(Error::parse_value(
                    env.path.clone(),
                    ty,
                    other.to_string(),
                    "expected a JSON object",
                ))
            }
        };

        let mut values = ValueMap::with_capacity(object.len());
        for (key, raw) in object {
            let key_env = env.field(key, Input::Text(key.as_str()));
            let key_text = key_ty.parse(&key_env)?.key_string().ok_or_else(|| {
                Error::parse_value(
                    key_env.path.clone(),
                    key_ty.ty(),
                    key.as_str(),
                    "mapping keys must be scalars",
                )
            })?;
            let value = value_ty.parse(&env.field(key, Input::Json(raw)))?;
            values.insert(key_text, value);
        }
        Ok(Value::Object(values))
    }
}

pub(crate) fn register(registry: &mut Registry, options: &ParserOptions) {
    let delimiter = options.delimiter.as_char();
    for kind in [SeqKind::List, SeqKind::Set, SeqKind::Tuple] {
        registry.register_origin(
            kind.origin(),
            SequenceParser {
                kind,
                delimiter,
                from_file: options.from_file,
            },
        );
    }
    registry.register_origin(
        Origin::Map,
        MappingParser {
            from_file: options.from_file,
        },
    );
}

#[cfg(test)]
mod tests {
    use crate::{describe, ErrorKind, Registry, TypeDesc, Value};
    use crate::input::{Envelope, Input};

    fn parse(raw: &str, ty: &TypeDesc) -> crate::Result<Value> {
        Registry::default().parse(&Envelope::root(Input::Text(raw)), ty)
    }

    fn ints(values: &[i64]) -> Value {
        Value::Array(values.iter().map(|&v| Value::from(v)).collect())
    }

    #[test]
    fn test_list_from_delimited_and_json() {
        let ty = describe::<Vec<i64>>();
        assert_eq!(parse("1,2,3,4,5", &ty).unwrap(), ints(&[1, 2, 3, 4, 5]));
        assert_eq!(parse(" 1 , 2 ", &ty).unwrap(), ints(&[1, 2]));
        assert_eq!(parse("[3, 2, 1]", &ty).unwrap(), ints(&[3, 2, 1]));
        assert_eq!(parse("", &ty).unwrap(), ints(&[]));
    }

    #[test]
    fn test_element_errors_carry_index() {
        let err = parse("1,x,3", &describe::<Vec<i64>>()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParseValue);
        assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("[1]"));
    }

    #[test]
    fn test_set_dedupes_in_order() {
        let ty = describe::<std::collections::BTreeSet<i64>>();
        assert_eq!(parse("3,1,3,2,1", &ty).unwrap(), ints(&[3, 1, 2]));

        let words = describe::<std::collections::BTreeSet<String>>();
        assert_eq!(
            parse("a,b,a,A", &words).unwrap(),
            Value::Array(vec![Value::from("a"), Value::from("b"), Value::from("A")])
        );
    }

    #[test]
    fn test_large_set_dedupes() {
        let ty = describe::<std::collections::HashSet<u32>>();
        let text = (0..50_000).map(|i| (i % 1000).to_string()).collect::<Vec<_>>().join(",");
        let value = parse(&text, &ty).unwrap();
        let expected: Vec<i64> = (0..1000).collect();
        assert_eq!(value, ints(&expected));
    }

    #[test]
    fn test_tuple_arity() {
        let ty = describe::<(i64, String)>();
        assert_eq!(
            parse("7,seven", &ty).unwrap(),
            Value::Array(vec![Value::from(7), Value::from("seven")])
        );
        let err = parse("7", &ty).unwrap_err();
        assert!(err.to_string().contains("expected 2 items, found 1"));
    }

    #[test]
    fn test_nested_lists_from_json() {
        let ty = describe::<Vec<Vec<u8>>>();
        assert_eq!(
            parse("[[1, 2], [3]]", &ty).unwrap(),
            Value::Array(vec![ints(&[1, 2]), ints(&[3])])
        );
    }

    #[test]
    fn test_mapping_coerces_keys_and_values() {
        let ty = describe::<std::collections::HashMap<u8, bool>>();
        let value = parse(r#"{"01": "yes", "2": false}"#, &ty).unwrap();
        let map = value.as_object().unwrap();
        assert_eq!(map.get("1"), Some(&Value::Bool(true)));
        assert_eq!(map.get("2"), Some(&Value::Bool(false)));

        let err = parse(r#"{"x": true}"#, &ty).unwrap_err();
        assert_eq!(err.path().map(|p| p.to_string()).as_deref(), Some("x"));
        assert_eq!(parse("a=1", &ty).unwrap_err().kind(), ErrorKind::ParseValue);
    }
}
