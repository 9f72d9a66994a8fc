//! Record construction from JSON, key/value text and `@file` references.
//!
//! The input shape is detected from the text:
//!
//! - `@path`: the file is decoded (JSON or YAML) and must hold an object
//! - `{...}`: a JSON object
//! - empty text: every field takes its default
//! - anything else: whitespace-separated `key=value` tokens, where a dotted
//!   key (`network.port=5433`) addresses a field of a nested record
//!
//! All three shapes are first normalized into a JSON object, so
//! `network.host=db network.port=5433` and
//! `{"network": {"host": "db", "port": 5433}}` build identical records.

use crate::descriptor::RecordDesc;
use crate::file;
use crate::input::{Envelope, FieldPath, Input};
use crate::{Error, Registry, Result, Value, ValueMap};
use serde_json::{Map, Value as Json};

/// Builds record values, consulting the registry for every field.
#[derive(Debug, Clone, Copy)]
pub struct ModelBuilder<'r> {
    registry: &'r Registry,
}

impl<'r> ModelBuilder<'r> {
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        ModelBuilder { registry }
    }

    /// Builds a record value from any supported input shape.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strto::{Envelope, FieldDesc, Input, ModelBuilder, RecordDesc, Registry, TypeDesc, Value};
    ///
    /// let record = RecordDesc::new("NetworkAddress")
    ///     .field(FieldDesc::new("host", TypeDesc::exact("str")))
    ///     .field(FieldDesc::new("port", TypeDesc::exact("u16")));
    /// let registry = Registry::default();
    ///
    /// let value = ModelBuilder::new(&registry)
    ///     .build(&Envelope::root(Input::Text("host=localhost port=5432")), &record)
    ///     .unwrap();
    /// let fields = value.as_object().unwrap();
    /// assert_eq!(fields.get("host"), Some(&Value::from("localhost")));
    /// assert_eq!(fields.get("port"), Some(&Value::from(5432)));
    /// ```
    pub fn build(&self, env: &Envelope<'_>, record: &RecordDesc) -> Result<Value> {
        match env.input {
            Input::Json(Json::Object(map)) => self.assemble(env, record, map),
            Input::Json(Json::String(text)) => self.build_from_text(env, record, text),
            Input::Text(text) => self.build_from_text(env, record, text),
            Input::Json(other) => Err(Error::parse_value(
                env.path.clone(),
                record.name(),
                other.to_string(),
                "expected an object or key=value text",
            )),
        }
    }

    fn build_from_text(&self, env: &Envelope<'_>, record: &RecordDesc, text: &str) -> Result<Value> {
        let text = text.trim();
        let from_file = self.registry.options().from_file;
        let map: Map<String, Json> = match file::reference(text).filter(|_| from_file) {
            Some(reference) => file::read_object(reference, &env.path)?,
            None if text.starts_with('{') => serde_json::from_str(text).map_err(|err| {
                Error::parse_value(env.path.clone(), record.name(), text, err)
            })?,
            None if text.is_empty() => Map::new(),
            None => key_values(text, &env.path, record.name())?,
        };
        self.assemble(env, record, &map)
    }

    fn assemble(
        &self,
        env: &Envelope<'_>,
        record: &RecordDesc,
        map: &Map<String, Json>,
    ) -> Result<Value> {
        let mut values = ValueMap::with_capacity(record.fields().len());
        for field in record.fields() {
            let value = match map.get(field.name()) {
                Some(raw) => self
                    .registry
                    .parse(&env.field(field.name(), Input::Json(raw)), field.ty())?,
                None => field
                    .fallback()
                    .ok_or_else(|| Error::missing_field(env.path.field(field.name())))?,
            };
            values.insert(field.name().to_string(), value);
        }

        let unknown: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|key| record.get(key).is_none())
            .collect();
        if !unknown.is_empty() {
            tracing::debug!(record = record.name(), at = %env.path, ?unknown, "ignoring unknown keys");
        }
        Ok(Value::Object(values))
    }
}

/// Splits on whitespace that is outside quotes and outside `[...]`/`{...}`.
///
/// Quotes and brackets only group when they open a token or the value after
/// its first `=`, so `name=O'Brien` stays a plain value.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start: Option<usize> = None;
    let mut value_start: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' && q == '"' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        let opens = depth > 0 || start.is_none() || value_start == Some(i);
        match ch {
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    tokens.push(&text[s..i]);
                }
                value_start = None;
                continue;
            }
            '"' | '\'' if opens => quote = Some(ch),
            '[' | '{' if opens => depth += 1,
            ']' | '}' if depth > 0 => depth -= 1,
            '=' if depth == 0 && value_start.is_none() => value_start = Some(i + 1),
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(&text[s..]);
    }
    tokens
}

/// Decodes a `"..."` value as a JSON string and strips `'...'`.
fn unquote(value: &str) -> std::result::Result<String, String> {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        serde_json::from_str::<String>(value).map_err(|err| err.to_string())
    } else if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        Ok(value[1..value.len() - 1].to_string())
    } else {
        Ok(value.to_string())
    }
}

fn key_values(text: &str, at: &FieldPath, record: &str) -> Result<Map<String, Json>> {
    let mut map = Map::new();
    for token in tokenize(text) {
        let (key, raw) = token.split_once('=').ok_or_else(|| {
            Error::parse_value(at.clone(), record, token, "expected key=value")
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::parse_value(at.clone(), record, token, "empty key"));
        }
        let value = unquote(raw.trim())
            .map_err(|reason| Error::parse_value(at.field(key), record, raw, reason))?;
        insert_dotted(&mut map, key, Json::String(value), at, record)?;
    }
    Ok(map)
}

/// Inserts `value` at a dotted key, creating intermediate objects.
///
/// A later scalar replaces an earlier one; a key that is used both as a
/// scalar and as a prefix of nested keys is an error.
fn insert_dotted(
    map: &mut Map<String, Json>,
    key: &str,
    value: Json,
    at: &FieldPath,
    record: &str,
) -> Result<()> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(Error::parse_value(at.clone(), record, key, "empty segment in dotted key"));
    }
    let conflict = |depth: usize| {
        let path = segments[..=depth]
            .iter()
            .fold(at.clone(), |path, segment| path.field(segment));
        Error::parse_value(path, record, key, "key is used both as a value and as a nested record")
    };

    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return Ok(()),
    };
    let mut current = map;
    for (depth, segment) in parents.iter().enumerate() {
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Json::Object(Map::new()));
        current = match entry {
            Json::Object(nested) => nested,
            _ => return Err(conflict(depth)),
        };
    }
    if let Some(Json::Object(_)) = current.get(*last) {
        return Err(conflict(parents.len()));
    }
    current.insert((*last).to_string(), value);
    Ok(())
}
