//! Parsers for null, booleans, text-like types, ranges, slices and free-form
//! JSON.

use crate::descriptor::{TypeDesc, ANY, NULL};
use crate::input::{Envelope, Input};
use crate::{
    Capability, ContainerParser, Error, Registry, Rejection, Resolved, Result, StepRange, Value,
    ValueMap,
};
use serde::Deserialize;

fn parse_null(raw: &str) -> std::result::Result<Value, Rejection> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "null" | "none" => Ok(Value::Null),
        _ => Err(Rejection::new("expected null, none or empty text")),
    }
}

fn parse_bool(raw: &str) -> std::result::Result<Value, Rejection> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(Value::Bool(true)),
        "false" | "0" | "no" | "off" => Ok(Value::Bool(false)),
        _ => Err(Rejection::new(
            "expected one of true, false, 1, 0, yes, no, on, off",
        )),
    }
}

fn parse_str(raw: &str) -> std::result::Result<Value, Rejection> {
    Ok(Value::String(raw.to_string()))
}

fn parse_char(raw: &str) -> std::result::Result<Value, Rejection> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::String(c.to_string())),
        (None, _) => Err(Rejection::new("empty input")),
        _ => Err(Rejection::new("expected a single character")),
    }
}

fn parse_path(raw: &str) -> std::result::Result<Value, Rejection> {
    let text = raw.trim();
    if text.is_empty() {
        Err(Rejection::new("empty path"))
    } else if text.contains('\0') {
        Err(Rejection::new("path contains a NUL byte"))
    } else {
        Ok(Value::String(text.to_string()))
    }
}

fn parse_url(raw: &str) -> std::result::Result<Value, Rejection> {
    url::Url::parse(raw.trim())
        .map(|url| Value::String(url.into()))
        .map_err(Rejection::new)
}

/// `stop`, `start:stop` or `start:stop:step`. Empty parts are skipped.
fn parse_range(raw: &str) -> std::result::Result<Value, Rejection> {
    let parts = raw
        .split(':')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|err| Rejection::new(format!("bad range bound {:?}: {}", part, err)))
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let range = match parts.as_slice() {
        [stop] => StepRange::new(0, *stop, 1),
        [start, stop] => StepRange::new(*start, *stop, 1),
        [start, stop, step] => StepRange::new(*start, *stop, *step),
        _ => {
            return Err(Rejection::new(format!(
                "expected start:stop[:step], found {} part(s)",
                parts.len()
            )))
        }
    };
    if range.step == 0 {
        return Err(Rejection::new("range step must not be zero"));
    }
    Ok(Value::Range(range))
}

/// `stop`, `start:stop` or `start:stop:step`, where any part may be empty.
fn parse_slice(raw: &str) -> std::result::Result<Value, Rejection> {
    let parts = raw
        .split(':')
        .map(str::trim)
        .map(|part| {
            if part.is_empty() {
                return Ok(Value::Null);
            }
            match part.parse::<f64>() {
                Ok(bound) if bound.is_finite() => Ok(Value::from(bound)),
                _ => Err(Rejection::new(format!("bad slice bound {:?}", part))),
            }
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let (start, stop, step) = match parts.as_slice() {
        [stop] => (Value::Null, stop.clone(), Value::Null),
        [start, stop] => (start.clone(), stop.clone(), Value::Null),
        [start, stop, step] => (start.clone(), stop.clone(), step.clone()),
        _ => {
            return Err(Rejection::new(format!(
                "use 'start:stop[:step]' with 1-3 parts, found {}",
                parts.len()
            )))
        }
    };
    let mut bounds = ValueMap::with_capacity(3);
    bounds.insert("start".to_string(), start);
    bounds.insert("stop".to_string(), stop);
    bounds.insert("step".to_string(), step);
    Ok(Value::Object(bounds))
}

/// Accepts any JSON value. Text that is not JSON is kept as a string.
#[derive(Debug, Clone, Copy)]
pub(crate) struct JsonParser;

impl ContainerParser for JsonParser {
    fn parse(&self, _ty: &TypeDesc, env: &Envelope<'_>, _args: &[Resolved<'_>]) -> Result<Value> {
        match env.input {
            Input::Json(json) => Value::deserialize(json).map_err(Error::decode),
            Input::Text(text) => Ok(serde_json::from_str::<Value>(text.trim())
                .unwrap_or_else(|_| Value::String(text.to_string()))),
        }
    }
}

pub(crate) fn register(registry: &mut Registry) {
    registry.register(&TypeDesc::exact(NULL), Capability::leaf(parse_null));
    registry.register(&TypeDesc::exact("bool"), Capability::leaf(parse_bool));
    registry.register(&TypeDesc::exact("str"), Capability::leaf(parse_str));
    registry.register(&TypeDesc::exact("char"), Capability::leaf(parse_char));
    registry.register(&TypeDesc::exact("path"), Capability::leaf(parse_path));
    registry.register(&TypeDesc::exact("url"), Capability::leaf(parse_url));
    registry.register(&TypeDesc::exact("range"), Capability::leaf(parse_range));
    registry.register(&TypeDesc::exact("slice"), Capability::leaf(parse_slice));
    registry.register(&TypeDesc::exact(ANY), Capability::container(JsonParser));
}
