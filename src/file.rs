//! `@path` file indirection.
//!
//! The decoding is chosen by extension: `.json` is JSON, `.yaml`/`.yml` is
//! YAML. Objects read from any other file are tried as JSON, then YAML;
//! sequences read from any other file are taken line by line.

use crate::input::FieldPath;
use crate::{Error, Result};
use serde_json::{Map, Value as Json};
use std::path::Path;

pub(crate) const FILE_PREFIX: char = '@';

/// Returns the path of an `@path` reference.
pub(crate) fn reference(text: &str) -> Option<&str> {
    text.trim().strip_prefix(FILE_PREFIX).map(str::trim)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
    Other,
}

fn format_of(path: &Path) -> Format {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => Format::Json,
        Some("yaml" | "yml") => Format::Yaml,
        _ => Format::Other,
    }
}

fn read(path: &Path, at: &FieldPath) -> Result<String> {
    tracing::debug!(file = %path.display(), at = %at, "reading indirected file");
    std::fs::read_to_string(path).map_err(|err| Error::file(at.clone(), path, err))
}

fn decode(path: &Path, at: &FieldPath, text: &str, format: Format) -> Result<Json> {
    let decoded: std::result::Result<Json, String> = match format {
        Format::Json => serde_json::from_str(text).map_err(|err| err.to_string()),
        Format::Yaml => serde_yaml::from_str(text).map_err(|err| err.to_string()),
        Format::Other => serde_json::from_str(text)
            .or_else(|_| serde_yaml::from_str(text))
            .map_err(|err| err.to_string()),
    };
    decoded.map_err(|reason| Error::file(at.clone(), path, reason))
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

/// Reads a file that must decode to an object.
pub(crate) fn read_object(reference: &str, at: &FieldPath) -> Result<Map<String, Json>> {
    let path = Path::new(reference);
    let text = read(path, at)?;
    match decode(path, at, &text, format_of(path))? {
        Json::Object(map) => Ok(map),
        other => Err(Error::file(
            at.clone(),
            path,
            format!("expected an object, found {}", json_kind(&other)),
        )),
    }
}

/// Items of an indirected sequence.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SequenceSource {
    Json(Vec<Json>),
    Lines(Vec<String>),
}

/// Reads a sequence: a JSON/YAML array, or one item per non-blank line.
/// A single line holding the delimiter is split on it.
pub(crate) fn read_sequence(
    reference: &str,
    at: &FieldPath,
    delimiter: char,
) -> Result<SequenceSource> {
    let path = Path::new(reference);
    let text = read(path, at)?;
    let format = format_of(path);
    if format != Format::Other {
        return match decode(path, at, &text, format)? {
            Json::Array(items) => Ok(SequenceSource::Json(items)),
            other => Err(Error::file(
                at.clone(),
                path,
                format!("expected an array, found {}", json_kind(&other)),
            )),
        };
    }

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let items = match lines.as_slice() {
        [single] if single.contains(delimiter) => single
            .split(delimiter)
            .map(|part| part.trim().to_string())
            .collect(),
        _ => lines.into_iter().map(str::to_string).collect(),
    };
    Ok(SequenceSource::Lines(items))
}
