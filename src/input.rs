//! Raw input and field-path bookkeeping.
//!
//! An [`Envelope`] pairs the raw [`Input`] with the [`FieldPath`] it was
//! found at. The path is only used to attribute errors; it carries no
//! parsing state.

use serde_json::Value as Json;
use std::borrow::Cow;
use std::fmt;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Field(String),
    Index(usize),
}

/// Dotted, root-relative location of a value inside the input.
///
/// # Examples
///
/// ```rust
/// use strto::FieldPath;
///
/// let path = FieldPath::root().field("replicas").index(1).field("port");
/// assert_eq!(path.to_string(), "replicas[1].port");
/// assert_eq!(FieldPath::root().to_string(), "<root>");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    #[must_use]
    pub fn root() -> Self {
        FieldPath(Vec::new())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new path extended with a named field.
    #[must_use]
    pub fn field(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Field(name.to_string()));
        FieldPath(segments)
    }

    /// Returns a new path extended with a sequence index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        FieldPath(segments)
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Field(name) if i == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Raw value handed to a parser: caller text, or a node of already-decoded
/// JSON (a record field, a JSON array element, a decoded file).
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    Text(&'a str),
    Json(&'a Json),
}

impl<'a> Input<'a> {
    /// Renders the input as text for leaf parsers.
    ///
    /// JSON strings are returned without quotes, scalars in their literal
    /// form and arrays/objects as compact JSON, so a sequence or mapping
    /// parser receiving them sees JSON-shaped text.
    #[must_use]
    pub fn text(&self) -> Cow<'a, str> {
        match *self {
            Input::Text(text) => Cow::Borrowed(text),
            Input::Json(Json::String(s)) => Cow::Borrowed(s.as_str()),
            Input::Json(Json::Null) => Cow::Borrowed(""),
            Input::Json(other) => Cow::Owned(other.to_string()),
        }
    }

    /// Returns `true` for a JSON `null`. Text is never null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Input::Json(Json::Null))
    }

    #[must_use]
    pub fn as_json(&self) -> Option<&'a Json> {
        match *self {
            Input::Json(json) => Some(json),
            Input::Text(_) => None,
        }
    }
}

/// An [`Input`] together with the path it was found at.
#[derive(Debug, Clone)]
pub struct Envelope<'a> {
    pub input: Input<'a>,
    pub path: FieldPath,
}

impl<'a> Envelope<'a> {
    pub fn new(input: Input<'a>, path: FieldPath) -> Self {
        Envelope { input, path }
    }

    pub fn root(input: Input<'a>) -> Self {
        Envelope::new(input, FieldPath::root())
    }

    /// Envelope for a named child of this value.
    pub fn field<'b>(&self, name: &str, input: Input<'b>) -> Envelope<'b> {
        Envelope::new(input, self.path.field(name))
    }

    /// Envelope for the `index`-th element of this value.
    pub fn element<'b>(&self, index: usize, input: Input<'b>) -> Envelope<'b> {
        Envelope::new(input, self.path.index(index))
    }
}
