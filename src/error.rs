//! Error types for type-directed parsing.
//!
//! Every failure carries the [`FieldPath`] at which it happened, so a bad
//! value three records deep reports `database.replicas[1].port` rather than
//! a bare "invalid digit".
//!
//! ## Error Categories
//!
//! - **UnsupportedType**: no parser could be resolved for the target type
//! - **ParseValue**: a leaf parser rejected the literal
//! - **AmbiguousUnion**: every member of a union failed (one cause per member)
//! - **MissingField**: a required record field was absent
//! - **FileIndirection**: an `@path` reference could not be read or decoded
//! - **Decode**: the parsed value did not fit the caller's Rust type
//!
//! ## Examples
//!
//! ```rust
//! use strto::{ErrorKind, TypeParser};
//!
//! let parser = TypeParser::new();
//! let err = parser.parse::<i32>("twelve").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::ParseValue);
//! assert!(err.to_string().contains("twelve"));
//! ```

use crate::input::FieldPath;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Represents all possible errors that can occur while parsing.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// No capability could be resolved for the descriptor.
    #[error("unsupported type `{ty}` at {path}; register a parser for it with `add`")]
    UnsupportedType { path: FieldPath, ty: String },

    /// A leaf parser rejected the literal.
    #[error("could not parse {input:?} as {ty} at {path}: {reason}")]
    ParseValue {
        path: FieldPath,
        ty: String,
        input: String,
        reason: String,
    },

    /// Every member of a union rejected the literal.
    #[error(
        "could not parse {input:?} as {ty} at {path}; tried types: {}",
        summarize(.causes)
    )]
    AmbiguousUnion {
        path: FieldPath,
        ty: String,
        input: String,
        causes: Vec<Error>,
    },

    /// A required record field was absent from the input.
    #[error("missing required field `{path}`")]
    MissingField { path: FieldPath },

    /// An `@path` reference could not be read or decoded.
    #[error("cannot use file `{}` at {path}: {reason}", .file.display())]
    FileIndirection {
        path: FieldPath,
        file: PathBuf,
        reason: String,
    },

    /// The parsed value could not be converted into the requested Rust type.
    #[error("cannot convert parsed value: {0}")]
    Decode(String),
}

/// Discriminant of [`Error`], handy for matching without destructuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnsupportedType,
    ParseValue,
    AmbiguousUnion,
    MissingField,
    FileIndirection,
    Decode,
}

fn summarize(causes: &[Error]) -> String {
    causes
        .iter()
        .map(|cause| match cause {
            Error::ParseValue { ty, reason, .. } => format!("{ty} ({reason})"),
            Error::AmbiguousUnion { ty, .. } | Error::UnsupportedType { ty, .. } => ty.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Creates a [`Error::ParseValue`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strto::{Error, FieldPath};
    ///
    /// let err = Error::parse_value(FieldPath::root().field("port"), "u16", "http", "invalid digit");
    /// assert!(err.to_string().contains("at port"));
    /// ```
    pub fn parse_value(
        path: FieldPath,
        ty: impl fmt::Display,
        input: impl Into<String>,
        reason: impl fmt::Display,
    ) -> Self {
        Error::ParseValue {
            path,
            ty: ty.to_string(),
            input: input.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates an [`Error::UnsupportedType`].
    pub fn unsupported(path: FieldPath, ty: impl fmt::Display) -> Self {
        Error::UnsupportedType {
            path,
            ty: ty.to_string(),
        }
    }

    /// Creates an [`Error::MissingField`].
    pub fn missing_field(path: FieldPath) -> Self {
        Error::MissingField { path }
    }

    /// Creates an [`Error::FileIndirection`] naming the offending file.
    pub fn file(path: FieldPath, file: impl AsRef<Path>, reason: impl fmt::Display) -> Self {
        Error::FileIndirection {
            path,
            file: file.as_ref().to_path_buf(),
            reason: reason.to_string(),
        }
    }

    /// Creates an [`Error::Decode`].
    pub fn decode<T: fmt::Display>(msg: T) -> Self {
        Error::Decode(msg.to_string())
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedType { .. } => ErrorKind::UnsupportedType,
            Error::ParseValue { .. } => ErrorKind::ParseValue,
            Error::AmbiguousUnion { .. } => ErrorKind::AmbiguousUnion,
            Error::MissingField { .. } => ErrorKind::MissingField,
            Error::FileIndirection { .. } => ErrorKind::FileIndirection,
            Error::Decode(_) => ErrorKind::Decode,
        }
    }

    /// Returns the field path the error is attributed to, if any.
    #[must_use]
    pub fn path(&self) -> Option<&FieldPath> {
        match self {
            Error::UnsupportedType { path, .. }
            | Error::ParseValue { path, .. }
            | Error::AmbiguousUnion { path, .. }
            | Error::MissingField { path }
            | Error::FileIndirection { path, .. } => Some(path),
            Error::Decode(_) => None,
        }
    }

    /// Returns the per-member causes of an [`Error::AmbiguousUnion`], or an
    /// empty slice for every other kind.
    #[must_use]
    pub fn causes(&self) -> &[Error] {
        match self {
            Error::AmbiguousUnion { causes, .. } => causes,
            _ => &[],
        }
    }
}

/// Failure reported by a leaf [`ValueParser`](crate::ValueParser).
///
/// The registry wraps it into [`Error::ParseValue`] together with the type
/// name, the offending input and the field path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct Rejection(String);

impl Rejection {
    /// Creates a rejection with a human-readable reason.
    pub fn new(reason: impl fmt::Display) -> Self {
        Rejection(reason.to_string())
    }

    #[must_use]
    pub fn reason(&self) -> &str {
        &self.0
    }
}

pub type Result<T> = std::result::Result<T, Error>;
