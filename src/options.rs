//! Configuration options for a parser.
//!
//! - [`ParserOptions`]: main configuration struct
//! - [`Delimiter`]: separator used to split sequence literals
//!
//! Options are fixed when a [`Registry`](crate::Registry) is built; the
//! built-in parsers capture the values they need at registration.
//!
//! ## Examples
//!
//! ```rust
//! use strto::{Delimiter, ParserOptions, TypeParser};
//!
//! let options = ParserOptions::new().with_delimiter(Delimiter::Pipe);
//! let parser = TypeParser::with_options(options);
//! let values: Vec<u8> = parser.parse("1|2|3").unwrap();
//! assert_eq!(values, vec![1, 2, 3]);
//! ```

/// Separator for sequence, set and tuple literals.
///
/// # Examples
///
/// ```rust
/// use strto::Delimiter;
///
/// assert_eq!(Delimiter::Comma.as_char(), ',');
/// assert_eq!(Delimiter::Tab.as_char(), '\t');
/// assert_eq!(Delimiter::Pipe.as_char(), '|');
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Semicolon,
    Tab,
    Pipe,
}

impl Delimiter {
    #[must_use]
    pub const fn as_char(&self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Semicolon => ';',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }
}

/// Configuration options for parsing.
///
/// # Examples
///
/// ```rust
/// use strto::ParserOptions;
///
/// let options = ParserOptions::new();
/// assert!(options.from_file);
/// assert!(options.allow_expressions);
/// assert!(!options.allow_constructor_fields);
///
/// let strict = ParserOptions::new()
///     .with_file_indirection(false)
///     .with_expressions(false);
/// assert!(!strict.from_file);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParserOptions {
    /// Separator for sequence literals.
    pub delimiter: Delimiter,
    /// Treat `@path` values as references to JSON/YAML/text files.
    pub from_file: bool,
    /// Let numeric parsers evaluate arithmetic such as `2^10` or `pi/2`.
    pub allow_expressions: bool,
    /// Build opaque types from field lists declared with
    /// [`Registry::declare_constructor`](crate::Registry::declare_constructor).
    pub allow_constructor_fields: bool,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            delimiter: Delimiter::default(),
            from_file: true,
            allow_expressions: true,
            allow_constructor_fields: false,
        }
    }
}

impl ParserOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_file_indirection(mut self, enabled: bool) -> Self {
        self.from_file = enabled;
        self
    }

    #[must_use]
    pub fn with_expressions(mut self, enabled: bool) -> Self {
        self.allow_expressions = enabled;
        self
    }

    /// Enables the opt-in mode that builds opaque types from declared
    /// constructor field lists.
    #[must_use]
    pub fn with_constructor_fields(mut self, enabled: bool) -> Self {
        self.allow_constructor_fields = enabled;
        self
    }
}
