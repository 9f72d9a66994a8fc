//! Textual type expressions.
//!
//! Lets callers name a target type at runtime, for example from a config
//! file: `dict[str, list[int]] | None`, `Optional[float]`, `Vec<u8>`,
//! `Literal['fast', 'safe']`. Both `[...]` and `<...>` argument brackets are
//! accepted.

use crate::descriptor::{Origin, TypeDesc, ANY};
use crate::Value;

impl TypeDesc {
    /// Parses a type expression into a descriptor.
    ///
    /// Never fails: text that does not parse, or a non-container name given
    /// arguments, resolves to [`TypeDesc::Unresolvable`]. Unknown bare names
    /// become exact types and are checked against the registry at parse time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use strto::TypeDesc;
    ///
    /// assert_eq!(TypeDesc::parse_expr("list[int]").to_string(), "list<i64>");
    /// assert_eq!(TypeDesc::parse_expr("Optional[float]").to_string(), "f64 | null");
    /// assert_eq!(
    ///     TypeDesc::parse_expr("HashMap<String, Vec<u8>>").to_string(),
    ///     "map<str, list<u8>>"
    /// );
    /// assert_eq!(TypeDesc::parse_expr("tuple[int, ...]").to_string(), "list<i64>");
    /// assert_eq!(TypeDesc::parse_expr("tuple[int]").to_string(), "list<i64>");
    /// assert_eq!(
    ///     TypeDesc::parse_expr("Literal['a', 2, True]").to_string(),
    ///     r#"literal["a", 2, true]"#
    /// );
    /// assert!(matches!(TypeDesc::parse_expr("list[int"), TypeDesc::Unresolvable(_)));
    /// ```
    #[must_use]
    pub fn parse_expr(text: &str) -> TypeDesc {
        let mut parser = ExprParser::new(text);
        match parser.parse_all() {
            Ok(desc) => desc,
            Err(reason) => TypeDesc::Unresolvable(format!("{:?}: {}", text, reason)),
        }
    }
}

type ExprResult<T> = std::result::Result<T, String>;

/// One parsed argument: a type, or the `...` marker of variadic tuples.
enum Arg {
    Type(TypeDesc),
    Ellipsis,
}

struct ExprParser<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> ExprParser<'a> {
    fn new(input: &'a str) -> Self {
        ExprParser { input, position: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(ch) if ch.is_whitespace()) {
            self.next_char();
        }
    }

    fn expect(&mut self, wanted: char) -> ExprResult<()> {
        self.skip_whitespace();
        match self.next_char() {
            Some(ch) if ch == wanted => Ok(()),
            Some(ch) => Err(format!("expected `{}`, found `{}`", wanted, ch)),
            None => Err(format!("expected `{}`, found end of input", wanted)),
        }
    }

    fn parse_all(&mut self) -> ExprResult<TypeDesc> {
        let desc = self.parse_union()?;
        self.skip_whitespace();
        match self.peek_char() {
            None => Ok(desc),
            Some(ch) => Err(format!("unexpected `{}` at offset {}", ch, self.position)),
        }
    }

    fn parse_union(&mut self) -> ExprResult<TypeDesc> {
        let mut members = vec![self.parse_term()?];
        loop {
            self.skip_whitespace();
            if self.peek_char() != Some('|') {
                break;
            }
            self.next_char();
            members.push(self.parse_term()?);
        }
        Ok(TypeDesc::union(members))
    }

    fn parse_name(&mut self) -> ExprResult<&'a str> {
        self.skip_whitespace();
        let start = self.position;
        while let Some(ch) = self.peek_char() {
            if ch.is_alphanumeric() || ch == '_' || ch == '.' || ch == ':' {
                self.next_char();
            } else {
                break;
            }
        }
        if start == self.position {
            return match self.peek_char() {
                Some(ch) => Err(format!("expected a type name, found `{}`", ch)),
                None => Err("expected a type name, found end of input".to_string()),
            };
        }
        Ok(&self.input[start..self.position])
    }

    fn parse_term(&mut self) -> ExprResult<TypeDesc> {
        let name = self.parse_name()?;
        self.skip_whitespace();
        if strip_module(name) == "Literal" && self.peek_char() == Some('[') {
            return self.parse_choices();
        }
        let args = match self.peek_char() {
            Some('[') => Some(self.parse_args(']')?),
            Some('<') => Some(self.parse_args('>')?),
            _ => None,
        };
        build(strip_module(name), args)
    }

    /// `Literal[...]` arguments: quoted strings, numbers, booleans and `None`.
    fn parse_choices(&mut self) -> ExprResult<TypeDesc> {
        self.next_char();
        let mut choices = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek_char() == Some(']') {
                break;
            }
            choices.push(self.parse_choice()?);
            self.skip_whitespace();
            if self.peek_char() == Some(',') {
                self.next_char();
            } else {
                break;
            }
        }
        self.expect(']')?;
        if choices.is_empty() {
            return Err("Literal needs at least one choice".to_string());
        }
        Ok(TypeDesc::literal(choices))
    }

    fn parse_choice(&mut self) -> ExprResult<Value> {
        if let Some(quote @ ('\'' | '"')) = self.peek_char() {
            self.next_char();
            let start = self.position;
            while let Some(ch) = self.next_char() {
                if ch == quote {
                    return Ok(Value::from(&self.input[start..self.position - 1]));
                }
            }
            return Err("unterminated string in Literal".to_string());
        }
        let start = self.position;
        while matches!(self.peek_char(), Some(ch) if ch != ',' && ch != ']' && !ch.is_whitespace()) {
            self.next_char();
        }
        let token = &self.input[start..self.position];
        match token {
            "True" | "true" => Ok(Value::Bool(true)),
            "False" | "false" => Ok(Value::Bool(false)),
            "None" | "null" => Ok(Value::Null),
            _ => token
                .parse::<i64>()
                .map(Value::from)
                .or_else(|_| token.parse::<f64>().map(Value::from))
                .map_err(|_| format!("`{}` is not a literal value", token)),
        }
    }

    fn parse_args(&mut self, close: char) -> ExprResult<Vec<Arg>> {
        self.next_char();
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek_char() == Some(close) {
            self.next_char();
            return Ok(args);
        }
        loop {
            self.skip_whitespace();
            if self.input[self.position..].starts_with("...") {
                self.position += 3;
                args.push(Arg::Ellipsis);
            } else {
                args.push(Arg::Type(self.parse_union()?));
            }
            self.skip_whitespace();
            match self.peek_char() {
                Some(',') => {
                    self.next_char();
                }
                _ => break,
            }
        }
        self.expect(close)?;
        Ok(args)
    }
}

/// `typing.Optional` → `Optional`, `std::path::PathBuf` → `PathBuf`.
fn strip_module(name: &str) -> &str {
    name.rsplit(|c: char| c == '.' || c == ':')
        .next()
        .unwrap_or(name)
}

fn exact_alias(name: &str) -> &str {
    match name {
        "int" | "integer" => "i64",
        "float" => "f64",
        "str" | "string" | "String" => "str",
        "None" | "NoneType" | "null" => "null",
        "bool" | "boolean" => "bool",
        "any" | "Any" | "json" | "object" | "Value" => ANY,
        "Path" | "PathBuf" | "path" => "path",
        "Url" | "url" | "uri" => "url",
        "date" | "NaiveDate" => "date",
        "datetime" | "DateTime" => "datetime",
        "time" | "NaiveTime" => "time",
        "timedelta" | "Duration" | "duration" => "duration",
        "slice" | "SliceBounds" => "slice",
        "range" | "StepRange" => "range",
        "bigint" | "BigInt" => "bigint",
        other => other,
    }
}

fn origin_alias(name: &str) -> Option<Origin> {
    match name {
        "list" | "List" | "Vec" | "VecDeque" | "deque" | "Deque" | "sequence" | "Sequence"
        | "Iterable" => Some(Origin::List),
        "set" | "Set" | "frozenset" | "FrozenSet" | "HashSet" | "BTreeSet" | "IndexSet" => {
            Some(Origin::Set)
        }
        "tuple" | "Tuple" => Some(Origin::Tuple),
        "dict" | "Dict" | "map" | "Map" | "mapping" | "Mapping" | "HashMap" | "BTreeMap"
        | "IndexMap" => Some(Origin::Map),
        _ => None,
    }
}

fn build(name: &str, args: Option<Vec<Arg>>) -> ExprResult<TypeDesc> {
    match (name, args) {
        ("Optional" | "Option", Some(args)) => {
            let mut types = only_types(name, args)?;
            if types.len() != 1 {
                return Err(format!("{} takes one argument, found {}", name, types.len()));
            }
            Ok(TypeDesc::optional(types.remove(0)))
        }
        ("Union", Some(args)) => Ok(TypeDesc::union(only_types(name, args)?)),
        (name, args) => match origin_alias(name) {
            Some(origin) => Ok(container(origin, args)),
            None => match args {
                None => Ok(TypeDesc::exact(exact_alias(name).to_string())),
                Some(_) => Err(format!("`{}` does not take type arguments", name)),
            },
        },
    }
}

fn only_types(name: &str, args: Vec<Arg>) -> ExprResult<Vec<TypeDesc>> {
    args.into_iter()
        .map(|arg| match arg {
            Arg::Type(ty) => Ok(ty),
            Arg::Ellipsis => Err(format!("`...` is not valid inside {}", name)),
        })
        .collect()
}

fn container(origin: Origin, args: Option<Vec<Arg>>) -> TypeDesc {
    let args = match args {
        Some(args) if !args.is_empty() => args,
        _ => {
            return match origin {
                Origin::Map => TypeDesc::map(TypeDesc::any(), TypeDesc::any()),
                Origin::Set => TypeDesc::set(TypeDesc::any()),
                Origin::List | Origin::Tuple => TypeDesc::list(TypeDesc::any()),
            }
        }
    };
    // tuple[T] and tuple[T, ...] are homogeneous, variable-length sequences
    if origin == Origin::Tuple {
        if let [Arg::Type(item)] | [Arg::Type(item), Arg::Ellipsis] = args.as_slice() {
            return TypeDesc::list(item.clone());
        }
    }
    match only_types(origin.name(), args) {
        Ok(types) => TypeDesc::generic(origin, types),
        Err(reason) => TypeDesc::Unresolvable(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(text: &str) -> String {
        TypeDesc::parse_expr(text).to_string()
    }

    #[test]
    fn test_aliases() {
        assert_eq!(expr("int"), "i64");
        assert_eq!(expr("typing.Any"), "json");
        assert_eq!(expr("std::path::PathBuf"), "path");
        assert_eq!(expr("NetworkAddress"), "NetworkAddress");
    }

    #[test]
    fn test_nested_union_in_arguments() {
        assert_eq!(
            expr("dict[str, list[int | float]] | None"),
            "map<str, list<i64 | f64>> | null"
        );
        assert_eq!(expr("Union[int, Union[str, int]]"), "i64 | str");
    }

    #[test]
    fn test_bare_containers_default_to_json() {
        assert_eq!(expr("list"), "list<json>");
        assert_eq!(expr("dict"), "map<json, json>");
        assert_eq!(expr("tuple"), "list<json>");
        assert_eq!(expr("set[]"), "set<json>");
    }

    #[test]
    fn test_single_argument_tuple_is_homogeneous() {
        assert_eq!(expr("tuple[int]"), "list<i64>");
        assert_eq!(expr("Tuple[str, ...]"), "list<str>");
        assert_eq!(expr("tuple[int, str]"), "tuple<i64, str>");
        // Rust tuples keep their arity.
        assert_eq!(crate::describe::<(i64,)>().to_string(), "tuple<i64>");
    }

    #[test]
    fn test_literal_choices() {
        assert_eq!(
            TypeDesc::parse_expr("typing.Literal['fast', \"safe\", 3, -1.5, False, None]"),
            TypeDesc::literal([
                Value::from("fast"),
                Value::from("safe"),
                Value::from(3),
                Value::from(-1.5),
                Value::from(false),
                Value::Null,
            ])
        );
        assert_eq!(expr("Literal['a b', 'c,d']"), r#"literal["a b", "c,d"]"#);
        assert_eq!(expr("Optional[Literal[1, 2]]"), "literal[1, 2] | null");
    }

    #[test]
    fn test_time_aliases() {
        assert_eq!(expr("timedelta"), "duration");
        assert_eq!(expr("datetime.time"), "time");
        assert_eq!(expr("slice"), "slice");
    }

    #[test]
    fn test_malformed_is_unresolvable() {
        for bad in [
            "",
            "list[",
            "int[str]",
            "dict[str]",
            "a b",
            "Optional[int, str]",
            "Literal[]",
            "Literal[red]",
            "Literal['open",
        ] {
            assert!(
                matches!(TypeDesc::parse_expr(bad), TypeDesc::Unresolvable(_)),
                "{bad:?} should be unresolvable"
            );
        }
    }
}
