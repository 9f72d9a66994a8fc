//! Integer, float and big-integer parsers.

use super::expr::{self, ExprError};
use crate::descriptor::TypeDesc;
use crate::{Capability, Number, ParserOptions, Registry, Rejection, Value, ValueParser};
use num_bigint::BigInt;

/// Removes `_` digit separators, but only between two digits.
fn strip_separators(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    chars
        .iter()
        .enumerate()
        .filter(|&(i, &c)| {
            !(c == '_'
                && i > 0
                && i + 1 < chars.len()
                && chars[i - 1].is_ascii_alphanumeric()
                && chars[i + 1].is_ascii_alphanumeric())
        })
        .map(|(_, &c)| c)
        .collect()
}

fn expression_failure(literal_error: impl std::fmt::Display, err: ExprError) -> Rejection {
    if err.is_syntax() {
        Rejection::new(literal_error)
    } else {
        Rejection::new(err)
    }
}

/// Parses integers into a bounded range.
#[derive(Debug, Clone)]
pub(crate) struct IntParser {
    name: &'static str,
    min: i128,
    max: i128,
    allow_expressions: bool,
}

impl IntParser {
    pub(crate) fn new(name: &'static str, min: i128, max: i128, allow_expressions: bool) -> Self {
        IntParser {
            name,
            min,
            max,
            allow_expressions,
        }
    }

    fn parse_i128(&self, text: &str) -> Result<i128, Rejection> {
        let cleaned = strip_separators(text);
        match cleaned.parse::<i128>() {
            Ok(n) => Ok(n),
            Err(err) if self.allow_expressions => {
                expr::eval::<i128>(&cleaned).map_err(|e| expression_failure(err, e))
            }
            Err(err) => Err(Rejection::new(err)),
        }
    }
}

impl ValueParser for IntParser {
    fn parse(&self, raw: &str) -> Result<Value, Rejection> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(Rejection::new("empty input"));
        }
        if text.contains('.') {
            return Err(Rejection::new("looks like a float"));
        }
        let n = self.parse_i128(text)?;
        if n < self.min || n > self.max {
            return Err(Rejection::new(format!(
                "{} is out of range for {} ({}..={})",
                n, self.name, self.min, self.max
            )));
        }
        Ok(match i64::try_from(n) {
            Ok(small) => Value::Number(Number::Integer(small)),
            Err(_) => Value::BigInt(BigInt::from(n)),
        })
    }
}

/// Parses finite floats, optionally narrowed to `f32` range.
#[derive(Debug, Clone)]
pub(crate) struct FloatParser {
    narrow: bool,
    allow_expressions: bool,
}

impl FloatParser {
    pub(crate) fn new(narrow: bool, allow_expressions: bool) -> Self {
        FloatParser {
            narrow,
            allow_expressions,
        }
    }
}

impl ValueParser for FloatParser {
    fn parse(&self, raw: &str) -> Result<Value, Rejection> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(Rejection::new("empty input"));
        }
        let cleaned = strip_separators(text);
        let value = match cleaned.parse::<f64>() {
            Ok(v) => v,
            Err(err) if self.allow_expressions => {
                expr::eval::<f64>(&cleaned).map_err(|e| expression_failure(err, e))?
            }
            Err(err) => return Err(Rejection::new(err)),
        };
        if !value.is_finite() {
            return Err(Rejection::new(format!("{} is not a finite number", value)));
        }
        if self.narrow && value.abs() > f64::from(f32::MAX) {
            return Err(Rejection::new(format!("{} is out of range for f32", value)));
        }
        Ok(Value::Number(Number::Float(value)))
    }
}

/// Parses integers of any size.
#[derive(Debug, Clone)]
pub(crate) struct BigIntParser {
    allow_expressions: bool,
}

impl ValueParser for BigIntParser {
    fn parse(&self, raw: &str) -> Result<Value, Rejection> {
        let text = raw.trim();
        if text.contains('.') {
            return Err(Rejection::new("looks like a float"));
        }
        let cleaned = strip_separators(text);
        let digits = cleaned.strip_prefix('+').unwrap_or(&cleaned);
        match digits.parse::<BigInt>() {
            Ok(n) => Ok(Value::BigInt(n)),
            Err(err) if self.allow_expressions => expr::eval::<i128>(&cleaned)
                .map(|n| Value::BigInt(BigInt::from(n)))
                .map_err(|e| expression_failure(err, e)),
            Err(err) => Err(Rejection::new(err)),
        }
    }
}

pub(crate) fn register(registry: &mut Registry, options: &ParserOptions) {
    let expressions = options.allow_expressions;
    let ints: [(&'static str, i128, i128); 10] = [
        ("i8", i8::MIN.into(), i8::MAX.into()),
        ("i16", i16::MIN.into(), i16::MAX.into()),
        ("i32", i32::MIN.into(), i32::MAX.into()),
        ("i64", i64::MIN.into(), i64::MAX.into()),
        ("isize", isize::MIN as i128, isize::MAX as i128),
        ("u8", 0, u8::MAX.into()),
        ("u16", 0, u16::MAX.into()),
        ("u32", 0, u32::MAX.into()),
        ("u64", 0, u64::MAX.into()),
        ("usize", 0, usize::MAX as i128),
    ];
    for (name, min, max) in ints {
        registry.register(
            &TypeDesc::exact(name),
            Capability::leaf(IntParser::new(name, min, max, expressions)),
        );
    }
    registry.register(
        &TypeDesc::exact("f32"),
        Capability::leaf(FloatParser::new(true, expressions)),
    );
    registry.register(
        &TypeDesc::exact("f64"),
        Capability::leaf(FloatParser::new(false, expressions)),
    );
    registry.register(
        &TypeDesc::exact("bigint"),
        Capability::leaf(BigIntParser {
            allow_expressions: expressions,
        }),
    );
}
