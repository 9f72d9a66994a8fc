//! Arithmetic over numeric literals.
//!
//! A small recursive-descent evaluator used by the numeric parsers when
//! expressions are enabled. It only knows literals, named constants and
//! arithmetic operators; there is no way to call anything.
//!
//! ```text
//! expr  := term (('+' | '-') term)*
//! term  := unary (('*' | '/' | '//' | '%') unary)*
//! unary := ('+' | '-') unary | power
//! power := atom (('**' | '^') unary)?
//! atom  := number | name | '(' expr ')'
//! ```

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum ExprError {
    #[error("unexpected {0:?} in expression")]
    Unexpected(String),
    #[error("unexpected end of expression")]
    End,
    #[error("unknown name {0:?}")]
    UnknownName(String),
    #[error("invalid number literal {0:?}")]
    Literal(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("result out of range")]
    Overflow,
    #[error("negative exponent in integer expression")]
    NegativeExponent,
    #[error("result is not a real number")]
    NotReal,
    #[error("expression nests deeper than {} levels", MAX_DEPTH)]
    TooDeep,
}

impl ExprError {
    /// `true` when the text is not an expression at all, as opposed to an
    /// expression whose evaluation failed.
    pub(crate) fn is_syntax(&self) -> bool {
        matches!(
            self,
            ExprError::Unexpected(_)
                | ExprError::End
                | ExprError::UnknownName(_)
                | ExprError::Literal(_)
                | ExprError::TooDeep
        )
    }
}

type EvalResult<T> = std::result::Result<T, ExprError>;

/// Deepest nesting of signs, exponents and parentheses.
pub(crate) const MAX_DEPTH: usize = 256;

/// Numeric domain an expression is evaluated in.
pub(crate) trait Arith: Copy {
    fn literal(text: &str) -> EvalResult<Self>;
    fn constant(name: &str) -> Option<Self>;
    fn add(self, rhs: Self) -> EvalResult<Self>;
    fn sub(self, rhs: Self) -> EvalResult<Self>;
    fn mul(self, rhs: Self) -> EvalResult<Self>;
    fn div(self, rhs: Self) -> EvalResult<Self>;
    fn floor_div(self, rhs: Self) -> EvalResult<Self>;
    fn rem(self, rhs: Self) -> EvalResult<Self>;
    fn pow(self, rhs: Self) -> EvalResult<Self>;
    fn neg(self) -> EvalResult<Self>;
}

fn radix_literal(text: &str) -> Option<EvalResult<i128>> {
    let lower = text.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest.to_string(), 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest.to_string(), 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest.to_string(), 2)
    } else {
        return None;
    };
    Some(i128::from_str_radix(&digits, radix).map_err(|_| ExprError::Literal(text.to_string())))
}

impl Arith for i128 {
    fn literal(text: &str) -> EvalResult<Self> {
        let cleaned = text.replace('_', "");
        match radix_literal(&cleaned) {
            Some(result) => result,
            None => cleaned
                .parse()
                .map_err(|_| ExprError::Literal(text.to_string())),
        }
    }

    fn constant(_name: &str) -> Option<Self> {
        None
    }

    fn add(self, rhs: Self) -> EvalResult<Self> {
        self.checked_add(rhs).ok_or(ExprError::Overflow)
    }

    fn sub(self, rhs: Self) -> EvalResult<Self> {
        self.checked_sub(rhs).ok_or(ExprError::Overflow)
    }

    fn mul(self, rhs: Self) -> EvalResult<Self> {
        self.checked_mul(rhs).ok_or(ExprError::Overflow)
    }

    // Integer `/` floors, so it always stays an integer.
    fn div(self, rhs: Self) -> EvalResult<Self> {
        self.floor_div(rhs)
    }

    fn floor_div(self, rhs: Self) -> EvalResult<Self> {
        if rhs == 0 {
            return Err(ExprError::DivisionByZero);
        }
        let quotient = self.checked_div(rhs).ok_or(ExprError::Overflow)?;
        let remainder = self % rhs;
        if remainder != 0 && ((remainder < 0) != (rhs < 0)) {
            Ok(quotient - 1)
        } else {
            Ok(quotient)
        }
    }

    fn rem(self, rhs: Self) -> EvalResult<Self> {
        if rhs == 0 {
            return Err(ExprError::DivisionByZero);
        }
        let remainder = self.checked_rem(rhs).ok_or(ExprError::Overflow)?;
        if remainder != 0 && ((remainder < 0) != (rhs < 0)) {
            Ok(remainder + rhs)
        } else {
            Ok(remainder)
        }
    }

    fn pow(self, rhs: Self) -> EvalResult<Self> {
        if rhs < 0 {
            return Err(ExprError::NegativeExponent);
        }
        let exp = u32::try_from(rhs).map_err(|_| ExprError::Overflow)?;
        self.checked_pow(exp).ok_or(ExprError::Overflow)
    }

    fn neg(self) -> EvalResult<Self> {
        self.checked_neg().ok_or(ExprError::Overflow)
    }
}

fn finite(value: f64) -> EvalResult<f64> {
    if value.is_nan() {
        Err(ExprError::NotReal)
    } else if value.is_infinite() {
        Err(ExprError::Overflow)
    } else {
        Ok(value)
    }
}

impl Arith for f64 {
    fn literal(text: &str) -> EvalResult<Self> {
        let cleaned = text.replace('_', "");
        match radix_literal(&cleaned) {
            Some(result) => result.map(|i| i as f64),
            None => cleaned
                .parse()
                .map_err(|_| ExprError::Literal(text.to_string())),
        }
    }

    fn constant(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "pi" => Some(std::f64::consts::PI),
            "e" => Some(std::f64::consts::E),
            "tau" => Some(std::f64::consts::TAU),
            "phi" => Some((1.0 + 5f64.sqrt()) / 2.0),
            "sqrt2" => Some(std::f64::consts::SQRT_2),
            "sqrt3" => Some(3f64.sqrt()),
            _ => None,
        }
    }

    fn add(self, rhs: Self) -> EvalResult<Self> {
        finite(self + rhs)
    }

    fn sub(self, rhs: Self) -> EvalResult<Self> {
        finite(self - rhs)
    }

    fn mul(self, rhs: Self) -> EvalResult<Self> {
        finite(self * rhs)
    }

    fn div(self, rhs: Self) -> EvalResult<Self> {
        if rhs == 0.0 {
            return Err(ExprError::DivisionByZero);
        }
        finite(self / rhs)
    }

    fn floor_div(self, rhs: Self) -> EvalResult<Self> {
        Ok(self.div(rhs)?.floor())
    }

    fn rem(self, rhs: Self) -> EvalResult<Self> {
        let quotient = self.floor_div(rhs)?;
        finite(self - rhs * quotient)
    }

    fn pow(self, rhs: Self) -> EvalResult<Self> {
        if self == 0.0 && rhs < 0.0 {
            return Err(ExprError::DivisionByZero);
        }
        finite(self.powf(rhs))
    }

    fn neg(self) -> EvalResult<Self> {
        Ok(-self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token<'a> {
    Number(&'a str),
    Name(&'a str),
    Op(&'static str),
    Open,
    Close,
}

impl Token<'_> {
    fn describe(&self) -> String {
        match self {
            Token::Number(text) | Token::Name(text) => (*text).to_string(),
            Token::Op(op) => (*op).to_string(),
            Token::Open => "(".to_string(),
            Token::Close => ")".to_string(),
        }
    }
}

fn tokenize(input: &str) -> EvalResult<Vec<Token<'_>>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let ch = bytes[pos];
        match ch {
            b' ' | b'\t' | b'\n' | b'\r' => pos += 1,
            b'0'..=b'9' | b'.' => {
                let start = pos;
                let radix = bytes.get(pos + 1).map_or(false, |b| b.is_ascii_alphabetic())
                    && ch == b'0';
                pos += 1;
                while pos < bytes.len() {
                    let b = bytes[pos];
                    let exponent_sign = !radix
                        && (b == b'+' || b == b'-')
                        && matches!(bytes[pos - 1], b'e' | b'E');
                    if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || exponent_sign {
                        pos += 1;
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Number(&input[start..pos]));
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let start = pos;
                while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
                    pos += 1;
                }
                tokens.push(Token::Name(&input[start..pos]));
            }
            b'*' if bytes.get(pos + 1) == Some(&b'*') => {
                tokens.push(Token::Op("**"));
                pos += 2;
            }
            b'/' if bytes.get(pos + 1) == Some(&b'/') => {
                tokens.push(Token::Op("//"));
                pos += 2;
            }
            b'+' | b'-' | b'*' | b'/' | b'%' | b'^' => {
                let op = match ch {
                    b'+' => "+",
                    b'-' => "-",
                    b'*' => "*",
                    b'/' => "/",
                    b'%' => "%",
                    _ => "^",
                };
                tokens.push(Token::Op(op));
                pos += 1;
            }
            b'(' => {
                tokens.push(Token::Open);
                pos += 1;
            }
            b')' => {
                tokens.push(Token::Close);
                pos += 1;
            }
            _ => {
                let rest: String = input[pos..].chars().take(1).collect();
                return Err(ExprError::Unexpected(rest));
            }
        }
    }
    Ok(tokens)
}

struct Evaluator<'t, 'a> {
    tokens: &'t [Token<'a>],
    position: usize,
    depth: usize,
}

impl<'t, 'a> Evaluator<'t, 'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.position).copied()
    }

    fn next(&mut self) -> EvalResult<Token<'a>> {
        let token = self.peek().ok_or(ExprError::End)?;
        self.position += 1;
        Ok(token)
    }

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> EvalResult<T>) -> EvalResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(ExprError::TooDeep);
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn expr<T: Arith>(&mut self) -> EvalResult<T> {
        let mut value = self.term::<T>()?;
        while let Some(Token::Op(op @ ("+" | "-"))) = self.peek() {
            self.position += 1;
            let rhs = self.term::<T>()?;
            value = if op == "+" { value.add(rhs)? } else { value.sub(rhs)? };
        }
        Ok(value)
    }

    fn term<T: Arith>(&mut self) -> EvalResult<T> {
        let mut value = self.unary::<T>()?;
        while let Some(Token::Op(op @ ("*" | "/" | "//" | "%"))) = self.peek() {
            self.position += 1;
            let rhs = self.unary::<T>()?;
            value = match op {
                "*" => value.mul(rhs)?,
                "/" => value.div(rhs)?,
                "//" => value.floor_div(rhs)?,
                _ => value.rem(rhs)?,
            };
        }
        Ok(value)
    }

    fn unary<T: Arith>(&mut self) -> EvalResult<T> {
        match self.peek() {
            Some(Token::Op("-")) => {
                self.position += 1;
                self.nested(Self::unary::<T>)?.neg()
            }
            Some(Token::Op("+")) => {
                self.position += 1;
                self.nested(Self::unary::<T>)
            }
            _ => self.power::<T>(),
        }
    }

    fn power<T: Arith>(&mut self) -> EvalResult<T> {
        let base = self.atom::<T>()?;
        if let Some(Token::Op("**" | "^")) = self.peek() {
            self.position += 1;
            let exponent = self.nested(Self::unary::<T>)?;
            return base.pow(exponent);
        }
        Ok(base)
    }

    fn atom<T: Arith>(&mut self) -> EvalResult<T> {
        match self.next()? {
            Token::Number(text) => T::literal(text),
            Token::Name(name) => T::constant(name).ok_or_else(|| ExprError::UnknownName(name.to_string())),
            Token::Open => {
                let value = self.nested(Self::expr::<T>)?;
                match self.next()? {
                    Token::Close => Ok(value),
                    other => Err(ExprError::Unexpected(other.describe())),
                }
            }
            other => Err(ExprError::Unexpected(other.describe())),
        }
    }
}

/// Evaluates `input` in the numeric domain `T`.
pub(crate) fn eval<T: Arith>(input: &str) -> EvalResult<T> {
    let tokens = tokenize(input)?;
    let mut evaluator = Evaluator {
        tokens: &tokens,
        position: 0,
        depth: 0,
    };
    let value = evaluator.expr::<T>()?;
    match evaluator.peek() {
        None => Ok(value),
        Some(token) => Err(ExprError::Unexpected(token.describe())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_precedence() {
        assert_eq!(eval::<i128>("2 + 3 * 4"), Ok(14));
        assert_eq!(eval::<i128>("(2 + 3) * 4"), Ok(20));
        assert_eq!(eval::<i128>("2^10"), Ok(1024));
        assert_eq!(eval::<i128>("2**3**2"), Ok(512));
        assert_eq!(eval::<i128>("-2**2"), Ok(-4));
        assert_eq!(eval::<i128>("0x10 + 0b11 + 0o7"), Ok(26));
        assert_eq!(eval::<i128>("1_000 * 3"), Ok(3000));
    }

    #[test]
    fn test_integer_division_floors() {
        assert_eq!(eval::<i128>("7 / 2"), Ok(3));
        assert_eq!(eval::<i128>("-7 // 2"), Ok(-4));
        assert_eq!(eval::<i128>("-7 % 3"), Ok(2));
        assert_eq!(eval::<i128>("1 / 0"), Err(ExprError::DivisionByZero));
        assert_eq!(eval::<i128>("2 ** -1"), Err(ExprError::NegativeExponent));
    }

    #[test]
    fn test_float_constants() {
        let half_pi = eval::<f64>("pi / 2").unwrap();
        assert!((half_pi - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
        assert_eq!(eval::<f64>("1e3 + 2.5"), Ok(1002.5));
        assert_eq!(eval::<f64>("7 // 2"), Ok(3.0));
        assert!(eval::<i128>("pi").unwrap_err().is_syntax());
    }

    #[test]
    fn test_rejects_non_expressions() {
        for bad in ["", "abc", "2 +", "(1", "1 2", "__import__('os')", "1; 2"] {
            let err = eval::<i128>(bad).unwrap_err();
            assert!(err.is_syntax(), "{bad:?} gave {err:?}");
        }
        assert!(!eval::<f64>("10 ** 400").unwrap_err().is_syntax());
    }

    #[test]
    fn test_nesting_depth_is_bounded() {
        let shallow = format!("{}1{}", "(".repeat(MAX_DEPTH - 1), ")".repeat(MAX_DEPTH - 1));
        assert_eq!(eval::<i128>(&shallow), Ok(1));
        assert_eq!(eval::<i128>(&format!("{}1", "-".repeat(MAX_DEPTH))), Ok(1));

        for deep in [
            format!("{}1", "-".repeat(10_000)),
            format!("{}1", "(".repeat(10_000)),
            format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000)),
            format!("2{}", "**2".repeat(10_000)),
            format!("{}1", "+-(".repeat(5_000)),
        ] {
            let err = eval::<f64>(&deep).unwrap_err();
            assert_eq!(err, ExprError::TooDeep);
            assert!(err.is_syntax());
        }
    }
}
