//! Enumeration member and literal choice lookup.

use crate::descriptor::{EnumDesc, LiteralDesc};
use crate::{Rejection, Value};

/// Resolves `raw` to a member name of `desc`.
pub(crate) fn lookup(desc: &EnumDesc, raw: &str) -> Result<Value, Rejection> {
    let name = raw.trim();
    match desc.lookup(name) {
        Some(member) => Ok(Value::String(member.to_string())),
        None => Err(Rejection::new(format!(
            "unknown {} member; valid choices are: {}",
            desc.name(),
            desc.members().collect::<Vec<_>>().join(", ")
        ))),
    }
}

/// Resolves `raw` to one of the choices of a literal type.
pub(crate) fn choose(desc: &LiteralDesc, raw: &str) -> Result<Value, Rejection> {
    match desc.lookup(raw) {
        Some(choice) => Ok(choice.clone()),
        None if desc.choices().is_empty() => Err(Rejection::new("literal type has no choices")),
        None => Err(Rejection::new(format!("valid choices: {}", desc.listing()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let level = EnumDesc::new("LogLevel", ["DEBUG", "INFO", "WARNING"]);
        assert_eq!(lookup(&level, "warning"), Ok(Value::from("WARNING")));
        assert_eq!(lookup(&level, " INFO "), Ok(Value::from("INFO")));
        let err = lookup(&level, "LOUD").unwrap_err();
        assert_eq!(
            err.reason(),
            "unknown LogLevel member; valid choices are: DEBUG, INFO, WARNING"
        );
    }

    #[test]
    fn test_choose_returns_typed_choice() {
        let choice = LiteralDesc::new([Value::from(1), Value::from("two"), Value::from(true)]);
        assert_eq!(choose(&choice, "1"), Ok(Value::from(1)));
        assert_eq!(choose(&choice, "TRUE"), Ok(Value::from(true)));
        assert_eq!(
            choose(&choice, "three").unwrap_err().reason(),
            r#"valid choices: 1, "two", true"#
        );
        assert!(choose(&LiteralDesc::new([]), "anything").is_err());
    }
}
