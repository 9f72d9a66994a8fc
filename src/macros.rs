/// Implements [`Describe`](crate::Describe) for a struct as a record.
///
/// Field names must match the names the struct deserializes from. A field
/// may carry `= default`; nullable fields without one default to null.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use strto::{record, TypeParser};
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct NetworkAddress {
///     host: String,
///     port: u16,
/// }
///
/// record!(NetworkAddress {
///     host: String,
///     port: u16 = 5432,
/// });
///
/// let parser = TypeParser::new();
/// let addr: NetworkAddress = parser.parse("host=localhost").unwrap();
/// assert_eq!(addr, NetworkAddress { host: "localhost".into(), port: 5432 });
/// ```
#[macro_export]
macro_rules! record {
    ($name:ident { $($field:ident : $fty:ty $(= $default:expr)?),* $(,)? }) => {
        impl $crate::Describe for $name {
            fn describe() -> $crate::TypeDesc {
                let record = $crate::RecordDesc::new(stringify!($name));
                $(
                    let field = $crate::FieldDesc::new(
                        stringify!($field),
                        $crate::describe::<$fty>(),
                    );
                    $(
                        let field = field.with_default_of::<$fty>(&$default);
                    )?
                    let record = record.field(field);
                )*
                $crate::TypeDesc::record(record)
            }
        }
    };
}

/// Implements [`Describe`](crate::Describe) for a fieldless enum.
///
/// Members are looked up by variant name, case-insensitively, and produce
/// the variant name itself, so the enum only needs `#[derive(Deserialize)]`.
///
/// # Examples
///
/// ```rust
/// use serde::Deserialize;
/// use strto::{enumeration, TypeParser};
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// enum LogLevel {
///     Debug,
///     Info,
///     Warning,
/// }
///
/// enumeration!(LogLevel { Debug, Info, Warning });
///
/// let parser = TypeParser::new();
/// assert_eq!(parser.parse::<LogLevel>("WARNING").unwrap(), LogLevel::Warning);
/// assert!(parser.parse::<LogLevel>("loud").is_err());
/// ```
#[macro_export]
macro_rules! enumeration {
    ($name:ident { $($variant:ident),* $(,)? }) => {
        impl $crate::Describe for $name {
            fn describe() -> $crate::TypeDesc {
                $crate::TypeDesc::enumeration($crate::EnumDesc::new(
                    stringify!($name),
                    [$(stringify!($variant)),*],
                ))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{describe, TypeDesc, Value};
    use std::collections::BTreeMap;

    #[allow(dead_code)]
    struct Database {
        host: String,
        port: u16,
        username: Option<String>,
    }

    record!(Database {
        host: String,
        port: u16 = 5432,
        username: Option<String>,
    });

    #[allow(dead_code)]
    enum Mode {
        Fast,
        Safe,
    }

    enumeration!(Mode { Fast, Safe });

    #[test]
    fn test_record_macro_fields() {
        let desc = describe::<Database>();
        let record = match &desc {
            TypeDesc::Record(record) => record,
            other => panic!("expected record, got {other}"),
        };
        assert_eq!(record.name(), "Database");
        assert_eq!(record.fields().len(), 3);
        assert!(record.get("host").unwrap().is_required());
        assert_eq!(record.get("port").unwrap().fallback(), Some(Value::from(5432)));
        assert_eq!(record.get("username").unwrap().fallback(), Some(Value::Null));
    }

    #[test]
    fn test_enumeration_macro() {
        match describe::<Mode>() {
            TypeDesc::Enum(desc) => {
                assert_eq!(desc.members().collect::<Vec<_>>(), vec!["Fast", "Safe"]);
            }
            other => panic!("expected enum, got {other}"),
        }
    }

    #[allow(dead_code)]
    struct Grid {
        cells: BTreeMap<(u8, u8), bool>,
    }

    record!(Grid {
        cells: BTreeMap<(u8, u8), bool> = BTreeMap::from([((0, 0), true)]),
    });

    #[test]
    fn test_unrepresentable_default_keeps_field_required() {
        let record = match describe::<Grid>() {
            TypeDesc::Record(record) => record,
            other => panic!("expected record, got {other}"),
        };
        let cells = record.get("cells").unwrap();
        assert!(cells.is_required());
        assert_eq!(cells.fallback(), None);
    }
}
