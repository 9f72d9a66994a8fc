//! Built-in capabilities.
//!
//! [`register`] fills a fresh [`Registry`] with a parser for every built-in
//! exact type and container origin. Option values are captured at this point.
//!
//! | key | accepts |
//! |-----|---------|
//! | `i8` .. `u64`, `isize`, `usize` | integer literals and arithmetic, bounds-checked |
//! | `bigint` | integers of any size |
//! | `f32`, `f64` | finite float literals, arithmetic and named constants |
//! | `bool` | `true/false`, `1/0`, `yes/no`, `on/off` |
//! | `null` | empty text, `null`, `none` |
//! | `str`, `char`, `path`, `url` | text, checked syntactically |
//! | `date`, `datetime`, `time` | several fixed formats, first match wins |
//! | `duration` | seconds or `HH:MM:SS` |
//! | `range` | `start:stop[:step]` |
//! | `slice` | `start:stop[:step]`, every part optional |
//! | `json` | any JSON value, else the text itself |
//! | `list`, `set`, `tuple` | delimited text, JSON arrays, `@file` |
//! | `map` | JSON objects, `@file` |

pub(crate) mod collections;
pub(crate) mod dates;
pub(crate) mod enums;
pub(crate) mod expr;
pub(crate) mod numbers;
pub(crate) mod scalars;

use crate::Registry;

pub(crate) fn register(registry: &mut Registry) {
    let options = registry.options().clone();
    numbers::register(registry, &options);
    scalars::register(registry);
    dates::register(registry);
    collections::register(registry, &options);
}
