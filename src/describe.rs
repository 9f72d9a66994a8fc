//! Descriptors for Rust types.
//!
//! [`Describe`] maps a Rust type onto its [`TypeDesc`]. Descriptors are
//! computed once per type and cached, so decomposing `HashMap<String,
//! Vec<Option<u16>>>` happens on the first parse only.
//!
//! User structs and enums get an implementation from the
//! [`record!`](crate::record) and [`enumeration!`](crate::enumeration)
//! macros, or by hand:
//!
//! ```rust
//! use strto::{Describe, ExactType, TypeDesc};
//!
//! struct Port(u16);
//!
//! impl Describe for Port {
//!     fn describe() -> TypeDesc {
//!         TypeDesc::Exact(ExactType::new("Port").with_supertype("u16"))
//!     }
//! }
//!
//! assert_eq!(strto::describe::<Vec<Port>>().to_string(), "list<Port>");
//! ```

use crate::descriptor::{TypeDesc, ANY};
use crate::{SliceBounds, StepRange, Value};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use std::any::TypeId;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

/// A Rust type with a known [`TypeDesc`].
pub trait Describe {
    fn describe() -> TypeDesc;
}

type Cache = RwLock<HashMap<TypeId, Arc<TypeDesc>>>;

fn cache() -> &'static Cache {
    static CACHE: OnceLock<Cache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Returns the cached descriptor of `T`, computing it on first use.
///
/// The lock is not held while `T::describe()` runs, so descriptors of
/// nested types may be looked up recursively.
pub fn descriptor_of<T: Describe + ?Sized + 'static>() -> Arc<TypeDesc> {
    let id = TypeId::of::<T>();
    if let Some(desc) = cache().read().get(&id) {
        return Arc::clone(desc);
    }
    let desc = Arc::new(T::describe());
    Arc::clone(cache().write().entry(id).or_insert(desc))
}

/// Returns an owned copy of the descriptor of `T`.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashMap;
///
/// assert_eq!(strto::describe::<Option<u16>>().to_string(), "u16 | null");
/// assert_eq!(
///     strto::describe::<HashMap<String, Vec<i64>>>().to_string(),
///     "map<str, list<i64>>"
/// );
/// ```
pub fn describe<T: Describe + ?Sized + 'static>() -> TypeDesc {
    (*descriptor_of::<T>()).clone()
}

macro_rules! describe_exact {
    ($($ty:ty => $name:expr),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDesc {
                    TypeDesc::exact($name)
                }
            }
        )*
    };
}

describe_exact! {
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
    bool => "bool",
    char => "char",
    String => "str",
    str => "str",
    PathBuf => "path",
    url::Url => "url",
    NaiveDate => "date",
    DateTime<Utc> => "datetime",
    NaiveTime => "time",
    std::time::Duration => "duration",
    StepRange => "range",
    SliceBounds => "slice",
    serde_json::Value => ANY,
    Value => ANY,
}

impl Describe for () {
    fn describe() -> TypeDesc {
        TypeDesc::null()
    }
}

impl<T: Describe + 'static> Describe for Option<T> {
    fn describe() -> TypeDesc {
        TypeDesc::optional(describe::<T>())
    }
}

impl<T: Describe + ?Sized + 'static> Describe for Box<T> {
    fn describe() -> TypeDesc {
        describe::<T>()
    }
}

impl<T: ?Sized> Describe for PhantomData<T> {
    fn describe() -> TypeDesc {
        TypeDesc::Unresolvable("PhantomData carries no value".to_string())
    }
}

macro_rules! describe_seq {
    ($ctor:ident: $($ty:ident<T $(, $extra:ident)*>),*) => {
        $(
            impl<T: Describe + 'static $(, $extra)*> Describe for $ty<T $(, $extra)*> {
                fn describe() -> TypeDesc {
                    TypeDesc::$ctor(describe::<T>())
                }
            }
        )*
    };
}

describe_seq!(list: Vec<T>, VecDeque<T>);
describe_seq!(set: HashSet<T, S>, BTreeSet<T>, IndexSet<T, S>);

macro_rules! describe_map {
    ($($ty:ident<K, V $(, $extra:ident)*>),*) => {
        $(
            impl<K, V $(, $extra)*> Describe for $ty<K, V $(, $extra)*>
            where
                K: Describe + 'static,
                V: Describe + 'static,
            {
                fn describe() -> TypeDesc {
                    TypeDesc::map(describe::<K>(), describe::<V>())
                }
            }
        )*
    };
}

describe_map!(HashMap<K, V, S>, BTreeMap<K, V>, IndexMap<K, V, S>);

macro_rules! describe_tuple {
    ($(($($name:ident),+))+) => {
        $(
            impl<$($name: Describe + 'static),+> Describe for ($($name,)+) {
                fn describe() -> TypeDesc {
                    TypeDesc::tuple(vec![$(describe::<$name>()),+])
                }
            }
        )+
    };
}

describe_tuple! {
    (A)
    (A, B)
    (A, B, C)
    (A, B, C, D)
    (A, B, C, D, E)
    (A, B, C, D, E, F)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Origin;

    #[test]
    fn test_nested_descriptors() {
        let desc = describe::<BTreeMap<String, Vec<Option<u16>>>>();
        assert_eq!(desc.to_string(), "map<str, list<u16 | null>>");
        match desc {
            TypeDesc::Generic { origin, args } => {
                assert_eq!(origin, Origin::Map);
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected generic, got {other}"),
        }
    }

    #[test]
    fn test_cache_returns_same_allocation() {
        let a = descriptor_of::<Vec<HashSet<u8>>>();
        let b = descriptor_of::<Vec<HashSet<u8>>>();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_option_of_option_flattens() {
        assert_eq!(describe::<Option<Option<i32>>>().to_string(), "i32 | null");
    }

    #[test]
    fn test_tuple_and_phantom() {
        assert_eq!(
            describe::<(i64, String, bool)>().to_string(),
            "tuple<i64, str, bool>"
        );
        assert!(matches!(
            describe::<PhantomData<u8>>(),
            TypeDesc::Unresolvable(_)
        ));
    }
}
