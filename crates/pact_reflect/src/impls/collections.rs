use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::hash::{BuildHasher, Hash};
use std::collections::HashMap;

use crate::cell::{GenericTypeInfoCell, GenericTypePathCell, concat};
use crate::info::{ListInfo, MapInfo, TypeInfo, TypePath, Typed};
use crate::value::{FromValue, IntoValue, Value, ValueError};

// -----------------------------------------------------------------------------
// Vec

impl<T: TypePath> TypePath for Vec<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["alloc::vec::Vec<", T::type_path(), ">"]))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["Vec<", T::type_name(), ">"]))
    }
}

impl<T: Typed> Typed for Vec<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::List(ListInfo::new::<Self, T>()))
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(IntoValue::to_value).collect())
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            Value::Nil => Ok(Vec::new()),
            other => Err(other.mismatch("list")),
        }
    }
}

// -----------------------------------------------------------------------------
// Box

// `Box<T>` is described as `T`, so a boxed field shares the procedures of
// its pointee. Recursive types rely on this.
impl<T: TypePath> TypePath for Box<T> {
    #[inline]
    fn type_path() -> &'static str {
        T::type_path()
    }

    #[inline]
    fn type_name() -> &'static str {
        T::type_name()
    }
}

impl<T: Typed> Typed for Box<T> {
    #[inline]
    fn type_info() -> &'static TypeInfo {
        T::type_info()
    }
}

impl<T: IntoValue> IntoValue for Box<T> {
    #[inline]
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: FromValue> FromValue for Box<T> {
    #[inline]
    fn from_value(value: Value) -> Result<Self, ValueError> {
        T::from_value(value).map(Box::new)
    }
}

// -----------------------------------------------------------------------------
// Maps

fn map_entries<K: FromValue, V: FromValue, M: FromIterator<(K, V)>>(
    value: Value,
) -> Result<M, ValueError> {
    match value {
        Value::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| Ok((K::from_value(k)?, V::from_value(v)?)))
            .collect(),
        Value::Nil => Ok(M::from_iter(core::iter::empty())),
        other => Err(other.mismatch("map")),
    }
}

impl<K: TypePath, V: TypePath, S: 'static> TypePath for HashMap<K, V, S> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| {
            concat(&["std::collections::HashMap<", K::type_path(), ", ", V::type_path(), ">"])
        })
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["HashMap<", K::type_name(), ", ", V::type_name(), ">"]))
    }
}

impl<K: Typed, V: Typed, S: 'static> Typed for HashMap<K, V, S> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::Map(MapInfo::new::<Self, K, V>()))
    }
}

impl<K: IntoValue, V: IntoValue, S> IntoValue for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }
}

impl<K, V, S> FromValue for HashMap<K, V, S>
where
    K: FromValue + Eq + Hash,
    V: FromValue,
    S: BuildHasher + Default,
{
    fn from_value(value: Value) -> Result<Self, ValueError> {
        map_entries(value)
    }
}

impl<K: TypePath, V: TypePath> TypePath for BTreeMap<K, V> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| {
            concat(&["alloc::collections::BTreeMap<", K::type_path(), ", ", V::type_path(), ">"])
        })
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["BTreeMap<", K::type_name(), ", ", V::type_name(), ">"]))
    }
}

impl<K: Typed, V: Typed> Typed for BTreeMap<K, V> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::Map(MapInfo::new::<Self, K, V>()))
    }
}

impl<K: IntoValue, V: IntoValue> IntoValue for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }
}

impl<K: FromValue + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        map_entries(value)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;
    use crate::info::TypeKind;

    #[test]
    fn generic_paths_are_per_instantiation() {
        assert_eq!(Vec::<u8>::type_path(), "alloc::vec::Vec<u8>");
        assert_eq!(Vec::<Vec<i64>>::type_name(), "Vec<Vec<i64>>");
        assert_eq!(
            BTreeMap::<alloc::string::String, bool>::type_name(),
            "BTreeMap<String, bool>"
        );
        assert_eq!(Option::<u16>::type_path(), "core::option::Option<u16>");
    }

    #[test]
    fn box_is_transparent() {
        assert_eq!(Box::<u8>::type_path(), u8::type_path());
        assert_eq!(Box::<Vec<u8>>::type_info().kind(), TypeKind::List);
    }

    #[test]
    fn nil_reads_as_empty_collection() {
        assert_eq!(Vec::<u8>::from_value(Value::Nil), Ok(vec![]));
        let map = BTreeMap::<u8, u8>::from_value(Value::Nil).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn map_values_convert() {
        let value = Value::Map(vec![(Value::U8(1), Value::Bool(true))]);
        let map = HashMap::<u8, bool>::from_value(value).unwrap();
        assert_eq!(map.get(&1), Some(&true));
    }
}
