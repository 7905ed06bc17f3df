use crate::cell::{GenericTypeInfoCell, GenericTypePathCell, concat};
use crate::info::{NullableInfo, TypeInfo, TypePath, Typed};
use crate::value::{FromValue, IntoValue, Value, ValueError};

impl<T: TypePath> TypePath for Option<T> {
    fn type_path() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["core::option::Option<", T::type_path(), ">"]))
    }

    fn type_name() -> &'static str {
        static CELL: GenericTypePathCell = GenericTypePathCell::new();
        CELL.get_or_insert::<Self>(|| concat(&["Option<", T::type_name(), ">"]))
    }
}

impl<T: Typed> Typed for Option<T> {
    fn type_info() -> &'static TypeInfo {
        static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
        CELL.get_or_insert::<Self>(|| TypeInfo::Nullable(NullableInfo::new::<Self, T>()))
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    #[inline]
    fn to_value(&self) -> Value {
        match self {
            Some(value) => value.to_value(),
            None => Value::Nil,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    #[inline]
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Nil => Ok(None),
            value => T::from_value(value).map(Some),
        }
    }
}
