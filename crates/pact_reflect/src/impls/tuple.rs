use alloc::vec;

use crate::cell::{GenericTypeInfoCell, GenericTypePathCell, concat};
use crate::info::{TupleInfo, TypeInfo, TypePath, Typed, UnnamedField};
use crate::value::{FromValue, IntoValue, Value, ValueError};

macro_rules! impl_tuple {
    ($len:literal: $($index:tt => $ty:ident),+) => {
        impl<$($ty: TypePath),+> TypePath for ($($ty,)+) {
            fn type_path() -> &'static str {
                static CELL: GenericTypePathCell = GenericTypePathCell::new();
                CELL.get_or_insert::<Self>(|| {
                    let parts = [$($ty::type_path()),+].join(", ");
                    concat(&["(", parts.as_str(), if $len == 1 { ",)" } else { ")" }])
                })
            }

            fn type_name() -> &'static str {
                static CELL: GenericTypePathCell = GenericTypePathCell::new();
                CELL.get_or_insert::<Self>(|| {
                    let parts = [$($ty::type_name()),+].join(", ");
                    concat(&["(", parts.as_str(), if $len == 1 { ",)" } else { ")" }])
                })
            }
        }

        impl<$($ty: Typed),+> Typed for ($($ty,)+) {
            fn type_info() -> &'static TypeInfo {
                static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
                CELL.get_or_insert::<Self>(|| {
                    TypeInfo::Tuple(TupleInfo::new::<Self>(&[
                        $(UnnamedField::new::<$ty>($index)),+
                    ]))
                })
            }
        }

        impl<$($ty: IntoValue),+> IntoValue for ($($ty,)+) {
            fn to_value(&self) -> Value {
                Value::Tuple(vec![$(self.$index.to_value()),+])
            }
        }

        impl<$($ty: FromValue),+> FromValue for ($($ty,)+) {
            fn from_value(value: Value) -> Result<Self, ValueError> {
                let items = match value {
                    Value::Tuple(items) if items.len() == $len => items,
                    other => return Err(other.mismatch(concat!("tuple of ", $len))),
                };
                let mut items = items.into_iter();
                Ok(($(
                    $ty::from_value(items.next().ok_or(ValueError::Mismatch {
                        expected: concat!("tuple of ", $len),
                        found: "tuple",
                    })?)?,
                )+))
            }
        }
    };
}

impl_tuple!(1: 0 => T0);
impl_tuple!(2: 0 => T0, 1 => T1);
impl_tuple!(3: 0 => T0, 1 => T1, 2 => T2);
impl_tuple!(4: 0 => T0, 1 => T1, 2 => T2, 3 => T3);

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;

    use super::*;

    #[test]
    fn tuple_paths() {
        assert_eq!(<(u8,)>::type_path(), "(u8,)");
        assert_eq!(<(u8, String)>::type_name(), "(u8, String)");
        assert_eq!(<(u8, bool, i64)>::type_info().as_tuple().unwrap().field_len(), 3);
    }

    #[test]
    fn tuple_values() {
        let value = (1_u8, true).to_value();
        assert_eq!(value, Value::Tuple(vec![Value::U8(1), Value::Bool(true)]));
        assert_eq!(<(u8, bool)>::from_value(value), Ok((1, true)));
        assert!(<(u8, bool)>::from_value(Value::Tuple(vec![Value::U8(1)])).is_err());
    }
}
