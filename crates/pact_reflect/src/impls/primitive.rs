use alloc::string::{String, ToString};

use crate::cell::NonGenericTypeInfoCell;
use crate::info::{PrimitiveInfo, PrimitiveKind, TypeInfo, TypePath, Typed};
use crate::value::{FromValue, IntoValue, Value, ValueError};

macro_rules! impl_primitive_typed {
    ($ty:ty, $path:expr, $name:expr, $kind:ident) => {
        impl TypePath for $ty {
            #[inline]
            fn type_path() -> &'static str {
                $path
            }

            #[inline]
            fn type_name() -> &'static str {
                $name
            }
        }

        impl Typed for $ty {
            fn type_info() -> &'static TypeInfo {
                static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
                CELL.get_or_init(|| {
                    TypeInfo::Primitive(PrimitiveInfo::new::<Self>(PrimitiveKind::$kind))
                })
            }
        }
    };
}

macro_rules! impl_integer {
    ($($ty:ident => $kind:ident),* $(,)?) => {$(
        impl_primitive_typed!($ty, stringify!($ty), stringify!($ty), $kind);

        impl IntoValue for $ty {
            #[inline]
            fn to_value(&self) -> Value {
                Value::$kind(*self)
            }
        }

        impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, ValueError> {
                let wide = value.as_integer().ok_or_else(|| value.mismatch("integer"))?;
                <$ty>::try_from(wide).map_err(|_| ValueError::OutOfRange {
                    target: stringify!($ty),
                    value: wide.to_string(),
                })
            }
        }
    )*};
}

impl_integer!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
);

impl_primitive_typed!(bool, "bool", "bool", Bool);
impl_primitive_typed!(f32, "f32", "f32", F32);
impl_primitive_typed!(f64, "f64", "f64", F64);
impl_primitive_typed!(String, "alloc::string::String", "String", Str);

impl IntoValue for bool {
    #[inline]
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bool(v) => Ok(v),
            other => Err(other.mismatch("bool")),
        }
    }
}

impl IntoValue for f32 {
    #[inline]
    fn to_value(&self) -> Value {
        Value::F32(*self)
    }
}

impl FromValue for f32 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::F32(v) => Ok(v),
            other => match other.as_integer() {
                Some(wide) => Ok(wide as f32),
                None => Err(other.mismatch("f32")),
            },
        }
    }
}

impl IntoValue for f64 {
    #[inline]
    fn to_value(&self) -> Value {
        Value::F64(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::F64(v) => Ok(v),
            Value::F32(v) => Ok(f64::from(v)),
            other => match other.as_integer() {
                Some(wide) => Ok(wide as f64),
                None => Err(other.mismatch("f64")),
            },
        }
    }
}

impl IntoValue for String {
    #[inline]
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl IntoValue for str {
    #[inline]
    fn to_value(&self) -> Value {
        Value::Str(self.into())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Str(v) => Ok(v),
            other => Err(other.mismatch("str")),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_convert_across_widths() {
        assert_eq!(i64::from_value(Value::U8(7)), Ok(7));
        assert_eq!(u16::from_value(Value::I32(65_535)), Ok(u16::MAX));
        assert!(matches!(
            u8::from_value(Value::I16(-1)),
            Err(ValueError::OutOfRange { target: "u8", .. })
        ));
        assert!(matches!(
            i32::from_value(Value::Str("1".into())),
            Err(ValueError::Mismatch { expected: "integer", found: "str" })
        ));
    }

    #[test]
    fn floats_widen() {
        assert_eq!(f64::from_value(Value::F32(0.5)), Ok(0.5));
        assert_eq!(f32::from_value(Value::I8(-3)), Ok(-3.0));
        assert!(f32::from_value(Value::F64(1.0)).is_err());
    }

    #[test]
    fn primitive_paths() {
        assert_eq!(String::type_path(), "alloc::string::String");
        assert_eq!(String::type_name(), "String");
        assert_eq!(i32::type_path(), "i32");
        assert_eq!(u64::type_name(), "u64");
        assert_eq!(
            u32::type_info().as_primitive().map(PrimitiveInfo::kind),
            Ok(PrimitiveKind::U32)
        );
    }
}
