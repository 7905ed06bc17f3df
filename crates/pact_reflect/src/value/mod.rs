//! The dynamic value model.
//!
//! Codecs read into and write from [`Value`]s; [`IntoValue`] and
//! [`FromValue`] bridge them to concrete Rust types.

// -----------------------------------------------------------------------------
// Modules

mod error;
mod record;

// -----------------------------------------------------------------------------
// Exports

pub use error::ValueError;
pub use record::Record;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::info::TypePath;

// -----------------------------------------------------------------------------
// Value

/// A dynamically typed value shaped like one of the supported type families.
///
/// `Nil` stands for an absent nullable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(Vec<(Value, Value)>),
    /// An enum member, by name.
    Enum(String),
    /// A union alternative and its tag.
    Union { tag: String, value: Box<Value> },
    Tuple(Vec<Value>),
    Record(Record),
}

impl Value {
    /// A short name of the variant, used in error messages.
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Enum(_) => "enum",
            Self::Union { .. } => "union",
            Self::Tuple(_) => "tuple",
            Self::Record(_) => "record",
        }
    }

    #[inline]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns any integer variant widened to `i128`.
    pub const fn as_integer(&self) -> Option<i128> {
        Some(match *self {
            Self::I8(v) => v as i128,
            Self::I16(v) => v as i128,
            Self::I32(v) => v as i128,
            Self::I64(v) => v as i128,
            Self::U8(v) => v as i128,
            Self::U16(v) => v as i128,
            Self::U32(v) => v as i128,
            Self::U64(v) => v as i128,
            _ => return None,
        })
    }

    /// Returns the record of `T`, or an error naming the mismatch.
    pub fn into_record<T: TypePath>(self) -> Result<Record, ValueError> {
        match self {
            Self::Record(record) if record.type_path() == T::type_path() => Ok(record),
            Self::Record(record) => Err(ValueError::WrongRecord {
                expected: T::type_path(),
                found: record.type_path(),
            }),
            other => Err(other.mismatch("record")),
        }
    }

    /// Builds the [`ValueError::Mismatch`] for this value.
    #[inline]
    pub fn mismatch(&self, expected: &'static str) -> ValueError {
        ValueError::Mismatch {
            expected,
            found: self.variant_name(),
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

/// Converts a Rust value into a [`Value`].
pub trait IntoValue {
    fn to_value(&self) -> Value;
}

/// Converts a [`Value`] back into a Rust value.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ValueError>;
}

impl IntoValue for Value {
    #[inline]
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    #[inline]
    fn from_value(value: Value) -> Result<Self, ValueError> {
        Ok(value)
    }
}

impl<T: IntoValue + ?Sized> IntoValue for &T {
    #[inline]
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}
