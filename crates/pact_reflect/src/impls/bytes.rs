use alloc::vec::Vec;
use core::ops::{Deref, DerefMut};

use crate::cell::NonGenericTypeInfoCell;
use crate::info::{PrimitiveInfo, PrimitiveKind, TypeInfo, Typed};
use crate::value::{FromValue, IntoValue, Value, ValueError};

/// A byte buffer written as MessagePack `bin`.
///
/// `Vec<u8>` is a list of integers; wrap it in `Bytes` to get the compact
/// binary encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

crate::impl_type_path!(Bytes => "pact_reflect::Bytes");

impl Typed for Bytes {
    fn type_info() -> &'static TypeInfo {
        static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
        CELL.get_or_init(|| TypeInfo::Primitive(PrimitiveInfo::new::<Self>(PrimitiveKind::Bytes)))
    }
}

impl IntoValue for Bytes {
    #[inline]
    fn to_value(&self) -> Value {
        Value::Bytes(self.0.clone())
    }
}

impl FromValue for Bytes {
    fn from_value(value: Value) -> Result<Self, ValueError> {
        match value {
            Value::Bytes(v) => Ok(Self(v)),
            other => Err(other.mismatch("bytes")),
        }
    }
}

impl From<Vec<u8>> for Bytes {
    #[inline]
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl Deref for Bytes {
    type Target = Vec<u8>;

    #[inline]
    fn deref(&self) -> &Vec<u8> {
        &self.0
    }
}

impl DerefMut for Bytes {
    #[inline]
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.0
    }
}
