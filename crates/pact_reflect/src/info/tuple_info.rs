use alloc::boxed::Box;

use crate::info::{Type, TypePath, UnnamedField, impl_type_fn};

/// Type information for a fixed-arity tuple, written as an array.
///
/// ```
/// use pact_reflect::info::Typed;
///
/// let info = <(u8, String) as Typed>::type_info().as_tuple().unwrap();
/// assert_eq!(info.field_len(), 2);
/// assert_eq!(info.field_at(1).unwrap().index(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct TupleInfo {
    ty: Type,
    fields: Box<[UnnamedField]>,
}

impl TupleInfo {
    impl_type_fn!(ty);

    /// Creates a new [`TupleInfo`].
    ///
    /// The order of `fields` must match the tuple element order.
    #[inline]
    pub fn new<T: TypePath>(fields: &[UnnamedField]) -> Self {
        Self {
            ty: Type::of::<T>(),
            fields: fields.into(),
        }
    }

    #[inline]
    pub fn field_at(&self, index: usize) -> Option<&UnnamedField> {
        self.fields.get(index)
    }

    #[inline]
    pub fn iter(&self) -> core::slice::Iter<'_, UnnamedField> {
        self.fields.iter()
    }

    #[inline]
    pub fn field_len(&self) -> usize {
        self.fields.len()
    }
}
