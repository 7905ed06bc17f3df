use core::any::TypeId;

use crate::info::{Type, TypeInfo, TypePath, Typed, impl_type_fn};

/// Type information for an optional value, such as `Option<T>`.
///
/// The inner [`TypeInfo`] is resolved on first access through a function
/// pointer, so a nullable field may refer back to the type that declares it.
///
/// ```
/// use pact_reflect::info::{TypeKind, Typed};
///
/// let info = <Option<String> as Typed>::type_info().as_nullable().unwrap();
/// assert_eq!(info.inner_info().kind(), TypeKind::Primitive);
/// ```
#[derive(Clone, Debug)]
pub struct NullableInfo {
    ty: Type,
    inner_id: TypeId,
    // `TypeInfo` is created on first access; using a function pointer delays it.
    inner_info: fn() -> &'static TypeInfo,
}

impl NullableInfo {
    impl_type_fn!(ty);

    /// Creates a new [`NullableInfo`] for `T` wrapping `TInner`.
    #[inline]
    pub fn new<T: TypePath, TInner: Typed>() -> Self {
        Self {
            ty: Type::of::<T>(),
            inner_id: TypeId::of::<TInner>(),
            inner_info: TInner::type_info,
        }
    }

    /// Returns the [`TypeId`] of the wrapped type.
    #[inline]
    pub fn inner_id(&self) -> TypeId {
        self.inner_id
    }

    /// Returns the [`TypeInfo`] of the wrapped type.
    #[inline]
    pub fn inner_info(&self) -> &'static TypeInfo {
        (self.inner_info)()
    }
}
