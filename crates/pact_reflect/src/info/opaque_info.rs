use crate::info::{Type, TypePath, impl_type_fn};

/// Type information for a type whose structure is not visible.
///
/// No built-in provider handles opaque types; a custom provider must be
/// registered for them.
#[derive(Clone, Debug)]
pub struct OpaqueInfo {
    ty: Type,
}

impl OpaqueInfo {
    impl_type_fn!(ty);

    /// Creates a new [`OpaqueInfo`].
    #[inline]
    pub fn new<T: TypePath>() -> Self {
        Self { ty: Type::of::<T>() }
    }
}
