use core::any::TypeId;

use crate::info::{Type, TypeInfo, TypePath, Typed, impl_type_fn};

/// Type information for a dictionary such as `HashMap<K, V>` or `BTreeMap<K, V>`.
#[derive(Clone, Debug)]
pub struct MapInfo {
    ty: Type,
    key_id: TypeId,
    value_id: TypeId,
    key_info: fn() -> &'static TypeInfo,
    value_info: fn() -> &'static TypeInfo,
}

impl MapInfo {
    impl_type_fn!(ty);

    /// Creates a new [`MapInfo`].
    #[inline]
    pub fn new<TMap: TypePath, TKey: Typed, TValue: Typed>() -> Self {
        Self {
            ty: Type::of::<TMap>(),
            key_id: TypeId::of::<TKey>(),
            value_id: TypeId::of::<TValue>(),
            key_info: TKey::type_info,
            value_info: TValue::type_info,
        }
    }

    #[inline]
    pub fn key_id(&self) -> TypeId {
        self.key_id
    }

    #[inline]
    pub fn value_id(&self) -> TypeId {
        self.value_id
    }

    /// Returns the [`TypeInfo`] of keys.
    #[inline]
    pub fn key_info(&self) -> &'static TypeInfo {
        (self.key_info)()
    }

    /// Returns the [`TypeInfo`] of values.
    #[inline]
    pub fn value_info(&self) -> &'static TypeInfo {
        (self.value_info)()
    }
}
