use core::any::TypeId;

use crate::info::{Type, TypeInfo, TypePath, Typed, impl_type_fn};

/// Type information for a homogeneous, ordered sequence such as `Vec<T>`.
///
/// ```
/// use core::any::TypeId;
/// use pact_reflect::info::Typed;
///
/// let info = <Vec<i32> as Typed>::type_info().as_list().unwrap();
/// assert_eq!(info.item_id(), TypeId::of::<i32>());
/// ```
#[derive(Clone, Debug)]
pub struct ListInfo {
    ty: Type,
    item_id: TypeId,
    // `TypeInfo` is created on the first visit, use function pointers to delay it.
    item_info: fn() -> &'static TypeInfo,
}

impl ListInfo {
    impl_type_fn!(ty);

    /// Creates a new [`ListInfo`].
    #[inline]
    pub fn new<TList: TypePath, TItem: Typed>() -> Self {
        Self {
            ty: Type::of::<TList>(),
            item_id: TypeId::of::<TItem>(),
            item_info: TItem::type_info,
        }
    }

    /// Returns the [`TypeId`] of list items.
    #[inline]
    pub fn item_id(&self) -> TypeId {
        self.item_id
    }

    /// Returns the [`TypeInfo`] of list items.
    #[inline]
    pub fn item_info(&self) -> &'static TypeInfo {
        (self.item_info)()
    }
}
