use alloc::boxed::Box;
use core::any::TypeId;

use crate::info::{Type, TypeInfo, TypePath, Typed, impl_type_fn};

// -----------------------------------------------------------------------------
// UnionMember

/// One alternative of a union, identified on the wire by its tag.
#[derive(Clone, Debug)]
pub struct UnionMember {
    tag: &'static str,
    type_id: TypeId,
    type_info: fn() -> &'static TypeInfo,
}

impl UnionMember {
    /// Creates a member with an explicit tag.
    #[inline]
    pub fn new<T: Typed>(tag: &'static str) -> Self {
        Self {
            tag,
            type_id: TypeId::of::<T>(),
            type_info: T::type_info,
        }
    }

    /// Creates a member tagged with the short name of `T`.
    #[inline]
    pub fn of<T: Typed>() -> Self {
        Self::new::<T>(T::type_name())
    }

    #[inline]
    pub fn tag(&self) -> &'static str {
        self.tag
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        (self.type_info)()
    }
}

// -----------------------------------------------------------------------------
// UnionInfo

/// Type information for a tagged union: a value of exactly one of several
/// member types.
///
/// On the wire a union is a two element array `[tag, value]`.
///
/// ```
/// use pact_reflect::cell::NonGenericTypeInfoCell;
/// use pact_reflect::impl_type_path;
/// use pact_reflect::info::{TypeInfo, Typed, UnionInfo, UnionMember};
///
/// enum Id {
///     Num(u64),
///     Name(String),
/// }
/// impl_type_path!(Id);
///
/// impl Typed for Id {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
///         CELL.get_or_init(|| {
///             TypeInfo::Union(UnionInfo::new::<Self>(&[
///                 UnionMember::new::<u64>("num"),
///                 UnionMember::new::<String>("name"),
///             ]))
///         })
///     }
/// }
///
/// let TypeInfo::Union(info) = Id::type_info() else { unreachable!() };
/// assert_eq!(info.members().len(), 2);
/// assert_eq!(info.member("NAME").map(UnionMember::tag), Some("name"));
/// ```
#[derive(Clone, Debug)]
pub struct UnionInfo {
    ty: Type,
    members: Box<[UnionMember]>,
}

impl UnionInfo {
    impl_type_fn!(ty);

    /// Creates a new [`UnionInfo`].
    ///
    /// # Panics
    ///
    /// Panics if two members share a tag (ignoring ASCII case).
    pub fn new<T: TypePath>(members: &[UnionMember]) -> Self {
        for (index, member) in members.iter().enumerate() {
            assert!(
                !members[..index]
                    .iter()
                    .any(|prev| prev.tag.eq_ignore_ascii_case(member.tag)),
                "duplicate union tag `{}` in `{}`",
                member.tag,
                T::type_path(),
            );
        }

        Self {
            ty: Type::of::<T>(),
            members: members.into(),
        }
    }

    #[inline]
    pub fn members(&self) -> &[UnionMember] {
        &self.members
    }

    /// Finds a member by tag, ignoring ASCII case.
    pub fn member(&self, tag: &str) -> Option<&UnionMember> {
        self.members
            .iter()
            .find(|member| member.tag.eq_ignore_ascii_case(tag))
    }
}
