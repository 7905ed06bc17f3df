use alloc::boxed::Box;

use crate::info::{Type, TypePath, impl_type_fn};

/// Type information for a fieldless enumeration.
///
/// Enum values travel as their member name, so only the names are recorded.
///
/// ```
/// use pact_reflect::info::EnumInfo;
///
/// struct Colour;
/// pact_reflect::impl_type_path!(Colour);
///
/// let info = EnumInfo::new::<Colour>(&["Red", "Green"]);
/// assert_eq!(info.index_of("green"), Some(1));
/// assert_eq!(info.index_of("Blue"), None);
/// ```
#[derive(Clone, Debug)]
pub struct EnumInfo {
    ty: Type,
    members: Box<[&'static str]>,
}

impl EnumInfo {
    impl_type_fn!(ty);

    /// Creates a new [`EnumInfo`] from the member names, in declaration order.
    pub fn new<T: TypePath>(members: &[&'static str]) -> Self {
        Self {
            ty: Type::of::<T>(),
            members: members.into(),
        }
    }

    /// Returns the member names in declaration order.
    #[inline]
    pub fn members(&self) -> &[&'static str] {
        &self.members
    }

    /// Returns the member name at `index`.
    #[inline]
    pub fn member_at(&self, index: usize) -> Option<&'static str> {
        self.members.get(index).copied()
    }

    /// Finds a member by name, ignoring ASCII case.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.members
            .iter()
            .position(|member| member.eq_ignore_ascii_case(name))
    }
}
