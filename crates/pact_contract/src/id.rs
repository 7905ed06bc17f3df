use core::fmt;
use core::hash::Hash;

/// A typed handle into a [`ContractCollection`](crate::ContractCollection).
///
/// Handles are only meaningful for the collection that issued them.
pub trait ContractId: Copy + Eq + Hash + Ord + fmt::Debug + 'static {
    fn from_index(index: u32) -> Self;

    fn index(self) -> u32;
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl ContractId for $name {
            #[inline(always)]
            fn from_index(index: u32) -> Self {
                Self(index)
            }

            #[inline(always)]
            fn index(self) -> u32 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Handle of a [`WriteContract`](crate::WriteContract).
    WriteId,
    "w#"
);

define_id!(
    /// Handle of a [`ReadContract`](crate::ReadContract).
    ReadId,
    "r#"
);
