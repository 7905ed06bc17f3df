use crate::info::{TypeInfo, TypePath};

/// A static accessor to compile-time type information.
///
/// There is no derive: descriptors are written by hand, usually with a
/// [`NonGenericTypeInfoCell`](crate::cell::NonGenericTypeInfoCell) so the
/// [`TypeInfo`] is built once.
///
/// ```
/// use pact_reflect::cell::NonGenericTypeInfoCell;
/// use pact_reflect::impl_type_path;
/// use pact_reflect::info::{EnumInfo, TypeInfo, TypeKind, Typed};
///
/// enum Mode {
///     Fast,
///     Safe,
/// }
/// impl_type_path!(Mode);
///
/// impl Typed for Mode {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
///         CELL.get_or_init(|| TypeInfo::Enum(EnumInfo::new::<Self>(&["Fast", "Safe"])))
///     }
/// }
///
/// assert_eq!(Mode::type_info().kind(), TypeKind::Enum);
/// ```
///
/// Generic types use a [`GenericTypeInfoCell`](crate::cell::GenericTypeInfoCell),
/// which keeps one [`TypeInfo`] per instantiation.
pub trait Typed: TypePath {
    /// Returns the compile-time info for the underlying type.
    fn type_info() -> &'static TypeInfo;
}
