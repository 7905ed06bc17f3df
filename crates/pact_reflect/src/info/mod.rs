//! Runtime type descriptors.
//!
//! [`Typed::type_info`] returns a [`TypeInfo`] whose variant selects the shape
//! family a codec uses for the type. Child types are referenced through
//! function pointers and resolved on access, so self-referential types can be
//! described without infinite recursion.

// -----------------------------------------------------------------------------
// Modules

mod complex_info;
mod enum_info;
mod field_info;
mod list_info;
mod map_info;
mod nullable_info;
mod opaque_info;
mod primitive_info;
mod tuple_info;
mod type_info;
mod type_path;
mod typed;
mod union_info;

// -----------------------------------------------------------------------------
// Exports

pub(crate) use type_path::impl_type_fn;

pub use complex_info::{ComplexInfo, ConstructorInfo};
pub use enum_info::EnumInfo;
pub use field_info::{NamedField, ParamInfo, UnnamedField};
pub use list_info::ListInfo;
pub use map_info::MapInfo;
pub use nullable_info::NullableInfo;
pub use opaque_info::OpaqueInfo;
pub use primitive_info::{PrimitiveInfo, PrimitiveKind};
pub use tuple_info::TupleInfo;
pub use type_info::{KindError, TypeInfo, TypeKind};
pub use type_path::{Type, TypePath};
pub use typed::Typed;
pub use union_info::{UnionInfo, UnionMember};
