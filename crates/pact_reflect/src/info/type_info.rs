use core::any::TypeId;
use core::fmt;

use thiserror::Error;

use crate::info::{ComplexInfo, EnumInfo, ListInfo, MapInfo, NullableInfo};
use crate::info::{OpaqueInfo, PrimitiveInfo, TupleInfo, Type, UnionInfo};

// -----------------------------------------------------------------------------
// TypeKind

/// The shape family of a type, one per [`TypeInfo`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive,
    Nullable,
    List,
    Map,
    Enum,
    Union,
    Tuple,
    Complex,
    Opaque,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive => f.pad("Primitive"),
            Self::Nullable => f.pad("Nullable"),
            Self::List => f.pad("List"),
            Self::Map => f.pad("Map"),
            Self::Enum => f.pad("Enum"),
            Self::Union => f.pad("Union"),
            Self::Tuple => f.pad("Tuple"),
            Self::Complex => f.pad("Complex"),
            Self::Opaque => f.pad("Opaque"),
        }
    }
}

/// Returned by the `as_*` casts of [`TypeInfo`] on a kind mismatch.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("type kind mismatch: expected {expected}, received {received}")]
pub struct KindError {
    pub expected: TypeKind,
    pub received: TypeKind,
}

// -----------------------------------------------------------------------------
// TypeInfo

/// Compile-time type information, obtained through [`Typed`](crate::info::Typed).
///
/// Codec providers dispatch on the variant; each variant exposes the
/// structure relevant to its shape family.
///
/// ```
/// use pact_reflect::info::{TypeKind, Typed};
///
/// let info = <Vec<Option<u8>> as Typed>::type_info();
/// assert_eq!(info.kind(), TypeKind::List);
///
/// let item = info.as_list().unwrap().item_info();
/// assert_eq!(item.kind(), TypeKind::Nullable);
/// assert!(item.as_complex().is_err());
/// ```
#[derive(Debug, Clone)]
pub enum TypeInfo {
    Primitive(PrimitiveInfo),
    Nullable(NullableInfo),
    List(ListInfo),
    Map(MapInfo),
    Enum(EnumInfo),
    Union(UnionInfo),
    Tuple(TupleInfo),
    Complex(ComplexInfo),
    Opaque(OpaqueInfo),
}

// Implements type-safe accessors like `as_complex`.
macro_rules! impl_cast_method {
    ($name:ident : $kind:ident => $info:ident) => {
        #[doc = concat!("Returns the [`", stringify!($info), "`] or a [`KindError`].")]
        pub const fn $name(&self) -> Result<&$info, KindError> {
            match self {
                Self::$kind(info) => Ok(info),
                _ => Err(KindError {
                    expected: TypeKind::$kind,
                    received: self.kind(),
                }),
            }
        }
    };
}

impl TypeInfo {
    impl_cast_method!(as_primitive: Primitive => PrimitiveInfo);
    impl_cast_method!(as_nullable: Nullable => NullableInfo);
    impl_cast_method!(as_list: List => ListInfo);
    impl_cast_method!(as_map: Map => MapInfo);
    impl_cast_method!(as_enum: Enum => EnumInfo);
    impl_cast_method!(as_union: Union => UnionInfo);
    impl_cast_method!(as_tuple: Tuple => TupleInfo);
    impl_cast_method!(as_complex: Complex => ComplexInfo);
    impl_cast_method!(as_opaque: Opaque => OpaqueInfo);

    /// Returns the underlying [`Type`].
    pub fn ty(&self) -> &Type {
        match self {
            Self::Primitive(info) => info.ty(),
            Self::Nullable(info) => info.ty(),
            Self::List(info) => info.ty(),
            Self::Map(info) => info.ty(),
            Self::Enum(info) => info.ty(),
            Self::Union(info) => info.ty(),
            Self::Tuple(info) => info.ty(),
            Self::Complex(info) => info.ty(),
            Self::Opaque(info) => info.ty(),
        }
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.ty().id()
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.ty().path()
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.ty().name()
    }

    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Primitive(_) => TypeKind::Primitive,
            Self::Nullable(_) => TypeKind::Nullable,
            Self::List(_) => TypeKind::List,
            Self::Map(_) => TypeKind::Map,
            Self::Enum(_) => TypeKind::Enum,
            Self::Union(_) => TypeKind::Union,
            Self::Tuple(_) => TypeKind::Tuple,
            Self::Complex(_) => TypeKind::Complex,
            Self::Opaque(_) => TypeKind::Opaque,
        }
    }

    /// Returns `true` for primitive types, whose values are never nil.
    #[inline]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }
}
