use core::fmt;

use crate::info::{Type, TypePath, impl_type_fn};

// -----------------------------------------------------------------------------
// PrimitiveKind

/// The leaf shapes written directly as one MessagePack scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Str,
    Bytes,
}

impl PrimitiveKind {
    /// Every kind, in declaration order.
    pub const ALL: [PrimitiveKind; 13] = [
        Self::Bool,
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
        Self::Str,
        Self::Bytes,
    ];

    /// The short lowercase name used in markup and documents.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Str => "str",
            Self::Bytes => "bytes",
        }
    }

    /// Parses a name produced by [`name`](Self::name).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    #[inline]
    pub const fn is_unsigned(self) -> bool {
        matches!(self, Self::U8 | Self::U16 | Self::U32 | Self::U64)
    }

    #[inline]
    pub const fn is_integer(self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Bit width of numeric kinds, `None` otherwise.
    pub const fn bits(self) -> Option<u32> {
        match self {
            Self::I8 | Self::U8 => Some(8),
            Self::I16 | Self::U16 => Some(16),
            Self::I32 | Self::U32 | Self::F32 => Some(32),
            Self::I64 | Self::U64 | Self::F64 => Some(64),
            Self::Bool | Self::Str | Self::Bytes => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

// -----------------------------------------------------------------------------
// PrimitiveInfo

/// Type information for a primitive (leaf) type.
///
/// ```
/// use pact_reflect::info::{PrimitiveKind, Typed};
///
/// let info = <u16 as Typed>::type_info().as_primitive().unwrap();
/// assert_eq!(info.kind(), PrimitiveKind::U16);
/// ```
#[derive(Clone, Debug)]
pub struct PrimitiveInfo {
    ty: Type,
    kind: PrimitiveKind,
}

impl PrimitiveInfo {
    impl_type_fn!(ty);

    /// Creates a new [`PrimitiveInfo`].
    #[inline]
    pub fn new<T: TypePath>(kind: PrimitiveKind) -> Self {
        Self {
            ty: Type::of::<T>(),
            kind,
        }
    }

    /// Returns the primitive kind.
    #[inline]
    pub const fn kind(&self) -> PrimitiveKind {
        self.kind
    }
}
