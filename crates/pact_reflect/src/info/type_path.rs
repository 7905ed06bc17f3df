use core::any::{Any, TypeId};
use core::fmt;

// -----------------------------------------------------------------------------
// TypePath

/// A static accessor to type paths and names.
///
/// A stable alternative to [`core::any::type_name`]: the path is part of the
/// type's contract surface (union tags and error messages use it), so it must
/// not change with compiler versions.
///
/// # Methods
///
/// - [`type_path`]: The unique identifier of the type, cannot be duplicated.
/// - [`type_name`]: Type name without module path, may be duplicated.
///
/// Neither may start with `::`.
///
/// # Implementation
///
/// For non-generic types use [`impl_type_path!`](crate::impl_type_path):
///
/// ```
/// use pact_reflect::{impl_type_path, info::TypePath};
///
/// struct Foo;
/// impl_type_path!(Foo);
///
/// assert_eq!(Foo::type_name(), "Foo");
/// assert!(Foo::type_path().ends_with("::Foo"));
/// ```
///
/// Generic types build their names once through a
/// [`GenericTypePathCell`](crate::cell::GenericTypePathCell).
///
/// [`type_path`]: TypePath::type_path
/// [`type_name`]: TypePath::type_name
pub trait TypePath: 'static {
    /// Returns the fully qualified path with generics of the type.
    ///
    /// For `Option<Vec<u8>>`, this is `"core::option::Option<alloc::vec::Vec<u8>>"`.
    fn type_path() -> &'static str;

    /// Returns a short name, without module path.
    ///
    /// For `Option<Vec<u8>>`, this is `"Option<Vec<u8>>"`.
    fn type_name() -> &'static str;
}

/// Implements [`TypePath`] for a non-generic type declared in the current module.
///
/// The path is `module_path!()` joined with the type identifier.
/// An explicit path can be given with `impl_type_path!(Foo => "my_crate::Foo")`.
#[macro_export]
macro_rules! impl_type_path {
    ($ty:ident) => {
        impl $crate::info::TypePath for $ty {
            #[inline]
            fn type_path() -> &'static str {
                ::core::concat!(::core::module_path!(), "::", ::core::stringify!($ty))
            }

            #[inline]
            fn type_name() -> &'static str {
                ::core::stringify!($ty)
            }
        }
    };
    ($ty:ident => $path:literal) => {
        impl $crate::info::TypePath for $ty {
            #[inline]
            fn type_path() -> &'static str {
                $path
            }

            #[inline]
            fn type_name() -> &'static str {
                ::core::stringify!($ty)
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Type

/// The base representation of a Rust type: its [`TypeId`] plus its names.
///
/// ```
/// use pact_reflect::info::Type;
///
/// let ty = Type::of::<String>();
/// assert!(ty.is::<String>());
/// assert_eq!(ty.path(), "alloc::string::String");
/// assert_eq!(ty.name(), "String");
/// ```
#[derive(Copy, Clone)]
pub struct Type {
    type_id: TypeId,
    type_path: fn() -> &'static str,
    type_name: fn() -> &'static str,
}

impl Type {
    /// Creates a new [`Type`] from a type that implements [`TypePath`].
    #[inline]
    pub fn of<T: TypePath>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_path: T::type_path,
            type_name: T::type_name,
        }
    }

    /// Returns the [`TypeId`] of the type.
    #[inline(always)]
    pub fn id(&self) -> TypeId {
        self.type_id
    }

    /// Check if the given type matches this one.
    #[inline(always)]
    pub fn is<T: Any>(&self) -> bool {
        TypeId::of::<T>() == self.type_id
    }

    /// See [`TypePath::type_path`].
    #[inline(always)]
    pub fn path(&self) -> &'static str {
        (self.type_path)()
    }

    /// See [`TypePath::type_name`].
    #[inline(always)]
    pub fn name(&self) -> &'static str {
        (self.type_name)()
    }
}

impl PartialEq for Type {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Type {}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// -----------------------------------------------------------------------------
// Helper

/// Implements `ty`, `type_id`, `type_path` and `type_name` for an info struct
/// with a `ty: Type` field.
macro_rules! impl_type_fn {
    ($field:ident) => {
        /// Returns the underlying [`Type`](crate::info::Type).
        #[inline]
        pub fn ty(&self) -> &$crate::info::Type {
            &self.$field
        }

        /// Returns the [`TypeId`](core::any::TypeId) of the type.
        #[inline]
        pub fn type_id(&self) -> ::core::any::TypeId {
            self.$field.id()
        }

        /// Returns the full type path.
        #[inline]
        pub fn type_path(&self) -> &'static str {
            self.$field.path()
        }

        /// Returns the short type name.
        #[inline]
        pub fn type_name(&self) -> &'static str {
            self.$field.name()
        }
    };
}

pub(crate) use impl_type_fn;
