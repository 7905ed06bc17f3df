//! Containers for static storage of type information.
//!
//! These are used to implement [`Typed`](crate::info::Typed) and
//! [`TypePath`](crate::info::TypePath) by hand.
//!
//! - [`NonGenericTypeInfoCell`] wraps a [`OnceLock`], for non-generic types.
//! - [`GenericTypeInfoCell`] and [`GenericTypePathCell`] hold one value per
//!   instantiation: the `static` inside a generic function is shared by every
//!   instantiation, so values are keyed by [`TypeId`] behind a [`RwLock`].

use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use crate::hash::{FixedHashState, TypeIdMap};
use crate::info::TypeInfo;

mod sealed {
    use super::TypeInfo;
    use alloc::string::String;

    pub trait TypedProperty: 'static + Send + Sync {}

    impl TypedProperty for String {}
    impl TypedProperty for TypeInfo {}
}

use sealed::TypedProperty;

// -----------------------------------------------------------------------------
// NonGenericTypeCell

/// A container for [`TypeInfo`] of a non-generic type.
///
/// See [`Typed`](crate::info::Typed) for an example.
pub struct NonGenericTypeCell<T: TypedProperty>(OnceLock<T>);

pub type NonGenericTypeInfoCell = NonGenericTypeCell<TypeInfo>;

impl<T: TypedProperty> NonGenericTypeCell<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    #[inline]
    pub fn get_or_init<F>(&self, f: F) -> &T
    where
        F: FnOnce() -> T,
    {
        self.0.get_or_init(f)
    }
}

impl<T: TypedProperty> Default for NonGenericTypeCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// GenericTypeCell

/// A container for values of generic types, one per instantiation.
///
/// Values are leaked on insertion and live for the rest of the process.
///
/// ```
/// use pact_reflect::cell::{GenericTypeInfoCell, GenericTypePathCell};
/// use pact_reflect::info::{ListInfo, TypeInfo, TypePath, Typed};
///
/// struct Stack<T>(Vec<T>);
///
/// impl<T: Typed> TypePath for Stack<T> {
///     fn type_path() -> &'static str {
///         static CELL: GenericTypePathCell = GenericTypePathCell::new();
///         CELL.get_or_insert::<Self>(|| format!("demo::Stack<{}>", T::type_path()))
///     }
///
///     fn type_name() -> &'static str {
///         static CELL: GenericTypePathCell = GenericTypePathCell::new();
///         CELL.get_or_insert::<Self>(|| format!("Stack<{}>", T::type_name()))
///     }
/// }
///
/// impl<T: Typed> Typed for Stack<T> {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
///         CELL.get_or_insert::<Self>(|| TypeInfo::List(ListInfo::new::<Self, T>()))
///     }
/// }
///
/// assert_eq!(Stack::<u8>::type_path(), "demo::Stack<u8>");
/// assert_eq!(Stack::<bool>::type_name(), "Stack<bool>");
/// assert!(Stack::<u8>::type_info().as_list().is_ok());
/// ```
pub struct GenericTypeCell<T: TypedProperty>(RwLock<TypeIdMap<&'static T>>);

pub type GenericTypeInfoCell = GenericTypeCell<TypeInfo>;

pub type GenericTypePathCell = GenericTypeCell<String>;

impl<T: TypedProperty> GenericTypeCell<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::with_hasher(FixedHashState)))
    }

    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> T) -> &T {
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    // Separate to reduce code compilation times
    #[inline(never)]
    fn get_or_insert_by_type_id(&self, type_id: TypeId, f: impl FnOnce() -> T) -> &T {
        match self.get_by_type_id(type_id) {
            Some(value) => value,
            None => self.insert_by_type_id(type_id, f()),
        }
    }

    #[inline(never)]
    fn get_by_type_id(&self, type_id: TypeId) -> Option<&'static T> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    #[inline(never)]
    fn insert_by_type_id(&self, type_id: TypeId, value: T) -> &'static T {
        *self
            .0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(type_id)
            .or_insert_with(|| Box::leak(Box::new(value)))
    }
}

impl<T: TypedProperty> Default for GenericTypeCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Joins string fragments into one allocation, for building generic paths.
///
/// ```
/// assert_eq!(pact_reflect::cell::concat(&["Vec<", "u8", ">"]), "Vec<u8>");
/// ```
pub fn concat(parts: &[&str]) -> String {
    let len = parts.iter().map(|part| part.len()).sum();
    let mut out = String::with_capacity(len);
    parts.iter().for_each(|part| out.push_str(part));
    out
}
