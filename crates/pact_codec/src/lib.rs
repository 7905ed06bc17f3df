//! The serialisation pipeline: providers, procedures and the caching
//! [`Context`].
//!
//! A [`Context`] turns a type's [`TypeInfo`](pact_reflect::info::TypeInfo)
//! into a read or write procedure the first time the type is used, caches
//! it, and runs it over MessagePack data. The same descriptors produce the
//! type's write and read contracts, which decide whether data written by one
//! version of a type can be read by another.
//!
//! ## Menu
//!
//! - [`Context`]: `serialise` / `deserialise`, contract computation and the
//!   procedure cache.
//! - [`provider`]: the [`TypeProvider`](provider::TypeProvider) strategies
//!   and their registry.
//! - [`build`]: the step trees procedures are made of.
//! - [`Serialiser`] / [`Deserialiser`]: handles bound to one type.
//! - [`ContextOptions`]: layout and policy defaults.
//!
//! ## Versioning
//!
//! Readers match fields by name, fill missing ones from constructor
//! defaults and, under [`UnexpectedFieldPolicy::Ignore`], skip fields they
//! do not know:
//!
//! ```
//! use pact_codec::{Context, UnexpectedFieldPolicy};
//! use pact_contract::are_compatible;
//! use pact_reflect::cell::NonGenericTypeInfoCell;
//! use pact_reflect::info::{ComplexInfo, ConstructorInfo, NamedField, ParamInfo, TypeInfo, Typed};
//! use pact_reflect::value::{Record, Value};
//!
//! struct V1;
//! pact_reflect::impl_type_path!(V1);
//! impl Typed for V1 {
//!     fn type_info() -> &'static TypeInfo {
//!         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
//!         CELL.get_or_init(|| TypeInfo::Complex(ComplexInfo::with_fields::<Self>(&[
//!             NamedField::new::<i32>("a"),
//!         ])))
//!     }
//! }
//!
//! struct V2;
//! pact_reflect::impl_type_path!(V2);
//! impl Typed for V2 {
//!     fn type_info() -> &'static TypeInfo {
//!         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
//!         CELL.get_or_init(|| TypeInfo::Complex(ComplexInfo::new::<Self>(
//!             &[ConstructorInfo::new(&[
//!                 ParamInfo::new::<i32>("a"),
//!                 ParamInfo::new::<String>("b").with_default(|| Value::Str("x".into())),
//!             ])],
//!             &[NamedField::new::<i32>("a"), NamedField::new::<String>("b")],
//!         )))
//!     }
//! }
//!
//! let cx = Context::new();
//! let writer = cx.write_contract_for(V1::type_info()).unwrap();
//! let reader = cx.read_contract_for(V2::type_info()).unwrap();
//! assert!(are_compatible(&writer, &reader, true));
//!
//! let bytes = cx
//!     .serialise_value(V1::type_info(), &Value::Record(Record::of::<V1>().with("a", &7)))
//!     .unwrap();
//! let value = cx
//!     .deserialise_value(&bytes, V2::type_info(), UnexpectedFieldPolicy::Throw)
//!     .unwrap();
//! let Value::Record(record) = value else { unreachable!() };
//! assert_eq!(record.get("b"), Some(&Value::Str("x".into())));
//! ```

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod build;
pub mod provider;

mod cache;
mod context;
mod error;
mod options;
mod typed;

#[cfg(test)]
mod fixtures;

// -----------------------------------------------------------------------------
// Exports

pub use context::{Context, Procedure};
pub use error::{
    CodecError, DeserialisationError, FieldPath, SerialisationError, UnsupportedTypeError,
};
pub use options::{ComplexLayout, ContextOptions, UnexpectedFieldPolicy};
pub use typed::{Deserialiser, Serialiser};
