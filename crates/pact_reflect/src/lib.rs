//! Runtime type descriptors and the dynamic value model.
//!
//! ## Menu
//!
//! - [`info`]: [`Typed`](info::Typed) and the [`TypeInfo`](info::TypeInfo) tree
//!   that codecs consume to build their procedures.
//! - [`value`]: [`Value`](value::Value), the dynamic form of every supported
//!   shape, plus the [`IntoValue`](value::IntoValue) / [`FromValue`](value::FromValue)
//!   bridges.
//! - [`cell`]: static storage used to implement `Typed` by hand.
//! - [`hash`]: fixed-seed hashing shared with the contract crate.
//!
//! Descriptors for standard types live in [`impls`]; user types implement
//! [`TypePath`](info::TypePath) (usually through [`impl_type_path!`]) and
//! [`Typed`](info::Typed).
//!
//! ```
//! use pact_reflect::cell::NonGenericTypeInfoCell;
//! use pact_reflect::impl_type_path;
//! use pact_reflect::info::{ComplexInfo, NamedField, TypeInfo, TypeKind, Typed};
//!
//! struct Node {
//!     value: i32,
//!     next: Option<Box<Node>>,
//! }
//! impl_type_path!(Node);
//!
//! impl Typed for Node {
//!     fn type_info() -> &'static TypeInfo {
//!         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
//!         CELL.get_or_init(|| {
//!             TypeInfo::Complex(ComplexInfo::with_fields::<Self>(&[
//!                 NamedField::new::<i32>("value"),
//!                 NamedField::new::<Option<Box<Node>>>("next"),
//!             ]))
//!         })
//!     }
//! }
//!
//! let next = Node::type_info().as_complex().unwrap().fields()[1].type_info();
//! let inner = next.as_nullable().unwrap().inner_info();
//! assert_eq!(inner.kind(), TypeKind::Complex);
//! assert_eq!(inner.type_id(), Node::type_info().type_id());
//! ```

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod cell;
pub mod hash;
pub mod impls;
pub mod info;
pub mod value;

// -----------------------------------------------------------------------------
// Exports

pub use impls::Bytes;
