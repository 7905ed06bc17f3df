//! Type contracts: structural descriptions of how a type is written or read.
//!
//! A contract graph is stored in a [`ContractCollection`] and addressed by
//! typed handles ([`WriteId`], [`ReadId`]). Collections hash-cons their
//! contents, so structurally equal contracts share one handle, including
//! cyclic contracts of recursive types.
//!
//! ## Menu
//!
//! - [`ContractShape`]: one node, aliased as [`WriteContract`] and
//!   [`ReadContract`].
//! - [`ContractCollection`]: canonical storage, with `reserve`/`fill` for
//!   self-referencing contracts and [`import`](ContractCollection::import)
//!   across collections.
//! - [`can_read_from`] / [`are_compatible`]: directional compatibility,
//!   resolved coinductively on recursive graphs.
//! - [`ContractGraph`]: a collection plus root, comparable and hashable by
//!   structure, renderable as markup and convertible to a [`ContractDocument`].
//!
//! ```
//! use pact_contract::*;
//! use pact_reflect::info::PrimitiveKind;
//!
//! let mut writes = WriteContractCollection::new();
//! let int = writes.get_or_create(WriteContract::Primitive(PrimitiveKind::I32));
//! let v1 = writes.get_or_create(WriteContract::Complex(Box::new([
//!     WriteField { name: "a".into(), contract: int },
//! ])));
//! let writer = WriteContractGraph::new(writes, v1);
//!
//! let mut reads = ReadContractCollection::new();
//! let int = reads.get_or_create(ReadContract::Primitive(PrimitiveKind::I32));
//! let text = reads.get_or_create(ReadContract::Primitive(PrimitiveKind::Str));
//! let v2 = reads.get_or_create(ReadContract::Complex(Box::new([
//!     ReadField { name: "a".into(), contract: int, has_default: false },
//!     ReadField { name: "b".into(), contract: text, has_default: true },
//! ])));
//! let reader = ReadContractGraph::new(reads, v2);
//!
//! assert!(are_compatible(&writer, &reader, true));
//! assert_eq!(reader.markup(), "{complex a:i32 b?:str}");
//! ```

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod collection;
mod compat;
mod contract;
mod document;
mod graph;
mod id;
mod markup;

// -----------------------------------------------------------------------------
// Exports

pub use collection::{ContractCollection, bisimilar};
pub use compat::{can_read_from, can_widen};
pub use contract::{ContractField, ContractKind, ContractShape, Direction};
pub use contract::{ReadContract, ReadField, WriteContract, WriteField};
pub use document::{ContractDocument, DocumentError, FieldDocument, NodeDocument, UnionCaseDocument};
pub use graph::{Contract, ContractGraph, ReadContractGraph, WriteContractGraph, are_compatible};
pub use id::{ContractId, ReadId, WriteId};
pub use markup::render_markup;

/// Canonical storage for write contracts.
pub type WriteContractCollection = ContractCollection<WriteField>;

/// Canonical storage for read contracts.
pub type ReadContractCollection = ContractCollection<ReadField>;
