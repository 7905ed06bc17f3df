//! Schema-aware MessagePack serialisation with versioning.
//!
//! Types describe themselves through [`reflect::info::Typed`]. From that
//! description a [`Context`] builds, caches and runs read and write
//! procedures, and computes the write and read contracts used to check
//! whether two versions of a type can exchange data.
//!
//! - [`pack`]: the MessagePack wire layer.
//! - [`reflect`]: type descriptors and the dynamic [`Value`](reflect::value::Value).
//! - [`contract`]: contract graphs, compatibility and contract documents.
//! - [`codec`]: providers, procedures and the [`Context`].
//!
//! ```
//! use pact::reflect::cell::NonGenericTypeInfoCell;
//! use pact::reflect::info::{ComplexInfo, NamedField, TypeInfo, Typed};
//! use pact::reflect::value::{FromValue, IntoValue, Record, Value, ValueError};
//! use pact::{Context, UnexpectedFieldPolicy};
//!
//! #[derive(Debug, PartialEq)]
//! struct Player {
//!     name: String,
//!     score: u32,
//! }
//! pact::reflect::impl_type_path!(Player);
//!
//! impl Typed for Player {
//!     fn type_info() -> &'static TypeInfo {
//!         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
//!         CELL.get_or_init(|| {
//!             TypeInfo::Complex(ComplexInfo::with_fields::<Self>(&[
//!                 NamedField::new::<String>("name"),
//!                 NamedField::new::<u32>("score"),
//!             ]))
//!         })
//!     }
//! }
//!
//! impl IntoValue for Player {
//!     fn to_value(&self) -> Value {
//!         Value::Record(Record::of::<Self>().with("name", &self.name).with("score", &self.score))
//!     }
//! }
//!
//! impl FromValue for Player {
//!     fn from_value(value: Value) -> Result<Self, ValueError> {
//!         let mut record = value.into_record::<Self>()?;
//!         Ok(Self { name: record.take_as("name")?, score: record.take_as("score")? })
//!     }
//! }
//!
//! let cx = Context::new();
//! let player = Player { name: "ada".into(), score: 42 };
//! let bytes = cx.serialise(&player).unwrap();
//! assert_eq!(cx.deserialise::<Player>(&bytes, UnexpectedFieldPolicy::Throw).unwrap(), player);
//!
//! let contract = cx.write_contract_for(Player::type_info()).unwrap();
//! assert_eq!(contract.markup(), "{complex name:str score:u32}");
//! ```

pub use pact_codec as codec;
pub use pact_contract as contract;
pub use pact_pack as pack;
pub use pact_reflect as reflect;

pub use pact_codec::{
    CodecError, Context, ContextOptions, DeserialisationError, Deserialiser, SerialisationError,
    Serialiser, UnexpectedFieldPolicy, UnsupportedTypeError,
};
pub use pact_contract::{Contract, Direction, are_compatible};
