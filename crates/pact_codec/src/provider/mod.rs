//! Type providers: one strategy object per family of type shapes.
//!
//! A provider decides whether it handles a [`TypeInfo`], describes it as a
//! write or read contract and builds its procedure steps. The
//! [`TypeProviderRegistry`] asks custom providers first, then the built-in
//! ones in a fixed order.

// -----------------------------------------------------------------------------
// Modules

mod complex;
mod dictionary;
mod enums;
mod list;
mod nullable;
mod primitive;
mod registry;
mod tuple;
mod union;

// -----------------------------------------------------------------------------
// Exports

pub use complex::ComplexProvider;
pub use dictionary::DictionaryProvider;
pub use enums::EnumProvider;
pub use list::ListProvider;
pub use nullable::NullableProvider;
pub use primitive::PrimitiveProvider;
pub use registry::TypeProviderRegistry;
pub use tuple::TupleProvider;
pub use union::UnionProvider;

use alloc::string::ToString;
use core::any::TypeId;

use pact_contract::{
    ContractCollection, ContractField, ContractGraph, ContractShape, ReadContract, ReadField,
    WriteContract, WriteField,
};
use pact_reflect::hash::TypeIdMap;
use pact_reflect::info::{KindError, PrimitiveKind, TypeInfo};

use crate::build::{ReadBuilder, ReadStep, WriteBuilder, WriteStep};
use crate::{CodecError, UnsupportedTypeError};

// -----------------------------------------------------------------------------
// TypeProvider

/// A strategy handling one family of types.
///
/// Providers are stateless and shared by every thread using the
/// [`Context`](crate::Context).
///
/// # Example
///
/// A provider writing a point as a two-element array:
///
/// ```
/// use pact_codec::build::{ReadBuilder, ReadStep, WriteBuilder, WriteStep};
/// use pact_codec::provider::{ContractBuilder, TypeProvider, TypeProviderRegistry};
/// use pact_codec::{CodecError, Context, ContextOptions, UnsupportedTypeError};
/// use pact_contract::{ReadContract, ReadField, WriteContract, WriteField};
/// use pact_reflect::info::{OpaqueInfo, PrimitiveKind, TypeInfo, Typed};
/// use pact_reflect::cell::NonGenericTypeInfoCell;
///
/// struct Point;
/// pact_reflect::impl_type_path!(Point);
/// impl Typed for Point {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: NonGenericTypeInfoCell = NonGenericTypeInfoCell::new();
///         CELL.get_or_init(|| TypeInfo::Opaque(OpaqueInfo::new::<Self>()))
///     }
/// }
///
/// struct PointProvider;
///
/// impl TypeProvider for PointProvider {
///     fn name(&self) -> &'static str {
///         "point"
///     }
///
///     fn can_provide(&self, info: &'static TypeInfo) -> bool {
///         info.type_id() == Point::type_info().type_id()
///     }
///
///     fn write_contract(
///         &self,
///         _: &'static TypeInfo,
///         contracts: &mut ContractBuilder<'_, WriteField>,
///     ) -> Result<WriteContract, UnsupportedTypeError> {
///         let item = contracts.primitive(PrimitiveKind::I32);
///         Ok(WriteContract::Tuple(Box::new([item, item])))
///     }
///
///     fn read_contract(
///         &self,
///         _: &'static TypeInfo,
///         contracts: &mut ContractBuilder<'_, ReadField>,
///     ) -> Result<ReadContract, UnsupportedTypeError> {
///         let item = contracts.primitive(PrimitiveKind::I32);
///         Ok(ReadContract::Tuple(Box::new([item, item])))
///     }
///
///     fn build_reader(&self, _: &'static TypeInfo, _: &mut ReadBuilder<'_>) -> Result<ReadStep, CodecError> {
///         let item = || ReadStep::Primitive(PrimitiveKind::I32);
///         Ok(ReadStep::Tuple(Box::new([item(), item()])))
///     }
///
///     fn build_writer(&self, _: &'static TypeInfo, _: &mut WriteBuilder<'_>) -> Result<WriteStep, CodecError> {
///         let item = || WriteStep::Primitive(PrimitiveKind::I32);
///         Ok(WriteStep::Tuple(Box::new([item(), item()])))
///     }
/// }
///
/// let registry = TypeProviderRegistry::new().with_provider(PointProvider);
/// let cx = Context::with_registry(ContextOptions::new(), registry);
/// let contract = cx.write_contract_for(Point::type_info()).unwrap();
/// assert_eq!(contract.markup(), "{tuple i32 i32}");
/// ```
pub trait TypeProvider: Send + Sync + 'static {
    /// A short name, used in logs and debug output.
    fn name(&self) -> &'static str;

    fn can_provide(&self, info: &'static TypeInfo) -> bool;

    /// Whether values of this provider's types are read and written through
    /// their own cached procedure rather than inlined into the parent's.
    ///
    /// Required for any family through which a type can refer to itself.
    #[inline]
    fn nests(&self) -> bool {
        false
    }

    fn write_contract(
        &self,
        info: &'static TypeInfo,
        contracts: &mut ContractBuilder<'_, WriteField>,
    ) -> Result<WriteContract, UnsupportedTypeError>;

    fn read_contract(
        &self,
        info: &'static TypeInfo,
        contracts: &mut ContractBuilder<'_, ReadField>,
    ) -> Result<ReadContract, UnsupportedTypeError>;

    fn build_reader(&self, info: &'static TypeInfo, builder: &mut ReadBuilder<'_>) -> Result<ReadStep, CodecError>;

    fn build_writer(&self, info: &'static TypeInfo, builder: &mut WriteBuilder<'_>) -> Result<WriteStep, CodecError>;
}

/// Maps a descriptor of the wrong kind to an [`UnsupportedTypeError`].
pub(crate) fn wrong_kind(info: &'static TypeInfo) -> impl FnOnce(KindError) -> UnsupportedTypeError {
    move |err| UnsupportedTypeError::new(info.type_path(), err.to_string())
}

// -----------------------------------------------------------------------------
// ContractBuilder

mod sealed {
    pub trait Sealed {}

    impl Sealed for pact_contract::WriteField {}
    impl Sealed for pact_contract::ReadField {}
}

/// A contract direction providers can describe.
///
/// Implemented for [`WriteField`] and [`ReadField`] only.
pub trait ProvidedField: ContractField + sealed::Sealed {
    #[doc(hidden)]
    fn provide(
        provider: &dyn TypeProvider,
        info: &'static TypeInfo,
        contracts: &mut ContractBuilder<'_, Self>,
    ) -> Result<ContractShape<Self>, UnsupportedTypeError>;
}

impl ProvidedField for WriteField {
    #[inline]
    fn provide(
        provider: &dyn TypeProvider,
        info: &'static TypeInfo,
        contracts: &mut ContractBuilder<'_, Self>,
    ) -> Result<WriteContract, UnsupportedTypeError> {
        provider.write_contract(info, contracts)
    }
}

impl ProvidedField for ReadField {
    #[inline]
    fn provide(
        provider: &dyn TypeProvider,
        info: &'static TypeInfo,
        contracts: &mut ContractBuilder<'_, Self>,
    ) -> Result<ReadContract, UnsupportedTypeError> {
        provider.read_contract(info, contracts)
    }
}

/// Computes the contract graph of one root type.
///
/// Every type is described once: a type met again while its own contract
/// is being computed resolves to its reserved handle, which is how
/// recursive types get cyclic contracts.
pub struct ContractBuilder<'a, F: ContractField> {
    registry: &'a TypeProviderRegistry,
    contracts: ContractCollection<F>,
    memo: TypeIdMap<F::Id>,
}

impl<'a, F: ProvidedField> ContractBuilder<'a, F> {
    pub fn new(registry: &'a TypeProviderRegistry) -> Self {
        Self {
            registry,
            contracts: ContractCollection::new(),
            memo: TypeIdMap::default(),
        }
    }

    /// Returns the handle of the contract describing `info`.
    pub fn contract_for(&mut self, info: &'static TypeInfo) -> Result<F::Id, UnsupportedTypeError> {
        let key: TypeId = info.type_id();
        if let Some(id) = self.memo.get(&key) {
            return Ok(self.contracts.resolve(*id));
        }
        let registry = self.registry;
        let provider = registry.find(info)?;
        let id = self.contracts.reserve();
        self.memo.insert(key, id);
        let shape = F::provide(provider, info, self)?;
        Ok(self.contracts.fill(id, shape))
    }

    /// Returns the handle of a primitive contract.
    #[inline]
    pub fn primitive(&mut self, kind: PrimitiveKind) -> F::Id {
        self.contracts.get_or_create(ContractShape::Primitive(kind))
    }

    /// Stores an arbitrary shape, for providers describing children that
    /// have no type of their own.
    #[inline]
    pub fn get_or_create(&mut self, shape: ContractShape<F>) -> F::Id {
        self.contracts.get_or_create(shape)
    }

    /// Finishes the graph rooted at `root`.
    pub fn finish(self, root: F::Id) -> ContractGraph<F> {
        ContractGraph::new(self.contracts, root)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use pact_contract::{ReadField, WriteField};
    use pact_reflect::info::Typed;

    use super::{ContractBuilder, TypeProviderRegistry};
    use crate::fixtures::{Node, Scores};

    #[test]
    fn recursive_types_get_cyclic_contracts() {
        let registry = TypeProviderRegistry::new();
        let mut builder = ContractBuilder::<WriteField>::new(&registry);
        let root = builder.contract_for(Node::type_info()).unwrap();
        let graph = builder.finish(root);
        assert_eq!(graph.markup(), "{complex value:i32 next:{nullable #0}}");
    }

    #[test]
    fn read_contracts_come_from_the_constructor() {
        let registry = TypeProviderRegistry::new();
        let mut builder = ContractBuilder::<ReadField>::new(&registry);
        let root = builder.contract_for(Scores::type_info()).unwrap();
        let graph = builder.finish(root);
        assert_eq!(
            graph.markup(),
            "{complex name:str scores:{list i32} note?:{nullable str}}"
        );
    }
}
