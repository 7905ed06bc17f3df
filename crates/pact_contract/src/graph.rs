use core::fmt;
use core::hash::{Hash, Hasher};

use crate::{ContractCollection, ContractField, ContractShape, Direction};
use crate::{ReadField, WriteField, bisimilar, can_read_from, render_markup};

// -----------------------------------------------------------------------------
// ContractGraph

/// A contract together with the collection that owns its graph.
///
/// Two graphs are equal when their roots are structurally equal, regardless
/// of the handles each collection assigned.
#[derive(Clone)]
pub struct ContractGraph<F: ContractField> {
    contracts: ContractCollection<F>,
    root: F::Id,
}

/// The contract a type is encoded with.
pub type WriteContractGraph = ContractGraph<WriteField>;

/// The contract a type is decoded with.
pub type ReadContractGraph = ContractGraph<ReadField>;

impl<F: ContractField> ContractGraph<F> {
    /// Wraps a collection and one of its handles.
    #[inline]
    pub fn new(contracts: ContractCollection<F>, root: F::Id) -> Self {
        let root = contracts.resolve(root);
        Self { contracts, root }
    }

    #[inline]
    pub fn root(&self) -> F::Id {
        self.root
    }

    /// Returns the root contract.
    ///
    /// Graphs built from a filled root always have one.
    #[inline]
    pub fn contract(&self) -> Option<&ContractShape<F>> {
        self.contracts.get(self.root)
    }

    #[inline]
    pub fn contracts(&self) -> &ContractCollection<F> {
        &self.contracts
    }

    #[inline]
    pub fn into_parts(self) -> (ContractCollection<F>, F::Id) {
        (self.contracts, self.root)
    }

    #[inline]
    pub const fn direction(&self) -> Direction {
        F::DIRECTION
    }

    /// Structural hash of the root.
    #[inline]
    pub fn structural_hash(&self) -> u64 {
        self.contracts.hash_of(self.root)
    }

    /// Compact text rendering, see [`render_markup`].
    #[inline]
    pub fn markup(&self) -> alloc::string::String {
        render_markup(&self.contracts, self.root)
    }
}

impl<F: ContractField> PartialEq for ContractGraph<F> {
    fn eq(&self, other: &Self) -> bool {
        bisimilar(&self.contracts, self.root, &other.contracts, other.root)
    }
}

impl<F: ContractField> Eq for ContractGraph<F> {}

impl<F: ContractField> Hash for ContractGraph<F> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.structural_hash());
    }
}

impl<F: ContractField> fmt::Display for ContractGraph<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.markup())
    }
}

impl<F: ContractField> fmt::Debug for ContractGraph<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Contract({})", self.direction(), self.markup())
    }
}

impl ReadContractGraph {
    /// Returns `true` if data written with `writer` can be read with this
    /// contract. See [`can_read_from`].
    #[inline]
    pub fn can_read_from(&self, writer: &WriteContractGraph, strict: bool) -> bool {
        can_read_from(&self.contracts, self.root, &writer.contracts, writer.root, strict)
    }
}

/// Returns `true` if data written with `writer` can be read with `reader`.
///
/// ```
/// use pact_contract::*;
/// use pact_reflect::info::PrimitiveKind;
///
/// let mut writes = WriteContractCollection::new();
/// let w = writes.get_or_create(WriteContract::Primitive(PrimitiveKind::U8));
/// let writer = WriteContractGraph::new(writes, w);
///
/// let mut reads = ReadContractCollection::new();
/// let r = reads.get_or_create(ReadContract::Primitive(PrimitiveKind::I16));
/// let reader = ReadContractGraph::new(reads, r);
///
/// assert!(are_compatible(&writer, &reader, true));
/// ```
#[inline]
pub fn are_compatible(writer: &WriteContractGraph, reader: &ReadContractGraph, strict: bool) -> bool {
    reader.can_read_from(writer, strict)
}

// -----------------------------------------------------------------------------
// Contract

/// A contract of either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contract {
    Write(WriteContractGraph),
    Read(ReadContractGraph),
}

impl Contract {
    pub const fn direction(&self) -> Direction {
        match self {
            Self::Write(_) => Direction::Write,
            Self::Read(_) => Direction::Read,
        }
    }

    pub fn markup(&self) -> alloc::string::String {
        match self {
            Self::Write(graph) => graph.markup(),
            Self::Read(graph) => graph.markup(),
        }
    }

    pub fn as_write(&self) -> Option<&WriteContractGraph> {
        match self {
            Self::Write(graph) => Some(graph),
            Self::Read(_) => None,
        }
    }

    pub fn as_read(&self) -> Option<&ReadContractGraph> {
        match self {
            Self::Read(graph) => Some(graph),
            Self::Write(_) => None,
        }
    }

    pub fn into_write(self) -> Option<WriteContractGraph> {
        match self {
            Self::Write(graph) => Some(graph),
            Self::Read(_) => None,
        }
    }

    pub fn into_read(self) -> Option<ReadContractGraph> {
        match self {
            Self::Read(graph) => Some(graph),
            Self::Write(_) => None,
        }
    }
}

impl From<WriteContractGraph> for Contract {
    #[inline]
    fn from(graph: WriteContractGraph) -> Self {
        Self::Write(graph)
    }
}

impl From<ReadContractGraph> for Contract {
    #[inline]
    fn from(graph: ReadContractGraph) -> Self {
        Self::Read(graph)
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write(graph) => fmt::Display::fmt(graph, f),
            Self::Read(graph) => fmt::Display::fmt(graph, f),
        }
    }
}
