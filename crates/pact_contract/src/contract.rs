use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;
use core::hash::{Hash, Hasher};

use pact_reflect::info::PrimitiveKind;

use crate::{ContractId, ReadId, WriteId};

// -----------------------------------------------------------------------------
// ContractKind

/// The shape family of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    Primitive,
    Nullable,
    List,
    Dictionary,
    Enum,
    Union,
    Tuple,
    Complex,
}

impl ContractKind {
    /// Per-kind hash seed.
    pub(crate) const fn seed(self) -> u32 {
        match self {
            Self::Primitive => 0x3C6E_F372,
            Self::Nullable => 0x5BE0_CD19,
            Self::List => 0xA4A7_6926,
            Self::Dictionary => 0x9ABC_F854,
            Self::Enum => 0x1F83_D9AB,
            Self::Union => 0x510E_527F,
            Self::Tuple => 0x9B05_688C,
            Self::Complex => 0xBB67_AE85,
        }
    }

    /// The keyword used in markup and documents.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Primitive => "primitive",
            Self::Nullable => "nullable",
            Self::List => "list",
            Self::Dictionary => "dictionary",
            Self::Enum => "enum",
            Self::Union => "union",
            Self::Tuple => "tuple",
            Self::Complex => "complex",
        }
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

// -----------------------------------------------------------------------------
// Direction

/// Whether a contract describes encoding or decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Direction {
    Read,
    Write,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => f.pad("read"),
            Self::Write => f.pad("write"),
        }
    }
}

// -----------------------------------------------------------------------------
// Fields

/// A field of a complex contract, as seen by one direction.
pub trait ContractField: Clone + fmt::Debug + PartialEq {
    type Id: ContractId;

    const DIRECTION: Direction;

    /// Builds a field; `None` if this direction cannot carry a default.
    fn from_parts(name: String, contract: Self::Id, has_default: bool) -> Option<Self>;

    fn name(&self) -> &str;

    fn contract(&self) -> Self::Id;

    /// Readers may mark a field as optional; writers never do.
    fn has_default(&self) -> bool;

    /// The same field pointing at another contract.
    fn with_contract(&self, contract: Self::Id) -> Self;
}

/// A field a writer emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteField {
    pub name: String,
    pub contract: WriteId,
}

/// A field a reader consumes, optionally with a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadField {
    pub name: String,
    pub contract: ReadId,
    pub has_default: bool,
}

impl ContractField for WriteField {
    type Id = WriteId;

    const DIRECTION: Direction = Direction::Write;

    fn from_parts(name: String, contract: WriteId, has_default: bool) -> Option<Self> {
        (!has_default).then_some(Self { name, contract })
    }

    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn contract(&self) -> WriteId {
        self.contract
    }

    #[inline]
    fn has_default(&self) -> bool {
        false
    }

    fn with_contract(&self, contract: WriteId) -> Self {
        Self {
            name: self.name.clone(),
            contract,
        }
    }
}

impl ContractField for ReadField {
    type Id = ReadId;

    const DIRECTION: Direction = Direction::Read;

    fn from_parts(name: String, contract: ReadId, has_default: bool) -> Option<Self> {
        Some(Self {
            name,
            contract,
            has_default,
        })
    }

    #[inline]
    fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    fn contract(&self) -> ReadId {
        self.contract
    }

    #[inline]
    fn has_default(&self) -> bool {
        self.has_default
    }

    fn with_contract(&self, contract: ReadId) -> Self {
        Self {
            name: self.name.clone(),
            contract,
            has_default: self.has_default,
        }
    }
}

// -----------------------------------------------------------------------------
// ContractShape

/// A structural description of one type's on-wire shape.
///
/// Children are referenced by handle, so shapes form a graph that may contain
/// cycles. Structural equality and hashing are provided by the owning
/// [`ContractCollection`](crate::ContractCollection), not by this type.
#[derive(Debug, Clone, PartialEq)]
pub enum ContractShape<F: ContractField> {
    Primitive(PrimitiveKind),
    Nullable(F::Id),
    List(F::Id),
    Dictionary { key: F::Id, value: F::Id },
    /// Member names in declaration order.
    Enum(Box<[String]>),
    /// `(tag, contract)` pairs in declaration order.
    Union(Box<[(String, F::Id)]>),
    Tuple(Box<[F::Id]>),
    Complex(Box<[F]>),
}

/// The shape used when encoding.
pub type WriteContract = ContractShape<WriteField>;

/// The shape used when decoding.
pub type ReadContract = ContractShape<ReadField>;

impl<F: ContractField> ContractShape<F> {
    pub const fn kind(&self) -> ContractKind {
        match self {
            Self::Primitive(_) => ContractKind::Primitive,
            Self::Nullable(_) => ContractKind::Nullable,
            Self::List(_) => ContractKind::List,
            Self::Dictionary { .. } => ContractKind::Dictionary,
            Self::Enum(_) => ContractKind::Enum,
            Self::Union(_) => ContractKind::Union,
            Self::Tuple(_) => ContractKind::Tuple,
            Self::Complex(_) => ContractKind::Complex,
        }
    }

    /// Number of child contracts.
    pub fn child_len(&self) -> usize {
        match self {
            Self::Primitive(_) | Self::Enum(_) => 0,
            Self::Nullable(_) | Self::List(_) => 1,
            Self::Dictionary { .. } => 2,
            Self::Union(members) => members.len(),
            Self::Tuple(items) => items.len(),
            Self::Complex(fields) => fields.len(),
        }
    }

    /// Child contract at `index`, in declaration order.
    pub fn child(&self, index: usize) -> Option<F::Id> {
        match self {
            Self::Primitive(_) | Self::Enum(_) => None,
            Self::Nullable(inner) | Self::List(inner) => (index == 0).then_some(*inner),
            Self::Dictionary { key, value } => match index {
                0 => Some(*key),
                1 => Some(*value),
                _ => None,
            },
            Self::Union(members) => members.get(index).map(|(_, id)| *id),
            Self::Tuple(items) => items.get(index).copied(),
            Self::Complex(fields) => fields.get(index).map(ContractField::contract),
        }
    }

    /// Iterates the child contracts in declaration order.
    pub fn children(&self) -> impl Iterator<Item = F::Id> + '_ {
        (0..self.child_len()).filter_map(|index| self.child(index))
    }

    /// Copies the shape, mapping every child handle through `f`.
    pub fn map_children(&self, mut f: impl FnMut(F::Id) -> F::Id) -> Self {
        match self {
            Self::Primitive(kind) => Self::Primitive(*kind),
            Self::Nullable(inner) => Self::Nullable(f(*inner)),
            Self::List(item) => Self::List(f(*item)),
            Self::Dictionary { key, value } => Self::Dictionary {
                key: f(*key),
                value: f(*value),
            },
            Self::Enum(members) => Self::Enum(members.clone()),
            Self::Union(members) => Self::Union(
                members
                    .iter()
                    .map(|(tag, id)| (tag.clone(), f(*id)))
                    .collect(),
            ),
            Self::Tuple(items) => Self::Tuple(items.iter().map(|id| f(*id)).collect()),
            Self::Complex(fields) => Self::Complex(
                fields
                    .iter()
                    .map(|field| field.with_contract(f(field.contract())))
                    .collect(),
            ),
        }
    }

    /// Compares everything except child handles.
    pub(crate) fn same_local(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Primitive(a), Self::Primitive(b)) => a == b,
            (Self::Nullable(_), Self::Nullable(_))
            | (Self::List(_), Self::List(_))
            | (Self::Dictionary { .. }, Self::Dictionary { .. }) => true,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Union(a), Self::Union(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.0 == y.0)
            }
            (Self::Tuple(a), Self::Tuple(b)) => a.len() == b.len(),
            (Self::Complex(a), Self::Complex(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|(x, y)| {
                        x.name() == y.name() && x.has_default() == y.has_default()
                    })
            }
            _ => false,
        }
    }

    /// Hashes everything except child handles.
    pub(crate) fn hash_local<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.kind().seed());
        match self {
            Self::Primitive(kind) => kind.hash(state),
            Self::Nullable(_) | Self::List(_) | Self::Dictionary { .. } => {}
            Self::Enum(members) => members.hash(state),
            Self::Union(members) => members.iter().for_each(|(tag, _)| tag.hash(state)),
            Self::Tuple(items) => state.write_usize(items.len()),
            Self::Complex(fields) => fields.iter().for_each(|field| {
                field.name().hash(state);
                state.write_u8(field.has_default() as u8);
            }),
        }
    }
}
