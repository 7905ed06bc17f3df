use alloc::string::String;
use alloc::vec::Vec;

use pact_reflect::hash::FixedHashMap;
use pact_reflect::info::PrimitiveKind;
use thiserror::Error;

use crate::{ContractCollection, ContractField, ContractGraph, ContractShape, Direction};

// -----------------------------------------------------------------------------
// Document types

/// A self-contained snapshot of a contract graph.
///
/// Nodes reference each other by index into [`nodes`](Self::nodes); the root
/// is node `root`. With the `serde` feature the document can be persisted and
/// compatibility checked offline against freshly computed contracts.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContractDocument {
    pub direction: Direction,
    pub root: u32,
    pub nodes: Vec<NodeDocument>,
}

/// One node of a [`ContractDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "kind", rename_all = "lowercase")
)]
pub enum NodeDocument {
    Primitive { name: String },
    Nullable { inner: u32 },
    List { item: u32 },
    Dictionary { key: u32, value: u32 },
    Enum { members: Vec<String> },
    Union { members: Vec<UnionCaseDocument> },
    Tuple { items: Vec<u32> },
    Complex { fields: Vec<FieldDocument> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnionCaseDocument {
    pub tag: String,
    pub contract: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldDocument {
    pub name: String,
    pub contract: u32,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "is_false"))]
    pub has_default: bool,
}

#[cfg(feature = "serde")]
fn is_false(value: &bool) -> bool {
    !*value
}

// -----------------------------------------------------------------------------
// DocumentError

/// A document that does not describe a valid contract graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("document describes a {found} contract, expected {expected}")]
    WrongDirection { expected: Direction, found: Direction },

    #[error("root node {root} is out of range for {len} node(s)")]
    RootOutOfRange { root: u32, len: usize },

    #[error("node {node} references missing node {target}")]
    DanglingReference { node: usize, target: u32 },

    #[error("node {node} names unknown primitive `{name}`")]
    UnknownPrimitive { node: usize, name: String },

    #[error("node {node} gives write field `{field}` a default")]
    DefaultOnWriter { node: usize, field: String },
}

// -----------------------------------------------------------------------------
// Conversion

impl<F: ContractField> ContractGraph<F> {
    /// Snapshots the graph reachable from the root.
    ///
    /// Nodes are numbered in depth-first order, so the root is node 0.
    pub fn to_document(&self) -> ContractDocument {
        let contracts = self.contracts();
        let mut index: FixedHashMap<F::Id, u32> = FixedHashMap::default();
        let mut order = Vec::new();
        let mut stack = alloc::vec![self.root()];

        while let Some(id) = stack.pop() {
            let id = contracts.resolve(id);
            if index.contains_key(&id) {
                continue;
            }
            index.insert(id, order.len() as u32);
            order.push(id);
            if let Some(contract) = contracts.get(id) {
                // Reverse so children are numbered in declaration order.
                let children: Vec<_> = contract.children().collect();
                stack.extend(children.into_iter().rev());
            }
        }

        let at = |id: F::Id| index[&contracts.resolve(id)];
        let nodes = order
            .iter()
            .filter_map(|id| contracts.get(*id))
            .map(|contract| match contract {
                ContractShape::Primitive(kind) => NodeDocument::Primitive {
                    name: String::from(kind.name()),
                },
                ContractShape::Nullable(inner) => NodeDocument::Nullable { inner: at(*inner) },
                ContractShape::List(item) => NodeDocument::List { item: at(*item) },
                ContractShape::Dictionary { key, value } => NodeDocument::Dictionary {
                    key: at(*key),
                    value: at(*value),
                },
                ContractShape::Enum(members) => NodeDocument::Enum {
                    members: members.to_vec(),
                },
                ContractShape::Union(members) => NodeDocument::Union {
                    members: members
                        .iter()
                        .map(|(tag, id)| UnionCaseDocument {
                            tag: tag.clone(),
                            contract: at(*id),
                        })
                        .collect(),
                },
                ContractShape::Tuple(items) => NodeDocument::Tuple {
                    items: items.iter().map(|id| at(*id)).collect(),
                },
                ContractShape::Complex(fields) => NodeDocument::Complex {
                    fields: fields
                        .iter()
                        .map(|field| FieldDocument {
                            name: String::from(field.name()),
                            contract: at(field.contract()),
                            has_default: field.has_default(),
                        })
                        .collect(),
                },
            })
            .collect();

        ContractDocument {
            direction: F::DIRECTION,
            root: 0,
            nodes,
        }
    }

    /// Rebuilds a graph from a document, canonicalising its nodes.
    pub fn from_document(document: &ContractDocument) -> Result<Self, DocumentError> {
        if document.direction != F::DIRECTION {
            return Err(DocumentError::WrongDirection {
                expected: F::DIRECTION,
                found: document.direction,
            });
        }
        let len = document.nodes.len();
        if document.root as usize >= len {
            return Err(DocumentError::RootOutOfRange {
                root: document.root,
                len,
            });
        }

        let mut contracts = ContractCollection::<F>::new();
        let ids: Vec<F::Id> = (0..len).map(|_| contracts.reserve()).collect();

        for (node, doc) in document.nodes.iter().enumerate() {
            let id = |target: u32| {
                ids.get(target as usize)
                    .copied()
                    .ok_or(DocumentError::DanglingReference { node, target })
            };
            let contract = match doc {
                NodeDocument::Primitive { name } => ContractShape::Primitive(
                    PrimitiveKind::from_name(name).ok_or_else(|| {
                        DocumentError::UnknownPrimitive {
                            node,
                            name: name.clone(),
                        }
                    })?,
                ),
                NodeDocument::Nullable { inner } => ContractShape::Nullable(id(*inner)?),
                NodeDocument::List { item } => ContractShape::List(id(*item)?),
                NodeDocument::Dictionary { key, value } => ContractShape::Dictionary {
                    key: id(*key)?,
                    value: id(*value)?,
                },
                NodeDocument::Enum { members } => ContractShape::Enum(members.clone().into()),
                NodeDocument::Union { members } => ContractShape::Union(
                    members
                        .iter()
                        .map(|case| Ok((case.tag.clone(), id(case.contract)?)))
                        .collect::<Result<_, DocumentError>>()?,
                ),
                NodeDocument::Tuple { items } => ContractShape::Tuple(
                    items
                        .iter()
                        .map(|item| id(*item))
                        .collect::<Result<_, _>>()?,
                ),
                NodeDocument::Complex { fields } => ContractShape::Complex(
                    fields
                        .iter()
                        .map(|field| {
                            F::from_parts(field.name.clone(), id(field.contract)?, field.has_default)
                                .ok_or_else(|| DocumentError::DefaultOnWriter {
                                    node,
                                    field: field.name.clone(),
                                })
                        })
                        .collect::<Result<_, _>>()?,
                ),
            };
            contracts.fill(ids[node], contract);
        }

        let root = ids[document.root as usize];
        debug_assert!(!contracts.is_building());
        debug_assert!(contracts.get(root).is_some());
        Ok(ContractGraph::new(contracts, root))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;

    use pact_reflect::info::PrimitiveKind;

    use super::*;
    use crate::{ReadContractGraph, WriteContract, WriteContractCollection};
    use crate::{WriteContractGraph, WriteField};

    fn linked() -> WriteContractGraph {
        let mut contracts = WriteContractCollection::new();
        let int = contracts.get_or_create(WriteContract::Primitive(PrimitiveKind::I32));
        let node = contracts.reserve();
        let next = contracts.get_or_create(WriteContract::Nullable(node));
        let node = contracts.fill(
            node,
            WriteContract::Complex(Box::new([
                WriteField { name: String::from("value"), contract: int },
                WriteField { name: String::from("next"), contract: next },
            ])),
        );
        WriteContractGraph::new(contracts, node)
    }

    #[test]
    fn document_numbers_nodes_depth_first() {
        let document = linked().to_document();
        assert_eq!(document.root, 0);
        assert_eq!(
            document.nodes,
            vec![
                NodeDocument::Complex {
                    fields: vec![
                        FieldDocument { name: "value".into(), contract: 1, has_default: false },
                        FieldDocument { name: "next".into(), contract: 2, has_default: false },
                    ],
                },
                NodeDocument::Primitive { name: "i32".into() },
                NodeDocument::Nullable { inner: 0 },
            ]
        );
    }

    #[test]
    fn document_rebuilds_an_equal_graph() {
        let graph = linked();
        let rebuilt = WriteContractGraph::from_document(&graph.to_document()).unwrap();
        assert_eq!(rebuilt, graph);
        assert_eq!(rebuilt.structural_hash(), graph.structural_hash());
        assert_eq!(rebuilt.markup(), graph.markup());
    }

    #[test]
    fn invalid_documents_are_rejected() {
        let mut document = linked().to_document();
        assert!(matches!(
            ReadContractGraph::from_document(&document),
            Err(DocumentError::WrongDirection { .. })
        ));

        document.nodes[2] = NodeDocument::Nullable { inner: 9 };
        assert_eq!(
            WriteContractGraph::from_document(&document),
            Err(DocumentError::DanglingReference { node: 2, target: 9 })
        );

        document.nodes[1] = NodeDocument::Primitive { name: "i128".into() };
        assert!(matches!(
            WriteContractGraph::from_document(&document),
            Err(DocumentError::UnknownPrimitive { node: 1, .. })
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn document_survives_json() {
        let graph = linked();
        let json = serde_json::to_string(&graph.to_document()).unwrap();
        assert!(json.contains(r#""kind":"nullable""#));

        let document: ContractDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(WriteContractGraph::from_document(&document).unwrap(), graph);
    }
}
