use alloc::vec::Vec;
use core::hash::{BuildHasher, Hasher};

use hashbrown::{HashSet, HashTable};
use pact_reflect::hash::{FixedHashMap, FixedHashState};

use crate::{ContractField, ContractId, ContractShape};

/// How many levels of children contribute to a contract's hash.
///
/// Bounding the unfolding makes hashing terminate on cyclic graphs.
const HASH_DEPTH: u8 = 4;

// -----------------------------------------------------------------------------
// Slot

#[derive(Debug, Clone)]
enum Slot<F: ContractField> {
    /// Handed out by `reserve`, not filled yet.
    Reserved,
    /// Filled, waiting for every open reservation to close.
    Pending(ContractShape<F>),
    Canonical { contract: ContractShape<F>, hash: u64 },
    /// Filled with a contract equal to an existing canonical one.
    Alias(F::Id),
}

// -----------------------------------------------------------------------------
// ContractCollection

/// Owns the canonical contracts of one traversal.
///
/// Structurally equal contracts share one canonical handle. Cyclic graphs are
/// built by [`reserve`](Self::reserve)-ing a handle before recursing and
/// [`fill`](Self::fill)-ing it afterwards. While any reservation is open,
/// new contracts stay pending; when the last one closes they are compared
/// against the canonical set and either become canonical or turn into aliases.
/// [`resolve`](Self::resolve) follows aliases.
///
/// # Examples
///
/// ```
/// use pact_contract::{WriteContract, WriteContractCollection, WriteField};
/// use pact_reflect::info::PrimitiveKind;
///
/// let mut contracts = WriteContractCollection::new();
/// let int = contracts.get_or_create(WriteContract::Primitive(PrimitiveKind::I32));
///
/// // node = {complex value:i32 next:{list node}}
/// let node = contracts.reserve();
/// let list = contracts.get_or_create(WriteContract::List(node));
/// let node = contracts.fill(node, WriteContract::Complex(Box::new([
///     WriteField { name: "value".into(), contract: int },
///     WriteField { name: "next".into(), contract: list },
/// ])));
///
/// // The same graph built again collapses onto the first one.
/// let again = contracts.reserve();
/// let list = contracts.get_or_create(WriteContract::List(again));
/// let again = contracts.fill(again, WriteContract::Complex(Box::new([
///     WriteField { name: "value".into(), contract: int },
///     WriteField { name: "next".into(), contract: list },
/// ])));
///
/// assert_eq!(node, again);
/// assert_eq!(contracts.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct ContractCollection<F: ContractField> {
    slots: Vec<Slot<F>>,
    table: HashTable<F::Id>,
    pending: Vec<F::Id>,
    open: usize,
    canonical: usize,
}

impl<F: ContractField> Default for ContractCollection<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: ContractField> ContractCollection<F> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            table: HashTable::new(),
            pending: Vec::new(),
            open: 0,
            canonical: 0,
        }
    }

    /// Number of canonical contracts.
    #[inline]
    pub const fn len(&self) -> usize {
        self.canonical
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.canonical == 0
    }

    /// Returns `true` while reservations are open.
    #[inline]
    pub const fn is_building(&self) -> bool {
        self.open > 0
    }

    fn push(&mut self, slot: Slot<F>) -> F::Id {
        debug_assert!(self.slots.len() < u32::MAX as usize);
        let id = F::Id::from_index(self.slots.len() as u32);
        self.slots.push(slot);
        id
    }

    /// Returns the canonical handle of a contract equal to `candidate`,
    /// storing the candidate if none exists.
    ///
    /// While reservations are open the candidate is stored as pending and its
    /// own handle is returned; it is canonicalised when the last reservation
    /// closes.
    pub fn get_or_create(&mut self, candidate: ContractShape<F>) -> F::Id {
        let id = self.push(Slot::Pending(candidate));
        if self.open == 0 {
            self.canonicalize(id);
            self.resolve(id)
        } else {
            self.pending.push(id);
            id
        }
    }

    /// Reserves a placeholder handle for a contract still under construction.
    pub fn reserve(&mut self) -> F::Id {
        self.open += 1;
        self.push(Slot::Reserved)
    }

    /// Fills a reserved handle and returns its canonical handle.
    ///
    /// The returned handle only differs from `id` when the filled contract
    /// equals an existing canonical one, or when other reservations are still
    /// open (then `id` itself is returned).
    ///
    /// # Panics
    ///
    /// Panics if `id` was not returned by [`reserve`](Self::reserve) or was
    /// already filled.
    pub fn fill(&mut self, id: F::Id, contract: ContractShape<F>) -> F::Id {
        let slot = &mut self.slots[id.index() as usize];
        assert!(
            matches!(slot, Slot::Reserved),
            "contract handle {id:?} is not an open reservation"
        );
        *slot = Slot::Pending(contract);
        self.pending.push(id);
        self.open -= 1;

        if self.open == 0 {
            for pending in core::mem::take(&mut self.pending) {
                self.canonicalize(pending);
            }
        }
        self.resolve(id)
    }

    /// Follows aliases to the handle that owns the contract.
    pub fn resolve(&self, mut id: F::Id) -> F::Id {
        while let Some(Slot::Alias(target)) = self.slots.get(id.index() as usize) {
            id = *target;
        }
        id
    }

    /// Returns the contract behind a handle, following aliases.
    ///
    /// Returns `None` for unknown handles and unfilled reservations.
    pub fn get(&self, id: F::Id) -> Option<&ContractShape<F>> {
        match self.slots.get(self.resolve(id).index() as usize)? {
            Slot::Pending(contract) | Slot::Canonical { contract, .. } => Some(contract),
            Slot::Reserved | Slot::Alias(_) => None,
        }
    }

    /// Iterates the canonical handles and contracts.
    pub fn iter(&self) -> impl Iterator<Item = (F::Id, &ContractShape<F>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                Slot::Canonical { contract, .. } => {
                    Some((F::Id::from_index(index as u32), contract))
                }
                _ => None,
            })
    }

    /// Structural hash of a contract.
    ///
    /// Equal contracts hash equally, across collections too. Canonical
    /// contracts return their cached hash.
    pub fn hash_of(&self, id: F::Id) -> u64 {
        let id = self.resolve(id);
        match &self.slots[id.index() as usize] {
            Slot::Canonical { hash, .. } => *hash,
            _ => self.unfold(id, HASH_DEPTH, &mut FixedHashMap::default()),
        }
    }

    fn unfold(&self, id: F::Id, depth: u8, memo: &mut FixedHashMap<(F::Id, u8), u64>) -> u64 {
        let id = self.resolve(id);
        if let Some(hash) = memo.get(&(id, depth)) {
            return *hash;
        }

        let mut hasher = FixedHashState.build_hasher();
        match self.get(id) {
            Some(contract) => {
                contract.hash_local(&mut hasher);
                if depth > 0 {
                    for child in contract.children() {
                        hasher.write_u64(self.unfold(child, depth - 1, memo));
                    }
                }
            }
            None => hasher.write_u8(0xFF),
        }

        let hash = hasher.finish();
        memo.insert((id, depth), hash);
        hash
    }

    fn canonicalize(&mut self, id: F::Id) {
        let index = id.index() as usize;
        if !matches!(self.slots[index], Slot::Pending(_)) {
            return;
        }

        let hash = self.unfold(id, HASH_DEPTH, &mut FixedHashMap::default());
        let existing = self
            .table
            .find(hash, |&canonical| bisimilar(self, canonical, self, id))
            .copied();

        let slot = &mut self.slots[index];
        match existing {
            Some(canonical) => *slot = Slot::Alias(canonical),
            None => {
                let Slot::Pending(contract) = core::mem::replace(slot, Slot::Reserved) else {
                    unreachable!()
                };
                *slot = Slot::Canonical { contract, hash };
                let slots = &self.slots;
                self.table.insert_unique(hash, id, |&other| match &slots[other.index() as usize] {
                    Slot::Canonical { hash, .. } => *hash,
                    _ => 0,
                });
                self.canonical += 1;
            }
        }
    }

    /// Copies the graph rooted at `id` in `source` into this collection and
    /// returns its canonical handle here.
    ///
    /// # Panics
    ///
    /// Panics if the graph contains an unfilled reservation.
    pub fn import(&mut self, source: &Self, id: F::Id) -> F::Id {
        let mut mapping: FixedHashMap<F::Id, F::Id> = FixedHashMap::default();
        let mut order = Vec::new();
        let mut stack = alloc::vec![source.resolve(id)];

        while let Some(next) = stack.pop() {
            if mapping.contains_key(&next) {
                continue;
            }
            mapping.insert(next, self.reserve());
            order.push(next);
            if let Some(contract) = source.get(next) {
                stack.extend(contract.children().map(|child| source.resolve(child)));
            }
        }

        for next in order {
            let Some(contract) = source.get(next) else {
                panic!("imported graph contains the unfilled reservation {next:?}");
            };
            let contract = contract.map_children(|child| mapping[&source.resolve(child)]);
            self.fill(mapping[&next], contract);
        }

        self.resolve(mapping[&source.resolve(id)])
    }
}

// -----------------------------------------------------------------------------
// Equality

/// Structural equality of two contract graphs, possibly in different
/// collections.
///
/// Pairs already under comparison are assumed equal, so cyclic graphs
/// compare by their infinite unfolding.
pub fn bisimilar<F: ContractField>(
    left: &ContractCollection<F>,
    a: F::Id,
    right: &ContractCollection<F>,
    b: F::Id,
) -> bool {
    let same_collection = core::ptr::eq(left, right);
    let mut assumed: HashSet<(F::Id, F::Id), FixedHashState> = HashSet::default();
    let mut stack = alloc::vec![(a, b)];

    while let Some((a, b)) = stack.pop() {
        let (a, b) = (left.resolve(a), right.resolve(b));
        if same_collection && a == b {
            continue;
        }
        if !assumed.insert((a, b)) {
            continue;
        }
        let (Some(x), Some(y)) = (left.get(a), right.get(b)) else {
            return false;
        };
        if !x.same_local(y) {
            return false;
        }
        stack.extend(x.children().zip(y.children()));
    }
    true
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;

    use pact_reflect::info::PrimitiveKind;

    use super::*;
    use crate::{ReadContract, ReadField, ReadId, WriteContract, WriteField, WriteId};

    type Writes = ContractCollection<WriteField>;

    fn field(name: &str, contract: WriteId) -> WriteField {
        WriteField {
            name: String::from(name),
            contract,
        }
    }

    fn prim(contracts: &mut Writes, kind: PrimitiveKind) -> WriteId {
        contracts.get_or_create(WriteContract::Primitive(kind))
    }

    /// `{complex value:i32 next:{nullable <self>}}`
    fn linked(contracts: &mut Writes) -> WriteId {
        let int = prim(contracts, PrimitiveKind::I32);
        let node = contracts.reserve();
        let next = contracts.get_or_create(WriteContract::Nullable(node));
        contracts.fill(
            node,
            WriteContract::Complex(Box::new([field("value", int), field("next", next)])),
        )
    }

    #[test]
    fn equal_contracts_share_a_handle() {
        let mut contracts = Writes::new();
        let a = prim(&mut contracts, PrimitiveKind::Str);
        let list_a = contracts.get_or_create(WriteContract::List(a));
        let b = prim(&mut contracts, PrimitiveKind::Str);
        let list_b = contracts.get_or_create(WriteContract::List(b));

        assert_eq!(a, b);
        assert_eq!(list_a, list_b);
        assert_eq!(contracts.len(), 2);
    }

    #[test]
    fn separate_collections_agree_on_equality_and_hash() {
        let mut left = Writes::new();
        let mut right = Writes::new();
        // Different insertion order gives different handles.
        prim(&mut right, PrimitiveKind::Bool);
        let a = linked(&mut left);
        let b = linked(&mut right);

        assert!(bisimilar(&left, a, &right, b));
        assert_eq!(left.hash_of(a), right.hash_of(b));
    }

    #[test]
    fn field_names_and_order_matter() {
        let mut contracts = Writes::new();
        let int = prim(&mut contracts, PrimitiveKind::I32);
        let text = prim(&mut contracts, PrimitiveKind::Str);
        let ab = contracts.get_or_create(WriteContract::Complex(Box::new([
            field("a", int),
            field("b", text),
        ])));
        let ba = contracts.get_or_create(WriteContract::Complex(Box::new([
            field("b", text),
            field("a", int),
        ])));
        let renamed = contracts.get_or_create(WriteContract::Complex(Box::new([
            field("a", int),
            field("c", text),
        ])));

        assert_ne!(ab, ba);
        assert_ne!(ab, renamed);
        assert!(!bisimilar(&contracts, ab, &contracts, ba));
    }

    #[test]
    fn recursive_contract_is_self_consistent() {
        let mut contracts = Writes::new();
        let node = linked(&mut contracts);

        let Some(WriteContract::Complex(fields)) = contracts.get(node) else {
            panic!("expected a complex contract");
        };
        let next = contracts.resolve(fields[1].contract);
        assert_eq!(contracts.get(next), Some(&WriteContract::Nullable(node)));
        assert_eq!(contracts.hash_of(node), contracts.hash_of(node));

        // A second copy collapses onto the first.
        assert_eq!(linked(&mut contracts), node);
        assert_eq!(contracts.len(), 3);
    }

    #[test]
    fn unrolled_cycle_collapses() {
        // A list of lists of ... built with two reservations still denotes
        // the same infinite shape as a single self-referencing list.
        let mut contracts = Writes::new();
        let outer = contracts.reserve();
        let inner = contracts.reserve();
        contracts.fill(inner, WriteContract::List(outer));
        let outer = contracts.fill(outer, WriteContract::List(inner));

        let single = contracts.reserve();
        let single = contracts.fill(single, WriteContract::List(single));

        assert_eq!(outer, single);
        assert_eq!(contracts.len(), 1);
    }

    #[test]
    fn read_fields_compare_defaults() {
        let mut contracts = ContractCollection::<ReadField>::new();
        let text: ReadId = contracts.get_or_create(ReadContract::Primitive(PrimitiveKind::Str));
        let field = |has_default| ReadField {
            name: String::from("b"),
            contract: text,
            has_default,
        };
        let required = contracts.get_or_create(ReadContract::Complex(Box::new([field(false)])));
        let optional = contracts.get_or_create(ReadContract::Complex(Box::new([field(true)])));
        assert_ne!(required, optional);
    }

    #[test]
    fn import_canonicalises_into_destination() {
        let mut source = Writes::new();
        let root = linked(&mut source);

        let mut dest = Writes::new();
        let existing = linked(&mut dest);
        let imported = dest.import(&source, root);

        assert_eq!(imported, existing);
        assert_eq!(dest.len(), source.len());
    }
}
