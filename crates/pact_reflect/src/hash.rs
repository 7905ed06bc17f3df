//! Fixed-seed hashing shared by the descriptor cells and the contract arenas.
//!
//! Hash results depend only on the input, so contract hashes are stable
//! across runs.

use core::any::TypeId;
use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};
use hashbrown::HashMap;

/// A fixed hash seed.
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x6A09E667F3BCC908);

/// A hasher whose results only depend on its input.
pub type FixedHasher = FoldHasher<'static>;

/// [`BuildHasher`] producing [`FixedHasher`]s.
///
/// ```
/// use core::hash::BuildHasher;
/// use pact_reflect::hash::FixedHashState;
///
/// assert_eq!(FixedHashState.hash_one("abc"), FixedHashState.hash_one("abc"));
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

/// A [`HashMap`] with fixed-seed hashing.
pub type FixedHashMap<K, V> = HashMap<K, V, FixedHashState>;

/// A map keyed by [`TypeId`].
pub type TypeIdMap<V> = FixedHashMap<TypeId, V>;
