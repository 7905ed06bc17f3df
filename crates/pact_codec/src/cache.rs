//! The concurrent procedure cache.
//!
//! Each key maps to a [`Slot`] that is inserted before its procedure exists,
//! so recursive builds can hand out a stable reference to it. A slot is set
//! exactly once: to the procedure, or to abandoned when the build that
//! claimed it failed. Late callers block on it until then, and retry when it
//! was abandoned; the error itself only reaches the caller whose build failed.

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::hash::Hash;
use std::sync::OnceLock;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use log::{debug, trace, warn};
use pact_reflect::hash::FixedHashState;

use crate::CodecError;

// -----------------------------------------------------------------------------
// Slot

enum SlotState<P> {
    Ready(Arc<P>),
    Abandoned,
}

/// A write-once cell holding a built procedure.
pub(crate) struct Slot<P> {
    state: OnceLock<SlotState<P>>,
}

impl<P> Slot<P> {
    #[inline]
    fn new() -> Self {
        Self {
            state: OnceLock::new(),
        }
    }

    /// The procedure, if its build has been published.
    #[inline]
    pub(crate) fn ready(&self) -> Option<&Arc<P>> {
        match self.state.get() {
            Some(SlotState::Ready(procedure)) => Some(procedure),
            _ => None,
        }
    }

    /// Blocks until the slot is set; `None` if it was abandoned.
    pub(crate) fn wait(&self) -> Option<Arc<P>> {
        match self.state.wait() {
            SlotState::Ready(procedure) => Some(procedure.clone()),
            SlotState::Abandoned => None,
        }
    }

    #[inline]
    fn set(&self, state: SlotState<P>) {
        // Only the claiming session sets a slot.
        let _ = self.state.set(state);
    }
}

// -----------------------------------------------------------------------------
// Session

/// Slots claimed by one root build, published or rolled back together.
pub(crate) struct Session<K, P> {
    claimed: Vec<(K, Arc<Slot<P>>)>,
    built: Vec<(Arc<Slot<P>>, P)>,
}

impl<K: Eq, P> Session<K, P> {
    fn new(key: K, slot: Arc<Slot<P>>) -> Self {
        Self {
            claimed: alloc::vec![(key, slot)],
            built: Vec::new(),
        }
    }

    /// The slot this session claimed for `key`, if any.
    pub(crate) fn claimed(&self, key: &K) -> Option<Arc<Slot<P>>> {
        self.claimed
            .iter()
            .find(|(claimed, _)| claimed == key)
            .map(|(_, slot)| slot.clone())
    }

    pub(crate) fn claim(&mut self, key: K, slot: Arc<Slot<P>>) {
        self.claimed.push((key, slot));
    }

    /// Records the procedure built for a claimed slot.
    pub(crate) fn finish(&mut self, slot: Arc<Slot<P>>, procedure: P) {
        self.built.push((slot, procedure));
    }

    fn publish(self) -> usize {
        let count = self.built.len();
        for (slot, procedure) in self.built {
            slot.set(SlotState::Ready(Arc::new(procedure)));
        }
        count
    }
}

// -----------------------------------------------------------------------------
// ProcedureCache

pub(crate) enum Claim<P> {
    /// The key was vacant; the caller must build the slot.
    Owned(Arc<Slot<P>>),
    /// Another build owns the slot.
    Existing(Arc<Slot<P>>),
}

/// An append-only map from cache key to procedure slot.
pub(crate) struct ProcedureCache<K, P> {
    map: DashMap<K, Arc<Slot<P>>, FixedHashState>,
    direction: &'static str,
}

impl<K: Eq + Hash + Clone, P> ProcedureCache<K, P> {
    pub(crate) fn new(direction: &'static str, capacity: usize) -> Self {
        Self {
            map: DashMap::with_capacity_and_hasher(capacity, FixedHashState),
            direction,
        }
    }

    /// Inserts an empty slot for `key` unless one is already present.
    pub(crate) fn claim(&self, key: K) -> Claim<P> {
        match self.map.entry(key) {
            Entry::Occupied(entry) => Claim::Existing(entry.get().clone()),
            Entry::Vacant(entry) => {
                let slot = Arc::new(Slot::new());
                entry.insert(slot.clone());
                Claim::Owned(slot)
            }
        }
    }

    /// Number of published procedures.
    pub(crate) fn ready_len(&self) -> usize {
        self.map
            .iter()
            .filter(|entry| entry.value().ready().is_some())
            .count()
    }

    /// Returns the procedure for `key`, building it with `build` on first use.
    ///
    /// Also returns how many procedures the call published: zero on a cache
    /// hit, one plus the nested procedures first claimed by this build
    /// otherwise. A caller waiting on a build that fails claims the key again
    /// and builds it itself.
    pub(crate) fn get_or_build<F>(
        &self,
        key: K,
        type_path: &'static str,
        build: F,
    ) -> Result<(Arc<P>, usize), CodecError>
    where
        F: FnOnce(&mut Session<K, P>) -> Result<P, CodecError>,
    {
        let slot = loop {
            let slot = match self.map.get(&key).map(|entry| entry.value().clone()) {
                Some(slot) => slot,
                None => match self.claim(key.clone()) {
                    Claim::Owned(slot) => break slot,
                    Claim::Existing(slot) => slot,
                },
            };
            if let Some(procedure) = slot.ready() {
                return Ok((procedure.clone(), 0));
            }
            trace!("waiting for {} procedure of `{type_path}`", self.direction);
            if let Some(procedure) = slot.wait() {
                return Ok((procedure, 0));
            }
            // Abandoned slots are removed from the map before they are set.
            trace!("{} procedure of `{type_path}` was abandoned, retrying", self.direction);
        };
        trace!("claimed {} procedure of `{type_path}`", self.direction);

        let mut session = Session::new(key, slot.clone());
        match build(&mut session) {
            Ok(root) => {
                let root = Arc::new(root);
                let count = session.publish() + 1;
                slot.set(SlotState::Ready(root.clone()));
                debug!(
                    "built {count} {} procedure(s) for `{type_path}`",
                    self.direction
                );
                Ok((root, count))
            }
            Err(err) => {
                let count = session.claimed.len();
                for (key, claimed) in session.claimed {
                    self.map
                        .remove_if(&key, |_, current| Arc::ptr_eq(current, &claimed));
                    claimed.set(SlotState::Abandoned);
                }
                warn!(
                    "building the {} procedure of `{type_path}` failed, {count} slot(s) rolled back: {err}",
                    self.direction
                );
                Err(err)
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use core::time::Duration;
    use std::sync::Barrier;
    use std::thread;

    use super::{Claim, ProcedureCache};
    use crate::{CodecError, UnsupportedTypeError};

    #[test]
    fn builds_once_and_counts_nested_claims() {
        let cache: ProcedureCache<u32, String> = ProcedureCache::new("test", 4);

        let (root, count) = cache
            .get_or_build(1, "demo::Root", |session| {
                let Claim::Owned(slot) = cache.claim(2) else {
                    panic!("key 2 is vacant");
                };
                session.claim(2, slot.clone());
                session.finish(slot, String::from("nested"));
                Ok(String::from("root"))
            })
            .unwrap();
        assert_eq!(*root, "root");
        assert_eq!(count, 2);
        assert_eq!(cache.ready_len(), 2);

        let (again, count) = cache
            .get_or_build(1, "demo::Root", |_| unreachable!("cached"))
            .unwrap();
        assert_eq!(*again, "root");
        assert_eq!(count, 0);
    }

    #[test]
    fn failure_removes_every_claimed_slot() {
        let cache: ProcedureCache<u32, String> = ProcedureCache::new("test", 4);
        let err = CodecError::from(UnsupportedTypeError::new("demo::Bad", "nope"));

        let result = cache.get_or_build(1, "demo::Bad", |session| {
            let Claim::Owned(slot) = cache.claim(2) else {
                panic!("key 2 is vacant");
            };
            session.claim(2, slot);
            Err(err.clone())
        });
        assert_eq!(result.unwrap_err(), err);
        assert_eq!(cache.ready_len(), 0);
        assert!(matches!(cache.claim(1), Claim::Owned(_)));
        assert!(matches!(cache.claim(2), Claim::Owned(_)));
    }

    #[test]
    fn waiters_rebuild_abandoned_slots() {
        let cache: ProcedureCache<u32, String> = ProcedureCache::new("test", 4);
        let barrier = Barrier::new(2);
        let err = CodecError::from(UnsupportedTypeError::new("demo::Bad", "nope"));

        let (failed, nested) = thread::scope(|scope| {
            let failed = scope.spawn(|| {
                cache.get_or_build(1, "demo::Bad", |session| {
                    let Claim::Owned(slot) = cache.claim(2) else {
                        panic!("key 2 is vacant");
                    };
                    session.claim(2, slot.clone());
                    session.finish(slot, String::from("nested"));
                    barrier.wait();
                    thread::sleep(Duration::from_millis(50));
                    Err(err.clone())
                })
            });
            let nested = scope.spawn(|| {
                barrier.wait();
                cache.get_or_build(2, "demo::Nested", |_| Ok(String::from("rebuilt")))
            });
            (failed.join().unwrap(), nested.join().unwrap())
        });

        assert_eq!(failed.unwrap_err(), err);
        let (nested, count) = nested.unwrap();
        assert_eq!(*nested, "rebuilt");
        assert_eq!(count, 1);
        assert_eq!(cache.ready_len(), 1);
    }
}
