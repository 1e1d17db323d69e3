//! Machine State Store
//!
//! Latest `ScoredReading` per machine id, backed by a sharded `DashMap`.
//! Each entry is replaced under its shard's write lock, so a reader of one
//! machine never sees a half-written value and writers to different machines
//! rarely contend. Values are stored behind `Arc` so readers clone a pointer,
//! not the reading.
//!
//! Consistency is per machine: a snapshot reflects each machine as of its own
//! last write, not a single global instant.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::types::{MachineId, ScoredReading};

struct Slot {
    /// Position in first-seen order, used to order snapshots
    seq: u64,
    latest: Arc<ScoredReading>,
}

/// Latest-value cache of machine health, shared between pipeline workers
/// (writers) and consumers (readers).
#[derive(Default)]
pub struct MachineStateStore {
    slots: DashMap<MachineId, Slot>,
    next_seq: AtomicU64,
}

impl MachineStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored state of `machine_id`.
    ///
    /// Last write wins, with no versioning. Returns `true` when this is the
    /// first state ever stored for the machine.
    pub fn upsert(&self, machine_id: MachineId, scored: ScoredReading) -> bool {
        match self.slots.entry(machine_id) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().latest = Arc::new(scored);
                false
            }
            Entry::Vacant(entry) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                entry.insert(Slot {
                    seq,
                    latest: Arc::new(scored),
                });
                true
            }
        }
    }

    /// Latest state of a machine; `None` if no reading ever arrived for it.
    pub fn get(&self, machine_id: &MachineId) -> Option<Arc<ScoredReading>> {
        self.slots.get(machine_id).map(|slot| Arc::clone(&slot.latest))
    }

    /// All machines with their latest state, in first-seen order.
    pub fn snapshot(&self) -> Vec<(MachineId, Arc<ScoredReading>)> {
        let mut entries: Vec<(u64, MachineId, Arc<ScoredReading>)> = self
            .slots
            .iter()
            .map(|slot| (slot.seq, slot.key().clone(), Arc::clone(&slot.latest)))
            .collect();
        entries.sort_unstable_by_key(|(seq, _, _)| *seq);
        entries
            .into_iter()
            .map(|(_, id, scored)| (id, scored))
            .collect()
    }

    /// Number of machines with a stored state.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
