//! The authoritative collection of hour slots.
//!
//! # Invariants
//!
//! - At most one slot per `(date, hour)` key.
//! - Every stored key is on the grid (`08..=24`).
//! - Slots iterate in key order, so a date's slots come out by ascending hour.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::key::{KeyError, SlotKey};
use crate::slot::{Lifecycle, Slot};

/// Flat keyed map of slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotStore {
    slots: BTreeMap<SlotKey, Slot>,
}

/// A set of removals and insertions committed together.
///
/// Removals run first, so a batch may rewrite keys it also removes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotBatch {
    pub remove: Vec<SlotKey>,
    pub insert: Vec<Slot>,
}

impl SlotBatch {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.insert.is_empty()
    }
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a snapshot. Later duplicates replace earlier ones.
    pub fn from_slots(slots: impl IntoIterator<Item = Slot>) -> Result<Self, KeyError> {
        let mut store = Self::new();
        for slot in slots {
            store.upsert(slot)?;
        }
        Ok(store)
    }

    pub fn get(&self, key: &SlotKey) -> Option<&Slot> {
        self.slots.get(key)
    }

    /// Inserts or replaces the slot at its key.
    pub fn upsert(&mut self, slot: Slot) -> Result<(), KeyError> {
        slot.key.check()?;
        self.slots.insert(slot.key, slot);
        Ok(())
    }

    /// Flags matching slots as exiting; missing keys are ignored.
    ///
    /// Returns how many slots were flagged.
    pub fn mark_exiting<'a>(&mut self, keys: impl IntoIterator<Item = &'a SlotKey>) -> usize {
        let mut marked = 0;
        for key in keys {
            if let Some(slot) = self.slots.get_mut(key) {
                slot.lifecycle = Lifecycle::Exiting;
                marked += 1;
            }
        }
        marked
    }

    /// Physically deletes the slots at `keys`, returning what was removed.
    ///
    /// Meant to follow [`SlotStore::mark_exiting`] after the caller's delay.
    pub fn remove_all<'a>(&mut self, keys: impl IntoIterator<Item = &'a SlotKey>) -> Vec<Slot> {
        keys.into_iter()
            .filter_map(|key| self.slots.remove(key))
            .collect()
    }

    /// Moves entering slots at `keys` to stable. Returns how many changed.
    pub fn settle<'a>(&mut self, keys: impl IntoIterator<Item = &'a SlotKey>) -> usize {
        let mut settled = 0;
        for key in keys {
            if let Some(slot) = self.slots.get_mut(key) {
                if slot.lifecycle == Lifecycle::Entering {
                    slot.lifecycle = Lifecycle::Stable;
                    settled += 1;
                }
            }
        }
        settled
    }

    /// Slots of one date ordered by hour.
    pub fn slots_for_date(&self, date: NaiveDate) -> impl Iterator<Item = &Slot> + '_ {
        let start = SlotKey { date, hour: 0 };
        let end = SlotKey {
            date,
            hour: u8::MAX,
        };
        self.slots.range(start..=end).map(|(_, slot)| slot)
    }

    /// Dates that have at least one slot, ascending.
    pub fn dates(&self) -> BTreeSet<NaiveDate> {
        self.slots.keys().map(|key| key.date).collect()
    }

    /// Commits a batch all-or-nothing.
    ///
    /// Every inserted key is checked before anything is written.
    pub fn apply(&mut self, batch: SlotBatch) -> Result<(), KeyError> {
        for slot in &batch.insert {
            slot.key.check()?;
        }
        for key in &batch.remove {
            self.slots.remove(key);
        }
        for slot in batch.insert {
            self.slots.insert(slot.key, slot);
        }
        Ok(())
    }

    /// A copy of every slot, for handing to a persistence collaborator.
    pub fn snapshot(&self) -> Vec<Slot> {
        self.slots.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
