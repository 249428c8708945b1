//! Derivation of display blocks from a day's slots.
//!
//! A block is a maximal run of hour-adjacent slots with the same subject,
//! structurally equal notes and the same exiting state. Blocks are never
//! stored; they are recomputed from the [`SlotStore`](crate::SlotStore) on
//! every read.

use std::ops::Range;

use chrono::NaiveDate;
use serde::Serialize;

use crate::key::{KeyError, SlotKey};
use crate::slot::{Lifecycle, NoteItem, Slot};
use crate::types::SubjectId;

/// A contiguous session on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub date: NaiveDate,
    /// First hour row of the block.
    pub start_hour: u8,
    /// Exclusive end hour; always greater than `start_hour`.
    pub end_hour: u8,
    /// Subject of the representative (first) slot.
    pub subject_id: SubjectId,
    /// Notes of the representative slot; every member carries the same list.
    pub notes: Vec<NoteItem>,
    pub has_entering: bool,
    pub has_exiting: bool,
}

impl Block {
    fn open(slot: &Slot) -> Self {
        Self {
            date: slot.key.date,
            start_hour: slot.key.hour,
            end_hour: slot.key.hour.saturating_add(1),
            subject_id: slot.subject_id.clone(),
            notes: slot.notes.clone(),
            has_entering: slot.lifecycle == Lifecycle::Entering,
            has_exiting: slot.lifecycle == Lifecycle::Exiting,
        }
    }

    /// Whether `slot` continues this block.
    fn accepts(&self, slot: &Slot) -> bool {
        self.end_hour == slot.key.hour
            && self.subject_id == slot.subject_id
            && self.notes == slot.notes
            && self.has_exiting == slot.lifecycle.is_exiting()
    }

    fn extend(&mut self, slot: &Slot) {
        self.end_hour = slot.key.hour.saturating_add(1);
        self.has_entering |= slot.lifecycle == Lifecycle::Entering;
    }

    pub const fn hours(&self) -> Range<u8> {
        self.start_hour..self.end_hour
    }

    pub const fn duration(&self) -> u8 {
        self.end_hour - self.start_hour
    }

    pub const fn contains(&self, hour: u8) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }

    /// Key of the first slot.
    pub const fn start_key(&self) -> SlotKey {
        SlotKey {
            date: self.date,
            hour: self.start_hour,
        }
    }

    /// Keys of every member slot, ascending.
    pub fn keys(&self) -> Result<Vec<SlotKey>, KeyError> {
        SlotKey::span(self.date, self.hours())
    }
}

/// Groups one date's slots into blocks.
///
/// `slots` must belong to a single date and come in ascending hour order, as
/// produced by [`SlotStore::slots_for_date`](crate::SlotStore::slots_for_date).
/// The result is ordered by start hour, and every input slot lands in exactly
/// one block. Pure: equal input gives equal output.
///
/// Hours are expected to be grid hours. A hand-built key at `u8::MAX` does not
/// panic but yields an empty block.
pub fn group_day<'a>(slots: impl IntoIterator<Item = &'a Slot>) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    for slot in slots {
        match blocks.last_mut() {
            Some(last) if last.accepts(slot) => last.extend(slot),
            _ => {
                debug_assert!(
                    blocks
                        .last()
                        .is_none_or(|b| b.date == slot.key.date && b.end_hour <= slot.key.hour),
                    "slots must be one date in ascending hour order"
                );
                blocks.push(Block::open(slot));
            }
        }
    }
    blocks
}

/// Finds the block covering `hour`.
pub fn block_at(blocks: &[Block], hour: u8) -> Option<&Block> {
    blocks.iter().find(|block| block.contains(hour))
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::store::SlotStore;
    use crate::types::NoteId;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn slot(hour: u32, subject: &str) -> Slot {
        Slot::new(
            SlotKey::new(date(), hour).unwrap(),
            SubjectId::new(subject).unwrap(),
            Vec::new(),
        )
    }

    fn with_lifecycle(mut slot: Slot, lifecycle: Lifecycle) -> Slot {
        slot.lifecycle = lifecycle;
        slot
    }

    fn spans(blocks: &[Block]) -> Vec<(u8, u8)> {
        blocks.iter().map(|b| (b.start_hour, b.end_hour)).collect()
    }

    #[test]
    fn empty_day_has_no_blocks() {
        assert!(group_day(&Vec::<Slot>::new()).is_empty());
    }

    #[test]
    fn hand_built_max_hour_does_not_overflow() {
        let key = SlotKey {
            date: date(),
            hour: u8::MAX,
        };
        let slots = vec![Slot::new(key, SubjectId::new("math").unwrap(), Vec::new())];
        let blocks = group_day(&slots);
        assert_eq!(spans(&blocks), vec![(u8::MAX, u8::MAX)]);
    }

    #[test]
    fn adjacent_equal_slots_merge() {
        let slots = vec![slot(9, "math"), slot(10, "math"), slot(11, "math")];
        let blocks = group_day(&slots);
        assert_eq!(spans(&blocks), vec![(9, 12)]);
        assert_eq!(blocks[0].duration(), 3);
    }

    #[test]
    fn gaps_and_subject_changes_split() {
        let slots = vec![
            slot(9, "math"),
            slot(10, "law"),
            slot(12, "law"),
            slot(13, "law"),
        ];
        assert_eq!(spans(&group_day(&slots)), vec![(9, 10), (10, 11), (12, 14)]);
    }

    #[test]
    fn different_notes_split() {
        let mut noted = slot(10, "math");
        noted.notes.push(NoteItem {
            id: NoteId::new("n1").unwrap(),
            text: "proofs".to_string(),
            completed: false,
        });
        let slots = vec![slot(9, "math"), noted];
        assert_eq!(spans(&group_day(&slots)), vec![(9, 10), (10, 11)]);
    }

    #[test]
    fn exiting_slots_are_isolated_from_stable_neighbours() {
        let slots = vec![
            slot(9, "math"),
            with_lifecycle(slot(10, "math"), Lifecycle::Exiting),
            with_lifecycle(slot(11, "math"), Lifecycle::Exiting),
            slot(12, "math"),
        ];
        let blocks = group_day(&slots);
        assert_eq!(spans(&blocks), vec![(9, 10), (10, 12), (12, 13)]);
        assert!(!blocks[0].has_exiting);
        assert!(blocks[1].has_exiting);
        assert!(!blocks[2].has_exiting);
    }

    #[test]
    fn entering_merges_and_propagates_flag() {
        let slots = vec![
            slot(9, "math"),
            with_lifecycle(slot(10, "math"), Lifecycle::Entering),
        ];
        let blocks = group_day(&slots);
        assert_eq!(spans(&blocks), vec![(9, 11)]);
        assert!(blocks[0].has_entering);
        assert!(!blocks[0].has_exiting);
    }

    #[test]
    fn grouping_is_idempotent() {
        let store = SlotStore::from_slots([
            slot(8, "a"),
            slot(9, "a"),
            with_lifecycle(slot(10, "a"), Lifecycle::Exiting),
            slot(14, "b"),
            slot(24, "b"),
        ])
        .unwrap();

        let first = group_day(store.slots_for_date(date()));
        let second = group_day(store.slots_for_date(date()));
        assert_eq!(first, second);
    }

    #[test]
    fn every_slot_lands_in_exactly_one_block() {
        let slots = vec![
            slot(8, "a"),
            slot(9, "a"),
            with_lifecycle(slot(10, "a"), Lifecycle::Exiting),
            slot(11, "b"),
            with_lifecycle(slot(12, "b"), Lifecycle::Entering),
            slot(20, "c"),
            slot(24, "c"),
        ];
        let blocks = group_day(&slots);

        for s in &slots {
            let owners = blocks.iter().filter(|b| b.contains(s.key.hour)).count();
            assert_eq!(owners, 1, "hour {} owned by {owners} blocks", s.key.hour);
        }
        let covered: usize = blocks.iter().map(|b| usize::from(b.duration())).sum();
        assert_eq!(covered, slots.len());
    }

    #[test]
    fn block_at_finds_covering_block() {
        let slots = vec![slot(9, "a"), slot(10, "a"), slot(13, "b")];
        let blocks = group_day(&slots);

        assert_eq!(block_at(&blocks, 10).map(|b| b.start_hour), Some(9));
        assert!(block_at(&blocks, 11).is_none());
        assert_eq!(block_at(&blocks, 13).map(|b| b.end_hour), Some(14));
    }

    #[test]
    fn block_keys_cover_its_hours() {
        let slots = vec![slot(22, "a"), slot(23, "a"), slot(24, "a")];
        let block = &group_day(&slots)[0];
        let keys: Vec<String> = block.keys().unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(keys, vec!["2024-01-01-22", "2024-01-01-23", "2024-01-01-24"]);
    }
}
