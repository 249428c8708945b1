//! Collision-aware mutations over the slot store.
//!
//! Every operation resolves its target against the block layout *before* the
//! mutation, validates the whole change, and then commits it as one
//! [`SlotBatch`]. A rejected operation leaves the store untouched.
//!
//! # Two-phase removal
//!
//! Deleting a block or shrinking one does not remove slots. The affected slots
//! are flagged [`Lifecycle::Exiting`] and their keys are handed back in a
//! [`Removal`]; the caller waits out its exit transition and then calls
//! [`Planner::remove_all`]. The planner owns no timer.
//!
//! Exiting slots are inert: any mutation that targets one is rejected with
//! [`PlanError::Exiting`] until it is physically removed. They still occupy
//! their hours for collision checks.

use std::collections::BTreeSet;
use std::ops::Range;

use chrono::NaiveDate;
use thiserror::Error;

use crate::grouping::{Block, block_at, group_day};
use crate::key::{KeyError, SlotKey};
use crate::note::{NoteEdit, NoteError};
use crate::slot::{Lifecycle, NoteItem, Slot};
use crate::store::{SlotBatch, SlotStore};
use crate::types::{NoteId, SubjectId};

/// Why a mutation was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// A key or target range falls outside the grid.
    #[error(transparent)]
    InvalidKey(#[from] KeyError),

    /// Create/edit was called without a subject.
    #[error("a subject is required")]
    MissingSubject,

    /// The target hour belongs to another block.
    #[error("{key} is already taken by another block")]
    Collision { key: SlotKey },

    /// The target is waiting for physical removal.
    #[error("{key} is being removed")]
    Exiting { key: SlotKey },

    /// The block passed in no longer matches the current layout.
    #[error("block starting at {key} no longer matches the schedule")]
    StaleBlock { key: SlotKey },

    /// A note operation failed.
    #[error(transparent)]
    Note(#[from] NoteError),
}

/// Result of [`Planner::create_or_edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// A new single-hour slot, flagged entering.
    Created(SlotKey),
    /// Every slot of the block containing the key was rewritten.
    Group(Vec<SlotKey>),
}

/// Keys flagged exiting, to be passed to [`Planner::remove_all`] later.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Removal {
    pub keys: BTreeSet<SlotKey>,
}

impl Removal {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Result of [`Planner::move_block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moved {
    pub date: NaiveDate,
    pub from: Range<u8>,
    pub to: Range<u8>,
}

/// Result of [`Planner::resize_block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resize {
    /// Same end, or an end at or before the start.
    Unchanged,
    /// New trailing slots were appended.
    Extended { added: Vec<SlotKey> },
    /// The trailing slice is exiting.
    Shrinking(Removal),
}

/// The mutation engine: a slot store plus a revision counter.
///
/// Single writer. The revision increases with every committed change so a
/// persistence collaborator can tell when a new snapshot is due.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    store: SlotStore,
    revision: u64,
}

impl Planner {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn from_store(store: SlotStore) -> Self {
        Self { store, revision: 0 }
    }

    /// Loads a persisted snapshot. All slots come back stable.
    pub fn from_slots(slots: impl IntoIterator<Item = Slot>) -> Result<Self, KeyError> {
        Ok(Self::from_store(SlotStore::from_slots(slots)?))
    }

    pub const fn store(&self) -> &SlotStore {
        &self.store
    }

    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Every slot, for persisting.
    pub fn snapshot(&self) -> Vec<Slot> {
        self.store.snapshot()
    }

    /// The display blocks of one date.
    pub fn blocks(&self, date: NaiveDate) -> Vec<Block> {
        group_day(self.store.slots_for_date(date))
    }

    /// The block covering `key`, if any.
    pub fn block_at(&self, key: SlotKey) -> Option<Block> {
        block_at(&self.blocks(key.date), key.hour).cloned()
    }

    /// Assigns a subject and notes at `key`.
    ///
    /// Inside an existing block the whole block is rewritten (and settles to
    /// stable). On an empty hour a single entering slot is created.
    pub fn create_or_edit(
        &mut self,
        key: SlotKey,
        subject_id: &str,
        notes: Vec<NoteItem>,
    ) -> Result<Edit, PlanError> {
        let key = key.check()?;
        let subject_id = SubjectId::new(subject_id).map_err(|_| PlanError::MissingSubject)?;

        let blocks = self.blocks(key.date);
        if let Some(block) = block_at(&blocks, key.hour) {
            if block.has_exiting {
                return Err(PlanError::Exiting { key });
            }
            let keys = block.keys()?;
            let insert = keys
                .iter()
                .map(|k| Slot::new(*k, subject_id.clone(), notes.clone()))
                .collect();
            self.commit(SlotBatch {
                remove: Vec::new(),
                insert,
            })?;
            tracing::debug!(%key, slots = keys.len(), %subject_id, "edited block");
            return Ok(Edit::Group(keys));
        }

        let mut slot = Slot::new(key, subject_id, notes);
        slot.lifecycle = Lifecycle::Entering;
        self.commit(SlotBatch {
            remove: Vec::new(),
            insert: vec![slot],
        })?;
        tracing::debug!(%key, "created slot");
        Ok(Edit::Created(key))
    }

    /// Flags the block containing `key` as exiting.
    ///
    /// An empty hour yields an empty removal.
    pub fn delete_block(&mut self, key: SlotKey) -> Result<Removal, PlanError> {
        let key = key.check()?;
        let removal = match block_at(&self.blocks(key.date), key.hour) {
            Some(block) if block.has_exiting => return Err(PlanError::Exiting { key }),
            Some(block) => Removal {
                keys: block.keys()?.into_iter().collect(),
            },
            None => Removal::default(),
        };
        self.mark_exiting(&removal.keys);
        tracing::debug!(%key, slots = removal.keys.len(), "block exiting");
        Ok(removal)
    }

    /// First phase of removal. Returns how many slots were flagged.
    pub fn mark_exiting<'a>(&mut self, keys: impl IntoIterator<Item = &'a SlotKey>) -> usize {
        let marked = self.store.mark_exiting(keys);
        if marked > 0 {
            self.revision += 1;
        }
        marked
    }

    /// Second phase of removal: physically deletes the slots.
    pub fn remove_all<'a>(&mut self, keys: impl IntoIterator<Item = &'a SlotKey>) -> Vec<Slot> {
        let removed = self.store.remove_all(keys);
        if !removed.is_empty() {
            self.revision += 1;
            tracing::debug!(slots = removed.len(), revision = self.revision, "slots removed");
        }
        removed
    }

    /// Ends the entering transition of the given slots.
    pub fn settle<'a>(&mut self, keys: impl IntoIterator<Item = &'a SlotKey>) -> usize {
        let settled = self.store.settle(keys);
        if settled > 0 {
            self.revision += 1;
        }
        settled
    }

    /// Moves a block so it starts at `target_start`, keeping its duration.
    ///
    /// Only hours owned by *other* blocks collide; the block may overlap its
    /// own current footprint.
    pub fn move_block(&mut self, block: &Block, target_start: u8) -> Result<Moved, PlanError> {
        let (current, day) = self.resolve(block)?;
        let from = current.hours();
        let target_end =
            target_start
                .checked_add(current.duration())
                .ok_or(KeyError::HourOutOfRange {
                    hour: u32::from(target_start) + u32::from(current.duration()),
                })?;
        let to = target_start..target_end;
        let dest = SlotKey::span(current.date, to.clone())?;

        if to == from {
            return Ok(Moved {
                date: current.date,
                from,
                to,
            });
        }
        if let Some(key) = foreign_collision(&day, &current, &dest) {
            return Err(PlanError::Collision { key });
        }

        let source = current.keys()?;
        let insert = dest
            .iter()
            .map(|k| Slot::new(*k, current.subject_id.clone(), current.notes.clone()))
            .collect();
        self.commit(SlotBatch {
            remove: source,
            insert,
        })?;
        tracing::debug!(date = %current.date, ?from, ?to, "moved block");
        Ok(Moved {
            date: current.date,
            from,
            to,
        })
    }

    /// Changes the exclusive end hour of a block.
    ///
    /// Extending appends copies of the block's slot; shrinking flags the
    /// trailing slice exiting exactly like [`Planner::delete_block`].
    pub fn resize_block(&mut self, block: &Block, new_end: u8) -> Result<Resize, PlanError> {
        let (current, day) = self.resolve(block)?;
        if new_end <= current.start_hour || new_end == current.end_hour {
            return Ok(Resize::Unchanged);
        }

        if new_end < current.end_hour {
            let removal = Removal {
                keys: SlotKey::span(current.date, new_end..current.end_hour)?
                    .into_iter()
                    .collect(),
            };
            self.mark_exiting(&removal.keys);
            tracing::debug!(key = %current.start_key(), new_end, "block shrinking");
            return Ok(Resize::Shrinking(removal));
        }

        let added = SlotKey::span(current.date, current.end_hour..new_end)?;
        if let Some(key) = foreign_collision(&day, &current, &added) {
            return Err(PlanError::Collision { key });
        }
        let insert = added
            .iter()
            .map(|k| Slot::new(*k, current.subject_id.clone(), current.notes.clone()))
            .collect();
        self.commit(SlotBatch {
            remove: Vec::new(),
            insert,
        })?;
        tracing::debug!(key = %current.start_key(), new_end, "block extended");
        Ok(Resize::Extended { added })
    }

    /// Applies a note edit to every slot of the block and returns the new list.
    pub fn edit_notes(
        &mut self,
        block: &Block,
        edit: &NoteEdit,
    ) -> Result<Vec<NoteItem>, PlanError> {
        let (current, _) = self.resolve(block)?;
        let mut notes = current.notes.clone();
        edit.apply(&mut notes)?;

        let insert = current
            .keys()?
            .into_iter()
            .map(|k| Slot::new(k, current.subject_id.clone(), notes.clone()))
            .collect();
        self.commit(SlotBatch {
            remove: Vec::new(),
            insert,
        })?;
        tracing::debug!(key = %current.start_key(), ?edit, "notes updated");
        Ok(notes)
    }

    /// Appends a note to the block; returns the new note's ID.
    pub fn add_note(&mut self, block: &Block, text: &str) -> Result<NoteId, PlanError> {
        let notes = self.edit_notes(
            block,
            &NoteEdit::Add {
                text: text.to_string(),
            },
        )?;
        // Add always appends.
        notes
            .last()
            .map(|item| item.id.clone())
            .ok_or(PlanError::Note(NoteError::EmptyText))
    }

    pub fn edit_note(&mut self, block: &Block, id: &NoteId, text: &str) -> Result<(), PlanError> {
        self.edit_notes(
            block,
            &NoteEdit::Edit {
                id: id.clone(),
                text: text.to_string(),
            },
        )
        .map(|_| ())
    }

    /// Flips a note's completion on every slot of the block.
    pub fn toggle_note(&mut self, block: &Block, id: &NoteId) -> Result<(), PlanError> {
        self.edit_notes(block, &NoteEdit::Toggle { id: id.clone() })
            .map(|_| ())
    }

    pub fn delete_note(&mut self, block: &Block, id: &NoteId) -> Result<(), PlanError> {
        self.edit_notes(block, &NoteEdit::Delete { id: id.clone() })
            .map(|_| ())
    }

    /// Finds the live block matching `block` and the day's layout around it.
    fn resolve(&self, block: &Block) -> Result<(Block, Vec<Block>), PlanError> {
        let key = block.start_key().check()?;
        let day = self.blocks(block.date);
        let current = day
            .iter()
            .find(|b| {
                b.hours() == block.hours()
                    && b.subject_id == block.subject_id
                    && b.notes == block.notes
            })
            .cloned()
            .ok_or(PlanError::StaleBlock { key })?;
        if current.has_exiting {
            return Err(PlanError::Exiting { key });
        }
        Ok((current, day))
    }

    fn commit(&mut self, batch: SlotBatch) -> Result<(), PlanError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.store.apply(batch)?;
        self.revision += 1;
        Ok(())
    }
}

/// First key in `targets` owned by a block other than `own`.
fn foreign_collision(day: &[Block], own: &Block, targets: &[SlotKey]) -> Option<SlotKey> {
    targets
        .iter()
        .find(|key| !own.contains(key.hour) && block_at(day, key.hour).is_some())
        .copied()
}
