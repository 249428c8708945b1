//! Hour slots and their checklist notes.

use serde::{Deserialize, Serialize};

use crate::key::SlotKey;
use crate::types::{NoteId, SubjectId};

/// One checklist item attached to a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteItem {
    pub id: NoteId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl NoteItem {
    /// Creates an open item with a fresh ID.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: NoteId::generate(),
            text: text.into(),
            completed: false,
        }
    }
}

/// Transition state of a slot.
///
/// Only drives the enter/exit transitions of a renderer; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    #[default]
    Stable,
    /// Freshly created; cleared by the first edit or by [`crate::Planner::settle`].
    Entering,
    /// Flagged for removal; physically removed by a later `remove_all`.
    Exiting,
}

impl Lifecycle {
    pub const fn is_exiting(self) -> bool {
        matches!(self, Self::Exiting)
    }
}

/// One hour of one day assigned to a subject.
///
/// The serialized form is the interchange format shared with existing
/// snapshots: `{"id": "YYYY-MM-DD-HH", "subjectId": .., "memo": [..]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    #[serde(rename = "id")]
    pub key: SlotKey,
    pub subject_id: SubjectId,
    #[serde(rename = "memo", default)]
    pub notes: Vec<NoteItem>,
    #[serde(skip)]
    pub lifecycle: Lifecycle,
}

impl Slot {
    /// Creates a stable slot.
    pub fn new(key: SlotKey, subject_id: SubjectId, notes: Vec<NoteItem>) -> Self {
        Self {
            key,
            subject_id,
            notes,
            lifecycle: Lifecycle::Stable,
        }
    }

    /// Copies subject and notes onto another key, as a stable slot.
    pub fn clone_to(&self, key: SlotKey) -> Self {
        Self::new(key, self.subject_id.clone(), self.notes.clone())
    }

    /// Whether two slots may belong to the same block.
    ///
    /// Adjacency is checked by the caller; this compares content and lifecycle.
    pub fn same_session(&self, other: &Self) -> bool {
        self.subject_id == other.subject_id
            && self.notes == other.notes
            && self.lifecycle.is_exiting() == other.lifecycle.is_exiting()
    }
}
