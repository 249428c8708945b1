//! Checklist operations over a note list.
//!
//! These work on a single list. Block-wide fan-out is the planner's job: it
//! computes the new list once and writes it to every member slot.

use thiserror::Error;

use crate::slot::NoteItem;
use crate::types::NoteId;

/// Errors from note list operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NoteError {
    /// The note text was blank after trimming.
    #[error("note text cannot be empty")]
    EmptyText,

    /// No note with this ID exists in the list.
    #[error("note not found: {0}")]
    NotFound(NoteId),
}

/// Appends an open note with a fresh ID and returns that ID.
pub fn add_note(notes: &mut Vec<NoteItem>, text: &str) -> Result<NoteId, NoteError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(NoteError::EmptyText);
    }
    let item = NoteItem::new(text);
    let id = item.id.clone();
    notes.push(item);
    Ok(id)
}

/// Replaces the text of a note.
pub fn edit_note(notes: &mut [NoteItem], id: &NoteId, text: &str) -> Result<(), NoteError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(NoteError::EmptyText);
    }
    find_mut(notes, id)?.text = text.to_string();
    Ok(())
}

/// Flips the completion flag of a note and returns the new value.
pub fn toggle_note(notes: &mut [NoteItem], id: &NoteId) -> Result<bool, NoteError> {
    let item = find_mut(notes, id)?;
    item.completed = !item.completed;
    Ok(item.completed)
}

/// Removes a note, returning it.
pub fn delete_note(notes: &mut Vec<NoteItem>, id: &NoteId) -> Result<NoteItem, NoteError> {
    let index = notes
        .iter()
        .position(|item| &item.id == id)
        .ok_or_else(|| NoteError::NotFound(id.clone()))?;
    Ok(notes.remove(index))
}

fn find_mut<'a>(notes: &'a mut [NoteItem], id: &NoteId) -> Result<&'a mut NoteItem, NoteError> {
    notes
        .iter_mut()
        .find(|item| &item.id == id)
        .ok_or_else(|| NoteError::NotFound(id.clone()))
}

/// A note operation, applied identically to every list it is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteEdit {
    Add { text: String },
    Edit { id: NoteId, text: String },
    Toggle { id: NoteId },
    Delete { id: NoteId },
}

impl NoteEdit {
    /// Applies the edit to `notes`.
    ///
    /// `Add` generates its ID here, so apply it once and copy the resulting
    /// list rather than applying it to several lists.
    pub fn apply(&self, notes: &mut Vec<NoteItem>) -> Result<(), NoteError> {
        match self {
            Self::Add { text } => add_note(notes, text).map(|_| ()),
            Self::Edit { id, text } => edit_note(notes, id, text),
            Self::Toggle { id } => toggle_note(notes, id).map(|_| ()),
            Self::Delete { id } => delete_note(notes, id).map(|_| ()),
        }
    }
}
