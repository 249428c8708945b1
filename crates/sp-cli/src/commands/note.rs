//! Note commands: edit the checklist shared by every hour of a block.

use std::io::Write;

use anyhow::Result;
use clap::Subcommand;

use sp_core::NoteEdit;

use super::util::{SlotArgs, checkbox, find_note, range_label, require_block, short_id};
use crate::Session;

#[derive(Debug, Subcommand)]
pub enum NoteAction {
    /// Add a checklist item to the block containing the hour.
    Add {
        #[command(flatten)]
        slot: SlotArgs,
        /// Item text.
        text: String,
    },
    /// Change the text of an item.
    Edit {
        #[command(flatten)]
        slot: SlotArgs,
        /// Item ID or unique prefix.
        id: String,
        /// New text.
        text: String,
    },
    /// Flip an item between open and done.
    Toggle {
        #[command(flatten)]
        slot: SlotArgs,
        /// Item ID or unique prefix.
        id: String,
    },
    /// Remove an item.
    Delete {
        #[command(flatten)]
        slot: SlotArgs,
        /// Item ID or unique prefix.
        id: String,
    },
}

impl NoteAction {
    const fn slot(&self) -> &SlotArgs {
        match self {
            Self::Add { slot, .. }
            | Self::Edit { slot, .. }
            | Self::Toggle { slot, .. }
            | Self::Delete { slot, .. } => slot,
        }
    }
}

pub fn run<W: Write>(writer: &mut W, session: &mut Session, action: &NoteAction) -> Result<()> {
    let key = action.slot().key()?;
    let block = require_block(session.planner(), key)?;

    let edit = match action {
        NoteAction::Add { text, .. } => NoteEdit::Add { text: text.clone() },
        NoteAction::Edit { id, text, .. } => NoteEdit::Edit {
            id: find_note(&block.notes, id)?.clone(),
            text: text.clone(),
        },
        NoteAction::Toggle { id, .. } => NoteEdit::Toggle {
            id: find_note(&block.notes, id)?.clone(),
        },
        NoteAction::Delete { id, .. } => NoteEdit::Delete {
            id: find_note(&block.notes, id)?.clone(),
        },
    };

    let notes = session
        .planner_mut()
        .edit_notes(&block, &edit)
        .inspect_err(|err| tracing::warn!(%key, %err, "note edit rejected"))?;

    writeln!(
        writer,
        "Notes for {} on {}:",
        range_label(block.start_hour, block.end_hour),
        block.date
    )?;
    if notes.is_empty() {
        writeln!(writer, "  (none)")?;
    }
    for note in &notes {
        writeln!(
            writer,
            "  {} {}  {}",
            checkbox(note),
            short_id(&note.id),
            note.text
        )?;
    }
    Ok(())
}
