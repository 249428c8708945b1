//! Set command: assign a subject to an hour, or rewrite the block around it.

use std::io::Write;

use anyhow::{Result, bail};
use clap::Args;

use sp_core::{Edit, NoteItem, SubjectCatalog, SubjectId};

use super::util::{SlotArgs, range_label};
use crate::Session;

#[derive(Debug, Args)]
pub struct SetArgs {
    #[command(flatten)]
    pub slot: SlotArgs,

    /// Subject ID to schedule.
    #[arg(long)]
    pub subject: String,

    /// Checklist item to attach (repeatable). Replaces the block's notes.
    #[arg(long = "note")]
    pub notes: Vec<String>,

    /// Drop the notes of the block being rewritten.
    #[arg(long, conflicts_with = "notes")]
    pub clear_notes: bool,
}

pub fn run<W: Write>(writer: &mut W, session: &mut Session, args: &SetArgs) -> Result<()> {
    let key = args.slot.key()?;
    let subject_id = SubjectId::new(args.subject.as_str())?;
    let Some(subject) = session.subjects().subject(&subject_id) else {
        bail!("unknown subject: {subject_id}");
    };
    let name = subject.name.clone();

    let mut notes: Vec<NoteItem> = args
        .notes
        .iter()
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .map(NoteItem::new)
        .collect();
    // Without new notes an edit keeps the block's checklist.
    if args.notes.is_empty() && !args.clear_notes {
        if let Some(block) = session.planner().block_at(key) {
            notes = block.notes;
        }
    }

    let planner = session.planner_mut();
    let edit = planner
        .create_or_edit(key, subject_id.as_str(), notes)
        .inspect_err(|err| tracing::warn!(%key, %err, "set rejected"))?;

    match edit {
        Edit::Created(key) => {
            // The CLI has no entering transition to wait for.
            planner.settle(&[key]);
            writeln!(
                writer,
                "Scheduled {name} on {} at {}",
                key.date,
                range_label(key.hour, key.hour + 1)
            )?;
        }
        Edit::Group(keys) => {
            let (Some(first), Some(last)) = (keys.first(), keys.last()) else {
                return Ok(());
            };
            writeln!(
                writer,
                "Updated {} on {} to {name}",
                range_label(first.hour, last.hour + 1),
                first.date
            )?;
        }
    }
    Ok(())
}
