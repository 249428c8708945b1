//! To-do commands: the per-day checklist kept beside the hour grid.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Subcommand};

use sp_core::{NoteEdit, NoteItem, TodoBook};

use super::util::{checkbox, find_note, short_id, today};
use crate::Session;

#[derive(Debug, Clone, Args)]
pub struct DateArgs {
    /// Date of the list (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
pub enum TodoAction {
    /// Show the list.
    List {
        #[command(flatten)]
        day: DateArgs,
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Add an item.
    Add {
        #[command(flatten)]
        day: DateArgs,
        /// Item text.
        text: String,
    },
    /// Change the text of an item.
    Edit {
        #[command(flatten)]
        day: DateArgs,
        /// Item ID or unique prefix.
        id: String,
        /// New text.
        text: String,
    },
    /// Flip an item between open and done.
    Toggle {
        #[command(flatten)]
        day: DateArgs,
        /// Item ID or unique prefix.
        id: String,
    },
    /// Remove an item.
    Delete {
        #[command(flatten)]
        day: DateArgs,
        /// Item ID or unique prefix.
        id: String,
    },
}

impl TodoAction {
    fn date(&self) -> NaiveDate {
        let (Self::List { day, .. }
        | Self::Add { day, .. }
        | Self::Edit { day, .. }
        | Self::Toggle { day, .. }
        | Self::Delete { day, .. }) = self;
        day.date.unwrap_or_else(today)
    }
}

pub fn run<W: Write>(writer: &mut W, session: &mut Session, action: &TodoAction) -> Result<()> {
    let date = action.date();
    let mut book = TodoBook::new();
    book.set_items(date, session.db().load_todos(date)?);

    let edit = match action {
        TodoAction::List { json, .. } => {
            if *json {
                writeln!(writer, "{}", serde_json::to_string_pretty(book.items(date))?)?;
                return Ok(());
            }
            return write_list(writer, date, book.items(date));
        }
        TodoAction::Add { text, .. } => NoteEdit::Add { text: text.clone() },
        TodoAction::Edit { id, text, .. } => NoteEdit::Edit {
            id: find_note(book.items(date), id)?.clone(),
            text: text.clone(),
        },
        TodoAction::Toggle { id, .. } => NoteEdit::Toggle {
            id: find_note(book.items(date), id)?.clone(),
        },
        TodoAction::Delete { id, .. } => NoteEdit::Delete {
            id: find_note(book.items(date), id)?.clone(),
        },
    };

    let items = book
        .apply(date, &edit)
        .inspect_err(|err| tracing::warn!(%date, %err, "to-do edit rejected"))?;
    session.db_mut().save_todos(date, items)?;
    tracing::debug!(%date, items = items.len(), "saved to-do list");
    write_list(writer, date, items)
}

fn write_list<W: Write>(writer: &mut W, date: NaiveDate, items: &[NoteItem]) -> Result<()> {
    writeln!(writer, "To-do for {date}:")?;
    if items.is_empty() {
        writeln!(writer, "  (none)")?;
    }
    for item in items {
        writeln!(
            writer,
            "  {} {}  {}",
            checkbox(item),
            short_id(&item.id),
            item.text
        )?;
    }
    Ok(())
}
