//! Day command: the blocks, to-do list and distraction log of one date.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use sp_core::{Block, NoteItem, SubjectCatalog};

use super::util::{checkbox, range_label, short_id, today};
use crate::Session;

#[derive(Debug, Args)]
pub struct DayArgs {
    /// Date to show (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BlockView<'a> {
    #[serde(flatten)]
    block: &'a Block,
    subject_name: &'a str,
    color: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DayView<'a> {
    date: NaiveDate,
    blocks: Vec<BlockView<'a>>,
    todos: &'a [NoteItem],
    distractions: &'a str,
}

pub fn run<W: Write>(writer: &mut W, session: &Session, args: &DayArgs) -> Result<()> {
    let date = args.date.unwrap_or_else(today);
    let blocks = session.planner().blocks(date);
    let todos = session.db().load_todos(date)?;
    let distractions = session.db().load_distractions(date)?;

    if args.json {
        let subjects = session.subjects();
        let view = DayView {
            date,
            blocks: blocks
                .iter()
                .map(|block| BlockView {
                    block,
                    subject_name: subjects.display_name(&block.subject_id),
                    color: subjects
                        .subject(&block.subject_id)
                        .map(|s| s.color.as_str()),
                })
                .collect(),
            todos: &todos,
            distractions: &distractions,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&view)?)?;
        return Ok(());
    }

    write_day(writer, session, date, &blocks, &todos)?;
    if !distractions.trim().is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Distractions:")?;
        for line in distractions.lines() {
            writeln!(writer, "  {line}")?;
        }
    }
    Ok(())
}

fn write_day<W: Write>(
    writer: &mut W,
    session: &Session,
    date: NaiveDate,
    blocks: &[Block],
    todos: &[NoteItem],
) -> Result<()> {
    writeln!(writer, "{}", date.format("%A %Y-%m-%d"))?;

    if blocks.is_empty() {
        writeln!(writer, "No blocks scheduled.")?;
    }
    for block in blocks {
        let marker = if block.has_exiting {
            " (removing)"
        } else if block.has_entering {
            " (new)"
        } else {
            ""
        };
        writeln!(
            writer,
            "{}  {} ({}h){marker}",
            range_label(block.start_hour, block.end_hour),
            session.subjects().display_name(&block.subject_id),
            block.duration(),
        )?;
        for note in &block.notes {
            writeln!(
                writer,
                "    {} {}  {}",
                checkbox(note),
                short_id(&note.id),
                note.text
            )?;
        }
    }

    writeln!(writer)?;
    if todos.is_empty() {
        writeln!(writer, "No to-do items.")?;
        return Ok(());
    }
    writeln!(writer, "To-do:")?;
    for item in todos {
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
