//! Log command: the free-form distraction log kept per day.

use std::io::Write;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::Subcommand;

use super::todo::DateArgs;
use super::util::today;
use crate::Session;

#[derive(Debug, Subcommand)]
pub enum LogAction {
    /// Print the log.
    Show {
        #[command(flatten)]
        day: DateArgs,
    },
    /// Replace the log with new text.
    Set {
        #[command(flatten)]
        day: DateArgs,
        /// Log text.
        text: String,
    },
    /// Add a line to the end of the log.
    Append {
        #[command(flatten)]
        day: DateArgs,
        /// Line to add.
        text: String,
    },
    /// Erase the log.
    Clear {
        #[command(flatten)]
        day: DateArgs,
    },
}

impl LogAction {
    fn date(&self) -> NaiveDate {
        let (Self::Show { day }
        | Self::Set { day, .. }
        | Self::Append { day, .. }
        | Self::Clear { day }) = self;
        day.date.unwrap_or_else(today)
    }
}

pub fn run<W: Write>(writer: &mut W, session: &mut Session, action: &LogAction) -> Result<()> {
    let date = action.date();
    let current = session.db().load_distractions(date)?;

    let text = match action {
        LogAction::Show { .. } => return write_log(writer, date, &current),
        LogAction::Set { text, .. } => text.clone(),
        LogAction::Append { text, .. } => {
            let line = text.trim();
            if line.is_empty() {
                bail!("log line cannot be empty");
            }
            if current.is_empty() {
                line.to_string()
            } else {
                format!("{}\n{line}", current.trim_end())
            }
        }
        LogAction::Clear { .. } => String::new(),
    };

    session.db_mut().save_distractions(date, &text)?;
    tracing::debug!(%date, bytes = text.len(), "saved distraction log");
    write_log(writer, date, &text)
}

fn write_log<W: Write>(writer: &mut W, date: NaiveDate, text: &str) -> Result<()> {
    writeln!(writer, "Distractions for {date}:")?;
    if text.trim().is_empty() {
        writeln!(writer, "  (none)")?;
    }
    for line in text.lines() {
        writeln!(writer, "  {line}")?;
    }
    Ok(())
}
