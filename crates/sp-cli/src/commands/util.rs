//! Shared utilities for CLI commands.

use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::Args;
use regex::Regex;

use sp_core::key::clock_label;
use sp_core::{Block, NoteId, NoteItem, Planner, SlotKey};

/// Pre-compiled regex for hour arguments: `9`, `09` or `09:00`.
static HOUR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})(?::00)?$").unwrap());

/// Characters of a note ID shown in listings.
const SHORT_ID_LEN: usize = 8;

/// An hour row on a date, as given on the command line.
#[derive(Debug, Clone, Args)]
pub struct SlotArgs {
    /// Hour (9, 09, 09:00) or a full YYYY-MM-DD-HH key.
    pub hour: String,

    /// Date of the hour (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

impl SlotArgs {
    pub fn key(&self) -> Result<SlotKey> {
        parse_slot(&self.hour, self.date)
    }
}

/// Today's local date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse an hour as a grid row. `0`/`00:00` is the midnight row (24).
pub fn parse_start_hour(s: &str) -> Result<u8> {
    let hour = parse_hour(s)?;
    Ok(if hour == 0 { 24 } else { hour })
}

/// Parse an exclusive end hour. `00:00` and `01:00` close the midnight row.
pub fn parse_end_hour(s: &str) -> Result<u8> {
    let hour = parse_hour(s)?;
    Ok(if hour <= 1 { hour + 24 } else { hour })
}

fn parse_hour(s: &str) -> Result<u8> {
    let Some(caps) = HOUR_RE.captures(s.trim()) else {
        bail!("Invalid hour: {s}. Use 9, 09 or 09:00");
    };
    caps[1].parse().context("failed to parse hour")
}

/// Parse a slot argument: either a full `YYYY-MM-DD-HH` key or an hour on
/// `date` (today when absent).
pub fn parse_slot(s: &str, date: Option<NaiveDate>) -> Result<SlotKey> {
    if s.contains('-') {
        return s
            .parse()
            .with_context(|| format!("invalid slot key: {s}"));
    }
    let hour = parse_start_hour(s)?;
    let date = date.unwrap_or_else(today);
    SlotKey::new(date, u32::from(hour)).with_context(|| format!("hour {s} is outside the grid"))
}

/// The block covering `key`, or an error naming the empty hour.
pub fn require_block(planner: &Planner, key: SlotKey) -> Result<Block> {
    planner
        .block_at(key)
        .with_context(|| format!("nothing scheduled at {key}"))
}

/// Resolve a note by a unique prefix of its ID.
pub fn find_note<'a>(notes: &'a [NoteItem], prefix: &str) -> Result<&'a NoteId> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        bail!("note ID cannot be empty");
    }
    let mut matches = notes.iter().filter(|n| n.id.as_str().starts_with(prefix));
    let Some(first) = matches.next() else {
        bail!("note not found: {prefix}");
    };
    if matches.next().is_some() {
        bail!("note ID prefix is ambiguous: {prefix}");
    }
    Ok(&first.id)
}

/// The leading characters of a note ID, enough to address it.
pub fn short_id(id: &NoteId) -> &str {
    let s = id.as_str();
    s.char_indices()
        .nth(SHORT_ID_LEN)
        .map_or(s, |(end, _)| &s[..end])
}

/// `09:00-11:00` style label for an hour range.
pub fn range_label(start: u8, end: u8) -> String {
    format!("{}-{}", clock_label(start), clock_label(end))
}

/// Checklist marker for a note.
pub const fn checkbox(item: &NoteItem) -> &'static str {
    if item.completed { "[x]" } else { "[ ]" }
}
