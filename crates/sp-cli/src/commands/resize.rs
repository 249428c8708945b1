//! Resize command: move the end hour of a block.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use sp_core::Resize;

use super::util::{SlotArgs, parse_end_hour, range_label, require_block};
use crate::Session;

#[derive(Debug, Args)]
pub struct ResizeArgs {
    #[command(flatten)]
    pub slot: SlotArgs,

    /// New exclusive end hour.
    #[arg(long)]
    pub until: String,
}

pub fn run<W: Write>(writer: &mut W, session: &mut Session, args: &ResizeArgs) -> Result<()> {
    let key = args.slot.key()?;
    let new_end = parse_end_hour(&args.until)?;
    let block = require_block(session.planner(), key)?;

    let resize = session
        .planner_mut()
        .resize_block(&block, new_end)
        .inspect_err(|err| tracing::warn!(%key, new_end, %err, "resize rejected"))?;

    match resize {
        Resize::Unchanged => writeln!(
            writer,
            "Block unchanged at {}",
            range_label(block.start_hour, block.end_hour)
        )?,
        Resize::Extended { added } => writeln!(
            writer,
            "Extended {} to {} (+{} slots)",
            range_label(block.start_hour, block.end_hour),
            range_label(block.start_hour, new_end),
            added.len()
        )?,
        Resize::Shrinking(removal) => {
            let removed = session.finish_removal(&removal);
            writeln!(
                writer,
                "Shortened {} to {} (-{removed} slots)",
                range_label(block.start_hour, block.end_hour),
                range_label(block.start_hour, new_end)
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use sp_core::{PlanError, SlotKey};

    use insta::assert_snapshot;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn key(hour: u32) -> SlotKey {
        SlotKey::new(date(), hour).unwrap()
    }

    fn args(hour: &str, until: &str) -> ResizeArgs {
        ResizeArgs {
            slot: SlotArgs {
                hour: hour.to_string(),
                date: Some(date()),
            },
            until: until.to_string(),
        }
    }

    fn session_with(blocks: &[(u32, u32, &str)]) -> Session {
        let mut session = Session::in_memory();
        let planner = session.planner_mut();
        for &(start, end, subject) in blocks {
            for hour in start..end {
                planner.create_or_edit(key(hour), subject, Vec::new()).unwrap();
            }
        }
        session
    }

    fn resize(session: &mut Session, hour: &str, until: &str) -> Result<String> {
        let mut output = Vec::new();
        run(&mut output, session, &args(hour, until))?;
        Ok(String::from_utf8(output).unwrap())
    }

    fn spans(session: &Session) -> Vec<(u8, u8)> {
        session
            .planner()
            .blocks(date())
            .iter()
            .map(|b| (b.start_hour, b.end_hour))
            .collect()
    }

    #[test]
    fn resize_extends_block() {
        let mut session = session_with(&[(9, 10, "1")]);
        let output = resize(&mut session, "9", "12").unwrap();

        assert_snapshot!(output, @"Extended 09:00-10:00 to 09:00-12:00 (+2 slots)");
        assert_eq!(spans(&session), vec![(9, 12)]);
    }

    #[test]
    fn resize_shrinks_and_removes_tail() {
        let mut session = session_with(&[(9, 12, "1")]);
        let output = resize(&mut session, "11", "10").unwrap();

        assert_snapshot!(output, @"Shortened 09:00-12:00 to 09:00-10:00 (-2 slots)");
        assert_eq!(spans(&session), vec![(9, 10)]);
    }

    #[test]
    fn resize_to_start_is_unchanged() {
        let mut session = session_with(&[(9, 11, "1")]);
        let output = resize(&mut session, "9", "9").unwrap();

        assert_snapshot!(output, @"Block unchanged at 09:00-11:00");
        assert_eq!(spans(&session), vec![(9, 11)]);
    }

    #[test]
    fn resize_into_other_block_is_rejected() {
        let mut session = session_with(&[(9, 10, "1"), (11, 12, "2")]);
        let err = resize(&mut session, "9", "12").unwrap_err();

        assert_eq!(
            err.downcast_ref::<PlanError>(),
            Some(&PlanError::Collision { key: key(11) })
        );
        assert_eq!(spans(&session), vec![(9, 10), (11, 12)]);
    }

    #[test]
    fn resize_to_midnight_row_end() {
        let mut session = session_with(&[(23, 24, "1")]);
        let output = resize(&mut session, "23", "01:00").unwrap();

        assert_snapshot!(output, @"Extended 23:00-00:00 to 23:00-01:00 (+1 slots)");
        assert_eq!(spans(&session), vec![(23, 25)]);
    }
}
