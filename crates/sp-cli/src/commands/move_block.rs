//! Move command: shift a block to a new start hour on the same date.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use super::util::{SlotArgs, parse_start_hour, range_label, require_block};
use crate::Session;

#[derive(Debug, Args)]
pub struct MoveArgs {
    #[command(flatten)]
    pub slot: SlotArgs,

    /// New start hour.
    #[arg(long)]
    pub to: String,
}

pub fn run<W: Write>(writer: &mut W, session: &mut Session, args: &MoveArgs) -> Result<()> {
    let key = args.slot.key()?;
    let target = parse_start_hour(&args.to)?;
    let block = require_block(session.planner(), key)?;

    let moved = session
        .planner_mut()
        .move_block(&block, target)
        .inspect_err(|err| tracing::warn!(%key, to = target, %err, "move rejected"))?;

    if moved.from == moved.to {
        writeln!(
            writer,
            "Block already at {}",
            range_label(moved.to.start, moved.to.end)
        )?;
        return Ok(());
    }
    writeln!(
        writer,
        "Moved {} to {} on {}",
        range_label(moved.from.start, moved.from.end),
        range_label(moved.to.start, moved.to.end),
        moved.date
    )?;
    Ok(())
}
