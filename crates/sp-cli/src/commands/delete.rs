//! Delete command: two-phase removal of the block containing an hour.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use super::util::{SlotArgs, range_label, require_block};
use crate::Session;

#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub slot: SlotArgs,
}

pub fn run<W: Write>(writer: &mut W, session: &mut Session, args: &DeleteArgs) -> Result<()> {
    let key = args.slot.key()?;
    let block = require_block(session.planner(), key)?;

    let removal = session
        .planner_mut()
        .delete_block(key)
        .inspect_err(|err| tracing::warn!(%key, %err, "delete rejected"))?;
    let removed = session.finish_removal(&removal);

    writeln!(
        writer,
        "Removed {} on {} ({removed} slots)",
        range_label(block.start_hour, block.end_hour),
        block.date
    )?;
    Ok(())
}
