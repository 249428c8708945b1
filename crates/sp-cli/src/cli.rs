//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::day::DayArgs;
use crate::commands::delete::DeleteArgs;
use crate::commands::log::LogAction;
use crate::commands::move_block::MoveArgs;
use crate::commands::note::NoteAction;
use crate::commands::resize::ResizeArgs;
use crate::commands::set::SetArgs;
use crate::commands::subjects::SubjectsAction;
use crate::commands::todo::TodoAction;

/// Hour-grid study planner.
///
/// Schedules study subjects onto the hours 08:00 to 01:00 of each day.
/// Adjacent hours with the same subject and notes form one block.
#[derive(Debug, Parser)]
#[command(name = "sp", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the blocks and to-do list of a day.
    Day(DayArgs),

    /// Schedule a subject at an hour, or rewrite the block containing it.
    Set(SetArgs),

    /// Remove the block containing an hour.
    Delete(DeleteArgs),

    /// Move a block to a new start hour.
    Move(MoveArgs),

    /// Change the end hour of a block.
    Resize(ResizeArgs),

    /// Edit the checklist of a block.
    #[command(subcommand)]
    Note(NoteAction),

    /// Manage study subjects.
    #[command(subcommand)]
    Subjects(SubjectsAction),

    /// Manage the daily to-do list.
    #[command(subcommand)]
    Todo(TodoAction),

    /// Record what broke your focus on a day.
    #[command(subcommand)]
    Log(LogAction),

    /// Export the schedule as JSON to stdout.
    Export,

    /// Replace the schedule with JSON read from stdin or a file.
    Import {
        /// Snapshot file; reads stdin when absent.
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Show database location and schedule totals.
    Status,
}
