//! CLI subcommand implementations.

pub mod day;
pub mod delete;
pub mod export;
pub mod log;
pub mod move_block;
pub mod note;
pub mod resize;
pub mod set;
pub mod status;
pub mod subjects;
pub mod todo;
pub mod util;
