//! Study planner CLI library.
//!
//! This crate provides the `sp` command-line interface over the hour-grid
//! engine in `sp-core` and the storage in `sp-db`.

mod cli;
pub mod commands;
mod config;
mod session;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use session::Session;
