use std::fs::File;
use std::io::{BufReader, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sp_cli::commands::{
    day, delete, export, log, move_block, note, resize, set, status, subjects, todo,
};
use sp_cli::{Cli, Commands, Config, Session};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");
    let mut session = Session::open(&config)?;

    let mut stdout = std::io::stdout().lock();
    match command {
        Commands::Day(args) => day::run(&mut stdout, &session, args)?,
        Commands::Set(args) => set::run(&mut stdout, &mut session, args)?,
        Commands::Delete(args) => delete::run(&mut stdout, &mut session, args)?,
        Commands::Move(args) => move_block::run(&mut stdout, &mut session, args)?,
        Commands::Resize(args) => resize::run(&mut stdout, &mut session, args)?,
        Commands::Note(action) => note::run(&mut stdout, &mut session, action)?,
        Commands::Subjects(action) => subjects::run(&mut stdout, &mut session, action)?,
        Commands::Todo(action) => todo::run(&mut stdout, &mut session, action)?,
        Commands::Log(action) => log::run(&mut stdout, &mut session, action)?,
        Commands::Export => export::run(&mut stdout, &session)?,
        Commands::Import { file } => match file {
            Some(path) => {
                let reader = File::open(path)
                    .with_context(|| format!("failed to open {}", path.display()))?;
                export::import(BufReader::new(reader), &mut stdout, &mut session)?;
            }
            None => export::import(std::io::stdin().lock(), &mut stdout, &mut session)?,
        },
        Commands::Status => status::run(&mut stdout, &session, &config.database_path)?,
    }

    session.save()?;
    stdout.flush()?;
    Ok(())
}
