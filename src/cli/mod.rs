use std::env;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{ConfigLoader, CONFIG_ENV, DATA_ENV};
use crate::storage::NoteStore;

pub mod commands;

use self::commands::{CreateArgs, DeleteArgs, EditArgs, ListArgs};

#[derive(Parser, Debug)]
#[command(
    name = "notty",
    version,
    about = "Fast terminal-based notes application",
    long_about = "Fast terminal-based notes application.\n\nNotes are stored in a SQLite database in the platform data directory."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over NOTTY_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory (takes precedence over NOTTY_DATA)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the interactive shell (default)
    Tui,
    /// List notes; opens the shell when given no arguments
    #[command(visible_alias = "l")]
    List(ListArgs),
    /// Create a new note
    #[command(visible_alias = "c")]
    Create(CreateArgs),
    /// Change the title or text of a note
    #[command(visible_alias = "e")]
    Edit(EditArgs),
    /// Delete a note
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),
}

impl Commands {
    fn is_interactive(&self) -> bool {
        match self {
            Commands::Tui => true,
            Commands::List(args) => args.opens_shell(),
            _ => false,
        }
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        env::set_var(CONFIG_ENV, path);
    }
    if let Some(path) = &cli.data_dir {
        env::set_var(DATA_ENV, path);
    }

    let loader = ConfigLoader::discover()?;
    let paths = loader.paths().clone();
    paths.ensure_directories()?;

    let command = cli.command.unwrap_or(Commands::Tui);
    let log_file = command.is_interactive().then(|| paths.log_file());
    init_tracing(&cli.log_level, log_file.as_deref())
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;

    let config = Arc::new(loader.load_or_init()?);
    let store = NoteStore::open(&config.storage.database_path, &config.storage).with_context(
        || {
            format!(
                "opening note database {}",
                config.storage.database_path.display()
            )
        },
    )?;
    tracing::info!(
        database = %config.storage.database_path.display(),
        "notty starting"
    );

    let mut stdout = std::io::stdout();
    match command {
        Commands::Tui => commands::run_tui(config, store),
        Commands::List(args) if args.opens_shell() => commands::run_tui(config, store),
        Commands::List(args) => commands::finish(store, |store| {
            commands::list_notes(store, &args, &mut stdout)
        }),
        Commands::Create(args) => commands::finish(store, |store| {
            commands::create_note(store, args, &mut stdout).map(|_| ())
        }),
        Commands::Edit(args) => {
            commands::finish(store, |store| commands::edit_note(store, args, &mut stdout))
        }
        Commands::Delete(args) => commands::finish(store, |store| {
            commands::delete_note(store, &args, &mut stdout)
        }),
    }
}

/// Installs the global subscriber once. The interactive shell logs to a file
/// so output never lands on the alternate screen.
fn init_tracing(level: &str, log_file: Option<&Path>) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
        match log_file {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("opening log file {}", path.display()))?;
                fmt()
                    .with_env_filter(env_filter)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .init();
            }
            None => {
                fmt()
                    .with_env_filter(env_filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }
        Ok(())
    })
    .map(|_| ())
}
