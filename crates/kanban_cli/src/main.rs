//! `kanban` command-line entry point.
//!
//! # Responsibility
//! - Open the file-backed board store and dispatch one command.
//! - Start rolling file logs when a log directory is configured.

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use kanban_core::{
    default_log_level, resolve_db_path, BoardStore, LoggingConfig, SqliteSlotStorage,
};
use log::info;
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = std::path::absolute(log_dir)
            .with_context(|| format!("invalid log directory `{}`", log_dir.display()))?;
        LoggingConfig::new(level, log_dir)
            .init()
            .context("failed to start logging")?;
    }

    let db_path = resolve_db_path(cli.db.as_deref());
    ensure_parent_dir(&db_path)?;
    let storage = SqliteSlotStorage::open(&db_path)
        .with_context(|| format!("failed to open board database `{}`", db_path.display()))?;
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        db_path.display()
    );

    let mut store = BoardStore::open(storage);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::execute(cli.command, &mut store, cli.format, &mut out)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create `{}`", parent.display())),
        _ => Ok(()),
    }
}
