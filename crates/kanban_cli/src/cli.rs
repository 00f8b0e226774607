//! Command-line surface of the `kanban` binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use kanban_core::StatusFilter;
use std::path::PathBuf;

/// Kanban board on a local SQLite file.
#[derive(Debug, Parser)]
#[command(name = "kanban")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Board database file.
    #[arg(long, env = "KANBAN_DB_PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Directory for rolling log files. Logging is off when unset.
    #[arg(long, env = "KANBAN_LOG_DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, env = "KANBAN_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print columns and their tasks.
    Show(ShowArgs),
    /// Print per-column task counters.
    Summary,
    /// Column operations.
    #[command(subcommand)]
    Column(ColumnCommand),
    /// Task operations.
    #[command(subcommand)]
    Task(TaskCommand),
    /// Operations over many tasks at once.
    #[command(subcommand)]
    Bulk(BulkCommand),
    /// Add the sample "To Do / In Progress / Done" board.
    Seed,
    /// Delete every column and task.
    Reset,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Completion filter.
    #[arg(long, value_enum, default_value_t = StatusArg::All)]
    pub status: StatusArg,

    /// Case-insensitive search over title and description.
    #[arg(long, short = 'q', default_value = "")]
    pub query: String,

    /// Restrict output to one column (id or unique id prefix).
    #[arg(long)]
    pub column: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    All,
    Completed,
    Incomplete,
}

impl From<StatusArg> for StatusFilter {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::All => Self::All,
            StatusArg::Completed => Self::Completed,
            StatusArg::Incomplete => Self::Incomplete,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ColumnCommand {
    /// Append a column.
    Add { title: String },
    /// Change a column title.
    Rename { column: String, title: String },
    /// Delete a column and all of its tasks.
    Delete { column: String },
    /// Move the column at position FROM to position TO.
    Move { from: usize, to: usize },
}

#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Append a task to a column.
    Add {
        column: String,
        title: String,
        #[arg(long, short = 'd')]
        description: Option<String>,
    },
    /// Patch task fields.
    Edit(EditTaskArgs),
    Delete {
        task: String,
    },
    /// Flip the completed flag.
    Toggle {
        task: String,
    },
    /// Move a task to INDEX within COLUMN.
    Move {
        task: String,
        column: String,
        index: usize,
    },
}

#[derive(Debug, Args)]
pub struct EditTaskArgs {
    pub task: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, conflicts_with = "clear_description")]
    pub description: Option<String>,

    #[arg(long)]
    pub clear_description: bool,

    #[arg(long)]
    pub completed: Option<bool>,
}

#[derive(Debug, Subcommand)]
pub enum BulkCommand {
    /// Delete the listed tasks, or every task of `--column`.
    Delete(BulkTargets),
    /// Move tasks to the end of a column, in the order given.
    Move {
        #[arg(long)]
        to: String,
        #[command(flatten)]
        targets: BulkTargets,
    },
    /// Mark tasks completed, or incomplete with `--undo`.
    Complete {
        #[arg(long)]
        undo: bool,
        #[command(flatten)]
        targets: BulkTargets,
    },
}

/// Tasks addressed by a bulk command.
#[derive(Debug, Args)]
pub struct BulkTargets {
    /// Task ids or unique id prefixes.
    pub tasks: Vec<String>,

    /// Target every task of this column instead.
    #[arg(long, conflicts_with = "tasks")]
    pub column: Option<String>,
}
