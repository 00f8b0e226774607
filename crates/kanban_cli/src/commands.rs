//! Executes parsed commands against a board store.

use crate::cli::{
    BulkCommand, BulkTargets, ColumnCommand, Command, OutputFormat, ShowArgs, TaskCommand,
};
use anyhow::{anyhow, bail, Result};
use kanban_core::store::selectors;
use kanban_core::{
    BoardState, BoardStore, Clock, ColumnId, ColumnPatch, ColumnSummary, Outcome, SlotStorage,
    Task, TaskFilter, TaskId, TaskPatch,
};
use serde::Serialize;
use std::io::Write;
use uuid::Uuid;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ColumnOutput {
    id: ColumnId,
    title: String,
    order: usize,
    tasks: Vec<Task>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryOutput {
    column_id: ColumnId,
    title: String,
    total: usize,
    completed: usize,
}

#[derive(Serialize)]
struct ActionOutput {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Uuid>,
}

/// Runs `command`, writing its output to `out`.
pub fn execute<S, C, W>(
    command: Command,
    store: &mut BoardStore<S, C>,
    format: OutputFormat,
    out: &mut W,
) -> Result<()>
where
    S: SlotStorage,
    C: Clock,
    W: Write,
{
    match command {
        Command::Show(args) => show(store.state(), &args, format, out),
        Command::Summary => summary(store.state(), format, out),
        Command::Column(command) => {
            let outcome = column(store, command)?;
            report(outcome, format, out)
        }
        Command::Task(command) => {
            let outcome = task(store, command)?;
            report(outcome, format, out)
        }
        Command::Bulk(command) => {
            let outcome = bulk(store, command)?;
            report(outcome, format, out)
        }
        Command::Seed => {
            seed_sample_board(store)?;
            summary(store.state(), format, out)
        }
        Command::Reset => {
            let outcome = store.reset_board()?;
            report(outcome, format, out)
        }
    }
}

fn column<S: SlotStorage, C: Clock>(
    store: &mut BoardStore<S, C>,
    command: ColumnCommand,
) -> Result<Outcome> {
    let outcome = match command {
        ColumnCommand::Add { title } => store
            .add_column(title.trim())
            .map_or(Outcome::Unchanged, Outcome::Created),
        ColumnCommand::Rename { column, title } => {
            let id = resolve_column(store.state(), &column)?;
            store.update_column(id, ColumnPatch::title(title.trim()))?
        }
        ColumnCommand::Delete { column } => {
            let id = resolve_column(store.state(), &column)?;
            store.delete_column(id)?
        }
        ColumnCommand::Move { from, to } => store.reorder_columns(from, to)?,
    };
    Ok(outcome)
}

fn task<S: SlotStorage, C: Clock>(
    store: &mut BoardStore<S, C>,
    command: TaskCommand,
) -> Result<Outcome> {
    let outcome = match command {
        TaskCommand::Add {
            column,
            title,
            description,
        } => {
            let column_id = resolve_column(store.state(), &column)?;
            store
                .add_task(title.trim(), description, column_id)
                .map_or(Outcome::Unchanged, Outcome::Created)
        }
        TaskCommand::Edit(args) => {
            let id = resolve_task(store.state(), &args.task)?;
            let patch = TaskPatch {
                title: args.title,
                description: if args.clear_description {
                    Some(None)
                } else {
                    args.description.map(Some)
                },
                completed: args.completed,
            };
            if patch.is_empty() {
                bail!("nothing to edit; pass --title, --description, --clear-description or --completed");
            }
            store.update_task(id, patch)?
        }
        TaskCommand::Delete { task } => {
            let id = resolve_task(store.state(), &task)?;
            store.delete_task(id)?
        }
        TaskCommand::Toggle { task } => {
            let id = resolve_task(store.state(), &task)?;
            store.toggle_task_completed(id)?
        }
        TaskCommand::Move {
            task,
            column,
            index,
        } => {
            let id = resolve_task(store.state(), &task)?;
            let column_id = resolve_column(store.state(), &column)?;
            store.move_task(id, column_id, index)?
        }
    };
    Ok(outcome)
}

fn bulk<S: SlotStorage, C: Clock>(
    store: &mut BoardStore<S, C>,
    command: BulkCommand,
) -> Result<Outcome> {
    let outcome = match command {
        BulkCommand::Delete(targets) => {
            let ids = select_targets(store, &targets)?;
            store.bulk_delete_tasks(ids)?
        }
        BulkCommand::Move { to, targets } => {
            let dest = resolve_column(store.state(), &to)?;
            let ids = select_targets(store, &targets)?;
            store.bulk_move_tasks(ids, dest)?
        }
        BulkCommand::Complete { undo, targets } => {
            let ids = select_targets(store, &targets)?;
            store.bulk_toggle_tasks_completed(ids, !undo)?
        }
    };
    Ok(outcome)
}

/// Builds the selection for a bulk command and returns it in request order.
fn select_targets<S: SlotStorage, C: Clock>(
    store: &mut BoardStore<S, C>,
    targets: &BulkTargets,
) -> Result<Vec<TaskId>> {
    store.deselect_all_tasks()?;
    match &targets.column {
        Some(column) => {
            let column_id = resolve_column(store.state(), column)?;
            store.select_all_tasks_in_column(column_id)?;
            Ok(selectors::tasks_by_column(store.state(), column_id)
                .into_iter()
                .map(|task| task.id)
                .filter(|id| store.state().selected_task_ids().contains(id))
                .collect())
        }
        None => {
            if targets.tasks.is_empty() {
                bail!("no tasks given; list task ids or pass --column");
            }
            let mut ids = Vec::with_capacity(targets.tasks.len());
            for raw in &targets.tasks {
                let id = resolve_task(store.state(), raw)?;
                store.select_task(id)?;
                ids.push(id);
            }
            Ok(ids)
        }
    }
}

/// Adds the three-column sample board.
pub fn seed_sample_board<S: SlotStorage, C: Clock>(store: &mut BoardStore<S, C>) -> Result<()> {
    let samples: [(&str, &[(&str, &str)]); 3] = [
        (
            "To Do",
            &[
                ("Learn Redux Toolkit", "Cover the basics and RTK Query"),
                ("Build components", "Board, column and card views"),
            ],
        ),
        (
            "In Progress",
            &[("Configure TypeScript", "Strict compiler settings")],
        ),
        ("Done", &[("Create project", "Initial repository layout")]),
    ];

    for (column_title, tasks) in samples {
        let column_id = store
            .add_column(column_title)
            .ok_or_else(|| anyhow!("failed to add column `{column_title}`"))?;
        for (title, description) in tasks {
            store
                .add_task(*title, Some((*description).to_string()), column_id)
                .ok_or_else(|| anyhow!("failed to add task to `{column_title}`"))?;
        }
    }
    Ok(())
}

/// Resolves a full column id or a unique prefix of one.
fn resolve_column(state: &BoardState, raw: &str) -> Result<ColumnId> {
    resolve_id(raw, "column", state.columns().iter().map(|column| column.id))
}

fn resolve_task(state: &BoardState, raw: &str) -> Result<TaskId> {
    resolve_id(raw, "task", state.tasks().iter().map(|task| task.id))
}

fn resolve_id(raw: &str, kind: &str, candidates: impl Iterator<Item = Uuid>) -> Result<Uuid> {
    let needle = raw.trim().to_ascii_lowercase();
    if needle.is_empty() {
        bail!("empty {kind} id");
    }
    if let Ok(id) = Uuid::parse_str(&needle) {
        return Ok(id);
    }
    let matches: Vec<Uuid> = candidates
        .filter(|id| id.to_string().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [id] => Ok(*id),
        [] => bail!("no {kind} matches `{needle}`"),
        _ => bail!("{kind} id prefix `{needle}` is ambiguous ({} matches)", matches.len()),
    }
}

fn show<W: Write>(
    state: &BoardState,
    args: &ShowArgs,
    format: OutputFormat,
    out: &mut W,
) -> Result<()> {
    let filter = TaskFilter::new(args.status.into(), args.query.clone());
    let only = args
        .column
        .as_deref()
        .map(|raw| resolve_column(state, raw))
        .transpose()?;

    let columns: Vec<ColumnOutput> = selectors::columns(state)
        .into_iter()
        .filter(|column| only.map_or(true, |id| id == column.id))
        .map(|column| ColumnOutput {
            tasks: selectors::filter_tasks_in_column(state, column.id, &filter),
            id: column.id,
            title: column.title,
            order: column.order,
        })
        .collect();

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, &columns)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            if columns.is_empty() {
                writeln!(out, "Board is empty")?;
            }
            for column in &columns {
                writeln!(out, "{} [{}]", column.title, short_id(column.id))?;
                for task in &column.tasks {
                    let mark = if task.completed { "x" } else { " " };
                    writeln!(out, "  [{mark}] {} ({})", task.title, short_id(task.id))?;
                }
            }
        }
    }
    Ok(())
}

fn summary<W: Write>(state: &BoardState, format: OutputFormat, out: &mut W) -> Result<()> {
    let rows: Vec<ColumnSummary> = selectors::board_summary(state);
    match format {
        OutputFormat::Json => {
            let rows: Vec<SummaryOutput> = rows
                .into_iter()
                .map(|row| SummaryOutput {
                    column_id: row.column_id,
                    title: row.title,
                    total: row.total,
                    completed: row.completed,
                })
                .collect();
            serde_json::to_writer_pretty(&mut *out, &rows)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            for row in rows {
                writeln!(
                    out,
                    "{:<20} {}/{} done  [{}]",
                    row.title,
                    row.completed,
                    row.total,
                    short_id(row.column_id)
                )?;
            }
        }
    }
    Ok(())
}

fn report<W: Write>(outcome: Outcome, format: OutputFormat, out: &mut W) -> Result<()> {
    let label = match outcome {
        Outcome::Created(_) => "created",
        Outcome::Changed | Outcome::Transient => "changed",
        Outcome::Reset => "reset",
        Outcome::Unchanged => "unchanged",
    };
    match format {
        OutputFormat::Json => {
            let output = ActionOutput {
                outcome: label,
                id: outcome.created_id(),
            };
            serde_json::to_writer(&mut *out, &output)?;
            writeln!(out)?;
        }
        OutputFormat::Text => match outcome.created_id() {
            Some(id) => writeln!(out, "{label} {id}")?,
            None => writeln!(out, "{label}")?,
        },
    }
    Ok(())
}

fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

#[cfg(test)]
mod tests {
    use super::{execute, resolve_id, seed_sample_board};
    use crate::cli::{Cli, OutputFormat};
    use clap::Parser;
    use kanban_core::store::selectors;
    use kanban_core::{BoardStore, MemoryStorage};
    use uuid::Uuid;

    fn run(store: &mut BoardStore<MemoryStorage>, args: &[&str]) -> String {
        let cli = Cli::parse_from(std::iter::once("kanban").chain(args.iter().copied()));
        let mut out = Vec::new();
        execute(cli.command, store, cli.format, &mut out).expect("command succeeds");
        String::from_utf8(out).expect("utf-8 output")
    }

    #[test]
    fn prefix_resolution_requires_unique_match() {
        let a = Uuid::parse_str("aaaa1111-0000-4000-8000-000000000000").expect("uuid");
        let b = Uuid::parse_str("aaaa2222-0000-4000-8000-000000000000").expect("uuid");

        assert_eq!(resolve_id("AAAA1", "task", [a, b].into_iter()).expect("unique"), a);
        assert!(resolve_id("aaaa", "task", [a, b].into_iter()).is_err());
        assert!(resolve_id("ffff", "task", [a, b].into_iter()).is_err());
    }

    #[test]
    fn seed_builds_three_columns() {
        let mut store = BoardStore::open(MemoryStorage::new());
        seed_sample_board(&mut store).expect("seed");

        let summary = selectors::board_summary(store.state());
        let totals: Vec<(String, usize)> = summary
            .into_iter()
            .map(|row| (row.title, row.total))
            .collect();
        assert_eq!(
            totals,
            vec![
                ("To Do".to_string(), 2),
                ("In Progress".to_string(), 1),
                ("Done".to_string(), 1),
            ]
        );
    }

    #[test]
    fn column_bulk_complete_marks_every_task() {
        let mut store = BoardStore::open(MemoryStorage::new());
        seed_sample_board(&mut store).expect("seed");
        let todo = selectors::columns(store.state())[0].id.to_string();

        run(&mut store, &["bulk", "complete", "--column", &todo]);

        let summary = selectors::board_summary(store.state());
        assert_eq!(summary[0].completed, 2);
        assert_eq!(summary[1].completed, 0);
    }

    #[test]
    fn task_commands_accept_prefixes() {
        let mut store = BoardStore::open(MemoryStorage::new());
        let created = run(&mut store, &["column", "add", "Backlog"]);
        let column_id = created
            .trim()
            .strip_prefix("created ")
            .expect("created output")
            .to_string();

        run(&mut store, &["task", "add", &column_id[..8], "Write tests"]);
        let task_id = store.state().tasks()[0].id.to_string();
        run(&mut store, &["task", "toggle", &task_id[..8]]);

        assert!(store.state().tasks()[0].completed);
        let shown = run(&mut store, &["show", "--status", "completed"]);
        assert!(shown.contains("[x] Write tests"));
    }

    #[test]
    fn json_show_lists_tasks_per_column() {
        let mut store = BoardStore::open(MemoryStorage::new());
        seed_sample_board(&mut store).expect("seed");

        let output = run(&mut store, &["--format", "json", "show", "--query", "typescript"]);
        let value: serde_json::Value = serde_json::from_str(&output).expect("json output");
        let columns = value.as_array().expect("array of columns");
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[1]["tasks"][0]["title"], "Configure TypeScript");
        assert_eq!(columns[0]["tasks"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn reset_reports_outcome() {
        let mut store = BoardStore::open(MemoryStorage::new());
        seed_sample_board(&mut store).expect("seed");

        let output = run(&mut store, &["--format", "json", "reset"]);
        assert_eq!(output.trim(), r#"{"outcome":"reset"}"#);
        assert!(store.state().columns().is_empty());
        assert_eq!(OutputFormat::default(), OutputFormat::Text);
    }
}
