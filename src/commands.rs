//! Subcommand handlers.
//!
//! Handlers write user-facing messages to the given writer and leave
//! diagnostics to `tracing`.

use std::io::Write;

use anyhow::{Context, Result};
use thiserror::Error;
use todo_store::{Condition, Database, Query, Record, Repo, StoreError};
use tracing::{debug, info};

use crate::cli::{Command, ShowFilter};
use crate::task::{Task, epoch_seconds};
use crate::time_ago::time_ago;

/// Message printed when a command names a task id that does not exist.
pub const NOT_FOUND_MESSAGE: &str = "This id of task not exist.";

/// A command referred to a missing task.
#[derive(Debug, Error)]
#[error("{}", NOT_FOUND_MESSAGE)]
pub struct TaskNotFound {
    /// The id that was asked for.
    pub id: i64,
}

/// The todo list stored in one database.
pub struct TodoList {
    tasks: Repo<Task>,
}

impl TodoList {
    /// Todo list over `db`.
    pub fn new(db: Database) -> Self {
        Self {
            tasks: Repo::new(db),
        }
    }

    /// Task repository.
    pub fn tasks(&self) -> &Repo<Task> {
        &self.tasks
    }

    /// Create the task table if missing.
    pub fn prepare(&self) -> Result<()> {
        self.tasks
            .create_table()
            .context("Failed to create task table")
    }

    /// Run one subcommand.
    pub fn run(&self, command: &Command, out: &mut impl Write) -> Result<()> {
        debug!(?command, "dispatch");
        match command {
            Command::Add { text } => self.add(text, out),
            Command::Delete { id } => self.delete(*id, out),
            Command::Update { id, text } => self.update(*id, text, out),
            Command::Complete { id } => self.complete(*id, out),
            Command::Show(args) => self.show(args.filter(), out),
        }
    }

    /// Drop every task and recreate the table.
    pub fn initialize(&self, out: &mut impl Write) -> Result<()> {
        // a fresh file has no table to drop yet
        self.prepare()?;
        self.tasks.drop_table().context("Failed to drop task table")?;
        self.prepare()?;
        info!("task table reinitialized");
        writeln!(out, "Todo list initialized successfully.")?;
        Ok(())
    }

    /// Insert a task with the next free id, then list incomplete tasks.
    pub fn add(&self, text: &str, out: &mut impl Write) -> Result<()> {
        let id = self.tasks.next_id().context("Failed to allocate task id")?;
        let _ = self
            .tasks
            .insert(&mut Task::draft(id, text))
            .context("Failed to insert task")?;
        info!(id, "task added");
        writeln!(out, "Task has been added successfully.")?;
        self.show(ShowFilter::Incomplete, out)
    }

    /// Remove a task.
    pub fn delete(&self, id: i64, out: &mut impl Write) -> Result<()> {
        self.guard(id)?;
        let _ = self
            .tasks
            .delete_key(id)
            .context("Failed to delete task")?;
        info!(id, "task deleted");
        writeln!(out, "Task {id} is deleted successfully.")?;
        Ok(())
    }

    /// Replace a task's text.
    pub fn update(&self, id: i64, text: &str, out: &mut impl Write) -> Result<()> {
        self.guard(id)?;
        let mut patch = Task::patch(id, "text", text, epoch_seconds());
        self.apply(id, &mut patch)?;
        info!(id, "task text updated");
        writeln!(out, "The text of task {id} has changed to \"{text}\".")?;
        Ok(())
    }

    /// Mark a task as done.
    pub fn complete(&self, id: i64, out: &mut impl Write) -> Result<()> {
        self.guard(id)?;
        let mut patch = Task::patch(id, "is_completed", true, epoch_seconds());
        self.apply(id, &mut patch)?;
        info!(id, "task completed");
        writeln!(out, "Task {id} complete.")?;
        Ok(())
    }

    /// List tasks matching `filter`, one per line.
    pub fn show(&self, filter: ShowFilter, out: &mut impl Write) -> Result<()> {
        let query = match filter {
            ShowFilter::Complete => Query::filter(Condition::new().and("is_completed", true)),
            ShowFilter::Incomplete => Query::filter(Condition::new().and("is_completed", false)),
            ShowFilter::All => Query::all(),
        };
        let tasks = self.tasks.find_all(&query).context("Failed to load tasks")?;
        let Some(tasks) = tasks else {
            writeln!(out, "No task exist.")?;
            return Ok(());
        };
        let now = epoch_seconds();
        for task in &tasks {
            writeln!(out, "{}", render(task, now))?;
        }
        Ok(())
    }

    fn apply(&self, id: i64, patch: &mut Record) -> Result<()> {
        let changed = self.tasks.update(patch).context("Failed to update task")?;
        if changed == 0 {
            return Err(TaskNotFound { id }.into());
        }
        Ok(())
    }

    fn guard(&self, id: i64) -> Result<()> {
        match self.tasks.ensure_exists(id) {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound { .. }) => Err(TaskNotFound { id }.into()),
            Err(err) => Err(anyhow::Error::new(err).context("Failed to look up task")),
        }
    }
}

/// `<id> | <text> (Created At: <ago>, Updated At: <ago or empty>)`.
pub fn render(task: &Task, now: f64) -> String {
    let updated = if task.was_updated() {
        time_ago(task.updated_at, now)
    } else {
        String::new()
    };
    format!(
        "{} | {} (Created At: {}, Updated At: {updated})",
        task.id,
        task.text,
        time_ago(task.created_at, now)
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
