//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Todo list manager.
#[derive(Parser, Debug)]
#[command(
    name = "todo",
    about = "Todo list manager",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Initialize the task table of the database, dropping existing tasks.
    #[arg(long)]
    pub init: bool,

    /// Open the database file at this path (overrides settings).
    #[arg(short = 'f', long = "file-path")]
    pub file_path: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Add a task to the todo list.
    Add {
        /// Text of the new task.
        text: String,
    },
    /// Delete a task from the todo list.
    Delete {
        /// The task id to delete.
        id: i64,
    },
    /// Change the text of a task.
    Update {
        /// The task id to update.
        #[arg(short = 'i', long = "update-task-id")]
        id: i64,
        /// New text of the task.
        #[arg(short = 't', long = "update-task-text")]
        text: String,
    },
    /// Show the todo list.
    Show(ShowArgs),
    /// Mark a task as complete.
    Complete {
        /// The task id to complete.
        id: i64,
    },
}

/// Filter flags for `show`. At most one may be given.
#[derive(Args, Debug, Default, PartialEq, Eq)]
#[group(multiple = false)]
pub struct ShowArgs {
    /// Show completed tasks.
    #[arg(short = 'c', long = "complete")]
    pub complete: bool,
    /// Show incomplete tasks (the default).
    #[arg(short = 'i', long = "incomplete")]
    pub incomplete: bool,
    /// Show all tasks.
    #[arg(short = 'a', long = "all")]
    pub all: bool,
}

/// Which tasks `show` lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowFilter {
    /// Only completed tasks.
    Complete,
    /// Only incomplete tasks.
    Incomplete,
    /// Every task.
    All,
}

impl ShowArgs {
    /// Selected filter; no flag means incomplete.
    pub fn filter(&self) -> ShowFilter {
        if self.complete {
            ShowFilter::Complete
        } else if self.all {
            ShowFilter::All
        } else {
            ShowFilter::Incomplete
        }
    }
}
