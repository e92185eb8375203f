//! # todo
//!
//! Command line todo list manager.
//!
//! - **[`cli`]**: `clap` argument definitions.
//! - **[`task`]**: the [`Task`] entity and its table schema.
//! - **[`commands`]**: one handler per subcommand, writing to any [`std::io::Write`].
//! - **[`time_ago`]**: elapsed-time labels for `show` output.

#![deny(unsafe_code)]

pub mod cli;
pub mod commands;
pub mod task;
pub mod time_ago;

pub use cli::{Cli, Command, ShowArgs, ShowFilter};
pub use commands::{NOT_FOUND_MESSAGE, TaskNotFound, TodoList, render};
pub use task::{TASK_SCHEMA, Task};
pub use time_ago::time_ago;
