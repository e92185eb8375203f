//! # todo-settings
//!
//! Configuration for the todo CLI.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`TodoSettings::default()`]
//! 2. **User file**: `~/.todo/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `TODO_*` overrides (highest priority)
//!
//! Command-line flags are applied by the binary after loading.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, apply_overrides, deep_merge, load_settings, load_settings_from_path,
    settings_path,
};
pub use types::{DatabaseSettings, LogLevel, LoggingSettings, TodoSettings, todo_home};
