//! # todo-store
//!
//! Schema-mapped persistence on top of `SQLite`.
//!
//! An entity type declares its columns once as a [`Schema`] built from
//! [`FieldDescriptor`]s. Everything else is derived from that registry:
//!
//! - **[`sql`]**: pure functions turning a schema plus a [`Record`] snapshot
//!   (or a [`Query`]) into a [`Statement`] with positional arguments.
//! - **[`database`]**: the [`Database`] gateway owning the one live
//!   connection; executes statements and hands back a [`Cursor`].
//! - **[`hydrate`]**: turns fetched rows back into records, with `None` as
//!   the explicit "no rows" signal.
//! - **[`repo`]**: [`Repo`], the typed entity-level API used by callers.

#![deny(unsafe_code)]

pub mod database;
pub mod error;
pub mod field;
pub mod hydrate;
pub mod query;
pub mod record;
pub mod repo;
pub mod schema;
pub mod sql;
pub mod value;

pub use database::{Commit, Cursor, Database, RawRow};
pub use error::{Result, SchemaError, StoreError};
pub use field::{FieldDefault, FieldDescriptor, StorageType};
pub use hydrate::hydrate;
pub use query::{Condition, Direction, OrderBy, Query};
pub use record::Record;
pub use repo::{Model, Repo};
pub use schema::{Schema, SchemaBuilder};
pub use sql::Statement;
pub use value::Value;
