//! Error types for the store.
//!
//! [`SchemaError`] is raised while an entity type is being registered, before
//! any SQL exists. [`StoreError`] covers everything after that, with engine
//! failures carried through untouched in [`StoreError::Statement`].

use thiserror::Error;

use crate::field::StorageType;

/// Definition-time errors for an entity schema.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    /// No field was flagged as primary key.
    #[error("primary key not found in table {table}")]
    NoPrimaryKey {
        /// Table being registered.
        table: String,
    },

    /// More than one field was flagged as primary key.
    #[error("primary key should only be one in table {table}: {columns:?}")]
    DuplicatePrimaryKey {
        /// Table being registered.
        table: String,
        /// Every column flagged as primary key.
        columns: Vec<String>,
    },

    /// The same column name was declared twice.
    #[error("column {column} declared twice in table {table}")]
    DuplicateColumn {
        /// Table being registered.
        table: String,
        /// Repeated column name.
        column: String,
    },

    /// The table name was empty.
    #[error("table name must not be empty")]
    EmptyTable,

    /// A constant default does not fit the column's storage type.
    #[error("default for {column} does not match storage type {expected}")]
    DefaultTypeMismatch {
        /// Column with the bad default.
        column: String,
        /// Declared storage type.
        expected: StorageType,
    },
}

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Invalid schema declaration.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Failure surfaced by `SQLite`: malformed SQL, constraint violation,
    /// missing table, type mismatch.
    #[error("statement error: {0}")]
    Statement(#[from] rusqlite::Error),

    /// A condition, ordering or resolution named a column the table does not declare.
    #[error("unknown column {column} for table {table}")]
    UnknownColumn {
        /// Table the column was looked up in.
        table: String,
        /// Offending column name.
        column: String,
    },

    /// An ordering clause could not be parsed.
    #[error("invalid order clause: {0}")]
    InvalidOrder(String),

    /// A fetched row did not fit the schema.
    #[error("corrupt row in {table}.{column}: {detail}")]
    CorruptRow {
        /// Table the row came from.
        table: String,
        /// Column that failed to convert.
        column: String,
        /// What went wrong.
        detail: String,
    },

    /// No row exists for the given primary key.
    #[error("record not found: {table} {key}")]
    NotFound {
        /// Table that was searched.
        table: String,
        /// Primary key value, rendered for display.
        key: String,
    },

    /// Filesystem error while preparing the database location.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
