//! Persistence gateway.
//!
//! [`Database`] owns the single live `SQLite` connection. Statements are
//! bound positionally, executed, and committed unless the caller asks to
//! defer. Engine failures come back unchanged as
//! [`StoreError::Statement`]; nothing here retries.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params_from_iter};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::sql::Statement;

/// One fetched row, cells in select-list order.
pub type RawRow = Vec<SqlValue>;

/// Commit behavior for a single statement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Commit {
    /// Commit immediately (`SQLite` autocommit).
    #[default]
    Auto,
    /// Leave the change pending until [`Database::commit`].
    Deferred,
}

struct Inner {
    conn: Connection,
    path: PathBuf,
}

/// Shared handle to the one open connection.
///
/// Clones share the connection. [`Database::reopen`] swaps it for every
/// clone at once, so there is never more than one live connection.
#[derive(Clone)]
pub struct Database {
    inner: Arc<Mutex<Inner>>,
}

impl Database {
    /// Open or create a database file. `file:` URIs are passed to `SQLite`
    /// as-is; for plain paths missing parent directories are created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = connect(path)?;
        info!(path = %path.display(), "database opened");
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                conn,
                path: path.to_owned(),
            })),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            inner: Arc::new(Mutex::new(Inner {
                conn,
                path: PathBuf::from(":memory:"),
            })),
        })
    }

    /// Point the gateway at a different file. The previous connection is
    /// closed once the new one is open; a failed open leaves it in place.
    pub fn reopen(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let conn = connect(path)?;
        let mut inner = self.inner.lock();
        let previous = std::mem::replace(&mut inner.conn, conn);
        inner.path = path.to_owned();
        drop(previous);
        info!(path = %path.display(), "database reopened");
        Ok(())
    }

    /// Path or URI of the current target.
    pub fn path(&self) -> PathBuf {
        self.inner.lock().path.clone()
    }

    /// Execute and commit.
    pub fn execute(&self, stmt: &Statement) -> Result<Cursor> {
        self.run(stmt, Commit::Auto, None)
    }

    /// Execute and commit, reading at most `cap` result rows.
    pub fn execute_capped(&self, stmt: &Statement, cap: usize) -> Result<Cursor> {
        self.run(stmt, Commit::Auto, Some(cap))
    }

    /// Execute with explicit commit behavior.
    ///
    /// With [`Commit::Deferred`] a transaction is opened if none is active,
    /// and the change stays pending until [`Database::commit`]. A deferred
    /// statement that fails rolls back the transaction it opened.
    /// [`Commit::Auto`] commits anything still pending once the statement
    /// succeeds.
    pub fn execute_with(&self, stmt: &Statement, commit: Commit) -> Result<Cursor> {
        self.run(stmt, commit, None)
    }

    fn run(&self, stmt: &Statement, commit: Commit, cap: Option<usize>) -> Result<Cursor> {
        let inner = self.inner.lock();
        let conn = &inner.conn;
        let opened = commit == Commit::Deferred && conn.is_autocommit();
        if opened {
            conn.execute_batch("BEGIN")?;
        }

        debug!(sql = %stmt.sql, args = stmt.args.len(), ?commit, ?cap, "execute");
        match run_statement(conn, stmt, cap) {
            Ok(cursor) => {
                if commit == Commit::Auto && !conn.is_autocommit() {
                    conn.execute_batch("COMMIT")?;
                    debug!("committed pending transaction");
                }
                Ok(cursor)
            }
            Err(err) => {
                if opened && !conn.is_autocommit() {
                    if let Err(rollback) = conn.execute_batch("ROLLBACK") {
                        warn!(error = %rollback, "rollback after failed statement");
                    }
                }
                Err(err)
            }
        }
    }

    /// Commit a pending deferred transaction. No-op when nothing is pending.
    pub fn commit(&self) -> Result<()> {
        let inner = self.inner.lock();
        if !inner.conn.is_autocommit() {
            inner.conn.execute_batch("COMMIT")?;
            debug!("committed");
        }
        Ok(())
    }

    /// Whether a deferred transaction is open.
    pub fn has_pending(&self) -> bool {
        !self.inner.lock().conn.is_autocommit()
    }
}

fn run_statement(conn: &Connection, stmt: &Statement, cap: Option<usize>) -> Result<Cursor> {
    let mut prepared = conn.prepare(&stmt.sql)?;
    let width = prepared.column_count();
    if width == 0 {
        let rows_affected = prepared.execute(params_from_iter(stmt.args.iter()))?;
        return Ok(Cursor {
            rows: VecDeque::new(),
            rows_affected,
        });
    }

    let cap = cap.unwrap_or(usize::MAX);
    let mut rows = prepared.query(params_from_iter(stmt.args.iter()))?;
    let mut fetched = VecDeque::new();
    while fetched.len() < cap {
        let Some(row) = rows.next()? else { break };
        let mut cells = Vec::with_capacity(width);
        for idx in 0..width {
            cells.push(row.get::<_, SqlValue>(idx)?);
        }
        fetched.push_back(cells);
    }
    Ok(Cursor {
        rows: fetched,
        rows_affected: 0,
    })
}

fn connect(path: &Path) -> Result<Connection> {
    let is_uri = path.to_str().is_some_and(|p| p.starts_with("file:"));
    if !is_uri {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(Connection::open(path)?)
}

/// Result handle of one statement.
///
/// Query rows are read when the statement runs (up to the cap given to
/// [`Database::execute_capped`]), so the cursor does not hold the connection.
#[derive(Debug, Default)]
pub struct Cursor {
    rows: VecDeque<RawRow>,
    rows_affected: usize,
}

impl Cursor {
    /// Rows changed by an `INSERT`/`UPDATE`/`DELETE`; 0 for queries.
    pub fn rows_affected(&self) -> usize {
        self.rows_affected
    }

    /// Next row, if any.
    pub fn fetch_one(&mut self) -> Option<RawRow> {
        self.rows.pop_front()
    }

    /// Up to `n` next rows.
    pub fn fetch_many(&mut self, n: usize) -> Vec<RawRow> {
        let n = n.min(self.rows.len());
        self.rows.drain(..n).collect()
    }

    /// Every remaining row.
    pub fn fetch_all(&mut self) -> Vec<RawRow> {
        self.rows.drain(..).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
