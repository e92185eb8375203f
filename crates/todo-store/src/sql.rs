//! SQL synthesis.
//!
//! Stateless functions from a [`Schema`] plus a [`Record`] snapshot (or a
//! [`Query`]) to a [`Statement`]: the SQL text with `?` placeholders and the
//! positional arguments to bind. Column names come only from the schema,
//! never from caller text, so every emitted identifier is a declared one.

use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::record::Record;
use crate::schema::Schema;
use crate::value::Value;

/// SQL text plus its positional arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    /// SQL with `?` placeholders.
    pub sql: String,
    /// Values bound to the placeholders, in order.
    pub args: Vec<Value>,
}

impl Statement {
    /// Statement without arguments.
    pub fn bare(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            args: Vec::new(),
        }
    }
}

/// `CREATE TABLE IF NOT EXISTS`. Safe to run when the table exists.
pub fn create_table(schema: &Schema) -> Statement {
    let defs: Vec<String> = schema.fields().iter().map(|f| f.column_def()).collect();
    Statement::bare(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        schema.table(),
        defs.join(", ")
    ))
}

/// `DROP TABLE`. Fails at execution time if the table does not exist.
pub fn drop_table(schema: &Schema) -> Statement {
    Statement::bare(format!("DROP TABLE {}", schema.table()))
}

/// `SELECT ... [WHERE c1=? AND c2=? ...] [ORDER BY ...]`.
///
/// `WHERE` terms follow the condition's insertion order. The size cap is
/// not part of the SQL; the caller applies it when fetching.
pub fn find_all(schema: &Schema, query: &Query) -> Result<Statement> {
    let mut sql = schema.select_clause();
    let mut args = Vec::with_capacity(query.condition.len());

    if !query.condition.is_empty() {
        let mut terms = Vec::with_capacity(query.condition.len());
        for (column, value) in query.condition.terms() {
            if !schema.contains(column) {
                return Err(StoreError::UnknownColumn {
                    table: schema.table().to_string(),
                    column: column.clone(),
                });
            }
            terms.push(format!("{column}=?"));
            args.push(value.clone());
        }
        sql.push_str(" WHERE ");
        sql.push_str(&terms.join(" AND "));
    }

    if let Some(order) = &query.order_by {
        order.check(schema)?;
        sql.push_str(" ORDER BY ");
        sql.push_str(&order.to_string());
    }

    Ok(Statement { sql, args })
}

/// `SELECT ... WHERE <pk> = ?`. Callers fetch at most one row.
pub fn find_by_key(schema: &Schema, key: impl Into<Value>) -> Statement {
    Statement {
        sql: format!("{} WHERE {} = ?", schema.select_clause(), schema.primary_key()),
        args: vec![key.into()],
    }
}

/// `INSERT INTO ... VALUES (...)` over every declared column, resolving
/// defaults onto the record.
pub fn insert(record: &mut Record) -> Statement {
    let schema = record.schema();
    let mut columns = Vec::with_capacity(schema.fields().len());
    let mut args = Vec::with_capacity(schema.fields().len());
    for name in schema.column_names() {
        columns.push(name);
        args.push(resolve_declared(record, name));
    }
    let placeholders = vec!["?"; columns.len()].join(", ");
    Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            schema.table(),
            columns.join(", ")
        ),
        args,
    }
}

/// `UPDATE ... SET c=?, ... WHERE <pk>=?`.
///
/// The primary key is resolved first and bound last. `SET` covers the
/// declared columns present on the snapshot, in declaration order, so
/// columns the caller never touched keep their stored values. The key is
/// always present once resolved, which keeps the clause non-empty.
pub fn update(record: &mut Record) -> Statement {
    let schema = record.schema();
    let key = record.resolve_key();

    let present: Vec<&str> = schema
        .column_names()
        .filter(|name| record.is_set(name))
        .collect();
    let mut sets = Vec::with_capacity(present.len());
    let mut args = Vec::with_capacity(present.len() + 1);
    for name in present {
        sets.push(format!("{name}=?"));
        args.push(resolve_declared(record, name));
    }
    if sets.is_empty() {
        // key had no value and no default; bind it as NULL so the
        // statement still parses and simply matches nothing
        sets.push(format!("{}=?", schema.primary_key()));
        args.push(Value::Null);
    }
    args.push(key);

    Statement {
        sql: format!(
            "UPDATE {} SET {} WHERE {}=?",
            schema.table(),
            sets.join(", "),
            schema.primary_key()
        ),
        args,
    }
}

/// `DELETE FROM ... WHERE <pk>=?` bound to the resolved key.
pub fn delete(record: &mut Record) -> Statement {
    let schema = record.schema();
    Statement {
        sql: schema.delete_clause(),
        args: vec![record.resolve_key()],
    }
}

fn resolve_declared(record: &mut Record, column: &str) -> Value {
    // column names come from the record's own schema
    record.resolve(column).unwrap_or(Value::Null)
}
