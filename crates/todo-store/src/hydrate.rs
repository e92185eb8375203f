//! Result hydration: fetched rows back into records.

use crate::database::RawRow;
use crate::error::{Result, StoreError};
use crate::record::Record;
use crate::schema::Schema;
use crate::value::Value;

/// Zip each row with the schema's declaration-order columns.
///
/// Returns `Ok(None)` when `rows` is empty. Callers branch on "no rows"
/// separately from "some rows", so an empty `Vec` is never returned.
pub fn hydrate(rows: Vec<RawRow>, schema: &'static Schema) -> Result<Option<Vec<Record>>> {
    if rows.is_empty() {
        return Ok(None);
    }

    let width = schema.fields().len();
    rows.into_iter()
        .map(|row| {
            if row.len() != width {
                return Err(StoreError::CorruptRow {
                    table: schema.table().to_string(),
                    column: "*".to_string(),
                    detail: format!("expected {width} cells, got {}", row.len()),
                });
            }
            let mut record = Record::new(schema);
            for (field, cell) in schema.fields().iter().zip(row) {
                let value = Value::from_sql(cell, field.storage_type()).map_err(|detail| {
                    StoreError::CorruptRow {
                        table: schema.table().to_string(),
                        column: field.name().to_string(),
                        detail,
                    }
                })?;
                record.set(field.name(), value);
            }
            Ok(record)
        })
        .collect::<Result<Vec<_>>>()
        .map(Some)
}
