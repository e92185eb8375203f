//! Sparse entity snapshots.

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::{Result, StoreError};
use crate::schema::Schema;
use crate::value::Value;

/// A sparse snapshot of one entity: any subset of the declared columns,
/// plus undeclared attributes kept aside in `extras`.
///
/// Unset declared columns stay absent until [`Record::resolve`] fills them
/// from the field default; the resolved value is then cached on the record.
/// SQL synthesis only ever walks the declared slots.
#[derive(Clone, Debug)]
pub struct Record {
    schema: &'static Schema,
    values: Vec<Option<Value>>,
    extras: BTreeMap<String, Value>,
}

impl Record {
    /// Empty record for `schema`.
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            values: vec![None; schema.fields().len()],
            extras: BTreeMap::new(),
        }
    }

    /// Builder form of [`Record::set`].
    #[must_use]
    pub fn with(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a column. Names the schema does not declare go to the extras map.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.slot(column) {
            Some(idx) => self.values[idx] = Some(value),
            None => {
                let _ = self.extras.insert(column.to_string(), value);
            }
        }
    }

    /// Current value of a declared column or extra attribute, without
    /// consulting defaults.
    pub fn get(&self, column: &str) -> Option<&Value> {
        match self.slot(column) {
            Some(idx) => self.values[idx].as_ref(),
            None => self.extras.get(column),
        }
    }

    /// Remove a column's value, declared or extra.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        match self.slot(column) {
            Some(idx) => self.values[idx].take(),
            None => self.extras.remove(column),
        }
    }

    /// Whether a declared column currently holds a value (set or resolved).
    pub fn is_set(&self, column: &str) -> bool {
        self.slot(column)
            .is_some_and(|idx| self.values[idx].is_some())
    }

    /// Undeclared attribute by name.
    pub fn extra(&self, name: &str) -> Option<&Value> {
        self.extras.get(name)
    }

    /// All undeclared attributes.
    pub fn extras(&self) -> &BTreeMap<String, Value> {
        &self.extras
    }

    /// Schema this record conforms to.
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Declared columns currently holding a value, in declaration order.
    pub fn present_columns(&self) -> impl Iterator<Item = &str> {
        self.schema
            .fields()
            .iter()
            .zip(&self.values)
            .filter(|(_, v)| v.is_some())
            .map(|(f, _)| f.name())
    }

    /// Effective value of a declared column.
    ///
    /// Returns the explicit value when present (an explicit `Null` counts).
    /// Otherwise evaluates the field default once, caches it here and
    /// returns it. Columns without a default resolve to `Null`, which is not
    /// an error: keys may be assigned by the caller's own id policy.
    pub fn resolve(&mut self, column: &str) -> Result<Value> {
        let idx = self.slot(column).ok_or_else(|| StoreError::UnknownColumn {
            table: self.schema.table().to_string(),
            column: column.to_string(),
        })?;
        Ok(self.resolve_slot(idx))
    }

    /// Effective value of the primary key.
    pub fn resolve_key(&mut self) -> Value {
        self.resolve_slot(self.schema.key_index())
    }

    fn resolve_slot(&mut self, idx: usize) -> Value {
        if let Some(v) = &self.values[idx] {
            return v.clone();
        }
        let schema = self.schema;
        let field = &schema.fields()[idx];
        match field.default_value() {
            Some(default) => {
                let value = default.produce();
                trace!(table = schema.table(), column = field.name(), "default resolved");
                self.values[idx] = Some(value.clone());
                value
            }
            None => Value::Null,
        }
    }

    fn slot(&self, column: &str) -> Option<usize> {
        self.schema
            .fields()
            .iter()
            .position(|f| f.name() == column)
    }
}

/// Records are equal when they belong to the same table and hold the same
/// declared values. Extras are ignored.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.table() == other.schema.table() && self.values == other.values
    }
}
