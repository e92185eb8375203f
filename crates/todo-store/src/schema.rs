//! Schema registry: table metadata derived once from an entity's fields.

use std::collections::HashSet;

use crate::error::SchemaError;
use crate::field::{FieldDefault, FieldDescriptor};

/// Immutable table metadata for one entity type.
///
/// `fields` keeps every declared column (primary key included) in
/// declaration order; `columns` is the same order with the primary key
/// left out.
#[derive(Clone, Debug)]
pub struct Schema {
    table: String,
    primary_key: String,
    key_index: usize,
    columns: Vec<String>,
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    /// Validate the declared fields and build the registry.
    ///
    /// Exactly one field must be flagged primary key, names must be unique,
    /// and constant defaults must fit their column type.
    pub fn register(
        table: impl Into<String>,
        fields: Vec<FieldDescriptor>,
    ) -> Result<Self, SchemaError> {
        let table = table.into();
        if table.is_empty() {
            return Err(SchemaError::EmptyTable);
        }

        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.name()) {
                return Err(SchemaError::DuplicateColumn {
                    table,
                    column: field.name().to_string(),
                });
            }
            if let Some(FieldDefault::Value(v)) = field.default_value() {
                if !v.fits(field.storage_type()) {
                    return Err(SchemaError::DefaultTypeMismatch {
                        column: field.name().to_string(),
                        expected: field.storage_type(),
                    });
                }
            }
        }

        let keys: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_primary_key())
            .map(|(i, _)| i)
            .collect();
        let key_index = match keys.as_slice() {
            [] => return Err(SchemaError::NoPrimaryKey { table }),
            [only] => *only,
            _ => {
                return Err(SchemaError::DuplicatePrimaryKey {
                    table,
                    columns: keys.iter().map(|&i| fields[i].name().to_string()).collect(),
                });
            }
        };
        let primary_key = fields[key_index].name().to_string();

        let columns = fields
            .iter()
            .filter(|f| !f.is_primary_key())
            .map(|f| f.name().to_string())
            .collect();

        Ok(Self {
            table,
            primary_key,
            key_index,
            columns,
            fields,
        })
    }

    /// Start a builder for `table`.
    pub fn builder(table: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            table: table.into(),
            fields: Vec::new(),
        }
    }

    /// Table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Primary key column name.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Non-key columns in declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// All descriptors in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Every declared column name in declaration order, key included.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldDescriptor::name)
    }

    /// Descriptor for `column`.
    pub fn field(&self, column: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == column)
    }

    /// Whether `column` is declared.
    pub fn contains(&self, column: &str) -> bool {
        self.field(column).is_some()
    }

    /// Descriptor of the primary key column.
    pub fn primary_key_field(&self) -> &FieldDescriptor {
        &self.fields[self.key_index]
    }

    pub(crate) fn key_index(&self) -> usize {
        self.key_index
    }

    /// `SELECT <every column> FROM <table>`.
    pub fn select_clause(&self) -> String {
        format!(
            "SELECT {} FROM {}",
            self.column_names().collect::<Vec<_>>().join(", "),
            self.table
        )
    }

    /// `DELETE FROM <table> WHERE <pk>=?`.
    pub fn delete_clause(&self) -> String {
        format!("DELETE FROM {} WHERE {}=?", self.table, self.primary_key)
    }
}

/// Incremental [`Schema`] declaration; validated by [`SchemaBuilder::build`].
#[derive(Debug)]
pub struct SchemaBuilder {
    table: String,
    fields: Vec<FieldDescriptor>,
}

impl SchemaBuilder {
    /// Append a column.
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Validate and produce the registry.
    pub fn build(self) -> Result<Schema, SchemaError> {
        Schema::register(self.table, self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::StorageType;

    fn user_schema() -> Schema {
        Schema::builder("user")
            .field(FieldDescriptor::integer("user_id").primary_key())
            .field(FieldDescriptor::text("user_name").default("Administrator"))
            .field(FieldDescriptor::boolean("user_auth").default(false))
            .field(FieldDescriptor::real("user_created_at"))
            .build()
            .unwrap()
    }

    #[test]
    fn registry_tracks_key_and_columns() {
        let schema = user_schema();
        assert_eq!(schema.table(), "user");
        assert_eq!(schema.primary_key(), "user_id");
        assert_eq!(
            schema.columns(),
            ["user_name", "user_auth", "user_created_at"]
        );
        assert_eq!(schema.fields().len(), 4);
        assert_eq!(
            schema.field("user_auth").unwrap().storage_type(),
            StorageType::Boolean
        );
        assert_eq!(schema.primary_key_field().name(), "user_id");
    }

    #[test]
    fn key_keeps_declaration_position() {
        let schema = Schema::builder("note")
            .field(FieldDescriptor::text("body"))
            .field(FieldDescriptor::integer("id").primary_key())
            .build()
            .unwrap();
        assert_eq!(schema.column_names().collect::<Vec<_>>(), ["body", "id"]);
        assert_eq!(schema.select_clause(), "SELECT body, id FROM note");
    }

    #[test]
    fn missing_primary_key_rejected() {
        let err = Schema::builder("t")
            .field(FieldDescriptor::text("a"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::NoPrimaryKey { table: "t".into() });
    }

    #[test]
    fn two_primary_keys_rejected() {
        let err = Schema::builder("t")
            .field(FieldDescriptor::integer("a").primary_key())
            .field(FieldDescriptor::integer("b").primary_key())
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicatePrimaryKey { ref columns, .. } if columns.len() == 2));
    }

    #[test]
    fn duplicate_column_rejected() {
        let err = Schema::builder("t")
            .field(FieldDescriptor::integer("id").primary_key())
            .field(FieldDescriptor::text("id"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn { .. }));
    }

    #[test]
    fn empty_table_rejected() {
        let err = Schema::register("", vec![FieldDescriptor::integer("id").primary_key()])
            .unwrap_err();
        assert_eq!(err, SchemaError::EmptyTable);
    }

    #[test]
    fn mismatched_default_rejected() {
        let err = Schema::builder("t")
            .field(FieldDescriptor::integer("id").primary_key())
            .field(FieldDescriptor::boolean("done").default(1))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DefaultTypeMismatch {
                column: "done".into(),
                expected: StorageType::Boolean,
            }
        );
    }

    #[test]
    fn select_and_delete_clauses() {
        let schema = user_schema();
        assert_eq!(
            schema.select_clause(),
            "SELECT user_id, user_name, user_auth, user_created_at FROM user"
        );
        assert_eq!(schema.delete_clause(), "DELETE FROM user WHERE user_id=?");
    }
}
