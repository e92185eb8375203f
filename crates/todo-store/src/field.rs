//! Column declarations.

use std::fmt;

use crate::value::Value;

/// `SQLite` column types an entity may declare.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageType {
    /// `TEXT`
    Text,
    /// `INTEGER`
    Integer,
    /// `BOOLEAN` (integer affinity, 0/1)
    Boolean,
    /// `REAL`
    Real,
}

impl StorageType {
    /// Type name as written in DDL.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Integer => "INTEGER",
            Self::Boolean => "BOOLEAN",
            Self::Real => "REAL",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Default for a column left unset on a record.
#[derive(Clone)]
pub enum FieldDefault {
    /// Fixed value, cloned on each resolution.
    Value(Value),
    /// Called on each resolution, e.g. the current time.
    Producer(fn() -> Value),
}

impl FieldDefault {
    /// Compute the default value.
    pub fn produce(&self) -> Value {
        match self {
            Self::Value(v) => v.clone(),
            Self::Producer(f) => f(),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// Declaration of one column: name, storage type, default, primary-key flag.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    name: String,
    storage_type: StorageType,
    primary_key: bool,
    default: Option<FieldDefault>,
}

impl FieldDescriptor {
    /// Declare a column with no default that is not a primary key.
    pub fn new(name: impl Into<String>, storage_type: StorageType) -> Self {
        Self {
            name: name.into(),
            storage_type,
            primary_key: false,
            default: None,
        }
    }

    /// `TEXT` column.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, StorageType::Text)
    }

    /// `INTEGER` column.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, StorageType::Integer)
    }

    /// `BOOLEAN` column.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, StorageType::Boolean)
    }

    /// `REAL` column.
    pub fn real(name: impl Into<String>) -> Self {
        Self::new(name, StorageType::Real)
    }

    /// Flag this column as the table's primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Fixed default. Type compatibility is checked at registration.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(FieldDefault::Value(value.into()));
        self
    }

    /// Default computed per resolution.
    #[must_use]
    pub fn default_with(mut self, producer: fn() -> Value) -> Self {
        self.default = Some(FieldDefault::Producer(producer));
        self
    }

    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared storage type.
    pub fn storage_type(&self) -> StorageType {
        self.storage_type
    }

    /// Whether this is the primary key.
    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    /// Declared default, if any.
    pub fn default_value(&self) -> Option<&FieldDefault> {
        self.default.as_ref()
    }

    /// Column definition as it appears inside `CREATE TABLE`.
    pub fn column_def(&self) -> String {
        if self.primary_key {
            format!("{} {} PRIMARY KEY", self.name, self.storage_type)
        } else {
            format!("{} {}", self.name, self.storage_type)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let f = FieldDescriptor::integer("id");
        assert_eq!(f.name(), "id");
        assert_eq!(f.storage_type(), StorageType::Integer);
        assert!(!f.is_primary_key());
        assert!(f.default_value().is_none());
    }

    #[test]
    fn zero_default_is_not_absent() {
        let f = FieldDescriptor::integer("count").default(0);
        assert_eq!(f.default_value().unwrap().produce(), Value::Integer(0));
        let f = FieldDescriptor::boolean("done").default(false);
        assert_eq!(f.default_value().unwrap().produce(), Value::Boolean(false));
    }

    #[test]
    fn column_def_marks_primary_key() {
        assert_eq!(
            FieldDescriptor::integer("id").primary_key().column_def(),
            "id INTEGER PRIMARY KEY"
        );
        assert_eq!(FieldDescriptor::real("at").column_def(), "at REAL");
    }

    #[test]
    fn producer_runs_each_time() {
        use std::sync::atomic::{AtomicI64, Ordering};
        static CALLS: AtomicI64 = AtomicI64::new(0);
        fn next() -> Value {
            Value::Integer(CALLS.fetch_add(1, Ordering::SeqCst))
        }

        let f = FieldDescriptor::integer("seq").default_with(next);
        let d = f.default_value().unwrap();
        let a = d.produce();
        let b = d.produce();
        assert_ne!(a, b);
    }
}
