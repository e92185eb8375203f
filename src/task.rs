//! The task entity.

use std::sync::LazyLock;

use chrono::Utc;
use todo_store::{FieldDescriptor, Model, Record, Result, Schema, StoreError, Value};

/// Table layout for [`Task`].
///
/// `created_at` takes the current time when a new task is inserted;
/// `updated_at` stays `0.0` until the first edit.
pub static TASK_SCHEMA: LazyLock<Schema> = LazyLock::new(|| {
    Schema::builder("task")
        .field(FieldDescriptor::integer("id").primary_key())
        .field(FieldDescriptor::text("text").default(""))
        .field(FieldDescriptor::boolean("is_completed").default(false))
        .field(FieldDescriptor::real("created_at").default_with(now))
        .field(FieldDescriptor::real("updated_at").default(0.0))
        .build()
        // the layout is a literal; a failure here is a programming error
        .unwrap_or_else(|err| panic!("invalid task schema: {err}"))
});

/// Current Unix time in fractional seconds.
pub fn now() -> Value {
    Value::Real(epoch_seconds())
}

/// Current Unix time in fractional seconds, as stored in time columns.
#[allow(clippy::cast_precision_loss)]
pub fn epoch_seconds() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// One row of the `task` table.
#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    /// Primary key.
    pub id: i64,
    /// What needs doing.
    pub text: String,
    /// Whether the task is done.
    pub is_completed: bool,
    /// Creation time, Unix seconds.
    pub created_at: f64,
    /// Last edit time, Unix seconds; `0.0` if never edited.
    pub updated_at: f64,
}

impl Task {
    /// Record for a new task: only `id` and `text` are set, the rest come
    /// from column defaults on insert.
    pub fn draft(id: i64, text: &str) -> Record {
        Record::new(&TASK_SCHEMA).with("id", id).with("text", text)
    }

    /// Sparse patch touching `column` and the edit time.
    pub fn patch(id: i64, column: &str, value: impl Into<Value>, at: f64) -> Record {
        Record::new(&TASK_SCHEMA)
            .with("id", id)
            .with(column, value)
            .with("updated_at", at)
    }

    /// Whether the task has been edited since creation.
    #[allow(clippy::float_cmp)]
    pub fn was_updated(&self) -> bool {
        self.updated_at != 0.0
    }
}

impl Model for Task {
    fn schema() -> &'static Schema {
        &TASK_SCHEMA
    }

    fn from_record(record: &Record) -> Result<Self> {
        let id = record
            .get("id")
            .and_then(Value::as_i64)
            .ok_or_else(|| StoreError::CorruptRow {
                table: TASK_SCHEMA.table().to_string(),
                column: "id".to_string(),
                detail: "missing task id".to_string(),
            })?;
        Ok(Self {
            id,
            text: record
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            is_completed: record
                .get("is_completed")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            created_at: record
                .get("created_at")
                .and_then(Value::as_f64)
                .unwrap_or_default(),
            updated_at: record
                .get("updated_at")
                .and_then(Value::as_f64)
                .unwrap_or_default(),
        })
    }

    fn to_record(&self) -> Record {
        Record::new(&TASK_SCHEMA)
            .with("id", self.id)
            .with("text", self.text.as_str())
            .with("is_completed", self.is_completed)
            .with("created_at", self.created_at)
            .with("updated_at", self.updated_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_layout() {
        assert_eq!(TASK_SCHEMA.table(), "task");
        assert_eq!(TASK_SCHEMA.primary_key(), "id");
        assert_eq!(
            TASK_SCHEMA.column_names().collect::<Vec<_>>(),
            ["id", "text", "is_completed", "created_at", "updated_at"]
        );
    }

    #[test]
    fn draft_defaults() {
        let before = epoch_seconds();
        let mut draft = Task::draft(1, "write tests");
        assert!(!draft.is_set("created_at"));
        assert_eq!(draft.resolve("is_completed").unwrap(), Value::Boolean(false));
        assert_eq!(draft.resolve("updated_at").unwrap(), Value::Real(0.0));
        let created = draft.resolve("created_at").unwrap().as_f64().unwrap();
        assert!(created >= before);
    }

    #[test]
    fn creation_time_is_per_record() {
        let mut first = Task::draft(1, "a");
        let stamp = first.resolve("created_at").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let mut second = Task::draft(2, "b");
        assert_ne!(second.resolve("created_at").unwrap(), stamp);
    }

    #[test]
    fn patch_is_sparse() {
        let patch = Task::patch(4, "is_completed", true, 10.0);
        assert_eq!(
            patch.present_columns().collect::<Vec<_>>(),
            ["id", "is_completed", "updated_at"]
        );
    }

    #[test]
    fn record_round_trip() {
        let task = Task {
            id: 3,
            text: "hello".into(),
            is_completed: true,
            created_at: 1.5,
            updated_at: 0.0,
        };
        assert_eq!(Task::from_record(&task.to_record()).unwrap(), task);
        assert!(!task.was_updated());
    }

    #[test]
    fn missing_id_is_corrupt() {
        let err = Task::from_record(&Record::new(&TASK_SCHEMA)).unwrap_err();
        assert!(matches!(err, StoreError::CorruptRow { .. }));
    }
}
