//! Typed entity-level operations.

use std::marker::PhantomData;

use tracing::{debug, instrument};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::hydrate::hydrate;
use crate::query::{OrderBy, Query};
use crate::record::Record;
use crate::schema::Schema;
use crate::sql;
use crate::value::Value;

/// An entity type mapped to one table.
pub trait Model: Sized {
    /// The entity's registry, built once.
    fn schema() -> &'static Schema;

    /// Build the typed entity from a hydrated record.
    fn from_record(record: &Record) -> Result<Self>;

    /// Snapshot every field into a record.
    fn to_record(&self) -> Record;
}

/// CRUD for one [`Model`] over a shared [`Database`].
pub struct Repo<M> {
    db: Database,
    marker: PhantomData<fn() -> M>,
}

impl<M: Model> Repo<M> {
    /// Repository over `db`.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            marker: PhantomData,
        }
    }

    /// Underlying gateway.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Create the table if missing.
    #[instrument(skip(self), fields(table = M::schema().table()))]
    pub fn create_table(&self) -> Result<()> {
        let _ = self.db.execute(&sql::create_table(M::schema()))?;
        Ok(())
    }

    /// Drop the table. Errors if it does not exist.
    #[instrument(skip(self), fields(table = M::schema().table()))]
    pub fn drop_table(&self) -> Result<()> {
        let _ = self.db.execute(&sql::drop_table(M::schema()))?;
        Ok(())
    }

    /// Rows matching `query`; `None` when nothing matches.
    #[instrument(skip(self, query), fields(table = M::schema().table()))]
    pub fn find_all(&self, query: &Query) -> Result<Option<Vec<M>>> {
        self.find_all_records(query)?
            .map(|records| records.iter().map(M::from_record).collect())
            .transpose()
    }

    /// Untyped form of [`Repo::find_all`].
    pub fn find_all_records(&self, query: &Query) -> Result<Option<Vec<Record>>> {
        let stmt = sql::find_all(M::schema(), query)?;
        let rows = match query.size {
            Some(n) => self.db.execute_capped(&stmt, n)?.fetch_many(n),
            None => self.db.execute(&stmt)?.fetch_all(),
        };
        debug!(rows = rows.len(), "find_all");
        hydrate(rows, M::schema())
    }

    /// Row with the given primary key.
    #[instrument(skip(self, key), fields(table = M::schema().table()))]
    pub fn find(&self, key: impl Into<Value>) -> Result<Option<M>> {
        self.find_record(key)?
            .as_ref()
            .map(M::from_record)
            .transpose()
    }

    /// Untyped form of [`Repo::find`].
    pub fn find_record(&self, key: impl Into<Value>) -> Result<Option<Record>> {
        let rows = self
            .db
            .execute_capped(&sql::find_by_key(M::schema(), key), 1)?
            .fetch_many(1);
        Ok(hydrate(rows, M::schema())?.and_then(|mut records| records.pop()))
    }

    /// Insert every declared column. Returns the row count.
    #[instrument(skip_all, fields(table = M::schema().table()))]
    pub fn insert(&self, record: &mut Record) -> Result<usize> {
        Ok(self.db.execute(&sql::insert(record))?.rows_affected())
    }

    /// Insert a typed entity.
    pub fn save(&self, entity: &M) -> Result<usize> {
        self.insert(&mut entity.to_record())
    }

    /// Update the columns present on `record`, matched by its key.
    /// Returns 0 when no row has that key.
    #[instrument(skip_all, fields(table = M::schema().table()))]
    pub fn update(&self, record: &mut Record) -> Result<usize> {
        Ok(self.db.execute(&sql::update(record))?.rows_affected())
    }

    /// Delete by the record's key. Returns 0 when no row has that key.
    #[instrument(skip_all, fields(table = M::schema().table()))]
    pub fn delete(&self, record: &mut Record) -> Result<usize> {
        Ok(self.db.execute(&sql::delete(record))?.rows_affected())
    }

    /// Delete by key value.
    pub fn delete_key(&self, key: impl Into<Value>) -> Result<usize> {
        let mut record = Record::new(M::schema());
        record.set(M::schema().primary_key(), key);
        self.delete(&mut record)
    }

    /// Whether a row with `key` exists.
    pub fn exists(&self, key: impl Into<Value>) -> Result<bool> {
        Ok(self.find_record(key)?.is_some())
    }

    /// Guard for mutating operations: [`StoreError::NotFound`] when no row
    /// has `key`.
    pub fn ensure_exists(&self, key: impl Into<Value>) -> Result<()> {
        let key = key.into();
        if self.exists(key.clone())? {
            Ok(())
        } else {
            Err(StoreError::NotFound {
                table: M::schema().table().to_string(),
                key: key.to_string(),
            })
        }
    }

    /// Highest integer key plus one, or 1 for an empty table.
    pub fn next_id(&self) -> Result<i64> {
        let schema = M::schema();
        let query = Query::all()
            .order_by(OrderBy::desc(schema.primary_key()))
            .size(1);
        let top = self
            .find_all_records(&query)?
            .and_then(|records| records.into_iter().next())
            .and_then(|r| r.get(schema.primary_key()).and_then(Value::as_i64));
        Ok(top.map_or(1, |id| id + 1))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use super::*;
    use crate::field::FieldDescriptor;
    use crate::query::Condition;

    static USER: LazyLock<Schema> = LazyLock::new(|| {
        Schema::builder("user")
            .field(FieldDescriptor::integer("user_id").primary_key())
            .field(FieldDescriptor::text("user_name").default("Administrator"))
            .field(FieldDescriptor::boolean("user_auth").default(false))
            .build()
            .unwrap()
    });

    #[derive(Debug, PartialEq)]
    struct User {
        id: i64,
        name: String,
        auth: bool,
    }

    impl Model for User {
        fn schema() -> &'static Schema {
            &USER
        }

        fn from_record(record: &Record) -> Result<Self> {
            Ok(Self {
                id: record.get("user_id").and_then(Value::as_i64).unwrap_or_default(),
                name: record
                    .get("user_name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                auth: record.get("user_auth").and_then(Value::as_bool).unwrap_or_default(),
            })
        }

        fn to_record(&self) -> Record {
            Record::new(&USER)
                .with("user_id", self.id)
                .with("user_name", self.name.as_str())
                .with("user_auth", self.auth)
        }
    }

    fn repo() -> Repo<User> {
        let repo = Repo::new(Database::in_memory().unwrap());
        repo.create_table().unwrap();
        repo
    }

    #[test]
    fn defaults_fill_unset_columns() {
        let repo = repo();
        let _ = repo.insert(&mut Record::new(&USER).with("user_id", 1)).unwrap();
        let user = repo.find(1).unwrap().unwrap();
        assert_eq!(user.name, "Administrator");
        assert!(!user.auth);
    }

    #[test]
    fn sparse_update_keeps_other_columns() {
        let repo = repo();
        let alice = User {
            id: 1234,
            name: "Alice wonderland".into(),
            auth: true,
        };
        assert_eq!(repo.save(&alice).unwrap(), 1);

        let mut patch = Record::new(&USER)
            .with("user_id", 1234)
            .with("user_name", "New Alice wonderland");
        assert_eq!(repo.update(&mut patch).unwrap(), 1);

        let found = repo.find(1234).unwrap().unwrap();
        assert_eq!(found.name, "New Alice wonderland");
        assert!(found.auth);
    }

    #[test]
    fn missing_key_affects_zero_rows() {
        let repo = repo();
        let mut ghost = Record::new(&USER).with("user_id", 1111).with("user_name", "Alice");
        assert_eq!(repo.update(&mut ghost).unwrap(), 0);
        assert_eq!(repo.delete_key(1111).unwrap(), 0);
        assert!(repo.find(1111).unwrap().is_none());
    }

    #[test]
    fn ensure_exists_guards() {
        let repo = repo();
        let err = repo.ensure_exists(5).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref key, .. } if key == "5"));
        let _ = repo.insert(&mut Record::new(&USER).with("user_id", 5)).unwrap();
        repo.ensure_exists(5).unwrap();
    }

    #[test]
    fn next_id_counts_up() {
        let repo = repo();
        assert_eq!(repo.next_id().unwrap(), 1);
        let _ = repo.insert(&mut Record::new(&USER).with("user_id", 7)).unwrap();
        assert_eq!(repo.next_id().unwrap(), 8);
    }

    #[test]
    fn find_all_filters_and_orders() {
        let repo = repo();
        for (id, auth) in [(1, true), (2, false), (3, true)] {
            let _ = repo
                .insert(&mut Record::new(&USER).with("user_id", id).with("user_auth", auth))
                .unwrap();
        }
        let authed = repo
            .find_all(&Query::filter(Condition::new().and("user_auth", true)).order_by(OrderBy::desc("user_id")))
            .unwrap()
            .unwrap();
        assert_eq!(authed.iter().map(|u| u.id).collect::<Vec<_>>(), [3, 1]);
        assert!(repo
            .find_all(&Query::filter(Condition::new().and("user_id", 99)))
            .unwrap()
            .is_none());
    }

    #[test]
    fn drop_missing_table_fails() {
        let repo: Repo<User> = Repo::new(Database::in_memory().unwrap());
        assert!(matches!(repo.drop_table(), Err(StoreError::Statement(_))));
    }
}
