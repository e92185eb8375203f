//! Scalar cell values and their `SQLite` conversions.

use std::fmt;

use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};

use crate::field::StorageType;

/// One column value of a record.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// No value. Binds as SQL `NULL`.
    Null,
    /// `TEXT` value.
    Text(String),
    /// `INTEGER` value.
    Integer(i64),
    /// `BOOLEAN` value, stored by `SQLite` as 0/1.
    Boolean(bool),
    /// `REAL` value.
    Real(f64),
}

impl Value {
    /// Storage type this value naturally belongs to, `None` for `Null`.
    pub fn storage_type(&self) -> Option<StorageType> {
        match self {
            Self::Null => None,
            Self::Text(_) => Some(StorageType::Text),
            Self::Integer(_) => Some(StorageType::Integer),
            Self::Boolean(_) => Some(StorageType::Boolean),
            Self::Real(_) => Some(StorageType::Real),
        }
    }

    /// Whether this value may be stored in a column of type `ty`.
    /// `Null` fits every column.
    pub fn fits(&self, ty: StorageType) -> bool {
        self.storage_type().is_none_or(|own| own == ty)
    }

    /// `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an integer value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Real content. Integers widen to `f64`.
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Real(r) => Some(*r),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Convert a fetched cell using the declared column type.
    ///
    /// `SQLite` has no boolean storage class and may hand back an integer for
    /// a `REAL` column, so the declared type decides the final variant.
    /// Returns a description of the mismatch on failure.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_sql(raw: SqlValue, ty: StorageType) -> Result<Self, String> {
        match (raw, ty) {
            (SqlValue::Null, _) => Ok(Self::Null),
            (SqlValue::Text(s), StorageType::Text) => Ok(Self::Text(s)),
            (SqlValue::Integer(n), StorageType::Integer) => Ok(Self::Integer(n)),
            (SqlValue::Integer(n), StorageType::Boolean) => Ok(Self::Boolean(n != 0)),
            (SqlValue::Integer(n), StorageType::Real) => Ok(Self::Real(n as f64)),
            (SqlValue::Real(r), StorageType::Real) => Ok(Self::Real(r)),
            (SqlValue::Text(s), StorageType::Integer) => s
                .parse()
                .map(Self::Integer)
                .map_err(|_| format!("text {s:?} in INTEGER column")),
            (other, ty) => Err(format!("{:?} cell in {ty} column", other.data_type())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Real(r) => write!(f, "{r}"),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(SqlValue::Null),
            Self::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Self::Integer(n) => ToSqlOutput::Owned(SqlValue::Integer(*n)),
            Self::Boolean(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Self::Real(r) => ToSqlOutput::Owned(SqlValue::Real(*r)),
        })
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Integer(i64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Self::Real(r)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}
