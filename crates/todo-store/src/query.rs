//! Filter, ordering and size options for `find_all`.

use std::fmt;

use crate::error::{Result, StoreError};
use crate::schema::Schema;
use crate::value::Value;

/// Equality filters joined with `AND`.
///
/// Kept as an insertion-ordered list so the synthesized `WHERE` clause and
/// its bound arguments always come out in the order the caller wrote them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Condition {
    terms: Vec<(String, Value)>,
}

impl Condition {
    /// No filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column = value`. Setting a column twice replaces the earlier
    /// value in place, keeping its original position.
    #[must_use]
    pub fn and(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.terms.iter_mut().find(|(c, _)| *c == column) {
            Some(term) => term.1 = value,
            None => self.terms.push((column, value)),
        }
        self
    }

    /// Terms in insertion order.
    pub fn terms(&self) -> &[(String, Value)] {
        &self.terms
    }

    /// Whether there are no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Condition {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |cond, (k, v)| cond.and(k, v))
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Ascending (the SQL default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    /// Keyword as written in SQL.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// `ORDER BY <column> <direction>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderBy {
    /// Column to sort on.
    pub column: String,
    /// Sort direction.
    pub direction: Direction,
}

impl OrderBy {
    /// Ascending order on `column`.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Asc,
        }
    }

    /// Descending order on `column`.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: Direction::Desc,
        }
    }

    /// Parse a raw clause such as `"id desc"`. The direction is optional
    /// and case-insensitive.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split_whitespace();
        let column = parts
            .next()
            .ok_or_else(|| StoreError::InvalidOrder(raw.to_string()))?;
        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => Direction::Asc,
            Some("desc") => Direction::Desc,
            Some(_) => return Err(StoreError::InvalidOrder(raw.to_string())),
        };
        if parts.next().is_some() {
            return Err(StoreError::InvalidOrder(raw.to_string()));
        }
        Ok(Self {
            column: column.to_string(),
            direction,
        })
    }

    /// Fail with [`StoreError::UnknownColumn`] if `schema` lacks the column.
    pub fn check(&self, schema: &Schema) -> Result<()> {
        if schema.contains(&self.column) {
            Ok(())
        } else {
            Err(StoreError::UnknownColumn {
                table: schema.table().to_string(),
                column: self.column.clone(),
            })
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.column, self.direction.as_sql())
    }
}

/// Options for `find_all`: filter, ordering, and a row cap applied at fetch time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    /// `AND`ed equality filters.
    pub condition: Condition,
    /// Optional ordering.
    pub order_by: Option<OrderBy>,
    /// Maximum number of rows to fetch.
    pub size: Option<usize>,
}

impl Query {
    /// Every row, unordered.
    pub fn all() -> Self {
        Self::default()
    }

    /// Rows matching `condition`.
    pub fn filter(condition: Condition) -> Self {
        Self {
            condition,
            ..Self::default()
        }
    }

    /// Set the ordering.
    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = Some(order);
        self
    }

    /// Cap the number of fetched rows.
    #[must_use]
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn condition_keeps_insertion_order() {
        let cond = Condition::new().and("b", 1).and("a", 2).and("c", 3);
        let cols: Vec<&str> = cond.terms().iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(cols, ["b", "a", "c"]);
    }

    #[test]
    fn condition_repeat_replaces_in_place() {
        let cond = Condition::new().and("a", 1).and("b", 2).and("a", 3);
        assert_eq!(cond.len(), 2);
        assert_eq!(cond.terms()[0], ("a".to_string(), Value::Integer(3)));
    }

    #[test]
    fn condition_from_iter() {
        let cond: Condition = [("x", true), ("y", false)].into_iter().collect();
        assert_eq!(cond.terms()[1].0, "y");
    }

    #[test]
    fn parse_order_clauses() {
        assert_eq!(OrderBy::parse("id desc").unwrap(), OrderBy::desc("id"));
        assert_eq!(OrderBy::parse("id ASC").unwrap(), OrderBy::asc("id"));
        assert_eq!(OrderBy::parse("  id  ").unwrap(), OrderBy::asc("id"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(OrderBy::parse(""), Err(StoreError::InvalidOrder(_))));
        assert!(matches!(
            OrderBy::parse("id sideways"),
            Err(StoreError::InvalidOrder(_))
        ));
        assert!(matches!(
            OrderBy::parse("id desc; DROP TABLE task"),
            Err(StoreError::InvalidOrder(_))
        ));
    }

    #[test]
    fn order_display() {
        assert_eq!(OrderBy::desc("id").to_string(), "id DESC");
    }

    #[test]
    fn query_builder() {
        let q = Query::all().order_by(OrderBy::desc("id")).size(1);
        assert!(q.condition.is_empty());
        assert_eq!(q.size, Some(1));
    }
}
