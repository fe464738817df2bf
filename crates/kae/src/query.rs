//! Fluent `SELECT` builder.

use std::fmt;

use kae_error::Result;

use crate::condition::Condition;
use crate::cursor::Cursor;
use crate::database::Database;
use crate::row::Row;
use crate::sql::join;

/// Direction of an `ORDER BY` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    /// Keyword as written after `ORDER BY` columns.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// A `SELECT` against one table.
///
/// Builder methods consume and return the query. Execution borrows it, so
/// the same query can run any number of times.
#[derive(Debug, Clone)]
#[must_use]
pub struct Query<'db> {
    db: &'db Database,
    table: String,
    columns: Vec<String>,
    condition: Condition,
    distinct: bool,
    group_by: Vec<String>,
    having: Condition,
    order_by: Vec<String>,
    sort_order: SortOrder,
    limit: i64,
    offset: i64,
}

impl<'db> Query<'db> {
    pub(crate) fn new<S: AsRef<str>>(
        db: &'db Database,
        table: &str,
        columns: &[S],
        condition: Condition,
    ) -> Self {
        Self {
            db,
            table: table.to_owned(),
            columns: columns.iter().map(|c| c.as_ref().to_owned()).collect(),
            condition,
            distinct: false,
            group_by: Vec::new(),
            having: Condition::NoOp,
            order_by: Vec::new(),
            sort_order: SortOrder::Ascending,
            limit: -1,
            offset: -1,
        }
    }

    /// Drop duplicate result rows.
    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = distinct;
        self
    }

    /// Group rows by `columns`.
    pub fn group_by<S: AsRef<str>>(mut self, columns: &[S]) -> Self {
        self.group_by = columns.iter().map(|c| c.as_ref().to_owned()).collect();
        self
    }

    /// Filter groups by `condition`.
    pub fn having(mut self, condition: Condition) -> Self {
        self.having = condition;
        self
    }

    /// Sort rows by `columns` in `sort_order`.
    pub fn order_by<S: AsRef<str>>(mut self, columns: &[S], sort_order: SortOrder) -> Self {
        self.order_by = columns.iter().map(|c| c.as_ref().to_owned()).collect();
        self.sort_order = sort_order;
        self
    }

    /// Maximum row count. Negative means unlimited.
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }

    /// Rows to skip. Zero or negative means none.
    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Render the statement text.
    pub fn to_sql(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        if self.columns.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&join(&self.columns, ", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        if !self.condition.is_no_op() {
            sql.push_str(" WHERE ");
            self.condition.write_sql(&mut sql);
        }
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&join(&self.group_by, ","));
        }
        if !self.having.is_no_op() {
            sql.push_str(" HAVING ");
            self.having.write_sql(&mut sql);
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&join(&self.order_by, ","));
            sql.push(' ');
            sql.push_str(self.sort_order.keyword());
        }
        if let Some(limit) = self.limit_clause() {
            sql.push_str(" LIMIT ");
            sql.push_str(&limit);
        }
        sql
    }

    /// `[offset,]limit`, or `None` when neither bound applies.
    fn limit_clause(&self) -> Option<String> {
        if self.limit < 0 && self.offset <= 0 {
            return None;
        }
        // A negative limit with an offset still needs a count.
        let limit = if self.limit < 0 { i64::MAX } else { self.limit };
        if self.offset > 0 {
            Some(format!("{},{limit}", self.offset))
        } else {
            Some(limit.to_string())
        }
    }

    /// Prepare the statement and return a cursor over its rows.
    pub fn as_cursor(&self) -> Result<Cursor<'db>> {
        self.db.raw_query(&self.to_sql())
    }

    /// Run the query and decode every row.
    pub fn to_list(&self) -> Result<Vec<Row>> {
        self.as_cursor()?.to_list()
    }

    /// Run the query and convert every row.
    pub fn to_list_with<T, F>(&self, converter: F) -> Result<Vec<T>>
    where
        F: FnMut(Row) -> T,
    {
        self.as_cursor()?.to_list_with(converter)
    }

    /// Run the query and convert every row with its position.
    pub fn to_list_indexed<T, F>(&self, converter: F) -> Result<Vec<T>>
    where
        F: FnMut(usize, Row) -> T,
    {
        self.as_cursor()?.to_list_indexed(converter)
    }

    /// Run the query and call `action` on every row.
    pub fn for_each<F>(&self, action: F) -> Result<()>
    where
        F: FnMut(Row),
    {
        self.as_cursor()?.for_each(action)
    }

    /// Run the query and call `action` on every row with its position.
    pub fn for_each_indexed<F>(&self, action: F) -> Result<()>
    where
        F: FnMut(usize, Row),
    {
        self.as_cursor()?.for_each_indexed(action)
    }

    /// First row. Fails with `CursorOutOfBounds` when the query matches nothing.
    pub fn first(&self) -> Result<Row> {
        self.as_cursor()?.first()
    }

    /// First row converted. Fails like [`Query::first`].
    pub fn first_with<T, F>(&self, converter: F) -> Result<T>
    where
        F: FnOnce(Row) -> T,
    {
        self.as_cursor()?.first_with(converter)
    }

    /// First row, or `default` when the query matches nothing.
    pub fn first_or(&self, default: Row) -> Result<Row> {
        self.as_cursor()?.first_or(default)
    }

    /// First row, or the lazily built default.
    pub fn first_or_else<D>(&self, default: D) -> Result<Row>
    where
        D: FnOnce() -> Row,
    {
        self.as_cursor()?.first_or_else(default)
    }

    /// First row converted, or `default`.
    pub fn first_or_with<T, F>(&self, default: T, converter: F) -> Result<T>
    where
        F: FnOnce(Row) -> T,
    {
        self.as_cursor()?.first_or_with(default, converter)
    }

    /// First row converted, or the lazily built default.
    pub fn first_or_else_with<T, D, F>(&self, default: D, converter: F) -> Result<T>
    where
        D: FnOnce() -> T,
        F: FnOnce(Row) -> T,
    {
        self.as_cursor()?.first_or_else_with(default, converter)
    }
}

impl fmt::Display for Query<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
