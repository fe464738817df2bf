//! Result cursors and row materialization.
//!
//! A [`Cursor`] owns a prepared statement. Consuming methods (`to_list`,
//! `for_each`, `first`, ...) run it once and close it; [`Cursor::rows`]
//! borrows the cursor, restarts the statement on every call and leaves
//! closing to the caller.

use std::ops::ControlFlow;

use kae_error::{KaeError, Result};
use kae_types::SqlValue;
use rusqlite::Statement;
use tracing::debug;

use crate::row::Row;

/// Forward-only result set over a prepared statement.
pub struct Cursor<'db> {
    stmt: Statement<'db>,
    columns: Vec<String>,
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("sql", &self.stmt.expanded_sql())
            .field("columns", &self.columns)
            .finish()
    }
}

impl<'db> Cursor<'db> {
    pub(crate) fn new(stmt: Statement<'db>) -> Self {
        let columns = stmt
            .column_names()
            .into_iter()
            .map(str::to_owned)
            .collect();
        Self { stmt, columns }
    }

    /// Result column names, in select order.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Number of result columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Lazily decode the result set from its first row.
    ///
    /// Each call re-executes the statement. The cursor stays open.
    pub fn rows(&mut self) -> Result<RowIter<'_>> {
        let rows = self.stmt.query([])?;
        Ok(RowIter {
            rows,
            columns: &self.columns,
        })
    }

    /// [`Cursor::rows`] paired with zero-based positions.
    pub fn rows_indexed(&mut self) -> Result<std::iter::Enumerate<RowIter<'_>>> {
        Ok(self.rows()?.enumerate())
    }

    /// Number of rows in the result set. Steps through it once.
    pub fn count(&mut self) -> Result<usize> {
        let mut rows = self.stmt.query([])?;
        let mut count = 0;
        while rows.next()?.is_some() {
            count += 1;
        }
        Ok(count)
    }

    /// Decode every row into a list and close the cursor.
    pub fn to_list(mut self) -> Result<Vec<Row>> {
        let rows = self.rows()?.collect::<Result<Vec<_>>>()?;
        self.close()?;
        Ok(rows)
    }

    /// Convert every row with `converter` and close the cursor.
    pub fn to_list_with<T, F>(mut self, mut converter: F) -> Result<Vec<T>>
    where
        F: FnMut(Row) -> T,
    {
        let mut out = Vec::new();
        for row in self.rows()? {
            out.push(converter(row?));
        }
        self.close()?;
        Ok(out)
    }

    /// Convert every row, together with its position, and close the cursor.
    pub fn to_list_indexed<T, F>(mut self, mut converter: F) -> Result<Vec<T>>
    where
        F: FnMut(usize, Row) -> T,
    {
        let mut out = Vec::new();
        for (index, row) in self.rows_indexed()? {
            out.push(converter(index, row?));
        }
        self.close()?;
        Ok(out)
    }

    /// Run `action` on every row and close the cursor.
    pub fn for_each<F>(mut self, mut action: F) -> Result<()>
    where
        F: FnMut(Row),
    {
        for row in self.rows()? {
            action(row?);
        }
        self.close()
    }

    /// Run `action` on every row with its position and close the cursor.
    pub fn for_each_indexed<F>(mut self, mut action: F) -> Result<()>
    where
        F: FnMut(usize, Row),
    {
        for (index, row) in self.rows_indexed()? {
            action(index, row?);
        }
        self.close()
    }

    /// Run `action` until it breaks or the rows run out, then close the cursor.
    pub fn try_for_each<F>(mut self, mut action: F) -> Result<()>
    where
        F: FnMut(Row) -> ControlFlow<()>,
    {
        for row in self.rows()? {
            if action(row?).is_break() {
                break;
            }
        }
        self.close()
    }

    /// First row, or `None` for an empty result. Closes the cursor.
    pub fn first_opt(mut self) -> Result<Option<Row>> {
        let first = self.rows()?.next().transpose()?;
        self.close()?;
        Ok(first)
    }

    /// First row. Fails with `CursorOutOfBounds` for an empty result.
    pub fn first(self) -> Result<Row> {
        self.first_opt()?
            .ok_or(KaeError::CursorOutOfBounds { index: 0, count: 0 })
    }

    /// First row converted. Fails like [`Cursor::first`].
    pub fn first_with<T, F>(self, converter: F) -> Result<T>
    where
        F: FnOnce(Row) -> T,
    {
        self.first().map(converter)
    }

    /// First row, or `default` for an empty result.
    pub fn first_or(self, default: Row) -> Result<Row> {
        Ok(self.first_opt()?.unwrap_or(default))
    }

    /// First row, or the lazily built default.
    pub fn first_or_else<D>(self, default: D) -> Result<Row>
    where
        D: FnOnce() -> Row,
    {
        Ok(self.first_opt()?.unwrap_or_else(default))
    }

    /// First row converted, or `default`.
    pub fn first_or_with<T, F>(self, default: T, converter: F) -> Result<T>
    where
        F: FnOnce(Row) -> T,
    {
        Ok(self.first_opt()?.map_or(default, converter))
    }

    /// First row converted, or the lazily built default.
    pub fn first_or_else_with<T, D, F>(self, default: D, converter: F) -> Result<T>
    where
        D: FnOnce() -> T,
        F: FnOnce(Row) -> T,
    {
        Ok(self.first_opt()?.map_or_else(default, converter))
    }

    /// Finalize the statement.
    pub fn close(self) -> Result<()> {
        debug!(columns = self.columns.len(), "closing cursor");
        self.stmt.finalize()?;
        Ok(())
    }
}

/// Lazy row decoder over one execution of a cursor's statement.
pub struct RowIter<'c> {
    rows: rusqlite::Rows<'c>,
    columns: &'c [String],
}

impl Iterator for RowIter<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.rows.next() {
            Ok(Some(row)) => Some(decode_row(row, self.columns)),
            Ok(None) => None,
            Err(err) => Some(Err(err.into())),
        }
    }
}

/// Decode the row at the current position by engine storage class.
pub(crate) fn decode_row(row: &rusqlite::Row<'_>, columns: &[String]) -> Result<Row> {
    let mut out = Row::with_capacity(columns.len());
    for (index, name) in columns.iter().enumerate() {
        let value = SqlValue::from(row.get_ref(index)?);
        out.insert(name.as_str(), value);
    }
    Ok(out)
}
