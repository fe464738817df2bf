//! Column/value maps for `insert` and `update`.

use kae_types::SqlValue;

use crate::row::{Row, upsert};

/// Ordered column-to-value map. Putting an existing column replaces its
/// value and keeps its position, so bound parameters follow first-put order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentValues {
    values: Vec<(String, SqlValue)>,
}

impl ContentValues {
    /// An empty map.
    pub const fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// Set `column` to `value`.
    pub fn put(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        upsert(&mut self.values, column.into(), value.into());
        self
    }

    /// Set `column` to NULL.
    pub fn put_null(&mut self, column: impl Into<String>) -> &mut Self {
        self.put(column, SqlValue::Null)
    }

    /// Value of `column`, if it was put.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.values
            .iter()
            .find(|(existing, _)| existing == column)
            .map(|(_, value)| value)
    }

    /// Drop `column`, returning its value.
    pub fn remove(&mut self, column: &str) -> Option<SqlValue> {
        let position = self.values.iter().position(|(existing, _)| existing == column)?;
        Some(self.values.remove(position).1)
    }

    /// Columns in first-put order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(column, _)| column.as_str())
    }

    /// Values in first-put order.
    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.values.iter().map(|(_, value)| value)
    }

    /// Columns and values in first-put order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.values.iter().map(|(column, value)| (column.as_str(), value))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was put.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ContentValues
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (column, value) in iter {
            values.put(column, value);
        }
        values
    }
}

impl From<Row> for ContentValues {
    fn from(row: Row) -> Self {
        row.into_iter().collect()
    }
}

impl<'a> IntoIterator for &'a ContentValues {
    type Item = (&'a str, &'a SqlValue);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a SqlValue)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
