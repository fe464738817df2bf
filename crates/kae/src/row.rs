//! Decoded result rows.

use std::ops::Index;

use kae_error::KaeError;
use kae_types::{FromSqlValue, SqlValue};

/// One decoded cursor position: column name to value, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, SqlValue)>,
}

static NULL: SqlValue = SqlValue::Null;

/// Replace the value of `key` in place, or append it.
pub(crate) fn upsert(entries: &mut Vec<(String, SqlValue)>, key: String, value: SqlValue) {
    match entries.iter_mut().find(|(existing, _)| *existing == key) {
        Some((_, slot)) => *slot = value,
        None => entries.push((key, value)),
    }
}

impl Row {
    /// An empty row.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// An empty row with room for `capacity` columns.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Set `key` to `value`, replacing an existing entry in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<SqlValue>) {
        upsert(&mut self.entries, key.into(), value.into());
    }

    /// Value of column `key`, or `None` if the row has no such column.
    pub fn get(&self, key: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Whether the row has column `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Typed value of column `key`.
    ///
    /// A missing column raises `NoSuchElement`; a value that does not
    /// convert raises `TypeMismatch`. `Option<T>` maps NULL to `None`.
    pub fn get_typed<T: FromSqlValue>(&self, key: &str) -> Result<T, KaeError> {
        let value = self.get(key).ok_or_else(|| KaeError::no_such_element(key))?;
        T::from_sql_value(value)
    }

    /// BLOB value of `key`.
    pub fn get_blob(&self, key: &str) -> Result<&[u8], KaeError> {
        match self.get(key) {
            Some(SqlValue::Blob(b)) => Ok(b),
            _ => Err(KaeError::no_such_element(key)),
        }
    }

    /// REAL value of `key`.
    pub fn get_double(&self, key: &str) -> Result<f64, KaeError> {
        match self.get(key) {
            Some(SqlValue::Float(f)) => Ok(*f),
            _ => Err(KaeError::no_such_element(key)),
        }
    }

    /// REAL value of `key`, narrowed to `f32`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_float(&self, key: &str) -> Result<f32, KaeError> {
        self.get_double(key).map(|f| f as f32)
    }

    /// INTEGER value of `key`.
    pub fn get_long(&self, key: &str) -> Result<i64, KaeError> {
        match self.get(key) {
            Some(SqlValue::Integer(i)) => Ok(*i),
            _ => Err(KaeError::no_such_element(key)),
        }
    }

    /// Truncates like a narrowing cast.
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_int(&self, key: &str) -> Result<i32, KaeError> {
        self.get_long(key).map(|i| i as i32)
    }

    /// INTEGER value of `key`, truncated to `i16`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn get_short(&self, key: &str) -> Result<i16, KaeError> {
        self.get_long(key).map(|i| i as i16)
    }

    /// TEXT value of `key`.
    pub fn get_string(&self, key: &str) -> Result<&str, KaeError> {
        match self.get(key) {
            Some(SqlValue::Text(s)) => Ok(s),
            _ => Err(KaeError::no_such_element(key)),
        }
    }

    /// Column names in column order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Values in column order.
    pub fn values(&self) -> impl Iterator<Item = &SqlValue> {
        self.entries.iter().map(|(_, value)| value)
    }

    /// Columns and values in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `row["col"]` yields NULL for a missing column.
impl Index<&str> for Row {
    type Output = SqlValue;

    fn index(&self, key: &str) -> &Self::Output {
        self.get(key).unwrap_or(&NULL)
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (key, value) in iter {
            row.insert(key, value);
        }
        row
    }
}

impl IntoIterator for Row {
    type Item = (String, SqlValue);
    type IntoIter = std::vec::IntoIter<(String, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
