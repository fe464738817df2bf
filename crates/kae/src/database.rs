//! Connection wrapper with schema, DML and query helpers.

use std::path::Path;

use kae_error::Result;
use rusqlite::{Connection, params_from_iter};
use tracing::{debug, info};

use crate::column::{ConflictClause, TableDefinition};
use crate::condition::Condition;
use crate::config::DatabaseConfig;
use crate::content::ContentValues;
use crate::cursor::Cursor;
use crate::query::Query;
use crate::sql::{
    build_create_index_sql, build_create_table_sql, build_delete_sql, build_drop_index_sql,
    build_drop_table_sql, build_has_table_sql, build_insert_sql, build_update_sql,
};

/// An open SQLite database.
///
/// # Examples
///
/// ```ignore
/// use kae::{ColumnModifier, ColumnType, ContentValues, Database, DatabaseConfig, col};
///
/// let db = Database::open_in_memory(&DatabaseConfig::default())?;
/// db.create_table("users", true, |t| {
///     t.column("id", ColumnType::Integer + ColumnModifier::PRIMARY_KEY)
///         .column("name", ColumnType::Text + ColumnModifier::NOT_NULL);
/// })?;
/// let mut values = ContentValues::new();
/// values.put("name", "alice");
/// db.insert("users", None, &values)?;
/// let alice = db.select("users", &["id"], col("name").eq("alice")).first()?;
/// ```
#[derive(Debug)]
pub struct Database {
    pub(crate) conn: Connection,
}

impl Database {
    /// Open (or create) the database file at `path` and apply `config`.
    pub fn open(path: impl AsRef<Path>, config: &DatabaseConfig) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let conn = Connection::open_with_flags(path, config.open_flags())?;
        info!(path = %path.display(), read_only = config.read_only, "opened database");
        Self::configure(conn, config)
    }

    /// Open a private in-memory database. `read_only` is ignored.
    pub fn open_in_memory(config: &DatabaseConfig) -> Result<Self> {
        config.validate()?;
        let conn = Connection::open_in_memory()?;
        debug!("opened in-memory database");
        Self::configure(conn, config)
    }

    fn configure(conn: Connection, config: &DatabaseConfig) -> Result<Self> {
        for pragma in config.to_pragmas() {
            debug!(sql = %pragma, "applying pragma");
            // Some PRAGMAs answer with a row; drain it.
            let mut stmt = conn.prepare(&pragma)?;
            let mut rows = stmt.query([])?;
            while rows.next()?.is_some() {}
        }
        Ok(Self { conn })
    }

    /// The underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Whether an explicit transaction is open.
    pub fn is_in_transaction(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Execute one or more `;`-separated statements.
    pub fn exec_sql(&self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "exec");
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Prepare `sql` and return a cursor over its rows.
    pub fn raw_query(&self, sql: &str) -> Result<Cursor<'_>> {
        debug!(sql = %sql, "query");
        Ok(Cursor::new(self.conn.prepare(sql)?))
    }

    /// Whether `table` exists in the schema.
    pub fn has_table(&self, table: &str) -> Result<bool> {
        Ok(self.raw_query(&build_has_table_sql(table))?.first_opt()?.is_some())
    }

    /// Create `table` with the columns declared by `define`.
    pub fn create_table<F>(&self, table: &str, if_not_exists: bool, define: F) -> Result<()>
    where
        F: FnOnce(&mut TableDefinition),
    {
        let mut columns = TableDefinition::new();
        define(&mut columns);
        self.create_table_with(table, if_not_exists, &columns)
    }

    /// Create `table` from a prebuilt definition.
    pub fn create_table_with(
        &self,
        table: &str,
        if_not_exists: bool,
        columns: &TableDefinition,
    ) -> Result<()> {
        self.exec_sql(&build_create_table_sql(table, if_not_exists, columns))
    }

    /// Drop `table`; with `if_exists` a missing table is not an error.
    pub fn drop_table(&self, table: &str, if_exists: bool) -> Result<()> {
        self.exec_sql(&build_drop_table_sql(table, if_exists))
    }

    /// Create `index` on `columns` of `table`.
    pub fn create_index<S: AsRef<str>>(
        &self,
        index: &str,
        table: &str,
        columns: &[S],
        if_not_exists: bool,
    ) -> Result<()> {
        self.exec_sql(&build_create_index_sql(index, table, columns, if_not_exists))
    }

    /// Drop `index`; with `if_exists` a missing index is not an error.
    pub fn drop_index(&self, index: &str, if_exists: bool) -> Result<()> {
        self.exec_sql(&build_drop_index_sql(index, if_exists))
    }

    /// Insert one row and return its rowid.
    ///
    /// Returns `-1` when no row was written, which is how an `IGNORE`
    /// conflict surfaces. Other conflicts fail with the engine error.
    pub fn insert(
        &self,
        table: &str,
        conflict: Option<ConflictClause>,
        values: &ContentValues,
    ) -> Result<i64> {
        let sql = build_insert_sql(table, conflict, values);
        debug!(sql = %sql, params = values.len(), "insert");
        let changed = self.conn.execute(&sql, params_from_iter(values.values()))?;
        if changed == 0 {
            return Ok(-1);
        }
        Ok(self.conn.last_insert_rowid())
    }

    /// Update the rows matching `condition` and return how many changed.
    ///
    /// An empty `values` map is rejected by the engine.
    pub fn update(
        &self,
        table: &str,
        values: &ContentValues,
        conflict: Option<ConflictClause>,
        condition: Condition,
    ) -> Result<usize> {
        let sql = build_update_sql(table, values, conflict, &condition);
        debug!(sql = %sql, params = values.len(), "update");
        Ok(self.conn.execute(&sql, params_from_iter(values.values()))?)
    }

    /// Delete the rows matching `condition` and return how many were removed.
    pub fn delete(&self, table: &str, condition: Condition) -> Result<usize> {
        let sql = build_delete_sql(table, &condition);
        debug!(sql = %sql, "delete");
        Ok(self.conn.execute(&sql, [])?)
    }

    /// Delete every row of `table`.
    pub fn delete_all(&self, table: &str) -> Result<usize> {
        self.delete(table, Condition::NoOp)
    }

    /// Start a `SELECT` of `columns` (all columns when empty) from `table`.
    pub fn select<S: AsRef<str>>(
        &self,
        table: &str,
        columns: &[S],
        condition: Condition,
    ) -> Query<'_> {
        Query::new(self, table, columns, condition)
    }
}
