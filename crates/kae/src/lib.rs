//! Typed SQL fragment builders over embedded SQLite.
//!
//! Predicates ([`condition`]), column constraints ([`column`]) and a fluent
//! [`Query`] render to SQL text; [`Database`] executes them and decodes
//! results into [`Row`]s through a [`Cursor`].

pub mod column;
pub mod condition;
pub mod config;
pub mod content;
pub mod cursor;
pub mod database;
pub mod function;
pub mod query;
pub mod row;
pub mod sql;
mod transaction;

pub use column::{
    ColumnModifier, ColumnModifiers, ColumnType, ConflictClause, ForeignKey, ForeignKeyAction,
    ForeignKeyConstraint, TableDefinition,
};
pub use condition::{Column, Condition, col, no_op, not};
pub use config::DatabaseConfig;
pub use content::ContentValues;
pub use cursor::{Cursor, RowIter};
pub use database::Database;
pub use query::{Query, SortOrder};
pub use row::Row;

pub use kae_error::{ErrorCode, KaeError, Result};
pub use kae_types::{FromSqlValue, SqlValue, StorageClass};
