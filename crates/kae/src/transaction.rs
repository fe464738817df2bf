//! Transaction scopes.
//!
//! A transaction body runs against the same [`Database`]; the scope commits
//! when the body returns `Ok` and rolls back otherwise, including when the
//! body panics.

use kae_error::{KaeError, Result};
use tracing::{debug, warn};

use crate::database::Database;

/// Rolls back on drop unless committed or rolled back explicitly.
struct TransactionGuard<'a> {
    db: &'a Database,
    finished: bool,
}

impl<'a> TransactionGuard<'a> {
    fn begin(db: &'a Database, exclusive: bool) -> Result<Self> {
        let sql = if exclusive {
            "BEGIN EXCLUSIVE"
        } else {
            "BEGIN IMMEDIATE"
        };
        db.conn.execute_batch(sql)?;
        debug!(exclusive, "transaction started");
        Ok(Self {
            db,
            finished: false,
        })
    }

    fn commit(mut self) -> Result<()> {
        // A failed COMMIT leaves the transaction open; drop rolls it back.
        self.db.conn.execute_batch("COMMIT")?;
        self.finished = true;
        debug!("transaction committed");
        Ok(())
    }

    fn rollback(mut self) -> Result<()> {
        self.finished = true;
        self.db.conn.execute_batch("ROLLBACK")?;
        debug!("transaction rolled back");
        Ok(())
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(err) = self.db.conn.execute_batch("ROLLBACK") {
                warn!(error = %err, "rollback on drop failed");
            }
        }
    }
}

impl Database {
    /// Run `body` in a transaction.
    ///
    /// `exclusive` selects `BEGIN EXCLUSIVE` over `BEGIN IMMEDIATE`. The
    /// body commits by returning `Ok`. Returning
    /// [`KaeError::TransactionAborted`] rolls back and reports success; any
    /// other error rolls back and is returned.
    ///
    /// ```ignore
    /// db.transaction(true, |db| {
    ///     db.insert("t", None, &values)?;
    ///     if !wanted {
    ///         return Err(KaeError::TransactionAborted);
    ///     }
    ///     Ok(())
    /// })?;
    /// ```
    pub fn transaction<F>(&self, exclusive: bool, body: F) -> Result<()>
    where
        F: FnOnce(&Self) -> Result<()>,
    {
        match self.with_transaction(exclusive, body) {
            Err(KaeError::TransactionAborted) => Ok(()),
            other => other,
        }
    }

    /// Run `body` in a transaction and return its value.
    ///
    /// Every error, [`KaeError::TransactionAborted`] included, rolls back
    /// and is returned.
    pub fn with_transaction<T, F>(&self, exclusive: bool, body: F) -> Result<T>
    where
        F: FnOnce(&Self) -> Result<T>,
    {
        let guard = TransactionGuard::begin(self, exclusive)?;
        match body(self) {
            Ok(value) => {
                guard.commit()?;
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, "transaction body failed");
                if let Err(rollback_err) = guard.rollback() {
                    warn!(error = %rollback_err, "rollback failed");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::config::DatabaseConfig;
    use crate::content::ContentValues;
    use std::panic::{AssertUnwindSafe, catch_unwind};

    fn db() -> Database {
        let db = Database::open_in_memory(&DatabaseConfig::default()).unwrap();
        db.exec_sql("CREATE TABLE t (v INTEGER)").unwrap();
        db
    }

    fn insert(db: &Database, v: i64) -> Result<()> {
        let values: ContentValues = [("v", v)].into_iter().collect();
        db.insert("t", None, &values)?;
        Ok(())
    }

    fn row_count(db: &Database) -> usize {
        db.select("t", &["v"], Condition::NoOp).to_list().unwrap().len()
    }

    #[test]
    fn commit_on_ok() {
        let db = db();
        db.transaction(true, |db| insert(db, 1)).unwrap();
        db.transaction(false, |db| insert(db, 2)).unwrap();
        assert_eq!(row_count(&db), 2);
        assert!(!db.is_in_transaction());
    }

    #[test]
    fn abort_rolls_back_silently() {
        let db = db();
        db.transaction(true, |db| {
            insert(db, 1)?;
            Err(KaeError::TransactionAborted)
        })
        .unwrap();
        assert_eq!(row_count(&db), 0);
    }

    #[test]
    fn other_error_rolls_back_and_propagates() {
        let db = db();
        let err = db
            .transaction(true, |db| {
                insert(db, 1)?;
                db.exec_sql("INSERT INTO missing VALUES (1)")
            })
            .unwrap_err();
        assert!(matches!(err, KaeError::Sqlite(_)));
        assert_eq!(row_count(&db), 0);
    }

    #[test]
    fn with_transaction_returns_value_and_reports_abort() {
        let db = db();
        let rowid = db
            .with_transaction(false, |db| {
                let values: ContentValues = [("v", 5)].into_iter().collect();
                db.insert("t", None, &values)
            })
            .unwrap();
        assert_eq!(rowid, 1);

        let err = db
            .with_transaction(false, |db| -> Result<()> {
                insert(db, 6)?;
                Err(KaeError::TransactionAborted)
            })
            .unwrap_err();
        assert!(err.is_transaction_abort());
        assert_eq!(row_count(&db), 1);
    }

    #[test]
    fn panic_rolls_back() {
        let db = db();
        let result = catch_unwind(AssertUnwindSafe(|| {
            db.transaction(true, |db| {
                insert(db, 1)?;
                panic!("boom");
            })
        }));
        assert!(result.is_err());
        assert!(!db.is_in_transaction());
        assert_eq!(row_count(&db), 0);
    }

    #[test]
    fn nested_transaction_is_rejected() {
        let db = db();
        let err = db
            .transaction(true, |db| db.transaction(true, |db| insert(db, 1)))
            .unwrap_err();
        assert!(matches!(err, KaeError::Sqlite(_)));
        assert_eq!(row_count(&db), 0);
    }
}
