//! Integration tests for the database helpers.
//!
//! These run the builders against live in-memory and file-backed
//! databases, complementing the inline unit tests in each module.

use kae::function::{avg, count};
use kae::{
    ColumnModifier, ColumnModifiers, ColumnType, ConflictClause, ContentValues, Database, DatabaseConfig,
    ForeignKeyAction, ForeignKeyConstraint, KaeError, Row, SortOrder, SqlValue, col, no_op,
};

const TABLE: &str = "test_table";
const KEY: &str = "key";
const VALUE: &str = "value";

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn open() -> Database {
    init_tracing();
    let db = Database::open_in_memory(&DatabaseConfig::default()).unwrap();
    db.create_table(TABLE, false, |t| {
        t.column(KEY, ColumnType::Text + ColumnModifier::PRIMARY_KEY)
            .column(VALUE, ColumnModifiers::text());
    })
    .unwrap();
    db
}

fn kv(key: &str, value: &str) -> ContentValues {
    [(KEY, key), (VALUE, value)].into_iter().collect()
}

fn seeded() -> Database {
    let db = open();
    for i in 1..=3 {
        db.insert(TABLE, None, &kv(&format!("key{i}"), &format!("value{i}")))
            .unwrap();
    }
    db
}

fn value_of(db: &Database, key: &str) -> String {
    db.select(TABLE, &[VALUE], col(KEY).eq(key))
        .first()
        .unwrap()
        .get_string(VALUE)
        .unwrap()
        .to_owned()
}

fn keys(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .map(|row| row.get_string(KEY).unwrap().to_owned())
        .collect()
}

// ===========================================================================
// 1. SCHEMA
// ===========================================================================

#[test]
fn has_table_reflects_create_and_drop() {
    let db = open();
    assert!(db.has_table(TABLE).unwrap());
    assert!(!db.has_table("non_exist").unwrap());

    db.drop_table(TABLE, false).unwrap();
    assert!(!db.has_table(TABLE).unwrap());
}

#[test]
fn drop_missing_table() {
    let db = open();
    db.drop_table("non_exist", true).unwrap();
    assert!(db.drop_table("non_exist", false).is_err());
}

#[test]
fn create_existing_table() {
    let db = open();
    db.create_table(TABLE, true, |t| {
        t.column(KEY, ColumnModifiers::text());
    })
    .unwrap();
    let err = db
        .create_table(TABLE, false, |t| {
            t.column(KEY, ColumnModifiers::text());
        })
        .unwrap_err();
    assert!(matches!(err, KaeError::Sqlite(_)));
}

#[test]
fn create_table_with_constraints() {
    let db = open();
    db.create_table("child", false, |t| {
        t.column("id", ColumnType::Integer + ColumnModifier::PRIMARY_KEY)
            .column(
                "name",
                ColumnType::Text
                    + ColumnModifier::NOT_NULL
                    + ColumnModifier::default_value("'anon'"),
            )
            .column(
                "parent",
                ColumnType::Text
                    + ColumnModifier::foreign_key(
                        TABLE,
                        KEY,
                        [ForeignKeyConstraint::OnDelete(ForeignKeyAction::Cascade)],
                    ),
            );
    })
    .unwrap();

    db.insert(TABLE, None, &kv("p", "parent")).unwrap();
    let child: ContentValues = [("parent", "p")].into_iter().collect();
    let id = db.insert("child", None, &child).unwrap();
    assert_eq!(id, 1);

    let row = db.select("child", &["name"], no_op()).first().unwrap();
    assert_eq!(row.get_string("name").unwrap(), "anon");

    // Foreign keys are enforced by default.
    let orphan: ContentValues = [("parent", "missing")].into_iter().collect();
    let err = db.insert("child", None, &orphan).unwrap_err();
    assert!(err.is_constraint_violation());

    db.delete(TABLE, col(KEY).eq("p")).unwrap();
    assert!(db.select("child", &["id"], no_op()).to_list().unwrap().is_empty());
}

#[test]
fn create_and_drop_index() {
    let db = open();
    db.create_index("idx_value", TABLE, &[VALUE], false).unwrap();
    db.create_index("idx_value", TABLE, &[VALUE], true).unwrap();
    assert!(db.create_index("idx_value", TABLE, &[VALUE], false).is_err());

    let indexes = db
        .raw_query("SELECT name FROM sqlite_master WHERE type = 'index' AND name = 'idx_value'")
        .unwrap()
        .to_list()
        .unwrap();
    assert_eq!(indexes.len(), 1);

    db.drop_index("idx_value", false).unwrap();
    db.drop_index("idx_value", true).unwrap();
    assert!(db.drop_index("idx_value", false).is_err());
}

// ===========================================================================
// 2. INSERT / UPDATE / DELETE
// ===========================================================================

#[test]
fn insert_round_trips() {
    let db = seeded();
    let rows = db
        .select(TABLE, &[KEY, VALUE], col(KEY).eq("key2"))
        .to_list()
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get_string(VALUE).unwrap(), "value2");
}

#[test]
fn insert_conflict_policies() {
    let db = seeded();

    assert_eq!(
        db.insert(TABLE, Some(ConflictClause::Ignore), &kv("key1", "other"))
            .unwrap(),
        -1
    );
    assert_eq!(value_of(&db, "key1"), "value1");

    assert!(db.insert(TABLE, None, &kv("key1", "other")).is_err());
    assert_eq!(value_of(&db, "key1"), "value1");
    assert!(
        db.insert(TABLE, Some(ConflictClause::Abort), &kv("key1", "other"))
            .is_err()
    );
    assert_eq!(value_of(&db, "key1"), "value1");
    assert_eq!(db.select(TABLE, &[KEY], no_op()).to_list().unwrap().len(), 3);

    assert_ne!(
        db.insert(TABLE, Some(ConflictClause::Replace), &kv("key1", "value1_updated"))
            .unwrap(),
        -1
    );
    assert_eq!(value_of(&db, "key1"), "value1_updated");
    assert_eq!(db.select(TABLE, &[KEY], no_op()).to_list().unwrap().len(), 3);
}

#[test]
fn update_with_condition_and_policy() {
    let db = seeded();

    let mut values = ContentValues::new();
    values.put(VALUE, "updated");
    assert_eq!(db.update(TABLE, &values, None, col(KEY).neq("key1")).unwrap(), 2);

    let mut rename = ContentValues::new();
    rename.put(KEY, "key1");
    assert!(db.update(TABLE, &rename, None, col(KEY).eq("key2")).is_err());
    assert_eq!(
        db.update(TABLE, &rename, Some(ConflictClause::Ignore), col(KEY).eq("key2"))
            .unwrap(),
        0
    );

    let rows = db
        .select(TABLE, &[KEY, VALUE], no_op())
        .order_by(&[KEY], SortOrder::Ascending)
        .to_list()
        .unwrap();
    assert_eq!(keys(&rows), ["key1", "key2", "key3"]);
    assert_eq!(rows[0].get_string(VALUE).unwrap(), "value1");
    assert_eq!(rows[1].get_string(VALUE).unwrap(), "updated");
}

#[test]
fn delete_counts() {
    let db = seeded();
    assert_eq!(db.delete(TABLE, col(KEY).eq("missing")).unwrap(), 0);
    assert_eq!(db.delete(TABLE, col(KEY).in_list(["key1", "key2"])).unwrap(), 2);
    assert_eq!(db.delete_all(TABLE).unwrap(), 1);
    assert!(db.select(TABLE, &[KEY], no_op()).to_list().unwrap().is_empty());
}

// ===========================================================================
// 3. SELECT
// ===========================================================================

#[test]
fn select_with_no_match() {
    let db = seeded();
    let query = db.select(TABLE, &[KEY], col(KEY).is_null());
    assert!(query.to_list().unwrap().is_empty());
    assert!(matches!(
        query.first().unwrap_err(),
        KaeError::CursorOutOfBounds { .. }
    ));
    assert_eq!(query.first_or_else(Row::new).unwrap(), Row::new());
}

#[test]
fn select_limit_and_offset() {
    let db = seeded();
    let all = db
        .select(TABLE, &[KEY], col(KEY).is_null() | col(KEY).is_not_null())
        .order_by(&[KEY], SortOrder::Ascending);

    let cases: [(i64, i64, &[&str]); 5] = [
        (-1, -1, &["key1", "key2", "key3"]),
        (1, -1, &["key1"]),
        (-1, 1, &["key2", "key3"]),
        (1, 1, &["key2"]),
        (2, 1, &["key2", "key3"]),
    ];
    for (limit, offset, expected) in cases {
        let rows = all.clone().limit(limit).offset(offset).to_list().unwrap();
        assert_eq!(keys(&rows), expected, "limit {limit} offset {offset}");
    }
}

#[test]
fn select_sorted_descending_with_converter() {
    let db = seeded();
    let values = db
        .select(TABLE, &[VALUE], col(VALUE).like("value%"))
        .order_by(&[VALUE], SortOrder::Descending)
        .to_list_with(|row| row.get_string(VALUE).unwrap().to_owned())
        .unwrap();
    assert_eq!(values, ["value3", "value2", "value1"]);
}

#[test]
fn select_decodes_every_storage_class() {
    init_tracing();
    let db = Database::open_in_memory(&DatabaseConfig::default()).unwrap();
    db.exec_sql("CREATE TABLE typed (b BLOB, r REAL, i INTEGER, n TEXT, t TEXT)")
        .unwrap();
    let mut values = ContentValues::new();
    values
        .put("b", vec![1_u8, 2, 3])
        .put("r", 2.5)
        .put("i", 42_i64)
        .put_null("n")
        .put("t", "text");
    db.insert("typed", None, &values).unwrap();

    let row = db.select("typed", &["b", "r", "i", "n", "t"], no_op()).first().unwrap();
    assert_eq!(row["b"], SqlValue::Blob(vec![1, 2, 3]));
    assert_eq!(row["r"], SqlValue::Float(2.5));
    assert_eq!(row["i"], SqlValue::Integer(42));
    assert_eq!(row["n"], SqlValue::Null);
    assert_eq!(row["t"], SqlValue::Text("text".to_owned()));
    assert_eq!(row.get_typed::<Option<String>>("n").unwrap(), None);

    // A read row can be written back.
    db.insert("typed", None, &ContentValues::from(row.clone())).unwrap();
    let rows = db.select("typed", &["b", "r", "i", "n", "t"], no_op()).to_list().unwrap();
    assert_eq!(rows, [row.clone(), row]);
}

#[test]
fn select_distinct_and_group_by() {
    init_tracing();
    let db = Database::open_in_memory(&DatabaseConfig::default()).unwrap();
    db.exec_sql("CREATE TABLE another_table (column1 TEXT, column2 REAL)")
        .unwrap();
    for (key, value) in [("key1", 1.0), ("key1", 2.0), ("key2", 3.0), ("key2", 3.0), ("key2", 6.0)]
    {
        let values: ContentValues = [
            ("column1", SqlValue::from(key)),
            ("column2", SqlValue::from(value)),
        ]
        .into_iter()
        .collect();
        db.insert("another_table", None, &values).unwrap();
    }

    let distinct = db
        .select("another_table", &["column1"], no_op())
        .distinct(true)
        .order_by(&["column1"], SortOrder::Ascending)
        .to_list()
        .unwrap();
    assert_eq!(distinct.len(), 2);

    let averages = |distinct: bool| {
        db.select(
            "another_table",
            &["column1".to_owned(), avg("column2", distinct)],
            no_op(),
        )
        .group_by(&["column1"])
        .order_by(&["column1"], SortOrder::Ascending)
        .to_list_with(|row| {
            let average = row.iter().nth(1).map(|(_, value)| value.clone());
            (row.get_string("column1").unwrap().to_owned(), average)
        })
        .unwrap()
    };
    assert_eq!(
        averages(false),
        [
            ("key1".to_owned(), Some(SqlValue::Float(1.5))),
            ("key2".to_owned(), Some(SqlValue::Float(4.0))),
        ]
    );
    assert_eq!(
        averages(true),
        [
            ("key1".to_owned(), Some(SqlValue::Float(1.5))),
            ("key2".to_owned(), Some(SqlValue::Float(4.5))),
        ]
    );

    let counts = db
        .select(
            "another_table",
            &["column1".to_owned(), count("column2", false)],
            no_op(),
        )
        .group_by(&["column1"])
        .having(col("COUNT(column2)").greater(2))
        .to_list()
        .unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0]["COUNT(column2)"], SqlValue::Integer(3));
}

// ===========================================================================
// 4. TRANSACTIONS
// ===========================================================================

#[test]
fn transaction_commits() {
    let db = open();
    db.transaction(true, |db| {
        db.insert(TABLE, None, &kv("key", "value"))?;
        Ok(())
    })
    .unwrap();
    let row = db.select(TABLE, &[KEY, VALUE], no_op()).first().unwrap();
    assert_eq!(row.get_string(KEY).unwrap(), "key");
    assert_eq!(row.get_string(VALUE).unwrap(), "value");
}

#[test]
fn aborted_transaction_leaves_nothing() {
    let db = open();
    db.transaction(false, |db| {
        db.insert(TABLE, None, &kv("key", "value"))?;
        Err(KaeError::TransactionAborted)
    })
    .unwrap();
    assert!(db.select(TABLE, &[KEY], no_op()).to_list().unwrap().is_empty());
}

#[test]
fn failed_transaction_propagates_and_leaves_nothing() {
    let db = open();
    let err = db
        .transaction(true, |db| {
            db.insert(TABLE, None, &kv("key", "value"))?;
            Err(KaeError::no_such_element("boom"))
        })
        .unwrap_err();
    assert!(matches!(err, KaeError::NoSuchElement { ref key } if key == "boom"));
    assert!(db.select(TABLE, &[KEY], no_op()).to_list().unwrap().is_empty());
}

// ===========================================================================
// 5. FILE-BACKED DATABASES AND CONFIG
// ===========================================================================

#[test]
fn file_database_persists_across_opens() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kae.db");
    let config = DatabaseConfig::from_json_str(r#"{"journal_mode":"truncate"}"#).unwrap();

    {
        let db = Database::open(&path, &config).unwrap();
        db.create_table(TABLE, true, |t| {
            t.column(KEY, ColumnModifiers::text());
        })
        .unwrap();
        let values: ContentValues = [(KEY, "persisted")].into_iter().collect();
        db.insert(TABLE, None, &values).unwrap();
    }

    let read_only = DatabaseConfig {
        read_only: true,
        ..DatabaseConfig::default()
    };
    let db = Database::open(&path, &read_only).unwrap();
    let row = db.select(TABLE, &[KEY], no_op()).first().unwrap();
    assert_eq!(row.get_string(KEY).unwrap(), "persisted");

    let values: ContentValues = [(KEY, "rejected")].into_iter().collect();
    assert!(db.insert(TABLE, None, &values).is_err());
}

#[test]
fn config_file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kae.json");
    std::fs::write(&path, r#"{"busy_timeout_ms": 250, "foreign_keys": false}"#).unwrap();

    let config = DatabaseConfig::from_path(&path).unwrap();
    assert_eq!(config.busy_timeout_ms, 250);
    assert!(!config.foreign_keys);

    let db = Database::open_in_memory(&config).unwrap();
    let row = db.raw_query("PRAGMA foreign_keys").unwrap().first().unwrap();
    assert_eq!(row["foreign_keys"], SqlValue::Integer(0));

    let missing = DatabaseConfig::from_path(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(missing, KaeError::Io(_)));
}

#[test]
fn invalid_config_is_rejected_before_open() {
    let config = DatabaseConfig {
        synchronous: "SOMETIMES".to_owned(),
        ..DatabaseConfig::default()
    };
    let err = Database::open_in_memory(&config).unwrap_err();
    assert!(matches!(err, KaeError::InvalidConfig { .. }));
}
