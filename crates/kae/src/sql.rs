//! SQL text builders for schema statements.

use crate::column::{ColumnModifier, ConflictClause, ForeignKey, TableDefinition};
use crate::condition::Condition;
use crate::content::ContentValues;

/// Build `CREATE TABLE` text for `columns`.
///
/// Non-key modifiers render inline after the column name. Every column
/// marked PRIMARY KEY joins one composite `PRIMARY KEY(...)` clause, which
/// carries the first conflict clause found in column order. FOREIGN KEY
/// clauses follow, one per referencing column, in column order.
pub fn build_create_table_sql(table: &str, if_not_exists: bool, columns: &TableDefinition) -> String {
    let mut sql = String::from("CREATE TABLE ");
    if if_not_exists {
        sql.push_str("IF NOT EXISTS ");
    }
    sql.push_str(table);
    sql.push_str(" (");

    let mut primary_keys: Vec<&str> = Vec::new();
    let mut primary_key_conflict: Option<ConflictClause> = None;
    let mut foreign_keys: Vec<(&str, &ForeignKey)> = Vec::new();

    for (index, (name, modifiers)) in columns.iter().enumerate() {
        if index > 0 {
            sql.push_str(", ");
        }
        sql.push_str(name);

        for modifier in modifiers.modifiers() {
            match modifier {
                ColumnModifier::PrimaryKey(conflict) => {
                    primary_keys.push(name);
                    if primary_key_conflict.is_none() {
                        primary_key_conflict = *conflict;
                    }
                }
                ColumnModifier::ForeignKey(foreign_key) => {
                    // Last declaration wins for a column.
                    match foreign_keys.iter_mut().find(|(column, _)| *column == name) {
                        Some(slot) => slot.1 = foreign_key,
                        None => foreign_keys.push((name, foreign_key)),
                    }
                }
                other => {
                    if let Some(text) = other.inline_sql() {
                        sql.push(' ');
                        sql.push_str(&text);
                    }
                }
            }
        }
    }

    if !primary_keys.is_empty() {
        sql.push_str(", PRIMARY KEY(");
        sql.push_str(&join(&primary_keys, ", "));
        sql.push(')');
        if let Some(conflict) = primary_key_conflict {
            sql.push(' ');
            sql.push_str(&conflict.to_string());
        }
    }

    for (column, foreign_key) in foreign_keys {
        sql.push_str(", FOREIGN KEY(");
        sql.push_str(column);
        sql.push_str(") REFERENCES ");
        sql.push_str(&foreign_key.reference_table);
        sql.push('(');
        sql.push_str(&foreign_key.reference_column);
        sql.push(')');
        for constraint in &foreign_key.constraints {
            sql.push(' ');
            sql.push_str(&constraint.to_string());
        }
    }

    sql.push_str(");");
    sql
}

/// Build `CREATE INDEX` text.
pub fn build_create_index_sql<S: AsRef<str>>(
    index: &str,
    table: &str,
    columns: &[S],
    if_not_exists: bool,
) -> String {
    let mut sql = String::from("CREATE INDEX ");
    if if_not_exists {
        sql.push_str("IF NOT EXISTS ");
    }
    sql.push_str(index);
    sql.push_str(" ON ");
    sql.push_str(table);
    sql.push_str(" (");
    sql.push_str(&join(columns, ", "));
    sql.push_str(");");
    sql
}

/// Build `DROP TABLE` text.
pub fn build_drop_table_sql(table: &str, if_exists: bool) -> String {
    if if_exists {
        format!("DROP TABLE IF EXISTS {table};")
    } else {
        format!("DROP TABLE {table};")
    }
}

/// Build `DROP INDEX` text.
pub fn build_drop_index_sql(index: &str, if_exists: bool) -> String {
    if if_exists {
        format!("DROP INDEX IF EXISTS {index};")
    } else {
        format!("DROP INDEX {index};")
    }
}

/// Catalog lookup used by `has_table`; the name is quoted as a text literal.
pub fn build_has_table_sql(table: &str) -> String {
    format!(
        "SELECT DISTINCT tbl_name FROM sqlite_master WHERE tbl_name = '{}';",
        kae_types::value::escape_quotes(table)
    )
}

/// Build `INSERT` text with one numbered parameter per value, in put order.
///
/// An empty value map inserts a row of column defaults.
pub fn build_insert_sql(table: &str, conflict: Option<ConflictClause>, values: &ContentValues) -> String {
    let mut sql = String::from("INSERT");
    if let Some(conflict) = conflict {
        sql.push_str(" OR ");
        sql.push_str(conflict.keyword());
    }
    sql.push_str(" INTO ");
    sql.push_str(table);
    if values.is_empty() {
        sql.push_str(" DEFAULT VALUES");
        return sql;
    }
    sql.push_str(" (");
    let columns: Vec<&str> = values.keys().collect();
    sql.push_str(&join(&columns, ", "));
    sql.push_str(") VALUES (");
    let params: Vec<String> = (1..=values.len()).map(|i| format!("?{i}")).collect();
    sql.push_str(&join(&params, ", "));
    sql.push(')');
    sql
}

/// Build `UPDATE` text with one numbered parameter per value, in put order.
pub fn build_update_sql(
    table: &str,
    values: &ContentValues,
    conflict: Option<ConflictClause>,
    condition: &Condition,
) -> String {
    let mut sql = String::from("UPDATE ");
    if let Some(conflict) = conflict {
        sql.push_str("OR ");
        sql.push_str(conflict.keyword());
        sql.push(' ');
    }
    sql.push_str(table);
    sql.push_str(" SET ");
    for (i, column) in values.keys().enumerate() {
        if i > 0 {
            sql.push_str(", ");
        }
        sql.push_str(column);
        sql.push_str(" = ?");
        sql.push_str(&(i + 1).to_string());
    }
    push_where(&mut sql, condition);
    sql
}

/// Build `DELETE` text; `NoOp` deletes every row.
pub fn build_delete_sql(table: &str, condition: &Condition) -> String {
    let mut sql = format!("DELETE FROM {table}");
    push_where(&mut sql, condition);
    sql
}

fn push_where(sql: &mut String, condition: &Condition) {
    if !condition.is_no_op() {
        sql.push_str(" WHERE ");
        condition.write_sql(sql);
    }
}

/// Join `parts` with `separator`, for any string-like element type.
pub(crate) fn join<S: AsRef<str>>(parts: &[S], separator: &str) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(part.as_ref());
    }
    out
}
