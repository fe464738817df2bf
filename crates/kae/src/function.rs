//! Aggregate expressions for select column lists.
//!
//! ```ignore
//! db.select("t", &["k".to_owned(), avg("v", true)], no_op()).group_by(&["k"])
//! ```

fn aggregate(name: &str, column: &str, distinct: bool) -> String {
    if distinct {
        format!("{name}(DISTINCT {column})")
    } else {
        format!("{name}({column})")
    }
}

/// `AVG([DISTINCT ]column)`.
pub fn avg(column: &str, distinct: bool) -> String {
    aggregate("AVG", column, distinct)
}

/// `COUNT([DISTINCT ]column)`.
pub fn count(column: &str, distinct: bool) -> String {
    aggregate("COUNT", column, distinct)
}

/// `SUM([DISTINCT ]column)`.
pub fn sum(column: &str, distinct: bool) -> String {
    aggregate("SUM", column, distinct)
}

/// `MIN(column)`.
pub fn min(column: &str) -> String {
    aggregate("MIN", column, false)
}

/// `MAX(column)`.
pub fn max(column: &str) -> String {
    aggregate("MAX", column, false)
}
