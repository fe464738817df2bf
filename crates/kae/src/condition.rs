//! Composable WHERE / HAVING predicates.
//!
//! ```ignore
//! use kae::condition::col;
//!
//! let cond = col("key").eq("key1") & col("value").greater(2_i64);
//! assert_eq!(cond.to_sql(), "key = 'key1' AND value > 2");
//! ```
//!
//! Combinators never add parentheses: `a & b | c` renders as
//! `a AND b OR c` and is grouped by the engine's own precedence rules.

use std::fmt;

use kae_types::SqlValue;

/// A boolean SQL predicate tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Condition {
    /// Matches everything; renders as an empty string.
    #[default]
    NoOp,
    IsNull(String),
    IsNotNull(String),
    Equal(String, SqlValue),
    NotEqual(String, SqlValue),
    Less(String, SqlValue),
    LessOrEqual(String, SqlValue),
    Greater(String, SqlValue),
    GreaterOrEqual(String, SqlValue),
    Between(String, SqlValue, SqlValue),
    /// Pattern is embedded verbatim.
    Like(String, String),
    /// Pattern is embedded verbatim.
    NotLike(String, String),
    /// Pattern is embedded verbatim.
    Glob(String, String),
    InList(String, Vec<SqlValue>),
    NotInList(String, Vec<SqlValue>),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
    Not(Box<Condition>),
}

impl Condition {
    /// `self AND other`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// `self OR other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// `NOT self`.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Whether this is the match-everything predicate.
    pub const fn is_no_op(&self) -> bool {
        matches!(self, Self::NoOp)
    }

    /// Render the predicate as SQL text.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        self.write_sql(&mut out);
        out
    }

    /// Append the SQL text of this predicate to `out`.
    pub fn write_sql(&self, out: &mut String) {
        match self {
            Self::NoOp => {}
            Self::IsNull(key) => {
                out.push_str(key);
                out.push_str(" IS NULL");
            }
            Self::IsNotNull(key) => {
                out.push_str(key);
                out.push_str(" IS NOT NULL");
            }
            Self::Equal(key, value) => write_comparison(out, key, "=", value),
            Self::NotEqual(key, value) => write_comparison(out, key, "!=", value),
            Self::Less(key, value) => write_comparison(out, key, "<", value),
            Self::LessOrEqual(key, value) => write_comparison(out, key, "<=", value),
            Self::Greater(key, value) => write_comparison(out, key, ">", value),
            Self::GreaterOrEqual(key, value) => write_comparison(out, key, ">=", value),
            Self::Between(key, from, to) => {
                out.push_str(key);
                out.push_str(" BETWEEN ");
                from.write_sql_literal(out);
                out.push_str(" AND ");
                to.write_sql_literal(out);
            }
            Self::Like(key, pattern) => write_pattern(out, key, "LIKE", pattern),
            Self::NotLike(key, pattern) => write_pattern(out, key, "NOT LIKE", pattern),
            Self::Glob(key, pattern) => write_pattern(out, key, "GLOB", pattern),
            Self::InList(key, values) => write_in_list(out, key, "IN", values),
            Self::NotInList(key, values) => write_in_list(out, key, "NOT IN", values),
            Self::And(lhs, rhs) => {
                lhs.write_sql(out);
                out.push_str(" AND ");
                rhs.write_sql(out);
            }
            Self::Or(lhs, rhs) => {
                lhs.write_sql(out);
                out.push_str(" OR ");
                rhs.write_sql(out);
            }
            Self::Not(inner) => {
                out.push_str("NOT ");
                inner.write_sql(out);
            }
        }
    }
}

fn write_comparison(out: &mut String, key: &str, op: &str, value: &SqlValue) {
    out.push_str(key);
    out.push(' ');
    out.push_str(op);
    out.push(' ');
    value.write_sql_literal(out);
}

fn write_pattern(out: &mut String, key: &str, op: &str, pattern: &str) {
    out.push_str(key);
    out.push(' ');
    out.push_str(op);
    out.push_str(" '");
    out.push_str(pattern);
    out.push('\'');
}

fn write_in_list(out: &mut String, key: &str, op: &str, values: &[SqlValue]) {
    out.push_str(key);
    out.push(' ');
    out.push_str(op);
    out.push_str(" (");
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        value.write_sql_literal(out);
    }
    out.push(')');
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

impl std::ops::BitAnd for Condition {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        self.and(rhs)
    }
}

impl std::ops::BitOr for Condition {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.or(rhs)
    }
}

impl std::ops::Not for Condition {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

/// A column name that predicates are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column(String);

/// Start a predicate on column `name`.
pub fn col(name: impl Into<String>) -> Column {
    Column(name.into())
}

/// The predicate that matches every row.
pub const fn no_op() -> Condition {
    Condition::NoOp
}

/// `NOT condition`.
pub fn not(condition: Condition) -> Condition {
    condition.negate()
}

impl Column {
    /// The column name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// `name IS NULL`.
    pub fn is_null(self) -> Condition {
        Condition::IsNull(self.0)
    }

    /// `name IS NOT NULL`.
    pub fn is_not_null(self) -> Condition {
        Condition::IsNotNull(self.0)
    }

    /// `name = value`.
    pub fn eq(self, value: impl Into<SqlValue>) -> Condition {
        Condition::Equal(self.0, value.into())
    }

    /// `name != value`.
    pub fn neq(self, value: impl Into<SqlValue>) -> Condition {
        Condition::NotEqual(self.0, value.into())
    }

    /// `name < value`.
    pub fn less(self, value: impl Into<SqlValue>) -> Condition {
        Condition::Less(self.0, value.into())
    }

    /// `name <= value`.
    pub fn less_eq(self, value: impl Into<SqlValue>) -> Condition {
        Condition::LessOrEqual(self.0, value.into())
    }

    /// `name > value`.
    pub fn greater(self, value: impl Into<SqlValue>) -> Condition {
        Condition::Greater(self.0, value.into())
    }

    /// `name >= value`.
    pub fn greater_eq(self, value: impl Into<SqlValue>) -> Condition {
        Condition::GreaterOrEqual(self.0, value.into())
    }

    /// `name BETWEEN from AND to`.
    pub fn between(self, from: impl Into<SqlValue>, to: impl Into<SqlValue>) -> Condition {
        Condition::Between(self.0, from.into(), to.into())
    }

    /// `name LIKE 'pattern'`.
    pub fn like(self, pattern: impl Into<String>) -> Condition {
        Condition::Like(self.0, pattern.into())
    }

    /// `name NOT LIKE 'pattern'`.
    pub fn not_like(self, pattern: impl Into<String>) -> Condition {
        Condition::NotLike(self.0, pattern.into())
    }

    /// `name GLOB 'pattern'`.
    pub fn glob(self, pattern: impl Into<String>) -> Condition {
        Condition::Glob(self.0, pattern.into())
    }

    /// `name IN (v1, v2, ...)`.
    pub fn in_list<I>(self, values: I) -> Condition
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        Condition::InList(self.0, values.into_iter().map(Into::into).collect())
    }

    /// `name NOT IN (v1, v2, ...)`.
    pub fn not_in_list<I>(self, values: I) -> Condition
    where
        I: IntoIterator,
        I::Item: Into<SqlValue>,
    {
        Condition::NotInList(self.0, values.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        col(name)
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        col(name)
    }
}
