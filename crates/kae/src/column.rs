//! Column constraints for `CREATE TABLE`.
//!
//! ```ignore
//! use kae::column::{ColumnModifier, ColumnType, ConflictClause};
//!
//! let id = ColumnType::Integer + ColumnModifier::PRIMARY_KEY;
//! let name = ColumnType::Text + ColumnModifier::unique(ConflictClause::Replace);
//! ```

use std::fmt;
use std::ops::Add;

/// Conflict resolution policy of a constraint or a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictClause {
    Abort,
    Fail,
    Ignore,
    Replace,
    Rollback,
}

impl ConflictClause {
    /// The bare keyword, used by `INSERT OR <KEYWORD>` / `UPDATE OR <KEYWORD>`.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Abort => "ABORT",
            Self::Fail => "FAIL",
            Self::Ignore => "IGNORE",
            Self::Replace => "REPLACE",
            Self::Rollback => "ROLLBACK",
        }
    }
}

/// Renders the DDL form, `ON CONFLICT <KEYWORD>`.
impl fmt::Display for ConflictClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ON CONFLICT {}", self.keyword())
    }
}

/// Declared column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Blob,
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// Type name as written in DDL.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Blob => "BLOB",
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
        }
    }
}

/// Action taken on the child row when the referenced parent key changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForeignKeyAction {
    Cascade,
    NoAction,
    SetDefault,
    SetNull,
    Restrict,
}

impl ForeignKeyAction {
    /// Action text as written after `ON DELETE` / `ON UPDATE`.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::NoAction => "NO ACTION",
            Self::SetDefault => "SET DEFAULT",
            Self::SetNull => "SET NULL",
            Self::Restrict => "RESTRICT",
        }
    }
}

/// When a [`ForeignKeyAction`] fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForeignKeyConstraint {
    OnDelete(ForeignKeyAction),
    OnUpdate(ForeignKeyAction),
}

impl fmt::Display for ForeignKeyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnDelete(action) => write!(f, "ON DELETE {}", action.keyword()),
            Self::OnUpdate(action) => write!(f, "ON UPDATE {}", action.keyword()),
        }
    }
}

/// Reference from a column to `reference_table(reference_column)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    pub reference_table: String,
    pub reference_column: String,
    pub constraints: Vec<ForeignKeyConstraint>,
}

/// A single column constraint.
///
/// Key modifiers (`PrimaryKey`, `ForeignKey`) do not render inline; they are
/// collected into table-level clauses by the DDL builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnModifier {
    Type(ColumnType),
    NotNull(Option<ConflictClause>),
    Unique(Option<ConflictClause>),
    /// Default value expression, embedded verbatim.
    Default(String),
    PrimaryKey(Option<ConflictClause>),
    ForeignKey(ForeignKey),
}

impl ColumnModifier {
    pub const PRIMARY_KEY: Self = Self::PrimaryKey(None);
    pub const NOT_NULL: Self = Self::NotNull(None);
    pub const UNIQUE: Self = Self::Unique(None);

    /// PRIMARY KEY with a conflict clause.
    pub const fn primary_key(conflict: ConflictClause) -> Self {
        Self::PrimaryKey(Some(conflict))
    }

    /// NOT NULL with a conflict clause.
    pub const fn not_null(conflict: ConflictClause) -> Self {
        Self::NotNull(Some(conflict))
    }

    /// UNIQUE with a conflict clause.
    pub const fn unique(conflict: ConflictClause) -> Self {
        Self::Unique(Some(conflict))
    }

    /// DEFAULT with an expression embedded verbatim.
    pub fn default_value(value: impl Into<String>) -> Self {
        Self::Default(value.into())
    }

    /// Reference to `reference_table(reference_column)` with optional actions.
    pub fn foreign_key(
        reference_table: impl Into<String>,
        reference_column: impl Into<String>,
        constraints: impl IntoIterator<Item = ForeignKeyConstraint>,
    ) -> Self {
        Self::ForeignKey(ForeignKey {
            reference_table: reference_table.into(),
            reference_column: reference_column.into(),
            constraints: constraints.into_iter().collect(),
        })
    }

    /// Inline DDL text, or `None` for key modifiers.
    pub fn inline_sql(&self) -> Option<String> {
        match self {
            Self::Type(ty) => Some(ty.keyword().to_owned()),
            Self::NotNull(conflict) => Some(with_conflict("NOT NULL", *conflict)),
            Self::Unique(conflict) => Some(with_conflict("UNIQUE", *conflict)),
            Self::Default(value) => Some(format!("DEFAULT {value}")),
            Self::PrimaryKey(_) | Self::ForeignKey(_) => None,
        }
    }
}

fn with_conflict(keyword: &str, conflict: Option<ConflictClause>) -> String {
    match conflict {
        Some(conflict) => format!("{keyword} {conflict}"),
        None => keyword.to_owned(),
    }
}

impl From<ColumnType> for ColumnModifier {
    fn from(ty: ColumnType) -> Self {
        Self::Type(ty)
    }
}

/// Ordered list of modifiers for one column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnModifiers {
    modifiers: Vec<ColumnModifier>,
}

impl ColumnModifiers {
    /// An empty modifier list.
    pub const fn new() -> Self {
        Self {
            modifiers: Vec::new(),
        }
    }

    /// Modifiers in the order they were added.
    pub fn modifiers(&self) -> &[ColumnModifier] {
        &self.modifiers
    }

    /// Append `modifier`, returning the extended list.
    #[must_use]
    pub fn with(mut self, modifier: impl Into<ColumnModifier>) -> Self {
        self.modifiers.push(modifier.into());
        self
    }

    /// A BLOB column.
    pub fn blob() -> Self {
        ColumnType::Blob.into()
    }

    /// An INTEGER column.
    pub fn integer() -> Self {
        ColumnType::Integer.into()
    }

    /// A REAL column.
    pub fn real() -> Self {
        ColumnType::Real.into()
    }

    /// A TEXT column.
    pub fn text() -> Self {
        ColumnType::Text.into()
    }
}

impl From<ColumnModifier> for ColumnModifiers {
    fn from(modifier: ColumnModifier) -> Self {
        Self {
            modifiers: vec![modifier],
        }
    }
}

impl From<ColumnType> for ColumnModifiers {
    fn from(ty: ColumnType) -> Self {
        ColumnModifier::Type(ty).into()
    }
}

impl FromIterator<ColumnModifier> for ColumnModifiers {
    fn from_iter<I: IntoIterator<Item = ColumnModifier>>(iter: I) -> Self {
        Self {
            modifiers: iter.into_iter().collect(),
        }
    }
}

impl Add<ColumnModifier> for ColumnModifiers {
    type Output = Self;

    fn add(self, rhs: ColumnModifier) -> Self::Output {
        self.with(rhs)
    }
}

impl Add<ColumnModifier> for ColumnType {
    type Output = ColumnModifiers;

    fn add(self, rhs: ColumnModifier) -> Self::Output {
        ColumnModifiers::from(self).with(rhs)
    }
}

/// Columns of a table, in declaration order.
///
/// Defining a column twice replaces its modifiers and keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableDefinition {
    columns: Vec<(String, ColumnModifiers)>,
}

impl TableDefinition {
    /// A table with no columns.
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Define (or redefine) `name`.
    pub fn column(&mut self, name: impl Into<String>, modifiers: impl Into<ColumnModifiers>) -> &mut Self {
        let name = name.into();
        let modifiers = modifiers.into();
        match self.columns.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = modifiers,
            None => self.columns.push((name, modifiers)),
        }
        self
    }

    /// Modifiers of column `name`.
    pub fn get(&self, name: &str) -> Option<&ColumnModifiers> {
        self.columns
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, modifiers)| modifiers)
    }

    /// Columns in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnModifiers)> {
        self.columns.iter().map(|(name, modifiers)| (name.as_str(), modifiers))
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether no column is defined.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for TableDefinition
where
    K: Into<String>,
    V: Into<ColumnModifiers>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut def = Self::new();
        for (name, modifiers) in iter {
            def.column(name, modifiers);
        }
        def
    }
}
