//! Value types shared across the kae crates.
//!
//! [`SqlValue`] models the five SQLite storage classes as a tagged union so
//! that decoded rows can be matched exhaustively instead of downcast.

pub mod from_value;
pub mod value;

pub use from_value::FromSqlValue;
pub use value::SqlValue;

/// SQLite storage class of a stored value.
///
/// See <https://www.sqlite.org/datatype3.html#storage_classes_and_datatypes>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum StorageClass {
    Null,
    Integer,
    Real,
    Text,
    Blob,
}

impl StorageClass {
    /// Lower-case name, as returned by SQL `typeof()`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Text => "text",
            Self::Blob => "blob",
        }
    }
}

impl std::fmt::Display for StorageClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
