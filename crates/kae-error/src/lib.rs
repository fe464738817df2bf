use thiserror::Error;

/// Primary error type for kae operations.
///
/// Engine failures are carried through unchanged in [`KaeError::Sqlite`];
/// the remaining variants are raised by the library itself (row access,
/// cursor bounds, transaction control, configuration).
#[derive(Error, Debug)]
pub enum KaeError {
    // === Engine Errors ===
    /// Error reported by the embedded SQLite engine.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// File I/O error (opening a database path, reading a config file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Row Access Errors ===
    /// The decoded row has no value of the requested storage class for `key`.
    #[error("no element for '{key}'")]
    NoSuchElement { key: String },

    /// Type mismatch while extracting a typed value.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Cursor was asked for a row it does not have.
    #[error("cursor index {index} out of bounds (row count {count})")]
    CursorOutOfBounds { index: usize, count: usize },

    // === Transaction Control ===
    /// Raised by a transaction body to roll back without reporting a failure.
    #[error("transaction aborted")]
    TransactionAborted,

    // === Configuration Errors ===
    /// Configuration document could not be parsed.
    #[error("config: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration value is outside the accepted range.
    #[error("invalid config: {detail}")]
    InvalidConfig { detail: String },
}

/// SQLite primary result codes.
///
/// Mirrors every primary code defined in `sqlite3.h`, with the same numeric
/// values, so an engine result code always has a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ErrorCode {
    /// Successful result.
    Ok = 0,
    /// Generic error.
    Error = 1,
    /// Internal logic error.
    Internal = 2,
    /// Access permission denied.
    Perm = 3,
    /// Callback requested abort.
    Abort = 4,
    /// Database file is locked.
    Busy = 5,
    /// Table is locked.
    Locked = 6,
    /// Out of memory.
    NoMem = 7,
    /// Attempt to write a read-only database.
    ReadOnly = 8,
    /// Interrupted by `sqlite3_interrupt()`.
    Interrupt = 9,
    /// Disk I/O error.
    IoErr = 10,
    /// Database disk image is malformed.
    Corrupt = 11,
    /// Not found (internal).
    NotFound = 12,
    /// Database or disk is full.
    Full = 13,
    /// Unable to open database file.
    CantOpen = 14,
    /// Locking protocol error.
    Protocol = 15,
    /// (Not used).
    Empty = 16,
    /// Database schema has changed.
    Schema = 17,
    /// String or BLOB exceeds size limit.
    TooBig = 18,
    /// Constraint violation.
    Constraint = 19,
    /// Data type mismatch.
    Mismatch = 20,
    /// Library used incorrectly.
    Misuse = 21,
    /// OS feature not available.
    NoLfs = 22,
    /// Authorization denied.
    Auth = 23,
    /// Not used.
    Format = 24,
    /// Bind parameter out of range.
    Range = 25,
    /// Not a database file.
    NotADb = 26,
    /// Notification from `sqlite3_log()`.
    Notice = 27,
    /// Warning from `sqlite3_log()`.
    Warning = 28,
    /// `sqlite3_step()` has another row ready.
    Row = 100,
    /// `sqlite3_step()` has finished executing.
    Done = 101,
}

impl ErrorCode {
    /// Map a (possibly extended) SQLite result code to its primary code.
    pub const fn from_raw(code: i32) -> Self {
        match code & 0xff {
            0 => Self::Ok,
            2 => Self::Internal,
            3 => Self::Perm,
            4 => Self::Abort,
            5 => Self::Busy,
            6 => Self::Locked,
            7 => Self::NoMem,
            8 => Self::ReadOnly,
            9 => Self::Interrupt,
            10 => Self::IoErr,
            11 => Self::Corrupt,
            12 => Self::NotFound,
            13 => Self::Full,
            14 => Self::CantOpen,
            15 => Self::Protocol,
            16 => Self::Empty,
            17 => Self::Schema,
            18 => Self::TooBig,
            19 => Self::Constraint,
            20 => Self::Mismatch,
            21 => Self::Misuse,
            22 => Self::NoLfs,
            23 => Self::Auth,
            24 => Self::Format,
            25 => Self::Range,
            26 => Self::NotADb,
            27 => Self::Notice,
            28 => Self::Warning,
            100 => Self::Row,
            101 => Self::Done,
            _ => Self::Error,
        }
    }
}

impl KaeError {
    /// Map this error to a SQLite error code.
    #[allow(clippy::match_same_arms)]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) => {
                ErrorCode::from_raw(err.extended_code)
            }
            Self::Sqlite(rusqlite::Error::QueryReturnedNoRows) => ErrorCode::NotFound,
            Self::Sqlite(
                rusqlite::Error::InvalidColumnType(..) | rusqlite::Error::FromSqlConversionFailure(..),
            ) => ErrorCode::Mismatch,
            Self::Sqlite(
                rusqlite::Error::InvalidParameterCount(..)
                | rusqlite::Error::InvalidColumnIndex(_),
            ) => ErrorCode::Range,
            Self::Sqlite(_) => ErrorCode::Error,
            Self::Io(_) => ErrorCode::IoErr,
            Self::NoSuchElement { .. } => ErrorCode::NotFound,
            Self::TypeMismatch { .. } => ErrorCode::Mismatch,
            Self::CursorOutOfBounds { .. } => ErrorCode::Range,
            Self::TransactionAborted => ErrorCode::Abort,
            Self::Config(_) | Self::InvalidConfig { .. } => ErrorCode::Misuse,
        }
    }

    /// Whether the engine rejected a statement because of a constraint.
    pub fn is_constraint_violation(&self) -> bool {
        self.error_code() == ErrorCode::Constraint
    }

    /// Whether this is the explicit abort signal of a transaction body.
    pub const fn is_transaction_abort(&self) -> bool {
        matches!(self, Self::TransactionAborted)
    }

    /// Create a missing-element error.
    pub fn no_such_element(key: impl Into<String>) -> Self {
        Self::NoSuchElement { key: key.into() }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create an invalid-config error.
    pub fn invalid_config(detail: impl Into<String>) -> Self {
        Self::InvalidConfig {
            detail: detail.into(),
        }
    }
}

/// Result type alias using `KaeError`.
pub type Result<T> = std::result::Result<T, KaeError>;
