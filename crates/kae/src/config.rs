//! Connection settings applied when a database is opened.

use std::path::Path;

use kae_error::{KaeError, Result};
use rusqlite::OpenFlags;
use serde::{Deserialize, Serialize};

const JOURNAL_MODES: [&str; 6] = ["delete", "truncate", "persist", "memory", "wal", "off"];
const SYNCHRONOUS_LEVELS: [&str; 4] = ["OFF", "NORMAL", "FULL", "EXTRA"];

/// Settings for a [`crate::Database`] connection.
///
/// Every field is optional in a config document; missing fields take the
/// [`Default`] value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Journal mode: `"delete"`, `"truncate"`, `"persist"`, `"memory"`, `"wal"` or `"off"`.
    pub journal_mode: String,
    /// Synchronous level: `"OFF"`, `"NORMAL"`, `"FULL"`, `"EXTRA"`.
    pub synchronous: String,
    /// Enforce `FOREIGN KEY` clauses.
    pub foreign_keys: bool,
    /// Busy timeout in milliseconds for lock contention.
    pub busy_timeout_ms: u32,
    /// Page cache size. Negative = KiB, positive = pages.
    pub cache_size: i64,
    /// Open the database file read-only.
    pub read_only: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            journal_mode: "delete".to_owned(),
            synchronous: "NORMAL".to_owned(),
            foreign_keys: true,
            busy_timeout_ms: 5000,
            cache_size: -2000,
            read_only: false,
        }
    }
}

impl DatabaseConfig {
    /// Parse a JSON config document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject values that are not valid PRAGMA arguments.
    pub fn validate(&self) -> Result<()> {
        if !JOURNAL_MODES
            .iter()
            .any(|mode| mode.eq_ignore_ascii_case(&self.journal_mode))
        {
            return Err(KaeError::invalid_config(format!(
                "unknown journal_mode '{}'",
                self.journal_mode
            )));
        }
        if !SYNCHRONOUS_LEVELS
            .iter()
            .any(|level| level.eq_ignore_ascii_case(&self.synchronous))
        {
            return Err(KaeError::invalid_config(format!(
                "unknown synchronous level '{}'",
                self.synchronous
            )));
        }
        Ok(())
    }

    /// PRAGMA statements run once on every new connection.
    ///
    /// A read-only connection leaves the journal mode alone.
    #[must_use]
    pub fn to_pragmas(&self) -> Vec<String> {
        let foreign_keys = if self.foreign_keys { "ON" } else { "OFF" };
        let mut pragmas = vec![
            format!("PRAGMA busy_timeout={};", self.busy_timeout_ms),
            format!("PRAGMA foreign_keys={foreign_keys};"),
            format!("PRAGMA synchronous={};", self.synchronous),
            format!("PRAGMA cache_size={};", self.cache_size),
        ];
        if !self.read_only {
            pragmas.push(format!("PRAGMA journal_mode={};", self.journal_mode));
        }
        pragmas
    }

    /// Open flags for a file-backed connection.
    #[must_use]
    pub fn open_flags(&self) -> OpenFlags {
        if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
        } else {
            OpenFlags::default()
        }
    }
}
