//! Relational execution interface.

mod sqlite;

pub use sqlite::{SqliteStore, METADATA_SCHEMA};

use crate::error::Result;
use crate::query::{Dialect, SqlValue};

/// Executes compiled search statements.
///
/// Statements use anonymous `?` placeholders bound positionally from
/// `params`.
pub trait SearchStore: Send + Sync {
    /// Probe the database vendor.
    fn detect_dialect(&self) -> Result<Dialect>;

    /// Run a statement returning a single count.
    fn count(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    /// Run a statement and return the first column of every row as a key.
    ///
    /// `page` is `(offset, limit)`.
    fn fetch_keys(&self, sql: &str, params: &[SqlValue], page: Option<(u64, u64)>) -> Result<Vec<String>>;
}
