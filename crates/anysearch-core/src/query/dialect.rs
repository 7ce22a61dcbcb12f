//! Database dialect detection and the per-domain dialect cache.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// SQL dialect quirks the compiler must honor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Standard SQL (PostgreSQL, MySQL, SQLite, ...).
    #[default]
    Generic,
    /// Oracle: LIKE needs an explicit escape character to match a literal `_`.
    Oracle,
}

impl Dialect {
    /// Clause appended after LIKE patterns, if any.
    pub fn like_escape(&self) -> Option<&'static str> {
        match self {
            Dialect::Generic => None,
            Dialect::Oracle => Some(" ESCAPE '\\'"),
        }
    }

    /// Guess the dialect from a database product name.
    pub fn from_product_name(name: &str) -> Self {
        if name.to_ascii_lowercase().contains("oracle") {
            Dialect::Oracle
        } else {
            Dialect::Generic
        }
    }
}

/// Dialect per tenant domain, computed once and kept for the process lifetime.
///
/// Detection runs outside any lock; two racing callers may both detect, and
/// the first insert wins. A domain's database vendor does not change at
/// runtime, so entries never expire.
#[derive(Debug, Default)]
pub struct DialectCache {
    entries: DashMap<String, Dialect>,
}

impl DialectCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached dialect for a domain, if known.
    pub fn get(&self, domain: &str) -> Option<Dialect> {
        self.entries.get(domain).map(|entry| *entry)
    }

    /// Cached dialect for a domain, detecting and storing it when absent.
    pub fn get_or_detect<F>(&self, domain: &str, detect: F) -> Result<Dialect>
    where
        F: FnOnce() -> Result<Dialect>,
    {
        if let Some(dialect) = self.get(domain) {
            return Ok(dialect);
        }
        let detected = detect()?;
        Ok(*self.entries.entry(domain.to_string()).or_insert(detected))
    }

    /// Number of cached domains.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no domain is cached yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::Cell;

    #[test]
    fn test_detects_once_per_domain() {
        let cache = DialectCache::new();
        let calls = Cell::new(0);
        let detect = || {
            calls.set(calls.get() + 1);
            Ok(Dialect::Oracle)
        };

        assert_eq!(cache.get_or_detect("Master", detect).unwrap(), Dialect::Oracle);
        assert_eq!(
            cache.get_or_detect("Master", || Ok(Dialect::Generic)).unwrap(),
            Dialect::Oracle
        );
        assert_eq!(calls.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failed_detection_is_not_cached() {
        let cache = DialectCache::new();
        let err = cache
            .get_or_detect("Two", || Err(Error::Store("offline".into())))
            .unwrap_err();
        assert!(!err.is_client_error());
        assert!(cache.get("Two").is_none());
    }

    #[test]
    fn test_product_names() {
        assert_eq!(Dialect::from_product_name("Oracle Database 19c"), Dialect::Oracle);
        assert_eq!(Dialect::from_product_name("PostgreSQL"), Dialect::Generic);
        assert!(Dialect::Generic.like_escape().is_none());
    }
}
