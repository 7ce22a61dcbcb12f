//! Search engine configuration.

use serde::Deserialize;

use crate::catalog::REALM_FIELD;
use crate::error::{Error, Result};
use crate::query::Dialect;

/// Domain used when none is configured.
pub const DEFAULT_DOMAIN: &str = "Master";

/// Configuration for a [`SearchEngine`](crate::SearchEngine).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Tenant domain, the key of the dialect cache.
    pub domain: String,

    /// Dialect override. When set the store is never probed.
    pub dialect: Option<Dialect>,

    /// Upper bound for page sizes. Larger requests are clamped.
    pub max_page_size: Option<u32>,

    /// Core field holding the realm reference.
    pub realm_field: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            dialect: None,
            max_page_size: None,
            realm_field: REALM_FIELD.to_string(),
        }
    }
}

impl SearchConfig {
    /// Parse a configuration from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::InvalidSearchParameters(format!("invalid search configuration: {e}")))
    }

    /// Set the domain.
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    /// Force a dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Cap page sizes.
    pub fn with_max_page_size(mut self, max: u32) -> Self {
        self.max_page_size = Some(max);
        self
    }

    /// Set the realm field name.
    pub fn with_realm_field(mut self, field: impl Into<String>) -> Self {
        self.realm_field = field.into();
        self
    }

    /// Apply the page size cap.
    pub fn clamp_page_size(&self, size: u32) -> u32 {
        match self.max_page_size {
            Some(max) => size.min(max),
            None => size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.domain, "Master");
        assert_eq!(config.realm_field, "realm");
        assert!(config.dialect.is_none());
        assert_eq!(config.clamp_page_size(500), 500);
    }

    #[test]
    fn test_from_json_partial() {
        let config = SearchConfig::from_json(r#"{"domain":"Two","dialect":"oracle","max_page_size":50}"#)
            .unwrap();
        assert_eq!(config.domain, "Two");
        assert_eq!(config.dialect, Some(Dialect::Oracle));
        assert_eq!(config.realm_field, "realm");
        assert_eq!(config.clamp_page_size(500), 50);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = SearchConfig::from_json("{not json").unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_builder() {
        let config = SearchConfig::default()
            .with_domain("Three")
            .with_dialect(Dialect::Generic)
            .with_max_page_size(10)
            .with_realm_field("realm");
        assert_eq!(config.domain, "Three");
        assert_eq!(config.clamp_page_size(11), 10);
    }
}
