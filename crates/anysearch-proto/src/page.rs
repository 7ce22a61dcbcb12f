//! Ordering and pagination requests.

use serde::{Deserialize, Serialize};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

impl OrderDirection {
    /// SQL keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

/// A single sort clause.
///
/// `property` is either a core field name (`username`, `creationDate`, ...) or
/// a plain schema key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSpec {
    /// Property to order by.
    pub property: String,
    /// Sort direction.
    pub direction: OrderDirection,
}

impl OrderSpec {
    /// Create an ascending order spec.
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: OrderDirection::Asc,
        }
    }

    /// Create a descending order spec.
    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            direction: OrderDirection::Desc,
        }
    }
}

/// Zero-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Zero-based page number.
    pub page: u32,
    /// Maximum number of keys per page.
    pub size: u32,
}

impl Pagination {
    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// Page and sort request for a search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Pagination; `None` returns every match.
    #[serde(default)]
    pub pagination: Option<Pagination>,
    /// Sort clauses, most significant first.
    #[serde(default)]
    pub sort: Vec<OrderSpec>,
}

impl PageRequest {
    /// Request every match, unordered.
    pub fn unpaged() -> Self {
        Self::default()
    }

    /// Request one page.
    pub fn of(page: u32, size: u32) -> Self {
        Self {
            pagination: Some(Pagination { page, size }),
            sort: Vec::new(),
        }
    }

    /// Append a sort clause.
    pub fn with_order(mut self, order: OrderSpec) -> Self {
        self.sort.push(order);
        self
    }

    /// Whether a page window applies.
    pub fn is_paged(&self) -> bool {
        self.pagination.is_some()
    }
}
