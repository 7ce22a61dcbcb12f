//! Search condition model for anysearch.
//!
//! This crate defines the data types callers use to describe an identity
//! search: the boolean condition tree, the identity kind being searched, and
//! the page/sort request. It holds no behavior beyond construction helpers;
//! compilation to SQL lives in `anysearch-core`.
//!
//! # Modules
//!
//! - [`kind`] - Identity kinds (users, groups, any objects)
//! - [`cond`] - Leaf predicates and the boolean condition tree
//! - [`page`] - Ordering and pagination requests
//!
//! # Serialization
//!
//! All types derive `serde::Serialize` and `serde::Deserialize`, so a
//! condition can travel as JSON:
//!
//! ```
//! use anysearch_proto::{AttrOp, Predicate, SearchCond};
//!
//! let cond = SearchCond::and(
//!     SearchCond::leaf(Predicate::attr("email", AttrOp::Ilike, "%@acme.com")),
//!     SearchCond::leaf(Predicate::resource("ldap-res")),
//! );
//! let json = serde_json::to_string(&cond).unwrap();
//! let back: SearchCond = serde_json::from_str(&json).unwrap();
//! assert_eq!(cond, back);
//! ```

pub mod cond;
pub mod kind;
pub mod page;

pub use cond::{AttrCond, AttrOp, FieldCond, Predicate, SearchCond};
pub use kind::AnyKind;
pub use page::{OrderDirection, OrderSpec, PageRequest, Pagination};
