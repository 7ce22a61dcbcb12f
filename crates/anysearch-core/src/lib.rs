//! anysearch core - search condition compiler for identity search views.
//!
//! Given a [`SearchCond`](proto::SearchCond) over users, groups or any
//! objects, this crate lowers every predicate to SQL against per-kind search
//! views, weaves in a realm-based authorization filter, plans ORDER BY joins
//! over core fields or typed attributes, and executes the resulting COUNT and
//! SELECT statements through a [`SearchStore`].
//!
//! # Example
//!
//! ```ignore
//! use anysearch_core::{Realm, SearchConfig, SearchEngine, SqliteStore};
//! use anysearch_core::proto::{AnyKind, AttrOp, PageRequest, Predicate, SearchCond};
//! use std::sync::Arc;
//!
//! let store = Arc::new(SqliteStore::open("identities.db")?);
//! let engine = SearchEngine::new(store.clone(), store.clone(), store, SearchConfig::default());
//! let root = Realm::new("root-key", "/");
//! let cond = SearchCond::leaf(Predicate::attr("email", AttrOp::Ilike, "%@acme.com"));
//! let keys = engine.search(&root, true, &["/".to_string()], &cond, &PageRequest::of(0, 10), AnyKind::User)?;
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod query;
pub mod security;
pub mod store;

pub use catalog::{
    AttrSchemaType, FieldDef, MemoryDirectory, PlainSchema, Realm, RealmDirectory, SchemaStore,
    SearchView, ViewCatalog,
};
pub use config::SearchConfig;
pub use error::{Error, ErrorKind, Result};
pub use query::{
    Compiled, Dialect, DialectCache, OrderBySupport, OrderItem, SearchEngine, SearchPage,
    SqlFragment, SqlValue,
};
pub use security::{build_effective_cond, RealmFilterBuilder, RealmScopeFilter};
pub use store::{SearchStore, SqliteStore};

/// Re-export condition model types.
pub use anysearch_proto as proto;
