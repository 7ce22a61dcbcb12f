//! Query assembly and execution.

use std::collections::HashSet;
use std::sync::Arc;

use anysearch_proto::{AnyKind, PageRequest, SearchCond};
use serde::Serialize;
use tracing::{debug, error, instrument};

use super::compiler::{compile, Compiled};
use super::dialect::{Dialect, DialectCache};
use super::fragment::SqlFragment;
use super::lower::Lowering;
use super::order::OrderBySupport;
use crate::catalog::{Realm, RealmDirectory, SchemaStore, ViewCatalog};
use crate::config::SearchConfig;
use crate::error::Result;
use crate::security::{build_effective_cond, RealmFilterBuilder, RealmScopeFilter};
use crate::store::SearchStore;

/// Keys of one page together with the total number of matches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    /// Identity keys of the requested page.
    pub keys: Vec<String>,
    /// Matches across all pages.
    pub total: u64,
}

/// A statement ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text and bind parameters.
    pub query: SqlFragment,
    /// `(offset, limit)` to apply, if paged.
    pub page: Option<(u64, u64)>,
}

/// Compiles search conditions and runs them against a [`SearchStore`].
pub struct SearchEngine<S: SearchStore> {
    store: Arc<S>,
    schemas: Arc<dyn SchemaStore>,
    realms: Arc<dyn RealmDirectory>,
    dialects: Arc<DialectCache>,
    config: SearchConfig,
}

impl<S: SearchStore> SearchEngine<S> {
    /// Create an engine with its own dialect cache.
    pub fn new(
        store: Arc<S>,
        schemas: Arc<dyn SchemaStore>,
        realms: Arc<dyn RealmDirectory>,
        config: SearchConfig,
    ) -> Self {
        Self {
            store,
            schemas,
            realms,
            dialects: Arc::new(DialectCache::new()),
            config,
        }
    }

    /// Share a dialect cache with other engines.
    pub fn with_dialect_cache(mut self, dialects: Arc<DialectCache>) -> Self {
        self.dialects = dialects;
        self
    }

    /// The configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Dialect of the configured domain.
    pub fn dialect(&self) -> Result<Dialect> {
        if let Some(dialect) = self.config.dialect {
            return Ok(dialect);
        }
        self.dialects
            .get_or_detect(&self.config.domain, || self.store.detect_dialect())
    }

    /// Count the identities matching `cond` within the admin's realms.
    ///
    /// Every error is propagated.
    #[instrument(skip_all, fields(kind = ?kind, recursive = recursive))]
    pub fn count(
        &self,
        base: &Realm,
        recursive: bool,
        scopes: &[String],
        cond: &SearchCond,
        kind: AnyKind,
    ) -> Result<u64> {
        let statement = self.count_statement(base, recursive, scopes, cond, kind)?;
        let (sql, params) = statement.query.into_parts();
        debug!(sql = %sql, params = params.len(), "Executing count");
        self.store.count(&sql, &params)
    }

    /// Keys of the identities matching `cond` within the admin's realms, in
    /// the requested order, each key once.
    ///
    /// Client errors are propagated. Store failures are logged and yield an
    /// empty result.
    #[instrument(skip_all, fields(kind = ?kind, recursive = recursive))]
    pub fn search(
        &self,
        base: &Realm,
        recursive: bool,
        scopes: &[String],
        cond: &SearchCond,
        page: &PageRequest,
        kind: AnyKind,
    ) -> Result<Vec<String>> {
        let result = self
            .search_statement(base, recursive, scopes, cond, page, kind)
            .and_then(|statement| {
                let (sql, params) = statement.query.into_parts();
                debug!(sql = %sql, params = params.len(), "Executing search");
                self.store.fetch_keys(&sql, &params, statement.page)
            });

        match result {
            Ok(keys) => Ok(dedup_keys(keys)),
            Err(e) if e.is_client_error() => Err(e),
            Err(e) => {
                error!(error = %e, kind = %kind, "Search failed, returning no results");
                Ok(Vec::new())
            }
        }
    }

    /// Run [`count`](Self::count) and [`search`](Self::search) for the same
    /// inputs.
    pub fn search_page(
        &self,
        base: &Realm,
        recursive: bool,
        scopes: &[String],
        cond: &SearchCond,
        page: &PageRequest,
        kind: AnyKind,
    ) -> Result<SearchPage> {
        let total = self.count(base, recursive, scopes, cond, kind)?;
        let keys = self.search(base, recursive, scopes, cond, page, kind)?;
        Ok(SearchPage { keys, total })
    }

    /// Build the COUNT statement without executing it.
    pub fn count_statement(
        &self,
        base: &Realm,
        recursive: bool,
        scopes: &[String],
        cond: &SearchCond,
        kind: AnyKind,
    ) -> Result<Statement> {
        let (compiled, filter) = self.prepare(base, recursive, scopes, cond, kind)?;
        let query = SqlFragment::new("SELECT COUNT(any_id) FROM (SELECT u.any_id FROM (")
            .append(compiled.fragment)
            .push(") u WHERE ")
            .append(filter.fragment)
            .push(") count_any_id");
        Ok(Statement { query, page: None })
    }

    /// Build the SELECT statement without executing it.
    pub fn search_statement(
        &self,
        base: &Realm,
        recursive: bool,
        scopes: &[String],
        cond: &SearchCond,
        page: &PageRequest,
        kind: AnyKind,
    ) -> Result<Statement> {
        let catalog = ViewCatalog::new(kind);
        let (compiled, filter) = self.prepare(base, recursive, scopes, cond, kind)?;
        let order = OrderBySupport::plan(catalog, self.schemas.as_ref(), &page.sort)?;
        let augment = order.non_mandatory || compiled.non_mandatory;

        let mut query = SqlFragment::new(format!("SELECT DISTINCT u.any_id{} FROM (", order.select_list()))
            .append(compiled.fragment)
            .push(") u");
        for source in order.sources(catalog.field(), augment) {
            query = query.push(", ").append(source);
        }

        let conditions = order
            .join_conditions()
            .into_iter()
            .chain(std::iter::once(filter.fragment));
        let query = query
            .push(" WHERE ")
            .append(SqlFragment::join(conditions, " AND "))
            .push(&order.order_by_clause());

        let page = page.pagination.as_ref().map(|pagination| {
            let size = u64::from(self.config.clamp_page_size(pagination.size));
            (u64::from(pagination.page) * size, size)
        });

        Ok(Statement { query, page })
    }

    /// Authorization filter plus the compiled effective condition.
    fn prepare(
        &self,
        base: &Realm,
        recursive: bool,
        scopes: &[String],
        cond: &SearchCond,
        kind: AnyKind,
    ) -> Result<(Compiled, RealmScopeFilter)> {
        let catalog = ViewCatalog::new(kind);
        let filter = RealmFilterBuilder::new(self.realms.as_ref(), catalog).build(base, recursive, scopes)?;
        let effective = build_effective_cond(cond, &filter, kind);

        let dialect = self.dialect()?;
        let lowering = Lowering::new(
            catalog,
            dialect,
            self.schemas.as_ref(),
            self.realms.as_ref(),
            &self.config.realm_field,
        );
        let compiled = compile(&lowering, &effective)?;
        Ok((compiled, filter))
    }
}

/// Drop repeated keys, keeping the first occurrence.
fn dedup_keys(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::with_capacity(keys.len());
    keys.into_iter().filter(|key| seen.insert(key.clone())).collect()
}
