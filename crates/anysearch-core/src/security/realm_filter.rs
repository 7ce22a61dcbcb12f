//! Realm-based authorization filter.
//!
//! An administrator holds a set of realm scopes. Each scope is one of:
//!
//! - a realm path (`/even/two`), granting the realm and, for recursive
//!   searches, every realm below it;
//! - a group-owner realm (`/even@<groupKey>`), granting the identities
//!   related to a group the administrator owns;
//! - a dynamic realm identifier, granting the members of that dynamic realm.
//!
//! An empty scope set grants everything.

use std::collections::BTreeSet;

use anysearch_proto::{AnyKind, AttrOp, Predicate, SearchCond};
use tracing::{debug, warn};

use crate::catalog::{is_under, parse_group_owner_realm, Realm, RealmDirectory, ViewCatalog, ROOT_PATH};
use crate::error::{Error, Result};
use crate::query::SqlFragment;

const ALWAYS_TRUE: &str = "u.any_id IS NOT NULL";
const DENY_ALL: &str = "1=2";

/// Realms an administrator may see for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct RealmScopeFilter {
    /// Concrete realm keys.
    pub realm_keys: BTreeSet<String>,
    /// Dynamic realm keys.
    pub dyn_realm_keys: BTreeSet<String>,
    /// Keys of groups whose owned identities are visible.
    pub group_owners: BTreeSet<String>,
    /// WHERE fragment over the condition subquery aliased `u`.
    pub fragment: SqlFragment,
}

/// Builds [`RealmScopeFilter`]s for one identity kind.
pub struct RealmFilterBuilder<'a> {
    realms: &'a dyn RealmDirectory,
    catalog: ViewCatalog,
}

impl<'a> RealmFilterBuilder<'a> {
    /// Create a builder.
    pub fn new(realms: &'a dyn RealmDirectory, catalog: ViewCatalog) -> Self {
        Self { realms, catalog }
    }

    /// Compute the filter for a search rooted at `base`.
    ///
    /// When any dynamic realm is granted, concrete realm keys are dropped:
    /// dynamic realm membership then decides visibility on its own.
    pub fn build(&self, base: &Realm, recursive: bool, scopes: &[String]) -> Result<RealmScopeFilter> {
        let mut realm_keys = BTreeSet::new();
        let mut dyn_realm_keys = BTreeSet::new();
        let mut group_owners = BTreeSet::new();

        if scopes.is_empty() {
            return Ok(RealmScopeFilter {
                realm_keys,
                dyn_realm_keys,
                group_owners,
                fragment: SqlFragment::new(ALWAYS_TRUE),
            });
        }

        if recursive {
            for scope in scopes {
                if let Some((_, group_key)) = parse_group_owner_realm(scope) {
                    group_owners.insert(group_key.to_string());
                } else if scope.starts_with(ROOT_PATH) {
                    let realm = self
                        .realms
                        .find_by_full_path(scope)?
                        .ok_or_else(|| Error::InvalidRealm(format!("Invalid realm specified: {scope}")))?;
                    realm_keys.extend(self.realms.find_descendants(&realm.full_path, &base.full_path)?);
                } else {
                    match self.realms.find_dyn_realm(scope)? {
                        Some(key) => {
                            dyn_realm_keys.insert(key);
                        }
                        None => warn!(dyn_realm = %scope, "Ignoring invalid dynamic realm"),
                    }
                }
            }
            if !dyn_realm_keys.is_empty() {
                realm_keys.clear();
            }
        } else if scopes.iter().any(|scope| is_under(&base.full_path, scope)) {
            realm_keys.insert(base.key.clone());
        }

        let fragment = if !realm_keys.is_empty() {
            let placeholders = SqlFragment::join(
                realm_keys.iter().map(|key| SqlFragment::default().bind(key)),
                ", ",
            );
            SqlFragment::new(format!(
                "u.any_id IN (SELECT any_id FROM {} WHERE realm_id IN (",
                self.catalog.field().name
            ))
            .append(placeholders)
            .push("))")
        } else if dyn_realm_keys.is_empty() && group_owners.is_empty() {
            debug!(base = %base.full_path, "No realm in scope, denying all");
            SqlFragment::new(DENY_ALL)
        } else {
            SqlFragment::new(ALWAYS_TRUE)
        };

        Ok(RealmScopeFilter {
            realm_keys,
            dyn_realm_keys,
            group_owners,
            fragment,
        })
    }
}

/// AND the caller's condition with the dynamic realm and group ownership
/// restrictions of the filter.
///
/// Group owners restrict groups by key and other kinds by membership.
pub fn build_effective_cond(cond: &SearchCond, filter: &RealmScopeFilter, kind: AnyKind) -> SearchCond {
    let dyn_realms = SearchCond::or_all(
        filter
            .dyn_realm_keys
            .iter()
            .map(|key| SearchCond::leaf(Predicate::dyn_realm(key.as_str()))),
    );
    let owned = SearchCond::or_all(filter.group_owners.iter().map(|group| {
        SearchCond::leaf(match kind {
            AnyKind::Group => Predicate::field("key", AttrOp::Eq, group.as_str()),
            _ => Predicate::membership([group.as_str()]),
        })
    }));

    SearchCond::and_all(std::iter::once(cond.clone()).chain(dyn_realms).chain(owned))
        .unwrap_or_else(|| cond.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MemoryDirectory;
    use crate::query::SqlValue;
    use pretty_assertions::assert_eq;

    fn directory() -> MemoryDirectory {
        MemoryDirectory::new()
            .with_realm(Realm::new("r0", "/"))
            .with_realm(Realm::new("r1", "/even"))
            .with_realm(Realm::new("r2", "/even/two"))
            .with_realm(Realm::new("r3", "/odd"))
            .with_dyn_realm("vip", "dr-vip")
    }

    fn build(base: &str, recursive: bool, scopes: &[&str]) -> Result<RealmScopeFilter> {
        let dir = directory();
        let base = dir.find_by_full_path(base)?.expect("base realm");
        let scopes: Vec<String> = scopes.iter().map(|s| s.to_string()).collect();
        RealmFilterBuilder::new(&dir, ViewCatalog::new(AnyKind::User)).build(&base, recursive, &scopes)
    }

    #[test]
    fn test_empty_scopes_allow_everything() {
        let filter = build("/", true, &[]).unwrap();
        assert_eq!(filter.fragment.sql(), "u.any_id IS NOT NULL");
        assert!(filter.realm_keys.is_empty());
    }

    #[test]
    fn test_recursive_expands_descendants_under_base() {
        let filter = build("/even", true, &["/"]).unwrap();
        assert_eq!(
            filter.realm_keys.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["r1", "r2"]
        );
        assert_eq!(
            filter.fragment.sql(),
            "u.any_id IN (SELECT any_id FROM user_search WHERE realm_id IN (?, ?))"
        );
        assert_eq!(filter.fragment.params(), &[SqlValue::from("r1"), SqlValue::from("r2")]);
    }

    #[test]
    fn test_non_recursive_uses_base_only() {
        let filter = build("/even/two", false, &["/even"]).unwrap();
        assert_eq!(filter.realm_keys.iter().collect::<Vec<_>>(), vec!["r2"]);

        let denied = build("/odd", false, &["/even"]).unwrap();
        assert_eq!(denied.fragment.sql(), "1=2");
    }

    #[test]
    fn test_invalid_realm_path() {
        let err = build("/", true, &["/nowhere"]).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidRealm);
    }

    #[test]
    fn test_dyn_realm_clears_realm_keys() {
        let filter = build("/", true, &["/even", "vip", "ghost"]).unwrap();
        assert!(filter.realm_keys.is_empty());
        assert_eq!(filter.dyn_realm_keys.iter().collect::<Vec<_>>(), vec!["dr-vip"]);
        assert_eq!(filter.fragment.sql(), "u.any_id IS NOT NULL");
    }

    #[test]
    fn test_unknown_dyn_realm_only_denies() {
        let filter = build("/", true, &["ghost"]).unwrap();
        assert_eq!(filter.fragment.sql(), "1=2");
    }

    #[test]
    fn test_group_owner_scope() {
        let filter = build("/", true, &["/even@g1"]).unwrap();
        assert_eq!(filter.group_owners.iter().collect::<Vec<_>>(), vec!["g1"]);
        assert_eq!(filter.fragment.sql(), "u.any_id IS NOT NULL");
    }

    #[test]
    fn test_effective_cond() {
        let filter = build("/", true, &["vip", "/even@g1"]).unwrap();
        let cond = SearchCond::leaf(Predicate::role("admin"));

        let users = build_effective_cond(&cond, &filter, AnyKind::User);
        assert_eq!(
            users,
            SearchCond::and(
                SearchCond::and(cond.clone(), SearchCond::leaf(Predicate::dyn_realm("dr-vip"))),
                SearchCond::leaf(Predicate::membership(["g1"])),
            )
        );

        let groups = build_effective_cond(&cond, &filter, AnyKind::Group);
        assert_eq!(groups.leaf_count(), 3);

        let open = build("/", true, &[]).unwrap();
        assert_eq!(build_effective_cond(&cond, &open, AnyKind::User), cond);
    }
}
