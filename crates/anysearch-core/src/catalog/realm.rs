//! Realm hierarchy collaborator.
//!
//! Realms form a tree addressed by `/`-separated full paths. The hierarchy
//! itself is owned elsewhere and reached through [`RealmDirectory`].

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Full path of the root realm.
pub const ROOT_PATH: &str = "/";

/// Separator between a realm path and a group key in a group-owner realm.
pub const GROUP_OWNER_SEPARATOR: char = '@';

/// A realm: its key and its full path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Realm {
    /// Realm key.
    pub key: String,
    /// Full path, e.g. `/even/two`.
    pub full_path: String,
}

impl Realm {
    /// Create a realm.
    pub fn new(key: impl Into<String>, full_path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            full_path: full_path.into(),
        }
    }
}

/// Whether `path` equals `ancestor` or lies below it.
///
/// Matching is per path segment: `/even` is not under `/ev`.
pub fn is_under(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT_PATH {
        return path.starts_with(ROOT_PATH);
    }
    match path.strip_prefix(ancestor) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Split a group-owner realm `<realmPath>@<groupKey>` into its parts.
///
/// Returns `None` for any other scope string.
pub fn parse_group_owner_realm(scope: &str) -> Option<(&str, &str)> {
    let (realm_path, group_key) = scope.split_once(GROUP_OWNER_SEPARATOR)?;
    if realm_path.is_empty() || group_key.is_empty() || group_key.contains(GROUP_OWNER_SEPARATOR)
    {
        return None;
    }
    Some((realm_path, group_key))
}

/// Lookup of realms and dynamic realms.
pub trait RealmDirectory: Send + Sync {
    /// Find a realm by full path.
    fn find_by_full_path(&self, full_path: &str) -> Result<Option<Realm>>;

    /// Keys of the realm at `full_path` and all of its descendants, restricted
    /// to realms at or below `base_path`.
    fn find_descendants(&self, full_path: &str, base_path: &str) -> Result<Vec<String>>;

    /// Resolve a dynamic realm identifier to its key.
    fn find_dyn_realm(&self, id: &str) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_under() {
        assert!(is_under("/even/two", "/"));
        assert!(is_under("/even/two", "/even"));
        assert!(is_under("/even", "/even"));
        assert!(!is_under("/evenmore", "/even"));
        assert!(!is_under("/odd", "/even"));
    }

    #[test]
    fn test_parse_group_owner_realm() {
        assert_eq!(parse_group_owner_realm("/even@g-1"), Some(("/even", "g-1")));
        assert_eq!(parse_group_owner_realm("/even"), None);
        assert_eq!(parse_group_owner_realm("@g-1"), None);
        assert_eq!(parse_group_owner_realm("/even@"), None);
        assert_eq!(parse_group_owner_realm("/a@b@c"), None);
    }
}
