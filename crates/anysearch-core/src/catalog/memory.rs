//! In-memory schema store and realm directory.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

use super::realm::{is_under, Realm, RealmDirectory};
use super::schema::{PlainSchema, SchemaStore};
use crate::error::Result;

/// Schema store and realm directory kept in memory.
///
/// Useful for embedding with a static metadata set and for tests.
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    schemas: RwLock<HashMap<String, PlainSchema>>,
    /// Realms keyed by full path.
    realms: RwLock<BTreeMap<String, Realm>>,
    /// Dynamic realm id -> key.
    dyn_realms: RwLock<HashMap<String, String>>,
}

impl MemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema.
    pub fn add_schema(&self, schema: PlainSchema) {
        self.schemas.write().insert(schema.key.clone(), schema);
    }

    /// Register a realm.
    pub fn add_realm(&self, realm: Realm) {
        self.realms.write().insert(realm.full_path.clone(), realm);
    }

    /// Register a dynamic realm.
    pub fn add_dyn_realm(&self, id: impl Into<String>, key: impl Into<String>) {
        self.dyn_realms.write().insert(id.into(), key.into());
    }

    /// Builder form of [`add_schema`](Self::add_schema).
    pub fn with_schema(self, schema: PlainSchema) -> Self {
        self.add_schema(schema);
        self
    }

    /// Builder form of [`add_realm`](Self::add_realm).
    pub fn with_realm(self, realm: Realm) -> Self {
        self.add_realm(realm);
        self
    }

    /// Builder form of [`add_dyn_realm`](Self::add_dyn_realm).
    pub fn with_dyn_realm(self, id: impl Into<String>, key: impl Into<String>) -> Self {
        self.add_dyn_realm(id, key);
        self
    }
}

impl SchemaStore for MemoryDirectory {
    fn find_schema(&self, key: &str) -> Result<Option<PlainSchema>> {
        Ok(self.schemas.read().get(key).cloned())
    }
}

impl RealmDirectory for MemoryDirectory {
    fn find_by_full_path(&self, full_path: &str) -> Result<Option<Realm>> {
        Ok(self.realms.read().get(full_path).cloned())
    }

    fn find_descendants(&self, full_path: &str, base_path: &str) -> Result<Vec<String>> {
        Ok(self
            .realms
            .read()
            .values()
            .filter(|realm| is_under(&realm.full_path, full_path))
            .filter(|realm| is_under(&realm.full_path, base_path))
            .map(|realm| realm.key.clone())
            .collect())
    }

    fn find_dyn_realm(&self, id: &str) -> Result<Option<String>> {
        Ok(self.dyn_realms.read().get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AttrSchemaType;

    fn directory() -> MemoryDirectory {
        MemoryDirectory::new()
            .with_realm(Realm::new("r0", "/"))
            .with_realm(Realm::new("r1", "/even"))
            .with_realm(Realm::new("r2", "/even/two"))
            .with_realm(Realm::new("r3", "/odd"))
            .with_dyn_realm("vip", "dr-vip")
            .with_schema(PlainSchema::new("email", AttrSchemaType::String))
    }

    #[test]
    fn test_descendants_bounded_by_base() {
        let dir = directory();
        let mut all = dir.find_descendants("/", "/").unwrap();
        all.sort();
        assert_eq!(all, vec!["r0", "r1", "r2", "r3"]);

        let mut even = dir.find_descendants("/", "/even").unwrap();
        even.sort();
        assert_eq!(even, vec!["r1", "r2"]);

        assert!(dir.find_descendants("/odd", "/even").unwrap().is_empty());
    }

    #[test]
    fn test_lookups() {
        let dir = directory();
        assert_eq!(dir.find_by_full_path("/even").unwrap().unwrap().key, "r1");
        assert!(dir.find_by_full_path("/nowhere").unwrap().is_none());
        assert_eq!(dir.find_dyn_realm("vip").unwrap().as_deref(), Some("dr-vip"));
        assert!(dir.find_schema("email").unwrap().is_some());
        assert!(dir.find_schema("phone").unwrap().is_none());
    }
}
