//! SQLite backend.
//!
//! One connection serves the search views, the plain schema metadata and the
//! realm hierarchy. The views are expected to exist already; this module only
//! creates the metadata tables.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::types::{ToSql, ToSqlOutput, Value};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use tracing::debug;

use super::SearchStore;
use crate::catalog::{is_under, AttrSchemaType, PlainSchema, Realm, RealmDirectory, SchemaStore};
use crate::error::{Error, Result};
use crate::query::{Dialect, SqlValue};

/// Separator of enumeration values in `plain_schema.enum_values`.
const ENUM_SEPARATOR: char = ';';

/// DDL for the metadata tables read by [`SqliteStore`].
pub const METADATA_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS realm (
    realm_key TEXT PRIMARY KEY,
    full_path TEXT NOT NULL UNIQUE
);
CREATE TABLE IF NOT EXISTS dyn_realm (
    id TEXT PRIMARY KEY,
    dyn_realm_key TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS plain_schema (
    schema_key TEXT PRIMARY KEY,
    schema_type TEXT NOT NULL,
    multivalue INTEGER NOT NULL DEFAULT 0,
    unique_constraint INTEGER NOT NULL DEFAULT 0,
    mandatory_condition TEXT NOT NULL DEFAULT 'false',
    enum_values TEXT
);
";

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::String(s) => ToSqlOutput::from(s.as_str()),
            SqlValue::Long(v) => ToSqlOutput::from(*v),
            SqlValue::Double(v) => ToSqlOutput::from(*v),
            SqlValue::Boolean(v) => ToSqlOutput::from(i64::from(*v)),
            SqlValue::Date(d) => ToSqlOutput::Owned(Value::Text(SqlValue::format_date(d))),
        })
    }
}

/// SQLite-backed search store, schema store and realm directory.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_connection(Connection::open(path)?))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_connection(Connection::open_in_memory()?))
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Create the metadata tables if missing.
    pub fn init_metadata(&self) -> Result<()> {
        self.execute_batch(METADATA_SCHEMA)
    }

    /// Execute a batch of statements.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn.lock().execute_batch(sql)?;
        Ok(())
    }

    /// Register a realm.
    pub fn insert_realm(&self, realm: &Realm) -> Result<()> {
        self.conn.lock().execute(
            "INSERT INTO realm (realm_key, full_path) VALUES (?1, ?2)",
            params![realm.key, realm.full_path],
        )?;
        Ok(())
    }

    /// Register a plain schema.
    pub fn insert_schema(&self, schema: &PlainSchema) -> Result<()> {
        let enum_values = (!schema.enum_values.is_empty())
            .then(|| schema.enum_values.join(&ENUM_SEPARATOR.to_string()));
        self.conn.lock().execute(
            "INSERT INTO plain_schema \
             (schema_key, schema_type, multivalue, unique_constraint, mandatory_condition, enum_values) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                schema.key,
                format!("{:?}", schema.schema_type),
                schema.multivalue,
                schema.unique_constraint,
                schema.mandatory_condition,
                enum_values
            ],
        )?;
        Ok(())
    }

    fn directory_error(e: rusqlite::Error) -> Error {
        Error::Directory(e.to_string())
    }
}

impl SearchStore for SqliteStore {
    fn detect_dialect(&self) -> Result<Dialect> {
        let version: String = self
            .conn
            .lock()
            .query_row("SELECT sqlite_version()", [], |row| row.get(0))?;
        debug!(version = %version, "Detected SQLite");
        Ok(Dialect::from_product_name("SQLite"))
    }

    fn count(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let count: i64 = self
            .conn
            .lock()
            .query_row(sql, params_from_iter(params.iter()), |row| row.get(0))?;
        u64::try_from(count).map_err(|_| Error::Store(format!("negative count {count}")))
    }

    fn fetch_keys(&self, sql: &str, params: &[SqlValue], page: Option<(u64, u64)>) -> Result<Vec<String>> {
        let sql = match page {
            Some((offset, limit)) => format!("{sql} LIMIT {limit} OFFSET {offset}"),
            None => sql.to_string(),
        };
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let keys = stmt
            .query_map(params_from_iter(params.iter()), |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(keys)
    }
}

impl SchemaStore for SqliteStore {
    fn find_schema(&self, key: &str) -> Result<Option<PlainSchema>> {
        let row = self
            .conn
            .lock()
            .query_row(
                "SELECT schema_key, schema_type, multivalue, unique_constraint, mandatory_condition, enum_values \
                 FROM plain_schema WHERE schema_key = ?1",
                [key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, bool>(2)?,
                        row.get::<_, bool>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()
            .map_err(Self::directory_error)?;

        let Some((key, type_name, multivalue, unique_constraint, mandatory_condition, enum_values)) = row
        else {
            return Ok(None);
        };
        let schema_type = AttrSchemaType::parse(&type_name)
            .ok_or_else(|| Error::Directory(format!("unknown schema type {type_name} for {key}")))?;

        Ok(Some(PlainSchema {
            key,
            schema_type,
            multivalue,
            unique_constraint,
            mandatory_condition,
            enum_values: enum_values
                .map(|values| {
                    values
                        .split(ENUM_SEPARATOR)
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        }))
    }
}

impl RealmDirectory for SqliteStore {
    fn find_by_full_path(&self, full_path: &str) -> Result<Option<Realm>> {
        self.conn
            .lock()
            .query_row(
                "SELECT realm_key, full_path FROM realm WHERE full_path = ?1",
                [full_path],
                |row| Ok(Realm::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()
            .map_err(Self::directory_error)
    }

    fn find_descendants(&self, full_path: &str, base_path: &str) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare("SELECT realm_key, full_path FROM realm ORDER BY full_path")
            .map_err(Self::directory_error)?;
        let realms = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(Self::directory_error)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Self::directory_error)?;

        Ok(realms
            .into_iter()
            .filter(|(_, path)| is_under(path, full_path) && is_under(path, base_path))
            .map(|(key, _)| key)
            .collect())
    }

    fn find_dyn_realm(&self, id: &str) -> Result<Option<String>> {
        self.conn
            .lock()
            .query_row("SELECT dyn_realm_key FROM dyn_realm WHERE id = ?1", [id], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Self::directory_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.init_metadata().unwrap();
        store
    }

    #[test]
    fn test_schema_roundtrip() {
        let store = store();
        let schema = PlainSchema::new("color", AttrSchemaType::Enum)
            .with_multivalue()
            .with_enum_values(["red", "green"]);
        store.insert_schema(&schema).unwrap();

        assert_eq!(store.find_schema("color").unwrap(), Some(schema));
        assert_eq!(store.find_schema("missing").unwrap(), None);
    }

    #[test]
    fn test_realm_lookups() {
        let store = store();
        for (key, path) in [("r0", "/"), ("r1", "/even"), ("r2", "/even/two"), ("r3", "/evening")] {
            store.insert_realm(&Realm::new(key, path)).unwrap();
        }
        store
            .execute_batch("INSERT INTO dyn_realm (id, dyn_realm_key) VALUES ('vip', 'dr-vip');")
            .unwrap();

        assert_eq!(store.find_by_full_path("/even").unwrap().map(|r| r.key), Some("r1".into()));
        assert_eq!(store.find_descendants("/even", "/").unwrap(), vec!["r1", "r2"]);
        assert_eq!(store.find_dyn_realm("vip").unwrap().as_deref(), Some("dr-vip"));
        assert_eq!(store.find_dyn_realm("ghost").unwrap(), None);
    }

    #[test]
    fn test_bind_values() {
        let store = store();
        let count = store
            .count(
                "SELECT COUNT(*) FROM (SELECT 1 AS b, '2024-03-01T00:00:00Z' AS d) WHERE b=? AND d=?",
                &[
                    SqlValue::Boolean(true),
                    SqlValue::parse(AttrSchemaType::Date, "2024-03-01").unwrap(),
                ],
            )
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(store.detect_dialect().unwrap(), Dialect::Generic);
    }

    #[test]
    fn test_fetch_keys_paging() {
        let store = store();
        store
            .execute_batch("CREATE TABLE k (any_id TEXT); INSERT INTO k VALUES ('a'), ('b'), ('c');")
            .unwrap();
        let keys = store
            .fetch_keys("SELECT any_id FROM k ORDER BY any_id", &[], Some((1, 1)))
            .unwrap();
        assert_eq!(keys, vec!["b"]);
    }

    #[test]
    fn test_store_error_is_fault() {
        let err = store().count("SELECT COUNT(*) FROM nowhere", &[]).unwrap_err();
        assert!(!err.is_client_error());
    }
}
