//! Catalog of search views, core fields, and the metadata collaborators
//! (plain schemas, realm hierarchy) the compiler consults.

mod field;
mod memory;
mod realm;
mod schema;
mod view;

pub use field::{fields, find_field, FieldDef, REALM_FIELD};
pub use memory::MemoryDirectory;
pub use realm::{
    is_under, parse_group_owner_realm, Realm, RealmDirectory, GROUP_OWNER_SEPARATOR, ROOT_PATH,
};
pub use schema::{AttrSchemaType, PlainSchema, SchemaStore, MANDATORY_ALWAYS};
pub use view::{SearchView, ViewCatalog, ViewKind};
