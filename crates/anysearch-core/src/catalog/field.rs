//! Core fields of each identity kind.
//!
//! Core fields are columns of the core-field view rather than custom
//! attributes. Relationship fields (realm, owners, any type) are stored as
//! `<field>_id` key columns.

use super::schema::AttrSchemaType;
use anysearch_proto::AnyKind;

/// A core field and the view column backing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name as used in predicates and sort clauses.
    pub name: &'static str,
    /// Column in the core-field view.
    pub column: &'static str,
    /// Semantic type of the column.
    pub field_type: AttrSchemaType,
    /// Whether the column holds the key of another entity.
    pub relationship: bool,
}

impl FieldDef {
    const fn plain(name: &'static str, column: &'static str, field_type: AttrSchemaType) -> Self {
        Self {
            name,
            column,
            field_type,
            relationship: false,
        }
    }

    const fn relationship(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column,
            field_type: AttrSchemaType::String,
            relationship: true,
        }
    }
}

/// Name of the realm relationship field.
pub const REALM_FIELD: &str = "realm";

const COMMON_FIELDS: &[FieldDef] = &[
    FieldDef::plain("key", "any_id", AttrSchemaType::String),
    FieldDef::relationship(REALM_FIELD, "realm_id"),
    FieldDef::plain("creator", "creator", AttrSchemaType::String),
    FieldDef::plain("creationDate", "creation_date", AttrSchemaType::Date),
    FieldDef::plain("lastModifier", "last_modifier", AttrSchemaType::String),
    FieldDef::plain("lastChangeDate", "last_change_date", AttrSchemaType::Date),
];

const USER_FIELDS: &[FieldDef] = &[
    FieldDef::plain("username", "username", AttrSchemaType::String),
    FieldDef::plain("status", "status", AttrSchemaType::String),
    FieldDef::plain("failedLogins", "failed_logins", AttrSchemaType::Long),
    FieldDef::plain("lastLoginDate", "last_login_date", AttrSchemaType::Date),
    FieldDef::plain("changePwdDate", "change_pwd_date", AttrSchemaType::Date),
    FieldDef::plain("suspended", "suspended", AttrSchemaType::Boolean),
    FieldDef::plain("mustChangePassword", "must_change_password", AttrSchemaType::Boolean),
    FieldDef::plain("cipherAlgorithm", "cipher_algorithm", AttrSchemaType::Enum),
];

const GROUP_FIELDS: &[FieldDef] = &[
    FieldDef::plain("name", "name", AttrSchemaType::String),
    FieldDef::relationship("userOwner", "user_owner_id"),
    FieldDef::relationship("groupOwner", "group_owner_id"),
];

const ANY_OBJECT_FIELDS: &[FieldDef] = &[
    FieldDef::plain("name", "name", AttrSchemaType::String),
    FieldDef::plain("status", "status", AttrSchemaType::String),
    FieldDef::relationship("type", "type_id"),
];

fn kind_fields(kind: AnyKind) -> &'static [FieldDef] {
    match kind {
        AnyKind::User => USER_FIELDS,
        AnyKind::Group => GROUP_FIELDS,
        AnyKind::AnyObject => ANY_OBJECT_FIELDS,
    }
}

/// All core fields of a kind.
pub fn fields(kind: AnyKind) -> impl Iterator<Item = &'static FieldDef> {
    COMMON_FIELDS.iter().chain(kind_fields(kind))
}

/// Find a core field by name.
pub fn find_field(kind: AnyKind, name: &str) -> Option<&'static FieldDef> {
    fields(kind).find(|field| field.name == name)
}
