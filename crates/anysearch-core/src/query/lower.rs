//! Predicate lowering.
//!
//! Every leaf predicate becomes a `SELECT DISTINCT any_id FROM <view> WHERE ...`
//! subquery selecting the keys of the identities that satisfy it (or, when
//! negated, that do not). The subqueries are composed by the tree compiler.

use anysearch_proto::{AnyKind, AttrCond, AttrOp, FieldCond, Predicate};
use tracing::error;

use super::dialect::Dialect;
use super::fragment::SqlFragment;
use super::value::SqlValue;
use crate::catalog::{
    find_field, PlainSchema, RealmDirectory, SchemaStore, SearchView, ViewCatalog, ViewKind,
};
use crate::error::{Error, Result};

/// A lowered predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    /// Subquery selecting matching identity keys.
    pub fragment: SqlFragment,
    /// Attribute schema the predicate touched, if any.
    pub schema: Option<PlainSchema>,
}

impl Lowered {
    fn plain(fragment: SqlFragment) -> Self {
        Self {
            fragment,
            schema: None,
        }
    }
}

/// Lowers leaf predicates for one identity kind.
pub struct Lowering<'a> {
    catalog: ViewCatalog,
    dialect: Dialect,
    schemas: &'a dyn SchemaStore,
    realms: &'a dyn RealmDirectory,
    realm_field: &'a str,
}

impl<'a> Lowering<'a> {
    /// Create a lowering context.
    pub fn new(
        catalog: ViewCatalog,
        dialect: Dialect,
        schemas: &'a dyn SchemaStore,
        realms: &'a dyn RealmDirectory,
        realm_field: &'a str,
    ) -> Self {
        Self {
            catalog,
            dialect,
            schemas,
            realms,
            realm_field,
        }
    }

    /// The identity kind being searched.
    pub fn kind(&self) -> AnyKind {
        self.catalog.kind()
    }

    /// Lower one predicate, optionally negated.
    pub fn lower(&self, predicate: &Predicate, negate: bool) -> Result<Lowered> {
        match predicate {
            Predicate::Attr(cond) => self.attr(cond, negate),
            Predicate::Field(cond) => self.field(cond, negate).map(Lowered::plain),
            Predicate::AnyType { any_type } => self.any_type(any_type, negate).map(Lowered::plain),
            Predicate::AuxClass { aux_class } => {
                let view = self.require(ViewKind::AuxClass, predicate)?;
                let inner = SqlFragment::new(format!(
                    "SELECT DISTINCT any_id FROM {} WHERE anytypeclass_id=",
                    view.name
                ))
                .bind(aux_class);
                Ok(Lowered::plain(self.key_in(inner, negate)))
            }
            Predicate::RelationshipType { relationship_type } => {
                let view = self.require(ViewKind::Relationship, predicate)?;
                let inner = SqlFragment::new(format!("SELECT any_id FROM {} WHERE type=", view.name))
                    .bind(relationship_type)
                    .push(&format!(
                        " UNION SELECT right_any_id AS any_id FROM {} WHERE type=",
                        view.name
                    ))
                    .bind(relationship_type);
                Ok(Lowered::plain(self.key_in(inner, negate)))
            }
            Predicate::Relationship { targets } => {
                let view = self.require(ViewKind::Relationship, predicate)?;
                non_empty(targets, predicate)?;
                let inner = SqlFragment::new(format!(
                    "SELECT DISTINCT any_id FROM {} WHERE ",
                    view.name
                ))
                .append(any_of("right_any_id", targets));
                Ok(Lowered::plain(self.key_in(inner, negate)))
            }
            Predicate::Membership { groups } => {
                non_empty(groups, predicate)?;
                let direct = self.require(ViewKind::Membership, predicate)?;
                let dynamic = self.require(ViewKind::DynGroupMembership, predicate)?;
                Ok(Lowered::plain(self.either_source(
                    &[direct, dynamic],
                    "group_id",
                    groups,
                    negate,
                )))
            }
            Predicate::Member { members } => self.member(members, predicate, negate).map(Lowered::plain),
            Predicate::Role { role } => {
                let direct = self.require(ViewKind::Role, predicate)?;
                let dynamic = self.require(ViewKind::DynRoleMembership, predicate)?;
                Ok(Lowered::plain(self.either_source(
                    &[direct, dynamic],
                    "role_id",
                    std::slice::from_ref(role),
                    negate,
                )))
            }
            Predicate::Privilege { privilege } => {
                let direct = self.require(ViewKind::Privilege, predicate)?;
                let dynamic = self.require(ViewKind::DynPrivilegeMembership, predicate)?;
                Ok(Lowered::plain(self.either_source(
                    &[direct, dynamic],
                    "privilege_id",
                    std::slice::from_ref(privilege),
                    negate,
                )))
            }
            Predicate::Resource { resource } => {
                let direct = self.require(ViewKind::Resource, predicate)?;
                let mut inner = SqlFragment::new(format!(
                    "SELECT any_id FROM {} WHERE resource_id=",
                    direct.name
                ))
                .bind(resource);
                if let Some(inherited) = self.catalog.view(ViewKind::GroupResource) {
                    inner = inner
                        .push(&format!(
                            " UNION SELECT any_id FROM {} WHERE resource_id=",
                            inherited.name
                        ))
                        .bind(resource);
                }
                Ok(Lowered::plain(self.key_in(inner, negate)))
            }
            Predicate::DynRealm { dyn_realm } => {
                let view = self.require(ViewKind::DynRealmMembership, predicate)?;
                let inner = SqlFragment::new(format!(
                    "SELECT DISTINCT any_id FROM {} WHERE dynrealm_id=",
                    view.name
                ))
                .bind(dyn_realm);
                Ok(Lowered::plain(
                    self.select_keys()
                        .push("(")
                        .append(in_subquery(inner, negate))
                        .push(")"),
                ))
            }
        }
    }

    fn select_keys(&self) -> SqlFragment {
        SqlFragment::new(format!(
            "SELECT DISTINCT any_id FROM {} WHERE ",
            self.catalog.field().name
        ))
    }

    /// `SELECT DISTINCT any_id FROM <field> WHERE any_id [NOT ]IN (<inner>)`
    fn key_in(&self, inner: SqlFragment, negate: bool) -> SqlFragment {
        self.select_keys().append(in_subquery(inner, negate))
    }

    /// Membership-like predicates satisfied through any of several views.
    ///
    /// Negated, every source has to fail independently.
    fn either_source(
        &self,
        views: &[SearchView],
        column: &str,
        keys: &[String],
        negate: bool,
    ) -> SqlFragment {
        let checks = views.iter().map(|view| {
            let inner = SqlFragment::new(format!("SELECT DISTINCT any_id FROM {} WHERE ", view.name))
                .append(any_of(column, keys));
            in_subquery(inner, negate)
        });
        let joined = SqlFragment::join(checks, if negate { " AND " } else { " OR " });
        self.select_keys().push("(").append(joined).push(")")
    }

    fn require(&self, view: ViewKind, predicate: &Predicate) -> Result<SearchView> {
        self.catalog
            .view(view)
            .ok_or_else(|| not_applicable(predicate, self.kind()))
    }

    fn attr(&self, cond: &AttrCond, negate: bool) -> Result<Lowered> {
        let schema = self.schemas.find_schema(&cond.schema)?.ok_or_else(|| {
            Error::InvalidSearchExpression(format!("Invalid schema key {}", cond.schema))
        })?;
        let view = self.catalog.attr_for(schema.unique_constraint);

        let fragment = if cond.op.is_null_check() {
            let schema_rows = SqlFragment::new(format!(
                "SELECT DISTINCT any_id FROM {} WHERE schema_id=",
                view.name
            ))
            .bind(&schema.key);
            if (cond.op == AttrOp::IsNull) != negate {
                self.select_keys()
                    .push("any_id NOT IN (")
                    .append(schema_rows)
                    .push(")")
            } else {
                schema_rows
            }
        } else if cond.op.is_like() && !schema.schema_type.is_textual() {
            error!(
                schema = %schema.key,
                schema_type = ?schema.schema_type,
                "LIKE is only supported for string and enum schemas"
            );
            self.always_false()
        } else {
            let literal = expression(cond.expression.as_deref(), &cond.schema)?;
            let value = if cond.op.is_like() {
                SqlValue::from(literal)
            } else {
                SqlValue::for_schema(&schema, literal)?
            };
            let column = schema.schema_type.value_column();
            let textual = schema.schema_type.is_textual();

            if negate && schema.multivalue {
                let matching = SqlFragment::new(format!(
                    "SELECT DISTINCT any_id FROM {} WHERE schema_id=",
                    view.name
                ))
                .bind(&schema.key)
                .push(" AND ")
                .append(self.comparison(column, cond.op, value, false, textual));
                self.select_keys()
                    .push("any_id NOT IN (")
                    .append(matching)
                    .push(")")
            } else {
                SqlFragment::new(format!(
                    "SELECT DISTINCT any_id FROM {} WHERE schema_id=",
                    view.name
                ))
                .bind(&schema.key)
                .push(" AND ")
                .append(self.comparison(column, cond.op, value, negate, textual))
            }
        };

        Ok(Lowered {
            fragment,
            schema: Some(schema),
        })
    }

    fn field(&self, cond: &FieldCond, negate: bool) -> Result<SqlFragment> {
        let field = find_field(self.kind(), &cond.field).ok_or_else(|| {
            Error::InvalidSearchExpression(format!(
                "Invalid core field {} for {}",
                cond.field,
                self.kind()
            ))
        })?;

        if cond.op.is_null_check() {
            let check = if (cond.op == AttrOp::IsNull) != negate {
                " IS NULL"
            } else {
                " IS NOT NULL"
            };
            return Ok(self.select_keys().push(field.column).push(check));
        }
        if cond.op.is_like() && !field.field_type.is_textual() {
            error!(
                field = field.name,
                field_type = ?field.field_type,
                "LIKE is only supported for textual fields"
            );
            return Ok(self.always_false());
        }

        let literal = expression(cond.expression.as_deref(), &cond.field)?;
        let value = if field.name == self.realm_field && literal.starts_with('/') {
            let realm = self.realms.find_by_full_path(literal)?.ok_or_else(|| {
                Error::InvalidRealm(format!("Invalid realm specified: {literal}"))
            })?;
            SqlValue::String(realm.key)
        } else if cond.op.is_like() {
            SqlValue::from(literal)
        } else {
            SqlValue::parse(field.field_type, literal)?
        };

        Ok(self.select_keys().append(self.comparison(
            field.column,
            cond.op,
            value,
            negate,
            field.field_type.is_textual(),
        )))
    }

    fn any_type(&self, any_type: &str, negate: bool) -> Result<SqlFragment> {
        if self.kind() != AnyKind::AnyObject {
            return Err(not_applicable(&Predicate::any_type(any_type), self.kind()));
        }
        let op = if negate { "type_id<>" } else { "type_id=" };
        Ok(self.select_keys().push(op).bind(any_type))
    }

    fn member(&self, members: &[String], predicate: &Predicate, negate: bool) -> Result<SqlFragment> {
        if self.kind() != AnyKind::Group {
            return Err(not_applicable(predicate, self.kind()));
        }
        non_empty(members, predicate)?;

        let sources = [AnyKind::User, AnyKind::AnyObject]
            .into_iter()
            .map(ViewCatalog::new)
            .flat_map(|catalog| {
                [ViewKind::Membership, ViewKind::DynGroupMembership]
                    .into_iter()
                    .filter_map(move |view| catalog.view(view))
            });
        let checks = sources.map(|view| {
            let inner = SqlFragment::new(format!(
                "SELECT DISTINCT group_id AS any_id FROM {} WHERE ",
                view.name
            ))
            .append(any_of("any_id", members));
            in_subquery(inner, negate)
        });
        let joined = SqlFragment::join(checks, if negate { " AND " } else { " OR " });
        Ok(self.select_keys().push("(").append(joined).push(")"))
    }

    fn always_false(&self) -> SqlFragment {
        self.select_keys().push("1=2")
    }

    /// `<column> <op> ?`, inverted when negated.
    fn comparison(
        &self,
        column: &str,
        op: AttrOp,
        value: SqlValue,
        negate: bool,
        textual: bool,
    ) -> SqlFragment {
        let lower = op.ignores_case() && textual;
        let operator = match (op, negate) {
            (AttrOp::Eq | AttrOp::Ieq, false) => "=",
            (AttrOp::Eq | AttrOp::Ieq, true) => "<>",
            (AttrOp::Like | AttrOp::Ilike, false) => " LIKE ",
            (AttrOp::Like | AttrOp::Ilike, true) => " NOT LIKE ",
            (AttrOp::Ge, false) | (AttrOp::Lt, true) => ">=",
            (AttrOp::Gt, false) | (AttrOp::Le, true) => ">",
            (AttrOp::Le, false) | (AttrOp::Gt, true) => "<=",
            (AttrOp::Lt, false) | (AttrOp::Ge, true) => "<",
            // null checks are rendered by the callers
            (AttrOp::IsNull | AttrOp::IsNotNull, _) => "=",
        };

        let mut fragment = if lower {
            SqlFragment::new(format!("LOWER({column}){operator}LOWER("))
                .bind(value)
                .push(")")
        } else {
            SqlFragment::new(format!("{column}{operator}")).bind(value)
        };
        if op.is_like() {
            if let Some(escape) = self.dialect.like_escape() {
                fragment = fragment.push(escape);
            }
        }
        fragment
    }
}

fn in_subquery(inner: SqlFragment, negate: bool) -> SqlFragment {
    SqlFragment::new(if negate { "any_id NOT IN (" } else { "any_id IN (" })
        .append(inner)
        .push(")")
}

/// `<column>=? OR <column>=? ...`
fn any_of(column: &str, keys: &[String]) -> SqlFragment {
    SqlFragment::join(
        keys.iter()
            .map(|key| SqlFragment::new(format!("{column}=")).bind(key)),
        " OR ",
    )
}

fn expression<'c>(expression: Option<&'c str>, subject: &str) -> Result<&'c str> {
    expression.ok_or_else(|| {
        Error::InvalidSearchExpression(format!("missing expression for {subject}"))
    })
}

fn non_empty(keys: &[String], predicate: &Predicate) -> Result<()> {
    if keys.is_empty() {
        return Err(Error::InvalidSearchExpression(format!(
            "{} requires at least one key",
            predicate.name()
        )));
    }
    Ok(())
}

fn not_applicable(predicate: &Predicate, kind: AnyKind) -> Error {
    Error::InvalidSearchExpression(format!("{} is not applicable to {kind}", predicate.name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AttrSchemaType, MemoryDirectory, Realm};
    use pretty_assertions::assert_eq;

    fn directory() -> MemoryDirectory {
        MemoryDirectory::new()
            .with_schema(PlainSchema::new("email", AttrSchemaType::String).with_unique_constraint())
            .with_schema(PlainSchema::new("nickname", AttrSchemaType::String).with_multivalue())
            .with_schema(PlainSchema::new("age", AttrSchemaType::Long))
            .with_realm(Realm::new("r-even", "/even"))
    }

    fn lower_with(
        dir: &MemoryDirectory,
        kind: AnyKind,
        dialect: Dialect,
        predicate: &Predicate,
        negate: bool,
    ) -> Result<Lowered> {
        Lowering::new(ViewCatalog::new(kind), dialect, dir, dir, "realm").lower(predicate, negate)
    }

    fn lower(kind: AnyKind, predicate: Predicate, negate: bool) -> Result<Lowered> {
        lower_with(&directory(), kind, Dialect::Generic, &predicate, negate)
    }

    #[test]
    fn test_attr_eq_uses_unique_view() {
        let lowered = lower(AnyKind::User, Predicate::attr("email", AttrOp::Eq, "a@b.c"), false).unwrap();
        assert_eq!(
            lowered.fragment.sql(),
            "SELECT DISTINCT any_id FROM user_search_unique_attr WHERE schema_id=? AND stringvalue=?"
        );
        assert_eq!(lowered.fragment.params(), &[SqlValue::from("email"), SqlValue::from("a@b.c")]);
        assert_eq!(lowered.schema.map(|s| s.key).as_deref(), Some("email"));
    }

    #[test]
    fn test_attr_ilike_lowercases_both_sides() {
        let lowered = lower(AnyKind::User, Predicate::attr("email", AttrOp::Ilike, "%@ACME.com"), false).unwrap();
        assert_eq!(
            lowered.fragment.sql(),
            "SELECT DISTINCT any_id FROM user_search_unique_attr WHERE schema_id=? AND LOWER(stringvalue) LIKE LOWER(?)"
        );
    }

    #[test]
    fn test_negated_single_value_inverts_operator() {
        let lowered = lower(AnyKind::User, Predicate::attr("age", AttrOp::Ge, "18"), true).unwrap();
        assert_eq!(
            lowered.fragment.sql(),
            "SELECT DISTINCT any_id FROM user_search_attr WHERE schema_id=? AND longvalue<?"
        );
        assert_eq!(lowered.fragment.params()[1], SqlValue::Long(18));
    }

    #[test]
    fn test_negated_multivalue_excludes_any_match() {
        let lowered = lower(AnyKind::User, Predicate::attr("nickname", AttrOp::Eq, "bob"), true).unwrap();
        assert_eq!(
            lowered.fragment.sql(),
            "SELECT DISTINCT any_id FROM user_search WHERE any_id NOT IN \
             (SELECT DISTINCT any_id FROM user_search_attr WHERE schema_id=? AND stringvalue=?)"
        );
    }

    #[test]
    fn test_null_checks_swap_when_negated() {
        let is_null = lower(AnyKind::Group, Predicate::attr_is_null("age"), false).unwrap();
        let not_not_null = lower(AnyKind::Group, Predicate::attr_is_not_null("age"), true).unwrap();
        assert_eq!(is_null, not_not_null);
        assert_eq!(
            is_null.fragment.sql(),
            "SELECT DISTINCT any_id FROM group_search WHERE any_id NOT IN \
             (SELECT DISTINCT any_id FROM group_search_attr WHERE schema_id=?)"
        );

        let not_null = lower(AnyKind::Group, Predicate::attr_is_null("age"), true).unwrap();
        assert_eq!(
            not_null.fragment.sql(),
            "SELECT DISTINCT any_id FROM group_search_attr WHERE schema_id=?"
        );
    }

    #[test]
    fn test_like_on_number_is_always_false() {
        let lowered = lower(AnyKind::User, Predicate::attr("age", AttrOp::Like, "1%"), false).unwrap();
        assert_eq!(lowered.fragment.sql(), "SELECT DISTINCT any_id FROM user_search WHERE 1=2");
        assert!(lowered.fragment.params().is_empty());
    }

    #[test]
    fn test_oracle_like_escape() {
        let dir = directory();
        let lowered = lower_with(
            &dir,
            AnyKind::User,
            Dialect::Oracle,
            &Predicate::field("username", AttrOp::Like, "a\\_%"),
            false,
        )
        .unwrap();
        assert_eq!(
            lowered.fragment.sql(),
            "SELECT DISTINCT any_id FROM user_search WHERE username LIKE ? ESCAPE '\\'"
        );
    }

    #[test]
    fn test_unknown_schema_and_bad_literal() {
        let err = lower(AnyKind::User, Predicate::attr("missing", AttrOp::Eq, "x"), false).unwrap_err();
        assert!(err.is_client_error());
        let err = lower(AnyKind::User, Predicate::attr("age", AttrOp::Eq, "old"), false).unwrap_err();
        assert!(err.to_string().contains("old"));
    }

    #[test]
    fn test_realm_field_resolves_path() {
        let lowered = lower(AnyKind::User, Predicate::field("realm", AttrOp::Eq, "/even"), false).unwrap();
        assert_eq!(
            lowered.fragment.sql(),
            "SELECT DISTINCT any_id FROM user_search WHERE realm_id=?"
        );
        assert_eq!(lowered.fragment.params(), &[SqlValue::from("r-even")]);

        let err = lower(AnyKind::User, Predicate::field("realm", AttrOp::Eq, "/odd"), false).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidRealm);
    }

    #[test]
    fn test_membership_unions_dynamic_source() {
        let lowered = lower(AnyKind::User, Predicate::membership(["g1", "g2"]), false).unwrap();
        assert_eq!(
            lowered.fragment.sql(),
            "SELECT DISTINCT any_id FROM user_search WHERE (\
             any_id IN (SELECT DISTINCT any_id FROM user_search_umembership WHERE group_id=? OR group_id=?) OR \
             any_id IN (SELECT DISTINCT any_id FROM user_search_dyngmemb WHERE group_id=? OR group_id=?))"
        );
        assert_eq!(lowered.fragment.params().len(), 4);

        let negated = lower(AnyKind::User, Predicate::membership(["g1"]), true).unwrap();
        assert_eq!(
            negated.fragment.sql(),
            "SELECT DISTINCT any_id FROM user_search WHERE (\
             any_id NOT IN (SELECT DISTINCT any_id FROM user_search_umembership WHERE group_id=?) AND \
             any_id NOT IN (SELECT DISTINCT any_id FROM user_search_dyngmemb WHERE group_id=?))"
        );
    }

    #[test]
    fn test_resource_includes_group_resources_except_for_groups() {
        let user = lower(AnyKind::User, Predicate::resource("ldap"), false).unwrap();
        assert_eq!(
            user.fragment.sql(),
            "SELECT DISTINCT any_id FROM user_search WHERE any_id IN (\
             SELECT any_id FROM user_search_resource WHERE resource_id=? \
             UNION SELECT any_id FROM user_search_group_res WHERE resource_id=?)"
        );
        let group = lower(AnyKind::Group, Predicate::resource("ldap"), true).unwrap();
        assert_eq!(
            group.fragment.sql(),
            "SELECT DISTINCT any_id FROM group_search WHERE any_id NOT IN (\
             SELECT any_id FROM group_search_resource WHERE resource_id=?)"
        );
    }

    #[test]
    fn test_member_reads_user_and_any_object_memberships() {
        let lowered = lower(AnyKind::Group, Predicate::member(["u1"]), false).unwrap();
        let sql = lowered.fragment.sql();
        assert!(sql.starts_with("SELECT DISTINCT any_id FROM group_search WHERE (any_id IN ("));
        for view in [
            "user_search_umembership",
            "user_search_dyngmemb",
            "anyobject_search_amembership",
            "anyobject_search_dyngmemb",
        ] {
            assert!(sql.contains(view), "{view} missing from {sql}");
        }
        assert_eq!(lowered.fragment.params().len(), 4);
    }

    #[test]
    fn test_kind_restrictions() {
        assert!(lower(AnyKind::Group, Predicate::role("admin"), false).is_err());
        assert!(lower(AnyKind::AnyObject, Predicate::privilege("p"), false).is_err());
        assert!(lower(AnyKind::User, Predicate::member(["u1"]), false).is_err());
        assert!(lower(AnyKind::Group, Predicate::membership(["g"]), false).is_err());
        assert!(lower(AnyKind::User, Predicate::any_type("PRINTER"), false).is_err());
        assert!(lower(AnyKind::User, Predicate::membership(Vec::<String>::new()), false).is_err());
    }

    #[test]
    fn test_dyn_realm_and_relationship_type() {
        let dyn_realm = lower(AnyKind::AnyObject, Predicate::dyn_realm("dr1"), true).unwrap();
        assert_eq!(
            dyn_realm.fragment.sql(),
            "SELECT DISTINCT any_id FROM anyobject_search WHERE (any_id NOT IN \
             (SELECT DISTINCT any_id FROM search_dynrealmmembership WHERE dynrealm_id=?))"
        );

        let rel = lower(AnyKind::AnyObject, Predicate::relationship_type("neighbor"), false).unwrap();
        assert_eq!(
            rel.fragment.sql(),
            "SELECT DISTINCT any_id FROM anyobject_search WHERE any_id IN (\
             SELECT any_id FROM anyobject_search_arelationship WHERE type=? \
             UNION SELECT right_any_id AS any_id FROM anyobject_search_arelationship WHERE type=?)"
        );
    }

    #[test]
    fn test_aux_class_and_relationship_targets() {
        let aux = lower(AnyKind::User, Predicate::aux_class("minimal"), false).unwrap();
        assert_eq!(
            aux.fragment.sql(),
            "SELECT DISTINCT any_id FROM user_search WHERE any_id IN (\
             SELECT DISTINCT any_id FROM user_search_auxclass WHERE anytypeclass_id=?)"
        );
        assert_eq!(aux.fragment.params(), &[SqlValue::from("minimal")]);

        let not_aux = lower(AnyKind::Group, Predicate::aux_class("minimal"), true).unwrap();
        assert!(not_aux.fragment.sql().contains("any_id NOT IN (SELECT DISTINCT any_id FROM group_search_auxclass"));

        let rel = lower(AnyKind::User, Predicate::relationship(["p1", "p2"]), false).unwrap();
        assert_eq!(
            rel.fragment.sql(),
            "SELECT DISTINCT any_id FROM user_search WHERE any_id IN (\
             SELECT DISTINCT any_id FROM user_search_urelationship WHERE right_any_id=? OR right_any_id=?)"
        );
        assert_eq!(rel.fragment.params(), &[SqlValue::from("p1"), SqlValue::from("p2")]);

        assert!(lower(AnyKind::User, Predicate::relationship(Vec::<String>::new()), false).is_err());
        assert!(lower(AnyKind::Group, Predicate::relationship(["p1"]), false).is_err());
    }

    #[test]
    fn test_negated_role_and_privilege_fail_on_both_sources() {
        let role = lower(AnyKind::User, Predicate::role("admin"), true).unwrap();
        assert_eq!(
            role.fragment.sql(),
            "SELECT DISTINCT any_id FROM user_search WHERE (\
             any_id NOT IN (SELECT DISTINCT any_id FROM user_search_role WHERE role_id=?) AND \
             any_id NOT IN (SELECT DISTINCT any_id FROM user_search_dynrmemb WHERE role_id=?))"
        );
        assert_eq!(role.fragment.params(), &[SqlValue::from("admin"), SqlValue::from("admin")]);

        let privilege = lower(AnyKind::User, Predicate::privilege("approve"), true).unwrap();
        assert_eq!(
            privilege.fragment.sql(),
            "SELECT DISTINCT any_id FROM user_search WHERE (\
             any_id NOT IN (SELECT DISTINCT any_id FROM user_search_priv WHERE privilege_id=?) AND \
             any_id NOT IN (SELECT DISTINCT any_id FROM user_search_dynpriv WHERE privilege_id=?))"
        );
    }
}
