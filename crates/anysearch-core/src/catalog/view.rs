//! Search view catalog.
//!
//! Every identity kind is backed by a family of read-only views: one row per
//! identity with the core columns, one row per attribute value, one row per
//! relationship, membership, role and so on. The catalog names them and gives
//! each a fixed SQL alias. It is derived purely from the kind and is `Copy`.

use anysearch_proto::AnyKind;

/// A view name with its SQL alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SearchView {
    /// View (or table) name.
    pub name: &'static str,
    /// Alias used when the view is joined.
    pub alias: &'static str,
}

/// Logical view kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// Core columns, one row per identity.
    Field,
    /// Non-unique attribute values.
    Attr,
    /// Unique-constrained attribute values.
    UniqueAttr,
    /// Relationships (left `any_id`, `right_any_id`, `type`).
    Relationship,
    /// Static group memberships (`any_id`, `group_id`).
    Membership,
    /// Dynamic group memberships (`any_id`, `group_id`).
    DynGroupMembership,
    /// Static role assignments (`any_id`, `role_id`).
    Role,
    /// Privileges granted through static roles (`any_id`, `privilege_id`).
    Privilege,
    /// Dynamic role memberships (`any_id`, `role_id`).
    DynRoleMembership,
    /// Privileges granted through dynamic roles (`any_id`, `privilege_id`).
    DynPrivilegeMembership,
    /// Direct resource assignments (`any_id`, `resource_id`).
    Resource,
    /// Resources inherited from group memberships (`any_id`, `resource_id`).
    GroupResource,
    /// Dynamic realm memberships (`any_id`, `dynrealm_id`), shared by all kinds.
    DynRealmMembership,
    /// Auxiliary class assignments (`any_id`, `anytypeclass_id`).
    AuxClass,
}

impl ViewKind {
    fn alias(&self) -> &'static str {
        match self {
            ViewKind::Field => "sv",
            ViewKind::Attr => "sva",
            ViewKind::UniqueAttr => "svu",
            ViewKind::Relationship => "svr",
            ViewKind::Membership => "svm",
            ViewKind::DynGroupMembership => "svdg",
            ViewKind::Role => "svrl",
            ViewKind::Privilege => "svp",
            ViewKind::DynRoleMembership => "svdr",
            ViewKind::DynPrivilegeMembership => "svdp",
            ViewKind::Resource => "svres",
            ViewKind::GroupResource => "svgr",
            ViewKind::DynRealmMembership => "svdrl",
            ViewKind::AuxClass => "svac",
        }
    }
}

const DYN_REALM_MEMBERSHIP: &str = "search_dynrealmmembership";

/// Per-kind view names; `None` marks a view the kind does not have.
struct ViewNames {
    field: &'static str,
    attr: &'static str,
    unique_attr: &'static str,
    relationship: Option<&'static str>,
    membership: Option<&'static str>,
    dyn_group_membership: Option<&'static str>,
    role: Option<&'static str>,
    privilege: Option<&'static str>,
    dyn_role_membership: Option<&'static str>,
    dyn_privilege_membership: Option<&'static str>,
    resource: &'static str,
    group_resource: Option<&'static str>,
    aux_class: &'static str,
}

const USER_VIEWS: ViewNames = ViewNames {
    field: "user_search",
    attr: "user_search_attr",
    unique_attr: "user_search_unique_attr",
    relationship: Some("user_search_urelationship"),
    membership: Some("user_search_umembership"),
    dyn_group_membership: Some("user_search_dyngmemb"),
    role: Some("user_search_role"),
    privilege: Some("user_search_priv"),
    dyn_role_membership: Some("user_search_dynrmemb"),
    dyn_privilege_membership: Some("user_search_dynpriv"),
    resource: "user_search_resource",
    group_resource: Some("user_search_group_res"),
    aux_class: "user_search_auxclass",
};

const GROUP_VIEWS: ViewNames = ViewNames {
    field: "group_search",
    attr: "group_search_attr",
    unique_attr: "group_search_unique_attr",
    relationship: None,
    membership: None,
    dyn_group_membership: None,
    role: None,
    privilege: None,
    dyn_role_membership: None,
    dyn_privilege_membership: None,
    resource: "group_search_resource",
    group_resource: None,
    aux_class: "group_search_auxclass",
};

const ANY_OBJECT_VIEWS: ViewNames = ViewNames {
    field: "anyobject_search",
    attr: "anyobject_search_attr",
    unique_attr: "anyobject_search_unique_attr",
    relationship: Some("anyobject_search_arelationship"),
    membership: Some("anyobject_search_amembership"),
    dyn_group_membership: Some("anyobject_search_dyngmemb"),
    role: None,
    privilege: None,
    dyn_role_membership: None,
    dyn_privilege_membership: None,
    resource: "anyobject_search_resource",
    group_resource: Some("anyobject_search_group_res"),
    aux_class: "anyobject_search_auxclass",
};

/// Views backing one identity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewCatalog {
    kind: AnyKind,
}

impl ViewCatalog {
    /// Catalog for the given kind.
    pub const fn new(kind: AnyKind) -> Self {
        Self { kind }
    }

    /// The identity kind.
    pub fn kind(&self) -> AnyKind {
        self.kind
    }

    fn names(&self) -> &'static ViewNames {
        match self.kind {
            AnyKind::User => &USER_VIEWS,
            AnyKind::Group => &GROUP_VIEWS,
            AnyKind::AnyObject => &ANY_OBJECT_VIEWS,
        }
    }

    /// Look up a view; `None` when the kind has no such view.
    pub fn view(&self, view: ViewKind) -> Option<SearchView> {
        let names = self.names();
        let name = match view {
            ViewKind::Field => Some(names.field),
            ViewKind::Attr => Some(names.attr),
            ViewKind::UniqueAttr => Some(names.unique_attr),
            ViewKind::Relationship => names.relationship,
            ViewKind::Membership => names.membership,
            ViewKind::DynGroupMembership => names.dyn_group_membership,
            ViewKind::Role => names.role,
            ViewKind::Privilege => names.privilege,
            ViewKind::DynRoleMembership => names.dyn_role_membership,
            ViewKind::DynPrivilegeMembership => names.dyn_privilege_membership,
            ViewKind::Resource => Some(names.resource),
            ViewKind::GroupResource => names.group_resource,
            ViewKind::DynRealmMembership => Some(DYN_REALM_MEMBERSHIP),
            ViewKind::AuxClass => Some(names.aux_class),
        };
        name.map(|name| SearchView {
            name,
            alias: view.alias(),
        })
    }

    /// Core-field view.
    pub fn field(&self) -> SearchView {
        SearchView {
            name: self.names().field,
            alias: ViewKind::Field.alias(),
        }
    }

    /// Non-unique attribute view.
    pub fn attr(&self) -> SearchView {
        SearchView {
            name: self.names().attr,
            alias: ViewKind::Attr.alias(),
        }
    }

    /// Unique attribute view.
    pub fn unique_attr(&self) -> SearchView {
        SearchView {
            name: self.names().unique_attr,
            alias: ViewKind::UniqueAttr.alias(),
        }
    }

    /// Attribute view holding values of a schema with the given uniqueness.
    pub fn attr_for(&self, unique: bool) -> SearchView {
        if unique {
            self.unique_attr()
        } else {
            self.attr()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_views() {
        let catalog = ViewCatalog::new(AnyKind::User);
        assert_eq!(catalog.field().name, "user_search");
        assert_eq!(catalog.field().alias, "sv");
        assert_eq!(catalog.attr_for(true).name, "user_search_unique_attr");
        assert_eq!(
            catalog.view(ViewKind::Role).map(|v| v.name),
            Some("user_search_role")
        );
    }

    #[test]
    fn test_group_has_no_membership_views() {
        let catalog = ViewCatalog::new(AnyKind::Group);
        assert!(catalog.view(ViewKind::Membership).is_none());
        assert!(catalog.view(ViewKind::Relationship).is_none());
        assert!(catalog.view(ViewKind::GroupResource).is_none());
        assert!(catalog.view(ViewKind::Resource).is_some());
    }

    #[test]
    fn test_dyn_realm_membership_is_shared() {
        let user = ViewCatalog::new(AnyKind::User).view(ViewKind::DynRealmMembership);
        let group = ViewCatalog::new(AnyKind::Group).view(ViewKind::DynRealmMembership);
        assert_eq!(user, group);
    }

    #[test]
    fn test_roles_are_user_only() {
        let any_object = ViewCatalog::new(AnyKind::AnyObject);
        assert!(any_object.view(ViewKind::Role).is_none());
        assert!(any_object.view(ViewKind::Privilege).is_none());
        assert!(any_object.view(ViewKind::Membership).is_some());
    }
}
