//! Search condition tree.
//!
//! A [`SearchCond`] is an immutable binary tree of boolean combinators whose
//! leaves are [`Predicate`]s. Negation only exists at the leaves
//! ([`SearchCond::NotLeaf`]); there is no general NOT over subtrees.

use serde::{Deserialize, Serialize};

/// Comparison operator of an attribute or core-field predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttrOp {
    /// Equality.
    Eq,
    /// Case-insensitive equality.
    Ieq,
    /// SQL LIKE pattern match.
    Like,
    /// Case-insensitive LIKE.
    Ilike,
    /// Greater than or equal.
    Ge,
    /// Greater than.
    Gt,
    /// Less than or equal.
    Le,
    /// Less than.
    Lt,
    /// No value present.
    IsNull,
    /// Some value present.
    IsNotNull,
}

impl AttrOp {
    /// Whether this operator only tests for presence and takes no literal.
    pub fn is_null_check(&self) -> bool {
        matches!(self, AttrOp::IsNull | AttrOp::IsNotNull)
    }

    /// Whether this is a LIKE-family operator.
    pub fn is_like(&self) -> bool {
        matches!(self, AttrOp::Like | AttrOp::Ilike)
    }

    /// Whether this operator compares case-insensitively.
    pub fn ignores_case(&self) -> bool {
        matches!(self, AttrOp::Ieq | AttrOp::Ilike)
    }
}

/// Predicate over a typed custom attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrCond {
    /// Plain schema key of the attribute.
    pub schema: String,
    /// Comparison operator.
    pub op: AttrOp,
    /// Literal to compare against; absent for null checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl AttrCond {
    /// Create a predicate without a literal.
    pub fn new(schema: impl Into<String>, op: AttrOp) -> Self {
        Self {
            schema: schema.into(),
            op,
            expression: None,
        }
    }

    /// Set the literal.
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }
}

/// Predicate over a core column of the identity (username, realm, status, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCond {
    /// Core field name.
    pub field: String,
    /// Comparison operator.
    pub op: AttrOp,
    /// Literal to compare against; absent for null checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl FieldCond {
    /// Create a predicate without a literal.
    pub fn new(field: impl Into<String>, op: AttrOp) -> Self {
        Self {
            field: field.into(),
            op,
            expression: None,
        }
    }

    /// Set the literal.
    pub fn with_expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }
}

/// A leaf predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// Typed custom attribute comparison.
    Attr(AttrCond),
    /// Core column comparison.
    Field(FieldCond),
    /// Any-object type (any objects only).
    AnyType {
        /// Any type key.
        any_type: String,
    },
    /// Auxiliary class assignment.
    AuxClass {
        /// Any type class key.
        aux_class: String,
    },
    /// Relationship towards any of the given any objects (not for groups).
    Relationship {
        /// Right-side any object keys.
        targets: Vec<String>,
    },
    /// Relationship of the given type, on either side (not for groups).
    RelationshipType {
        /// Relationship type key.
        relationship_type: String,
    },
    /// Membership in any of the given groups (not for groups).
    Membership {
        /// Group keys.
        groups: Vec<String>,
    },
    /// Group having any of the given users or any objects as member (groups only).
    Member {
        /// Member keys.
        members: Vec<String>,
    },
    /// Role assignment (users only).
    Role {
        /// Role key.
        role: String,
    },
    /// Privilege granted through a role (users only).
    Privilege {
        /// Privilege key.
        privilege: String,
    },
    /// External resource assignment.
    Resource {
        /// Resource key.
        resource: String,
    },
    /// Dynamic realm membership.
    DynRealm {
        /// Dynamic realm key.
        dyn_realm: String,
    },
}

impl Predicate {
    /// Attribute comparison with a literal.
    pub fn attr(schema: impl Into<String>, op: AttrOp, expression: impl Into<String>) -> Self {
        Predicate::Attr(AttrCond::new(schema, op).with_expression(expression))
    }

    /// Attribute has no value.
    pub fn attr_is_null(schema: impl Into<String>) -> Self {
        Predicate::Attr(AttrCond::new(schema, AttrOp::IsNull))
    }

    /// Attribute has a value.
    pub fn attr_is_not_null(schema: impl Into<String>) -> Self {
        Predicate::Attr(AttrCond::new(schema, AttrOp::IsNotNull))
    }

    /// Core field comparison with a literal.
    pub fn field(field: impl Into<String>, op: AttrOp, expression: impl Into<String>) -> Self {
        Predicate::Field(FieldCond::new(field, op).with_expression(expression))
    }

    /// Any-object type.
    pub fn any_type(any_type: impl Into<String>) -> Self {
        Predicate::AnyType {
            any_type: any_type.into(),
        }
    }

    /// Auxiliary class.
    pub fn aux_class(aux_class: impl Into<String>) -> Self {
        Predicate::AuxClass {
            aux_class: aux_class.into(),
        }
    }

    /// Relationship towards any of the targets.
    pub fn relationship<I, S>(targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::Relationship {
            targets: targets.into_iter().map(Into::into).collect(),
        }
    }

    /// Relationship of a given type.
    pub fn relationship_type(relationship_type: impl Into<String>) -> Self {
        Predicate::RelationshipType {
            relationship_type: relationship_type.into(),
        }
    }

    /// Membership in any of the groups.
    pub fn membership<I, S>(groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::Membership {
            groups: groups.into_iter().map(Into::into).collect(),
        }
    }

    /// Group with any of the members.
    pub fn member<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Predicate::Member {
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    /// Role assignment.
    pub fn role(role: impl Into<String>) -> Self {
        Predicate::Role { role: role.into() }
    }

    /// Privilege grant.
    pub fn privilege(privilege: impl Into<String>) -> Self {
        Predicate::Privilege {
            privilege: privilege.into(),
        }
    }

    /// Resource assignment.
    pub fn resource(resource: impl Into<String>) -> Self {
        Predicate::Resource {
            resource: resource.into(),
        }
    }

    /// Dynamic realm membership.
    pub fn dyn_realm(dyn_realm: impl Into<String>) -> Self {
        Predicate::DynRealm {
            dyn_realm: dyn_realm.into(),
        }
    }

    /// Short name of the predicate variant, for diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Predicate::Attr(_) => "AttrCond",
            Predicate::Field(_) => "AnyCond",
            Predicate::AnyType { .. } => "AnyTypeCond",
            Predicate::AuxClass { .. } => "AuxClassCond",
            Predicate::Relationship { .. } => "RelationshipCond",
            Predicate::RelationshipType { .. } => "RelationshipTypeCond",
            Predicate::Membership { .. } => "MembershipCond",
            Predicate::Member { .. } => "MemberCond",
            Predicate::Role { .. } => "RoleCond",
            Predicate::Privilege { .. } => "PrivilegeCond",
            Predicate::Resource { .. } => "ResourceCond",
            Predicate::DynRealm { .. } => "DynRealmCond",
        }
    }
}

/// Boolean condition tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchCond {
    /// A predicate.
    Leaf(Predicate),
    /// A negated predicate.
    NotLeaf(Predicate),
    /// Both subtrees hold.
    And(Box<SearchCond>, Box<SearchCond>),
    /// Either subtree holds.
    Or(Box<SearchCond>, Box<SearchCond>),
}

impl SearchCond {
    /// A predicate leaf.
    pub fn leaf(predicate: Predicate) -> Self {
        SearchCond::Leaf(predicate)
    }

    /// A negated predicate leaf.
    pub fn not_leaf(predicate: Predicate) -> Self {
        SearchCond::NotLeaf(predicate)
    }

    /// Conjunction of two conditions.
    pub fn and(left: SearchCond, right: SearchCond) -> Self {
        SearchCond::And(Box::new(left), Box::new(right))
    }

    /// Disjunction of two conditions.
    pub fn or(left: SearchCond, right: SearchCond) -> Self {
        SearchCond::Or(Box::new(left), Box::new(right))
    }

    /// Left-deep conjunction of all conditions; `None` when empty.
    pub fn and_all(conds: impl IntoIterator<Item = SearchCond>) -> Option<Self> {
        conds.into_iter().reduce(SearchCond::and)
    }

    /// Left-deep disjunction of all conditions; `None` when empty.
    pub fn or_all(conds: impl IntoIterator<Item = SearchCond>) -> Option<Self> {
        conds.into_iter().reduce(SearchCond::or)
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            SearchCond::Leaf(_) | SearchCond::NotLeaf(_) => 1,
            SearchCond::And(left, right) | SearchCond::Or(left, right) => {
                left.leaf_count() + right.leaf_count()
            }
        }
    }
}

impl From<Predicate> for SearchCond {
    fn from(predicate: Predicate) -> Self {
        SearchCond::Leaf(predicate)
    }
}
