//! ORDER BY planning.
//!
//! Sort clauses name either a core field or an attribute schema. Core fields
//! sort on the core-field view; attributes join the (unique) attribute view
//! filtered on the schema.

use std::collections::BTreeSet;

use anysearch_proto::OrderSpec;
use tracing::warn;

use super::fragment::SqlFragment;
use crate::catalog::{find_field, SchemaStore, SearchView, ViewCatalog};
use crate::error::{Error, Result};

/// One sort key of the final query.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    /// Expression added to the SELECT list, aliased `ob_<n>`.
    pub select: String,
    /// Join condition restricting the view to the sorted schema.
    pub where_clause: Option<SqlFragment>,
    /// ORDER BY term.
    pub order_by: String,
    /// View the expression reads from.
    pub view: SearchView,
    /// Attribute schema sorted on, if any.
    pub schema: Option<String>,
}

/// The planned ORDER BY.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBySupport {
    /// Sort keys in clause order.
    pub items: Vec<OrderItem>,
    /// Views to join, each once.
    pub views: Vec<SearchView>,
    /// Whether a sorted attribute is not mandatory.
    pub non_mandatory: bool,
}

impl OrderBySupport {
    /// Plan the sort clauses for a kind.
    ///
    /// Unknown properties are dropped. Sorting on more than one unique or
    /// more than one non-unique attribute is rejected.
    pub fn plan(catalog: ViewCatalog, schemas: &dyn SchemaStore, sort: &[OrderSpec]) -> Result<Self> {
        let mut support = OrderBySupport::default();
        let mut unique = BTreeSet::new();
        let mut non_unique = BTreeSet::new();

        for clause in sort {
            let alias = format!("ob_{}", support.items.len());
            let order_by = format!("{alias} {}", clause.direction.as_sql());

            if let Some(field) = find_field(catalog.kind(), &clause.property) {
                let view = catalog.field();
                support.add(OrderItem {
                    select: format!("{}.{} AS {alias}", view.alias, field.column),
                    where_clause: None,
                    order_by,
                    view,
                    schema: None,
                });
                continue;
            }

            let Some(schema) = schemas.find_schema(&clause.property)? else {
                warn!(property = %clause.property, "Unsupported sort property, ignoring");
                continue;
            };

            let view = catalog.attr_for(schema.unique_constraint);
            if schema.unique_constraint {
                unique.insert(schema.key.clone());
            } else {
                non_unique.insert(schema.key.clone());
            }
            support.non_mandatory |= !schema.is_mandatory();
            support.add(OrderItem {
                select: format!(
                    "{}.{} AS {alias}",
                    view.alias,
                    schema.schema_type.value_column()
                ),
                where_clause: Some(
                    SqlFragment::new(format!("{}.schema_id=", view.alias)).bind(&schema.key),
                ),
                order_by,
                view,
                schema: Some(schema.key),
            });
        }

        for keys in [&unique, &non_unique] {
            if keys.len() > 1 {
                let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
                return Err(Error::InvalidSearchParameters(format!(
                    "Order by more than one attribute is not allowed; remove one from {}",
                    keys.join(", ")
                )));
            }
        }

        Ok(support)
    }

    fn add(&mut self, item: OrderItem) {
        if !self.views.contains(&item.view) {
            self.views.push(item.view);
        }
        self.items.push(item);
    }

    /// Whether there is anything to sort on.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// FROM-list entries for the joined views.
    ///
    /// With `augment`, attribute views are replaced by a union that adds a
    /// NULL-valued row for every identity lacking the sorted attribute, so
    /// sorting does not drop those identities.
    pub fn sources(&self, field: SearchView, augment: bool) -> Vec<SqlFragment> {
        self.views
            .iter()
            .map(|view| {
                let schema = self
                    .items
                    .iter()
                    .find(|item| item.view == *view)
                    .and_then(|item| item.schema.as_deref());
                match schema {
                    Some(schema) if augment => augmented_attr_view(*view, field, schema),
                    _ => SqlFragment::new(format!("{} {}", view.name, view.alias)),
                }
            })
            .collect()
    }

    /// Join conditions against the condition subquery aliased `u`, then the
    /// per-item schema restrictions.
    pub fn join_conditions(&self) -> Vec<SqlFragment> {
        let joins = self
            .views
            .iter()
            .map(|view| SqlFragment::new(format!("u.any_id={}.any_id", view.alias)));
        let restrictions = self
            .items
            .iter()
            .filter_map(|item| item.where_clause.clone());
        joins.chain(restrictions).collect()
    }

    /// Expressions appended to the SELECT list.
    pub fn select_list(&self) -> String {
        self.items
            .iter()
            .map(|item| format!(", {}", item.select))
            .collect()
    }

    /// `ORDER BY ...` clause, empty when there is nothing to sort on.
    pub fn order_by_clause(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        let terms: Vec<&str> = self.items.iter().map(|item| item.order_by.as_str()).collect();
        format!(" ORDER BY {}", terms.join(", "))
    }
}

fn augmented_attr_view(view: SearchView, field: SearchView, schema: &str) -> SqlFragment {
    SqlFragment::new(format!(
        "(SELECT any_id, schema_id, booleanvalue, datevalue, doublevalue, longvalue, stringvalue \
         FROM {} WHERE schema_id=",
        view.name
    ))
    .bind(schema)
    .push(" UNION SELECT any_id, ")
    .bind(schema)
    .push(&format!(
        " AS schema_id, NULL AS booleanvalue, NULL AS datevalue, NULL AS doublevalue, \
         NULL AS longvalue, NULL AS stringvalue FROM {} WHERE any_id NOT IN \
         (SELECT any_id FROM {} WHERE schema_id=",
        field.name, view.name
    ))
    .bind(schema)
    .push(&format!(")) {}", view.alias))
}
