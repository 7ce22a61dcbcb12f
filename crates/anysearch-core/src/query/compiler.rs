//! Condition tree compilation.

use std::collections::BTreeSet;

use anysearch_proto::SearchCond;

use super::fragment::SqlFragment;
use super::lower::Lowering;
use crate::error::Result;

/// A compiled condition tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    /// Query selecting the keys of matching identities.
    pub fragment: SqlFragment,
    /// Attribute schemas referenced by the tree.
    pub schemas: BTreeSet<String>,
    /// Whether any referenced schema is not mandatory.
    pub non_mandatory: bool,
}

/// Compile a condition tree.
///
/// The tree shape fully determines the SQL shape: for AND/OR the left
/// operand's first `WHERE ` opens a parenthesis that is closed after the
/// right operand, giving `<left> AND|OR any_id IN (<right>))`.
pub fn compile(lowering: &Lowering<'_>, cond: &SearchCond) -> Result<Compiled> {
    match cond {
        SearchCond::Leaf(predicate) | SearchCond::NotLeaf(predicate) => {
            let negate = matches!(cond, SearchCond::NotLeaf(_));
            let lowered = lowering.lower(predicate, negate)?;
            let mut schemas = BTreeSet::new();
            let mut non_mandatory = false;
            if let Some(schema) = lowered.schema {
                non_mandatory = !schema.is_mandatory();
                schemas.insert(schema.key);
            }
            Ok(Compiled {
                fragment: lowered.fragment,
                schemas,
                non_mandatory,
            })
        }
        SearchCond::And(left, right) => combine(lowering, left, right, " AND "),
        SearchCond::Or(left, right) => combine(lowering, left, right, " OR "),
    }
}

fn combine(
    lowering: &Lowering<'_>,
    left: &SearchCond,
    right: &SearchCond,
    connective: &str,
) -> Result<Compiled> {
    let left = compile(lowering, left)?;
    let right = compile(lowering, right)?;

    let fragment = left
        .fragment
        .open_first_where()
        .push(connective)
        .push("any_id IN (")
        .append(right.fragment)
        .push("))");

    let mut schemas = left.schemas;
    schemas.extend(right.schemas);

    Ok(Compiled {
        fragment,
        schemas,
        non_mandatory: left.non_mandatory || right.non_mandatory,
    })
}
