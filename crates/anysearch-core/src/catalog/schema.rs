//! Plain schema metadata.
//!
//! Plain schemas describe custom attributes: their semantic type, cardinality
//! and uniqueness. They are owned by an external metadata store reached
//! through [`SchemaStore`].

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Mandatory condition meaning "always required".
pub const MANDATORY_ALWAYS: &str = "true";

/// Semantic type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttrSchemaType {
    /// Free text.
    String,
    /// Text restricted to an enumeration.
    Enum,
    /// Boolean.
    Boolean,
    /// Timestamp.
    Date,
    /// Floating point.
    Double,
    /// Integer.
    Long,
}

impl AttrSchemaType {
    /// Column of the attribute views holding values of this type.
    pub fn value_column(&self) -> &'static str {
        match self {
            AttrSchemaType::String | AttrSchemaType::Enum => "stringvalue",
            AttrSchemaType::Boolean => "booleanvalue",
            AttrSchemaType::Date => "datevalue",
            AttrSchemaType::Double => "doublevalue",
            AttrSchemaType::Long => "longvalue",
        }
    }

    /// String and enum values; the only types LIKE and case folding apply to.
    pub fn is_textual(&self) -> bool {
        matches!(self, AttrSchemaType::String | AttrSchemaType::Enum)
    }

    /// Parse a type name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" => Some(AttrSchemaType::String),
            "enum" => Some(AttrSchemaType::Enum),
            "boolean" => Some(AttrSchemaType::Boolean),
            "date" => Some(AttrSchemaType::Date),
            "double" => Some(AttrSchemaType::Double),
            "long" => Some(AttrSchemaType::Long),
            _ => None,
        }
    }
}

/// A plain schema definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainSchema {
    /// Schema key.
    pub key: String,
    /// Semantic type.
    pub schema_type: AttrSchemaType,
    /// Whether an identity may hold several values.
    pub multivalue: bool,
    /// Whether values are unique across identities; such values live in the
    /// unique attribute view.
    pub unique_constraint: bool,
    /// Mandatory condition expression; `"true"` means always required.
    pub mandatory_condition: String,
    /// Allowed values for enum schemas; empty means unrestricted.
    #[serde(default)]
    pub enum_values: Vec<String>,
}

impl PlainSchema {
    /// Create an optional, single-valued, non-unique schema.
    pub fn new(key: impl Into<String>, schema_type: AttrSchemaType) -> Self {
        Self {
            key: key.into(),
            schema_type,
            multivalue: false,
            unique_constraint: false,
            mandatory_condition: "false".to_string(),
            enum_values: Vec::new(),
        }
    }

    /// Mark as multivalued.
    pub fn with_multivalue(mut self) -> Self {
        self.multivalue = true;
        self
    }

    /// Mark as unique-constrained.
    pub fn with_unique_constraint(mut self) -> Self {
        self.unique_constraint = true;
        self
    }

    /// Set the mandatory condition.
    pub fn with_mandatory_condition(mut self, condition: impl Into<String>) -> Self {
        self.mandatory_condition = condition.into();
        self
    }

    /// Restrict enum values.
    pub fn with_enum_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Whether every identity is guaranteed to hold this attribute.
    pub fn is_mandatory(&self) -> bool {
        self.mandatory_condition == MANDATORY_ALWAYS
    }
}

/// Lookup of plain schemas by key.
pub trait SchemaStore: Send + Sync {
    /// Find a schema; `Ok(None)` when no such schema exists.
    fn find_schema(&self, key: &str) -> Result<Option<PlainSchema>>;
}
