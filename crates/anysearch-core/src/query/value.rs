//! Bind values and literal validation.
//!
//! Predicate literals arrive as strings and are parsed according to the
//! semantic type of the attribute or core field they are compared with.

use std::fmt;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::catalog::{AttrSchemaType, PlainSchema};
use crate::error::{Error, Result};

/// A positional bind parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SqlValue {
    /// Text.
    String(String),
    /// Integer.
    Long(i64),
    /// Floating point.
    Double(f64),
    /// Boolean, bound as 1/0.
    Boolean(bool),
    /// Timestamp, bound as RFC 3339 text in UTC with second precision.
    Date(DateTime<Utc>),
}

impl SqlValue {
    /// Text form of a date as stored in the views.
    pub fn format_date(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Parse a literal for a value of the given type.
    pub fn parse(schema_type: AttrSchemaType, literal: &str) -> Result<Self> {
        let invalid = |what: &str| {
            Error::InvalidSearchExpression(format!("'{literal}' is not a valid {what} value"))
        };

        match schema_type {
            AttrSchemaType::String | AttrSchemaType::Enum => Ok(SqlValue::String(literal.to_string())),
            AttrSchemaType::Long => literal
                .trim()
                .parse::<i64>()
                .map(SqlValue::Long)
                .map_err(|_| invalid("long")),
            AttrSchemaType::Double => literal
                .trim()
                .parse::<f64>()
                .map(SqlValue::Double)
                .map_err(|_| invalid("double")),
            AttrSchemaType::Boolean => match literal.trim().to_ascii_lowercase().as_str() {
                "true" => Ok(SqlValue::Boolean(true)),
                "false" => Ok(SqlValue::Boolean(false)),
                _ => Err(invalid("boolean")),
            },
            AttrSchemaType::Date => parse_date(literal.trim())
                .map(SqlValue::Date)
                .ok_or_else(|| invalid("date")),
        }
    }

    /// Parse and validate a literal against a plain schema.
    ///
    /// Enum schemas that declare their values only accept those values.
    pub fn for_schema(schema: &PlainSchema, literal: &str) -> Result<Self> {
        if schema.schema_type == AttrSchemaType::Enum
            && !schema.enum_values.is_empty()
            && !schema.enum_values.iter().any(|v| v == literal)
        {
            return Err(Error::InvalidSearchExpression(format!(
                "'{literal}' is not one of the values of {}: {:?}",
                schema.key, schema.enum_values
            )));
        }
        Self::parse(schema.schema_type, literal)
    }
}

fn parse_date(literal: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(literal) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(literal, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|datetime| datetime.and_utc())
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::String(s) => write!(f, "'{s}'"),
            SqlValue::Long(v) => write!(f, "{v}"),
            SqlValue::Double(v) => write!(f, "{v}"),
            SqlValue::Boolean(v) => write!(f, "{}", u8::from(*v)),
            SqlValue::Date(d) => write!(f, "'{}'", Self::format_date(d)),
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::String(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::String(value)
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        SqlValue::String(value.clone())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Long(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Boolean(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers() {
        assert_eq!(SqlValue::parse(AttrSchemaType::Long, "42").unwrap(), SqlValue::Long(42));
        assert_eq!(
            SqlValue::parse(AttrSchemaType::Double, "1.5").unwrap(),
            SqlValue::Double(1.5)
        );
        let err = SqlValue::parse(AttrSchemaType::Long, "forty").unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_parse_boolean() {
        assert_eq!(
            SqlValue::parse(AttrSchemaType::Boolean, "TRUE").unwrap(),
            SqlValue::Boolean(true)
        );
        assert!(SqlValue::parse(AttrSchemaType::Boolean, "yes").is_err());
    }

    #[test]
    fn test_parse_dates() {
        let plain = SqlValue::parse(AttrSchemaType::Date, "2024-03-01").unwrap();
        let full = SqlValue::parse(AttrSchemaType::Date, "2024-03-01T02:00:00+02:00").unwrap();
        assert_eq!(plain, full);
        assert_eq!(plain.to_string(), "'2024-03-01T00:00:00Z'");
    }

    #[test]
    fn test_enum_values_enforced() {
        let schema = PlainSchema::new("color", AttrSchemaType::Enum).with_enum_values(["red", "green"]);
        assert!(SqlValue::for_schema(&schema, "red").is_ok());
        let err = SqlValue::for_schema(&schema, "blue").unwrap_err();
        assert!(err.to_string().contains("blue"));
    }
}
