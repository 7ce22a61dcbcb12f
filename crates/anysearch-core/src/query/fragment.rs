//! Immutable SQL fragments.
//!
//! A fragment pairs SQL text containing anonymous `?` placeholders with the
//! values bound to them, in textual order. Because placeholders carry no
//! index, fragments compose by plain concatenation: the parameters of a
//! combined fragment are the parameters of its parts in the same order.

use super::value::SqlValue;

/// SQL text with its bind parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    sql: String,
    params: Vec<SqlValue>,
}

impl SqlFragment {
    /// A fragment without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Append SQL text.
    pub fn push(mut self, sql: &str) -> Self {
        self.sql.push_str(sql);
        self
    }

    /// Append a placeholder bound to `value`.
    pub fn bind(mut self, value: impl Into<SqlValue>) -> Self {
        self.sql.push('?');
        self.params.push(value.into());
        self
    }

    /// Append another fragment.
    pub fn append(mut self, other: SqlFragment) -> Self {
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
        self
    }

    /// Join fragments with a separator.
    pub fn join(fragments: impl IntoIterator<Item = SqlFragment>, separator: &str) -> Self {
        let mut joined = SqlFragment::default();
        for (i, fragment) in fragments.into_iter().enumerate() {
            if i > 0 {
                joined.sql.push_str(separator);
            }
            joined = joined.append(fragment);
        }
        joined
    }

    /// Open a parenthesis right after the first `WHERE `.
    ///
    /// Used when this fragment becomes the left operand of AND/OR; the caller
    /// closes the parenthesis after the right operand.
    pub fn open_first_where(mut self) -> Self {
        self.sql = self.sql.replacen("WHERE ", "WHERE (", 1);
        self
    }

    /// SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound parameters in placeholder order.
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Whether the fragment holds no text.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Split into text and parameters.
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.sql, self.params)
    }
}
