//! Identity kinds.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three kinds of identity record held by the repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnyKind {
    /// Users.
    User,
    /// Groups.
    Group,
    /// Any objects (printers, devices, ...).
    AnyObject,
}

impl AnyKind {
    /// All kinds, in declaration order.
    pub const ALL: [AnyKind; 3] = [AnyKind::User, AnyKind::Group, AnyKind::AnyObject];

    /// Canonical upper-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnyKind::User => "USER",
            AnyKind::Group => "GROUP",
            AnyKind::AnyObject => "ANY_OBJECT",
        }
    }

    /// Parse a kind from its canonical name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for AnyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind() {
        assert_eq!(AnyKind::parse("user"), Some(AnyKind::User));
        assert_eq!(AnyKind::parse("ANY_OBJECT"), Some(AnyKind::AnyObject));
        assert_eq!(AnyKind::parse("printer"), None);
    }

    #[test]
    fn test_serde_name() {
        let json = serde_json::to_string(&AnyKind::AnyObject).unwrap();
        assert_eq!(json, "\"ANY_OBJECT\"");
    }
}
