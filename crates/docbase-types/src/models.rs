use std::fmt;

use serde::{Deserialize, Serialize};

/// Authorization tier. Stored in the database as a stable lowercase tag,
/// independent of any display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Regular,
}

impl Role {
    /// Stable tag used for the `role` column. Never a display string.
    pub fn as_tag(self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Regular => "regular",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "administrator" => Some(Role::Administrator),
            "regular" => Some(Role::Regular),
            _ => None,
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Administrator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Role::Administrator => "Administrator",
            Role::Regular => "Regular user",
        };
        f.write_str(label)
    }
}

/// A registered user. The password hash stays inside the storage layer and
/// is never part of this type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    pub role: Role,
}

/// The `(username, role)` projection used by user listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub name: String,
    pub content: String,
    /// Raw comma-separated tag list, kept as entered.
    pub keywords: String,
    pub category: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_tag_roundtrip() {
        for role in [Role::Administrator, Role::Regular] {
            assert_eq!(Role::from_tag(role.as_tag()), Some(role));
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        assert_eq!(Role::from_tag("Administrator"), None);
        assert_eq!(Role::from_tag(""), None);
    }
}
