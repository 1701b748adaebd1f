//! Signed-in user as returned by the backend

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Role of a user inside their family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FamilyRole {
    /// Manages members and budgets
    Admin,
    #[default]
    Member,
}

/// Authenticated user profile
///
/// Only the fields the client reads are typed; the server owns the rest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_id: Option<String>,
    #[serde(default)]
    pub role: FamilyRole,
}

impl User {
    /// Creates a user without a family
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            family_id: None,
            role: FamilyRole::Member,
        }
    }

    /// Decodes a user from its serialized JSON form
    pub fn from_json(raw: &str) -> CoreResult<Self> {
        serde_json::from_str(raw).map_err(|e| CoreError::InvalidUser(e.to_string()))
    }

    /// Returns true if the user belongs to a family
    pub fn has_family(&self) -> bool {
        self.family_id.is_some()
    }

    /// Returns true if the user administers their family
    pub fn is_admin(&self) -> bool {
        self.role == FamilyRole::Admin
    }
}

impl std::fmt::Display for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
