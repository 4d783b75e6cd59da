/// User domain types
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user
///
/// Identity and credentials live in the external auth provider; Cadence
/// only stores the ownership record and role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: UserId,

    /// Display name
    pub name: String,

    /// Role used for authorization decisions
    pub role: Role,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            id: UserId::generate(),
            name: name.into(),
            role,
            created_at: Utc::now(),
        }
    }

    /// Create a user with a specific ID (for database loading)
    pub fn with_id(
        id: UserId,
        name: impl Into<String>,
        role: Role,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            created_at,
        }
    }
}

/// Authorization role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular user, may only mutate resources they own
    User,
    /// Elevated role, may mutate any resource
    Admin,
}

impl Role {
    /// Convert role to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Parse role from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Whether this role overrides ownership checks
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}
