use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Mod,
    /// Lowest privilege, assigned when no role is given on create.
    #[default]
    Default,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [UserRole::Admin, UserRole::Mod, UserRole::Default];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Mod => "mod",
            UserRole::Default => "default",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| format!("unknown role '{s}' (expected admin, mod or default)"))
    }
}

/// External identity: the provider name and the user's id at that provider.
/// Unique per tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub provider: String,
    pub provider_user_id: String,
}

impl Identity {
    pub fn new(provider: impl Into<String>, provider_user_id: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            provider_user_id: provider_user_id.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.provider, self.provider_user_id)
    }
}

/// How a single user is addressed within a tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKey {
    Id(String),
    Identity(Identity),
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserKey::Id(id) => write!(f, "id={id}"),
            UserKey::Identity(identity) => write!(f, "identity={identity}"),
        }
    }
}

impl From<Identity> for UserKey {
    fn from(identity: Identity) -> Self {
        UserKey::Identity(identity)
    }
}

/// User model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub tenant: String,
    pub provider: String,
    pub provider_user_id: String,
    pub username: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity::new(self.provider.clone(), self.provider_user_id.clone())
    }
}

/// Stored credential material for one user. `password` holds a hash.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCredentials {
    pub provider: String,
    pub provider_user_id: String,
    pub password: Option<String>,
}

/// Outcome of a password confirmation. `identity` is only filled in when
/// the password matched, so a wrong password and an unknown user look the
/// same to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmResult {
    pub is_correct: bool,
    pub identity: Option<Identity>,
}

impl ConfirmResult {
    pub fn rejected() -> Self {
        Self {
            is_correct: false,
            identity: None,
        }
    }

    pub fn accepted(identity: Identity) -> Self {
        Self {
            is_correct: true,
            identity: Some(identity),
        }
    }
}
