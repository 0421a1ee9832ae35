use async_trait::async_trait;

use super::{Identity, Patch, User, UserCredentials, UserKey, UserRole};
use crate::support::{PageRequest, PersistenceError, UserResult};

/// A user ready to be inserted. `password` is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub identity: Identity,
    pub username: String,
    pub password: Option<String>,
    pub role: UserRole,
}

/// Column changes for a partial update. `password` is already hashed.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password: Patch<String>,
    pub role: Option<UserRole>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_unset() && self.role.is_none()
    }
}

/// Tenant-scoped user persistence. Every method filters by `tenant`.
#[async_trait]
pub trait UserRepositoryInterface: Send + Sync {
    /// One page of users ordered by `created_at DESC, id DESC`, fetched with
    /// one row of look-ahead (see [`crate::support::pagination::window`]).
    async fn find(
        &self,
        tenant: &str,
        page: &PageRequest,
        username: Option<&str>,
    ) -> Result<Vec<User>, PersistenceError>;

    async fn find_one(&self, tenant: &str, key: &UserKey) -> Result<Option<User>, PersistenceError>;

    async fn find_credentials(
        &self,
        tenant: &str,
        key: &UserKey,
    ) -> Result<Option<UserCredentials>, PersistenceError>;

    /// Fails with `UserError::AlreadyExists` on a unique-key violation.
    async fn insert(&self, user: &NewUser, tenant: &str) -> UserResult<()>;

    /// Writes only the present fields. An empty change set is a no-op.
    async fn update_partial(&self, tenant: &str, key: &UserKey, changes: &UserChanges) -> UserResult<()>;
}
