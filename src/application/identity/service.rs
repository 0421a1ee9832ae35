//! User management service: application-layer orchestration
//!
//! Enforces the multi-step rules on top of the repository: insert followed
//! by a mandatory re-fetch, existence check before partial updates, and
//! password confirmation that never reveals whether the user exists.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::{
    ConfirmResult, CreateUserDto, Identity, NewUser, Patch, UpdateUserDto, User, UserChanges, UserKey,
    UserRepositoryInterface,
};
use crate::infrastructure::crypto::password::{hash_password, verify_password};
use crate::support::pagination::shape;
use crate::support::{Page, PageRequest, PersistenceError, UserError, UserResult};

/// Orchestrates the user-management use-cases.
///
/// Generic over `R: UserRepositoryInterface` so it stays decoupled from
/// the concrete persistence layer.
pub struct UserService<R: UserRepositoryInterface> {
    repo: Arc<R>,
    password_cost: u32,
}

impl<R: UserRepositoryInterface> UserService<R> {
    pub fn new(repo: Arc<R>, password_cost: u32) -> Self {
        Self {
            repo,
            password_cost,
        }
    }

    // ── Commands (mutations) ────────────────────────────────────

    /// Insert a user and return it as stored.
    ///
    /// # Panics
    ///
    /// If the insert succeeds but the row cannot be read back in the same
    /// tenant. Nothing in this service deletes users, so that means the
    /// store broke its contract.
    pub async fn create(&self, dto: CreateUserDto, tenant: &str) -> UserResult<User> {
        let identity = dto.identity();
        let password = match dto.password {
            Some(password) => Some(self.hash(password).await?),
            None => None,
        };

        let new_user = NewUser {
            identity: identity.clone(),
            username: dto.username,
            password,
            role: dto.role.unwrap_or_default(),
        };
        self.repo.insert(&new_user, tenant).await?;

        let key = UserKey::Identity(identity);
        let Some(user) = self.repo.find_one(tenant, &key).await? else {
            error!(tenant, %key, "Inserted user missing on re-fetch");
            panic!(
                "invariant violated: user {key} was inserted in tenant '{tenant}' \
                 but could not be read back"
            );
        };

        info!(tenant, user_id = %user.id, username = %user.username, "New user created");
        Ok(user)
    }

    /// Apply a partial update and return the updated user.
    pub async fn update(&self, tenant: &str, key: &UserKey, dto: UpdateUserDto) -> UserResult<User> {
        let existing = self.get(tenant, key).await?;
        if dto.is_empty() {
            return Ok(existing);
        }

        let password = match dto.password {
            Patch::Unset => Patch::Unset,
            Patch::Null => Patch::Null,
            Patch::Value(password) => Patch::Value(self.hash(password).await?),
        };
        let changes = UserChanges {
            username: dto.username,
            password,
            role: dto.role,
        };
        self.repo.update_partial(tenant, key, &changes).await?;

        let user = self.get(tenant, key).await?;
        info!(tenant, user_id = %user.id, "User updated");
        Ok(user)
    }

    /// Replace the stored password.
    pub async fn change_password(&self, tenant: &str, key: &UserKey, password: String) -> UserResult<User> {
        let dto = UpdateUserDto {
            password: Patch::Value(password),
            ..UpdateUserDto::default()
        };
        self.update(tenant, key, dto).await
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn get(&self, tenant: &str, key: &UserKey) -> UserResult<User> {
        self.repo
            .find_one(tenant, key)
            .await?
            .ok_or_else(|| UserError::not_found(key))
    }

    /// One page of the tenant's users, newest first.
    pub async fn list(
        &self,
        tenant: &str,
        page: PageRequest,
        username: Option<&str>,
    ) -> UserResult<Page<User>> {
        let rows = self.repo.find(tenant, &page, username).await?;
        Ok(shape(rows, &page))
    }

    /// Check a candidate password.
    ///
    /// Unknown user, user without a password and wrong password all yield
    /// the same rejected result; only persistence failures are errors.
    pub async fn confirm(&self, tenant: &str, key: &UserKey, candidate: &str) -> UserResult<ConfirmResult> {
        let Some(credentials) = self.repo.find_credentials(tenant, key).await? else {
            return Ok(ConfirmResult::rejected());
        };
        let Some(stored) = credentials.password else {
            return Ok(ConfirmResult::rejected());
        };

        let candidate = candidate.to_owned();
        let matches = tokio::task::spawn_blocking(move || verify_password(&candidate, &stored))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "Password verification task failed");
                false
            });

        if !matches {
            return Ok(ConfirmResult::rejected());
        }

        Ok(ConfirmResult::accepted(Identity::new(
            credentials.provider,
            credentials.provider_user_id,
        )))
    }

    // ── Helpers ─────────────────────────────────────────────────

    async fn hash(&self, password: String) -> Result<String, PersistenceError> {
        let cost = self.password_cost;
        tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| PersistenceError::new(e, None))?
            .map_err(|e| PersistenceError::new(e, None))
    }
}
