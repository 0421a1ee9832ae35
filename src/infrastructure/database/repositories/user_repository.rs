use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sea_orm::sea_query::{ConditionalStatement, Expr, Order, Query};
use tracing::{debug, info};

use crate::domain::{
    NewUser, Patch, User, UserChanges, UserCredentials, UserKey, UserRepositoryInterface,
};
use crate::infrastructure::database::error_codes::{classify, ErrorClass};
use crate::infrastructure::database::schema::{Users, CREDENTIAL_COLUMNS, USER_COLUMNS};
use crate::infrastructure::database::QueryExecutor;
use crate::support::pagination::window;
use crate::support::{PageRequest, PersistenceError, UserError, UserResult};

pub struct UserRepository {
    executor: Arc<QueryExecutor>,
}

impl UserRepository {
    pub fn new(executor: Arc<QueryExecutor>) -> Self {
        Self { executor }
    }

    /// Turns a duplicate-key failure into `AlreadyExists`; anything else
    /// passes through untouched.
    fn classify_write_error(&self, err: PersistenceError) -> UserError {
        match classify(self.executor.backend(), err.code()) {
            Some(ErrorClass::DuplicateKey) => UserError::AlreadyExists,
            None => UserError::Persistence(err),
        }
    }
}

// ── Statement helpers ───────────────────────────────────────────

/// Restrict a statement to one tenant and, optionally, one user.
fn scope<S: ConditionalStatement>(statement: &mut S, tenant: &str, key: Option<&UserKey>) {
    statement.and_where(Expr::col(Users::Tenant).eq(tenant));

    match key {
        Some(UserKey::Id(id)) => {
            statement.and_where(Expr::col(Users::Id).eq(id.as_str()));
        }
        Some(UserKey::Identity(identity)) => {
            statement
                .and_where(Expr::col(Users::Provider).eq(identity.provider.as_str()))
                .and_where(Expr::col(Users::ProviderUserId).eq(identity.provider_user_id.as_str()));
        }
        None => {}
    }
}

/// Microsecond precision, `Z` suffix: every value has the same width.
fn created_at_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn find(
        &self,
        tenant: &str,
        page: &PageRequest,
        username: Option<&str>,
    ) -> Result<Vec<User>, PersistenceError> {
        let window = window(page);

        let mut select = Query::select();
        select.columns(USER_COLUMNS).from(Users::Table);
        scope(&mut select, tenant, None);
        if let Some(username) = username {
            select.and_where(Expr::col(Users::Username).eq(username));
        }
        select
            .order_by(Users::CreatedAt, Order::Desc)
            .order_by(Users::Id, Order::Desc)
            .limit(window.limit)
            .offset(window.offset);

        let statement = self.executor.backend().build(&select);
        self.executor.query_as(statement).await
    }

    async fn find_one(&self, tenant: &str, key: &UserKey) -> Result<Option<User>, PersistenceError> {
        let mut select = Query::select();
        select.columns(USER_COLUMNS).from(Users::Table);
        scope(&mut select, tenant, Some(key));

        let statement = self.executor.backend().build(&select);
        self.executor.query_one_as(statement).await
    }

    async fn find_credentials(
        &self,
        tenant: &str,
        key: &UserKey,
    ) -> Result<Option<UserCredentials>, PersistenceError> {
        let mut select = Query::select();
        select.columns(CREDENTIAL_COLUMNS).from(Users::Table);
        scope(&mut select, tenant, Some(key));

        let statement = self.executor.backend().build(&select);
        self.executor.query_one_as(statement).await
    }

    async fn insert(&self, user: &NewUser, tenant: &str) -> UserResult<()> {
        let id = uuid::Uuid::new_v4().to_string();

        let mut insert = Query::insert();
        insert
            .into_table(Users::Table)
            .columns([
                Users::Id,
                Users::Tenant,
                Users::Provider,
                Users::ProviderUserId,
                Users::Username,
                Users::Password,
                Users::Role,
                Users::CreatedAt,
            ])
            .values([
                id.as_str().into(),
                tenant.into(),
                user.identity.provider.as_str().into(),
                user.identity.provider_user_id.as_str().into(),
                user.username.as_str().into(),
                user.password.clone().into(),
                user.role.as_str().into(),
                created_at_now().into(),
            ])
            .map_err(|e| UserError::Persistence(PersistenceError::new(e, None)))?;

        let statement = self.executor.backend().build(&insert);
        self.executor
            .execute(statement)
            .await
            .map_err(|e| self.classify_write_error(e))?;

        info!(tenant, user_id = %id, identity = %user.identity, "User inserted");
        Ok(())
    }

    async fn update_partial(&self, tenant: &str, key: &UserKey, changes: &UserChanges) -> UserResult<()> {
        if changes.is_empty() {
            debug!(tenant, %key, "Empty update, nothing to write");
            return Ok(());
        }

        let mut update = Query::update();
        update.table(Users::Table);

        if let Some(username) = &changes.username {
            update.value(Users::Username, username.as_str());
        }
        match &changes.password {
            Patch::Unset => {}
            Patch::Null => {
                update.value(Users::Password, Option::<String>::None);
            }
            Patch::Value(hash) => {
                update.value(Users::Password, hash.as_str());
            }
        }
        if let Some(role) = changes.role {
            update.value(Users::Role, role.as_str());
        }
        scope(&mut update, tenant, Some(key));

        let statement = self.executor.backend().build(&update);
        let affected = self
            .executor
            .execute(statement)
            .await
            .map_err(|e| self.classify_write_error(e))?;

        debug!(tenant, %key, affected, "User updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::UserService;
    use crate::domain::{CreateUserDto, Identity, UpdateUserDto, UserRole};
    use crate::infrastructure::crypto::password::MIN_COST;
    use crate::infrastructure::database::{init_database, DatabaseConfig};

    async fn repository() -> Arc<UserRepository> {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();
        let executor = Arc::new(QueryExecutor::new(db));
        executor.migrate().await.unwrap();
        Arc::new(UserRepository::new(executor))
    }

    async fn service() -> UserService<UserRepository> {
        UserService::new(repository().await, MIN_COST)
    }

    fn dto(provider_user_id: &str, username: &str, password: Option<&str>) -> CreateUserDto {
        CreateUserDto {
            provider: "discord".to_string(),
            provider_user_id: provider_user_id.to_string(),
            username: username.to_string(),
            password: password.map(str::to_string),
            role: None,
        }
    }

    fn new_user(provider_user_id: &str, username: &str) -> NewUser {
        NewUser {
            identity: Identity::new("discord", provider_user_id),
            username: username.to_string(),
            password: None,
            role: UserRole::Default,
        }
    }

    #[tokio::test]
    async fn test_insert_then_find_one_by_both_keys() {
        let repo = repository().await;
        repo.insert(&new_user("1", "alice"), "acme").await.unwrap();

        let by_identity = repo
            .find_one("acme", &UserKey::Identity(Identity::new("discord", "1")))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_identity.tenant, "acme");
        assert_eq!(by_identity.username, "alice");
        assert_eq!(by_identity.role, UserRole::Default);

        let by_id = repo
            .find_one("acme", &UserKey::Id(by_identity.id.clone()))
            .await
            .unwrap();
        assert_eq!(by_id, Some(by_identity));
    }

    #[tokio::test]
    async fn test_tenants_do_not_see_each_other() {
        let repo = repository().await;
        repo.insert(&new_user("1", "alice"), "acme").await.unwrap();

        let key = UserKey::Identity(Identity::new("discord", "1"));
        assert!(repo.find_one("globex", &key).await.unwrap().is_none());
        assert!(repo.find_credentials("globex", &key).await.unwrap().is_none());
        assert!(repo
            .find("globex", &PageRequest::default(), None)
            .await
            .unwrap()
            .is_empty());

        // Same identity and username are free in another tenant.
        repo.insert(&new_user("1", "alice"), "globex").await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicates_map_to_already_exists() {
        let repo = repository().await;
        repo.insert(&new_user("1", "alice"), "acme").await.unwrap();

        let same_identity = repo.insert(&new_user("1", "bob"), "acme").await.unwrap_err();
        assert!(matches!(same_identity, UserError::AlreadyExists));

        let same_username = repo.insert(&new_user("2", "alice"), "acme").await.unwrap_err();
        assert!(matches!(same_username, UserError::AlreadyExists));
    }

    #[tokio::test]
    async fn test_update_partial_scoped_to_tenant() {
        let repo = repository().await;
        repo.insert(&new_user("1", "alice"), "acme").await.unwrap();
        let key = UserKey::Identity(Identity::new("discord", "1"));

        let changes = UserChanges {
            role: Some(UserRole::Admin),
            ..Default::default()
        };
        repo.update_partial("globex", &key, &changes).await.unwrap();
        let user = repo.find_one("acme", &key).await.unwrap().unwrap();
        assert_eq!(user.role, UserRole::Default);

        repo.update_partial("acme", &key, &changes).await.unwrap();
        let user = repo.find_one("acme", &key).await.unwrap().unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_renaming_onto_taken_username_is_conflict() {
        let repo = repository().await;
        repo.insert(&new_user("1", "alice"), "acme").await.unwrap();
        repo.insert(&new_user("2", "bob"), "acme").await.unwrap();

        let changes = UserChanges {
            username: Some("alice".to_string()),
            ..Default::default()
        };
        let err = repo
            .update_partial("acme", &UserKey::Identity(Identity::new("discord", "2")), &changes)
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::AlreadyExists));
    }

    #[tokio::test]
    async fn test_create_round_trips_every_field() {
        let service = service().await;
        let mut input = dto("42", "alice", None);
        input.role = Some(UserRole::Mod);

        let created = service.create(input, "acme").await.unwrap();

        assert_eq!(created.tenant, "acme");
        assert_eq!(created.provider, "discord");
        assert_eq!(created.provider_user_id, "42");
        assert_eq!(created.username, "alice");
        assert_eq!(created.role, UserRole::Mod);

        let fetched = service.get("acme", &UserKey::Id(created.id.clone())).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_list_pages_are_disjoint() {
        let service = service().await;
        for (i, name) in ["alice", "bob", "carol"].iter().enumerate() {
            service.create(dto(&i.to_string(), name, None), "acme").await.unwrap();
        }
        service.create(dto("9", "mallory", None), "globex").await.unwrap();

        let first = service
            .list("acme", PageRequest::new(1, 2, 100).unwrap(), None)
            .await
            .unwrap();
        let second = service
            .list("acme", PageRequest::new(2, 2, 100).unwrap(), None)
            .await
            .unwrap();

        assert_eq!(first.items.len(), 2);
        assert!(first.page_info.has_next_page);
        assert_eq!(second.items.len(), 1);
        assert!(!second.page_info.has_next_page);
        assert!(first.items.iter().all(|u| u.id != second.items[0].id));
        assert!(first.items.iter().chain(&second.items).all(|u| u.tenant == "acme"));

        let newest = first.items[0].created_at;
        assert!(first.items.iter().chain(&second.items).all(|u| u.created_at <= newest));
    }

    #[tokio::test]
    async fn test_equal_timestamps_page_by_id_descending() {
        let repo = repository().await;
        for id in ["b", "a", "c"] {
            let mut insert = Query::insert();
            insert
                .into_table(Users::Table)
                .columns([
                    Users::Id,
                    Users::Tenant,
                    Users::Provider,
                    Users::ProviderUserId,
                    Users::Username,
                    Users::CreatedAt,
                ])
                .values_panic([
                    id.into(),
                    "acme".into(),
                    "discord".into(),
                    id.into(),
                    format!("user-{id}").into(),
                    "2024-01-01T00:00:00.000000Z".into(),
                ]);
            let statement = repo.executor.backend().build(&insert);
            repo.executor.execute(statement).await.unwrap();
        }

        let ids = |users: Vec<User>| users.into_iter().map(|u| u.id).collect::<Vec<_>>();
        let first = repo
            .find("acme", &PageRequest::new(1, 2, 100).unwrap(), None)
            .await
            .unwrap();
        let second = repo
            .find("acme", &PageRequest::new(2, 2, 100).unwrap(), None)
            .await
            .unwrap();

        // Each window holds one look-ahead row past the page.
        assert_eq!(ids(first), ["c", "b", "a"]);
        assert_eq!(ids(second), ["a"]);

        let service = UserService::new(repo, MIN_COST);
        let page_one = service
            .list("acme", PageRequest::new(1, 2, 100).unwrap(), None)
            .await
            .unwrap();
        let page_two = service
            .list("acme", PageRequest::new(2, 2, 100).unwrap(), None)
            .await
            .unwrap();

        assert!(page_one.page_info.has_next_page);
        assert!(!page_two.page_info.has_next_page);
        assert_eq!(ids(page_one.items), ["c", "b"]);
        assert_eq!(ids(page_two.items), ["a"]);
    }

    #[tokio::test]
    async fn test_list_filters_by_username() {
        let service = service().await;
        service.create(dto("1", "alice", None), "acme").await.unwrap();
        service.create(dto("2", "bob", None), "acme").await.unwrap();

        let page = service
            .list("acme", PageRequest::default(), Some("bob"))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].provider_user_id, "2");
        assert!(!page.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_confirm_follows_password_changes() {
        let service = service().await;
        let created = service.create(dto("1", "alice", None), "acme").await.unwrap();
        let key = UserKey::Id(created.id.clone());

        let no_password = service.confirm("acme", &key, "anything").await.unwrap();
        assert!(!no_password.is_correct);
        assert!(no_password.identity.is_none());

        service
            .change_password("acme", &key, "first-pw".to_string())
            .await
            .unwrap();
        assert!(service.confirm("acme", &key, "first-pw").await.unwrap().is_correct);

        service
            .change_password("acme", &key, "second-pw".to_string())
            .await
            .unwrap();
        assert!(!service.confirm("acme", &key, "first-pw").await.unwrap().is_correct);

        let accepted = service.confirm("acme", &key, "second-pw").await.unwrap();
        assert!(accepted.is_correct);
        assert_eq!(accepted.identity, Some(Identity::new("discord", "1")));
    }

    #[tokio::test]
    async fn test_clearing_password_locks_out_confirm() {
        let service = service().await;
        let created = service.create(dto("1", "alice", Some("secret")), "acme").await.unwrap();
        let key = UserKey::Identity(created.identity());
        assert!(service.confirm("acme", &key, "secret").await.unwrap().is_correct);

        let dto = UpdateUserDto {
            password: Patch::Null,
            ..Default::default()
        };
        let updated = service.update("acme", &key, dto).await.unwrap();

        assert_eq!(updated.username, "alice");
        assert!(!service.confirm("acme", &key, "secret").await.unwrap().is_correct);
    }

    #[tokio::test]
    async fn test_role_only_update_leaves_other_fields() {
        let service = service().await;
        let created = service.create(dto("1", "alice", None), "acme").await.unwrap();
        let key = UserKey::Id(created.id.clone());

        let dto = UpdateUserDto {
            role: Some(UserRole::Admin),
            ..Default::default()
        };
        let updated = service.update("acme", &key, dto).await.unwrap();

        assert_eq!(updated.role, UserRole::Admin);
        assert_eq!(updated.username, created.username);
        assert_eq!(updated.created_at, created.created_at);

        let unchanged = service.update("acme", &key, UpdateUserDto::default()).await.unwrap();
        assert_eq!(unchanged, updated);
    }

    #[tokio::test]
    async fn test_update_in_wrong_tenant_is_not_found() {
        let service = service().await;
        let created = service.create(dto("1", "alice", None), "acme").await.unwrap();

        let dto = UpdateUserDto {
            username: Some("eve".to_string()),
            ..Default::default()
        };
        let err = service
            .update("globex", &UserKey::Id(created.id), dto)
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::NotFound { .. }));
    }
}
