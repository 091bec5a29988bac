//! User service.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tsocial_common::{
    AppError, AppResult, SuspensionNotice,
    config::{AuthConfig, SystemAccountConfig},
};
use tsocial_db::{entities::user, repositories::UserRepository};
use validator::{Validate, ValidationError};

use super::auth::{TokenService, hash_password, verify_password};
use super::moderation::{DEFAULT_SUSPENSION_REASON, SYSTEM_HANDLE};

/// Shown as the suspending admin when that account no longer exists.
const FALLBACK_ADMIN_NAME: &str = "TSocial Staff";

/// Shown as `suspendedBy` when no actor was recorded.
const FALLBACK_SUSPENDED_BY: &str = "System";

/// Handles are ASCII letters, digits and underscores.
fn validate_handle(handle: &str) -> Result<(), ValidationError> {
    if handle
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Ok(())
    } else {
        Err(ValidationError::new("handle_charset"))
    }
}

/// Input for registering an account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 32), custom(function = "validate_handle"))]
    pub handle: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

/// Input for updating the caller's profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(max = 500))]
    pub bio: Option<String>,

    #[validate(length(max = 128))]
    pub location: Option<String>,

    #[validate(length(max = 512))]
    pub website: Option<String>,
}

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub account: user::Model,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    tokens: TokenService,
    system_account: SystemAccountConfig,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub fn new(
        user_repo: UserRepository,
        auth: &AuthConfig,
        system_account: SystemAccountConfig,
    ) -> Self {
        Self {
            user_repo,
            tokens: TokenService::new(auth),
            system_account,
        }
    }

    /// Register an account and sign it in.
    pub async fn register(&self, input: RegisterInput) -> AppResult<Session> {
        input.validate()?;

        if self.user_repo.find_by_handle(&input.handle).await?.is_some() {
            return Err(AppError::BadRequest("Handle is already taken".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            handle: Set(input.handle),
            name: Set(input.name),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let account = self.user_repo.create(model).await?;
        let token = self.tokens.issue(&account)?;

        Ok(Session { token, account })
    }

    /// Sign in with handle and password.
    ///
    /// A suspended account gets [`AppError::AccountSuspended`] carrying the
    /// context the client needs to show the suspension and appeal screens.
    pub async fn login(&self, handle: &str, password: &str) -> AppResult<Session> {
        let account = match self.user_repo.find_by_handle(handle).await? {
            Some(account) if verify_password(password, &account.password_hash)? => account,
            _ => return Err(AppError::Unauthorized),
        };

        if account.is_suspended {
            return Err(AppError::AccountSuspended(Box::new(
                self.suspension_notice(&account).await?,
            )));
        }

        let token = self.tokens.issue(&account)?;
        Ok(Session { token, account })
    }

    async fn suspension_notice(&self, account: &user::Model) -> AppResult<SuspensionNotice> {
        let admin_name = match &account.suspended_by {
            Some(by) => self.user_repo.find_by_handle(by).await?.map(|a| a.name),
            None => None,
        };

        Ok(SuspensionNotice {
            reason: account
                .suspension_reason
                .clone()
                .unwrap_or_else(|| DEFAULT_SUSPENSION_REASON.to_string()),
            suspended_by: account
                .suspended_by
                .clone()
                .unwrap_or_else(|| FALLBACK_SUSPENDED_BY.to_string()),
            admin_name: admin_name.unwrap_or_else(|| FALLBACK_ADMIN_NAME.to_string()),
            user_name: account.name.clone(),
            appeal_status: account.appeal_status.map(|s| s.as_str().to_string()),
            appeal_text: account.appeal_text.clone(),
        })
    }

    /// Resolve a bearer token to its account.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.tokens.verify(token)?;
        self.user_repo
            .find_by_id(claims.user_id()?)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    /// Record activity for presence display.
    pub async fn touch_activity(&self, user_id: i64) -> AppResult<()> {
        self.user_repo.touch_last_active(user_id).await
    }

    /// Get a user by handle.
    pub async fn get_by_handle(&self, handle: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_handle(handle).await
    }

    /// Update the caller's profile fields.
    pub async fn update_profile(
        &self,
        user_id: i64,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let model = user::ActiveModel {
            id: Set(user_id),
            name: Set(input.name),
            bio: Set(input.bio),
            location: Set(input.location),
            website: Set(input.website),
            ..Default::default()
        };

        self.user_repo.update(model).await
    }

    /// Make sure the system account exists, is admin, and is not suspended.
    pub async fn ensure_system_account(&self) -> AppResult<user::Model> {
        if let Some(existing) = self.user_repo.find_by_handle(SYSTEM_HANDLE).await? {
            if !existing.is_admin || existing.is_suspended {
                tracing::warn!(
                    user_id = existing.id,
                    "System account was altered, restoring admin role"
                );
                self.user_repo.restore_privileged(existing.id).await?;
                return self.user_repo.get_by_id(existing.id).await;
            }
            return Ok(existing);
        }

        let model = user::ActiveModel {
            handle: Set(SYSTEM_HANDLE.to_string()),
            name: Set(self.system_account.name.clone()),
            password_hash: Set(hash_password(&self.system_account.password)?),
            is_admin: Set(true),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let account = self.user_repo.create(model).await?;
        tracing::info!(user_id = account.id, handle = SYSTEM_HANDLE, "Created system account");
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr};
    use std::sync::Arc;
    use tsocial_db::entities::AppealStatus;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 24,
        }
    }

    fn create_test_user(id: i64, handle: &str, password: &str) -> user::Model {
        user::Model {
            id,
            handle: handle.to_string(),
            name: format!("{handle} name"),
            password_hash: hash_password(password).unwrap(),
            bio: None,
            location: None,
            website: None,
            avatar_url: None,
            banner_url: None,
            posts_count: 0,
            is_admin: false,
            is_suspended: false,
            suspension_reason: None,
            suspended_by: None,
            appeal_status: None,
            appeal_text: None,
            created_at: Utc::now().into(),
            last_active_at: None,
        }
    }

    fn service(db: MockDatabase) -> UserService {
        UserService::new(
            UserRepository::new(Arc::new(db.into_connection())),
            &auth_config(),
            SystemAccountConfig::default(),
        )
    }

    #[test]
    fn test_validate_handle() {
        assert!(validate_handle("good_handle_1").is_ok());
        assert!(validate_handle("bad handle").is_err());
        assert!(validate_handle("bad-handle").is_err());
        assert!(validate_handle("héllo").is_err());
    }

    #[test]
    fn test_register_input_bounds() {
        let input = RegisterInput {
            name: "Alice".to_string(),
            handle: "a".repeat(33),
            password: "secret".to_string(),
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            name: "Alice".to_string(),
            handle: "alice".to_string(),
            password: "12345".to_string(),
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            name: "Alice".to_string(),
            handle: "alice".to_string(),
            password: "123456".to_string(),
        };
        assert!(input.validate().is_ok());
    }

    #[tokio::test]
    async fn test_register_duplicate_handle() {
        let existing = create_test_user(1, "alice", "password");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[existing]]),
        );

        let result = svc
            .register(RegisterInput {
                name: "Alice".to_string(),
                handle: "alice".to_string(),
                password: "password".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_register_loses_race_for_handle() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                    "duplicate key value violates unique constraint \"users_handle_key\""
                        .to_string(),
                ))]),
        );

        let result = svc
            .register(RegisterInput {
                name: "Alice".to_string(),
                handle: "alice".to_string(),
                password: "password".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_register_issues_token() {
        let created = create_test_user(5, "alice", "password");
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[created]]),
        );

        let session = svc
            .register(RegisterInput {
                name: "Alice".to_string(),
                handle: "alice".to_string(),
                password: "password".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(session.account.id, 5);
        let resolved = TokenService::new(&auth_config()).verify(&session.token).unwrap();
        assert_eq!(resolved.sub, "5");
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user(1, "alice", "password")]]),
        );

        let result = svc.login("alice", "nope").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_unknown_handle() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let result = svc.login("ghost", "password").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_suspended_carries_context() {
        let mut target = create_test_user(2, "bob", "password");
        target.is_suspended = true;
        target.suspension_reason = Some("spam".to_string());
        target.suspended_by = Some("mod".to_string());
        target.appeal_status = Some(AppealStatus::Rejected);
        target.appeal_text = Some("I didn't spam".to_string());

        let mut moderator = create_test_user(1, "mod", "password");
        moderator.name = "Moderator Mia".to_string();

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[target]])
                .append_query_results([[moderator]]),
        );

        match svc.login("bob", "password").await {
            Err(AppError::AccountSuspended(notice)) => {
                assert_eq!(notice.reason, "spam");
                assert_eq!(notice.suspended_by, "mod");
                assert_eq!(notice.admin_name, "Moderator Mia");
                assert_eq!(notice.user_name, "bob name");
                assert_eq!(notice.appeal_status.as_deref(), Some("rejected"));
            }
            other => panic!("Expected AccountSuspended, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_suspended_fallbacks() {
        let mut target = create_test_user(2, "bob", "password");
        target.is_suspended = true;

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[target]]),
        );

        match svc.login("bob", "password").await {
            Err(AppError::AccountSuspended(notice)) => {
                assert_eq!(notice.reason, DEFAULT_SUSPENSION_REASON);
                assert_eq!(notice.suspended_by, "System");
                assert_eq!(notice.admin_name, "TSocial Staff");
                assert_eq!(notice.appeal_status, None);
            }
            other => panic!("Expected AccountSuspended, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_authenticate_by_token_unknown_user() {
        let account = create_test_user(9, "gone", "password");
        let token = TokenService::new(&auth_config()).issue(&account).unwrap();

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let result = svc.authenticate_by_token(&token).await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_ensure_system_account_restores_privileges() {
        let mut system = create_test_user(1, SYSTEM_HANDLE, "password");
        system.is_suspended = true;

        let mut restored = system.clone();
        restored.is_suspended = false;
        restored.is_admin = true;

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[system]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .append_query_results([[restored]]),
        );

        let account = svc.ensure_system_account().await.unwrap();
        assert!(account.is_admin);
        assert!(!account.is_suspended);
    }

    #[tokio::test]
    async fn test_ensure_system_account_creates_when_missing() {
        let mut created = create_test_user(1, SYSTEM_HANDLE, "change-me-now");
        created.is_admin = true;

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .append_query_results([[created]]),
        );

        let account = svc.ensure_system_account().await.unwrap();
        assert_eq!(account.handle, SYSTEM_HANDLE);
        assert!(account.is_admin);
    }
}
