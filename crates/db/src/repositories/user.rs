//! User repository.

use std::sync::Arc;

use crate::entities::{AppealStatus, User, user};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, SqlErr, sea_query::Expr,
};
use tsocial_common::{AppError, AppResult};

/// User repository for database operations.
///
/// Moderation transitions are conditional single-row updates. Each returns
/// `true` when the row matched its precondition and was changed, `false`
/// otherwise; callers re-read the row to explain a `false`.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

/// Postgres message for a unique index violation.
const UNIQUE_VIOLATION_MESSAGE: &str = "duplicate key value violates unique constraint";

/// Whether an insert lost against the unique handle index.
fn is_unique_violation(err: &DbErr) -> bool {
    // Typed sqlx error, or the raw Postgres message from other connections
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
        || err.to_string().contains(UNIQUE_VIOLATION_MESSAGE)
}

/// Active model that returns an account to the active state.
fn cleared_suspension() -> user::ActiveModel {
    user::ActiveModel {
        is_suspended: Set(false),
        suspension_reason: Set(None),
        suspended_by: Set(None),
        appeal_status: Set(None),
        appeal_text: Set(None),
        ..Default::default()
    }
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: i64) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[i64]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by handle (case-sensitive).
    pub async fn find_by_handle(&self, handle: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Handle.eq(handle))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by handle, returning an error if not found.
    pub async fn get_by_handle(&self, handle: &str) -> AppResult<user::Model> {
        self.find_by_handle(handle)
            .await?
            .ok_or_else(|| AppError::UserNotFound(handle.to_string()))
    }

    /// Create a new user.
    ///
    /// A handle taken by a concurrent insert is a [`AppError::BadRequest`].
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if is_unique_violation(&e) {
                AppError::BadRequest("Handle is already taken".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record that the user just made an authenticated request.
    pub async fn touch_last_active(&self, id: i64) -> AppResult<()> {
        User::update_many()
            .col_expr(
                user::Column::LastActiveAt,
                Expr::value(Utc::now().fixed_offset()),
            )
            .filter(user::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count all accounts.
    pub async fn count(&self) -> AppResult<u64> {
        User::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All accounts, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<user::Model>> {
        User::find()
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Accounts with an appeal waiting for review, oldest account first.
    pub async fn find_pending_appeals(&self) -> AppResult<Vec<user::Model>> {
        User::find()
            .filter(user::Column::AppealStatus.eq(AppealStatus::Pending))
            .order_by_asc(user::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // === Moderation transitions ===

    /// ACTIVE -> `SUSPENDED_NO_APPEAL`.
    pub async fn suspend(&self, id: i64, reason: &str, suspended_by: &str) -> AppResult<bool> {
        let result = User::update_many()
            .set(user::ActiveModel {
                is_suspended: Set(true),
                suspension_reason: Set(Some(reason.to_string())),
                suspended_by: Set(Some(suspended_by.to_string())),
                appeal_status: Set(None),
                appeal_text: Set(None),
                ..Default::default()
            })
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::IsSuspended.eq(false))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Any state -> ACTIVE. Only fails when the row does not exist.
    pub async fn lift_suspension(&self, id: i64) -> AppResult<bool> {
        let result = User::update_many()
            .set(cleared_suspension())
            .filter(user::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// `SUSPENDED_NO_APPEAL` -> `SUSPENDED_APPEAL_PENDING`.
    pub async fn file_appeal(&self, id: i64, text: &str) -> AppResult<bool> {
        let result = User::update_many()
            .set(user::ActiveModel {
                appeal_status: Set(Some(AppealStatus::Pending)),
                appeal_text: Set(Some(text.to_string())),
                ..Default::default()
            })
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::IsSuspended.eq(true))
            .filter(user::Column::AppealStatus.is_null())
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// `SUSPENDED_APPEAL_PENDING` -> ACTIVE.
    pub async fn approve_appeal(&self, id: i64) -> AppResult<bool> {
        let result = User::update_many()
            .set(cleared_suspension())
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::IsSuspended.eq(true))
            .filter(user::Column::AppealStatus.eq(AppealStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// `SUSPENDED_APPEAL_PENDING` -> `SUSPENDED_APPEAL_REJECTED`.
    pub async fn reject_appeal(&self, id: i64) -> AppResult<bool> {
        let result = User::update_many()
            .set(user::ActiveModel {
                appeal_status: Set(Some(AppealStatus::Rejected)),
                ..Default::default()
            })
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::IsSuspended.eq(true))
            .filter(user::Column::AppealStatus.eq(AppealStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Grant or revoke the admin role.
    pub async fn set_admin(&self, id: i64, is_admin: bool) -> AppResult<bool> {
        let result = User::update_many()
            .set(user::ActiveModel {
                is_admin: Set(is_admin),
                ..Default::default()
            })
            .filter(user::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Force the account to admin and clear any suspension.
    pub async fn restore_privileged(&self, id: i64) -> AppResult<()> {
        let mut model = cleared_suspension();
        model.is_admin = Set(true);

        User::update_many()
            .set(model)
            .filter(user::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
