//! Account suspension and appeal lifecycle.
//!
//! An account is always in exactly one [`ModerationState`], derived from its
//! `is_suspended` and `appeal_status` columns:
//!
//! ```text
//! ACTIVE --suspend--> SUSPENDED_NO_APPEAL --file appeal--> SUSPENDED_APPEAL_PENDING
//!   ^                        |                               |            |
//!   +-------unsuspend--------+                            approve       reject
//!   +-------------------------------------------------------+            |
//!   +-------unsuspend------- SUSPENDED_APPEAL_REJECTED <-----------------+
//! ```
//!
//! [`ModerationState::apply`] is the pure transition table. The service
//! checks it, then persists with a conditional update so a concurrent
//! transition is reported as a conflict instead of being overwritten.

use std::fmt;
use std::str::FromStr;

use tracing::info;
use tsocial_common::{AppError, AppResult};
use tsocial_db::{
    entities::{AppealStatus, user},
    repositories::UserRepository,
};

use super::auth::verify_password;

/// Handle of the reserved platform account.
pub const SYSTEM_HANDLE: &str = "tsocial";

/// Reason recorded when an administrator gives none.
pub const DEFAULT_SUSPENSION_REASON: &str = "Violation of the terms of use.";

/// Minimum appeal length, counted in characters after trimming.
pub const APPEAL_MIN_CHARS: usize = 10;

/// Maximum appeal length.
pub const APPEAL_MAX_CHARS: usize = 2000;

/// Moderation state of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationState {
    /// `ACTIVE`: not suspended.
    Active,
    /// `SUSPENDED_NO_APPEAL`: suspended, an appeal may be filed.
    SuspendedNoAppeal,
    /// `SUSPENDED_APPEAL_PENDING`: waiting for an administrator decision.
    SuspendedAppealPending,
    /// `SUSPENDED_APPEAL_REJECTED`: appeal turned down. Only a manual
    /// unsuspend leaves this state.
    SuspendedAppealRejected,
}

/// Something that moves an account between moderation states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationEvent {
    /// Administrator suspends an active account.
    Suspend,
    /// Administrator lifts a suspension, whatever the appeal state.
    Unsuspend,
    /// Suspended user files an appeal.
    FileAppeal,
    /// Administrator approves the pending appeal.
    ApproveAppeal,
    /// Administrator rejects the pending appeal.
    RejectAppeal,
}

impl ModerationState {
    /// Derive the state from a stored account.
    #[must_use]
    pub fn of(account: &user::Model) -> Self {
        match (account.is_suspended, account.appeal_status) {
            (false, _) => Self::Active,
            (true, None) => Self::SuspendedNoAppeal,
            (true, Some(AppealStatus::Pending)) => Self::SuspendedAppealPending,
            (true, Some(AppealStatus::Rejected)) => Self::SuspendedAppealRejected,
        }
    }

    /// Whether the gate should reject this account.
    #[must_use]
    pub const fn is_suspended(self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Apply an event, returning the next state or the conflict it hits.
    pub fn apply(self, event: ModerationEvent) -> AppResult<Self> {
        use ModerationEvent as E;
        use ModerationState as S;

        match (self, event) {
            (S::Active, E::Suspend) => Ok(S::SuspendedNoAppeal),
            (_, E::Suspend) => Err(conflict("Account is already suspended")),

            // Manual override, valid from every state
            (_, E::Unsuspend) => Ok(S::Active),

            (S::SuspendedNoAppeal, E::FileAppeal) => Ok(S::SuspendedAppealPending),
            (S::Active, E::FileAppeal) => Err(conflict("This account is not suspended")),
            (S::SuspendedAppealPending, E::FileAppeal) => {
                Err(conflict("An appeal is already pending"))
            }
            (S::SuspendedAppealRejected, E::FileAppeal) => Err(conflict(
                "Your appeal was rejected; no further appeals are accepted",
            )),

            (S::SuspendedAppealPending, E::ApproveAppeal) => Ok(S::Active),
            (S::SuspendedAppealPending, E::RejectAppeal) => Ok(S::SuspendedAppealRejected),
            (_, E::ApproveAppeal | E::RejectAppeal) => {
                Err(conflict("This account has no pending appeal"))
            }
        }
    }
}

fn conflict(message: &str) -> AppError {
    AppError::StateConflict(message.to_string())
}

/// Administrator decision on a pending appeal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppealDecision {
    Approve,
    Reject,
}

impl FromStr for AppealDecision {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(Self::Approve),
            "reject" => Ok(Self::Reject),
            other => Err(AppError::Validation(format!(
                "Unknown appeal action '{other}', expected 'approve' or 'reject'"
            ))),
        }
    }
}

impl fmt::Display for AppealDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        })
    }
}

impl From<AppealDecision> for ModerationEvent {
    fn from(decision: AppealDecision) -> Self {
        match decision {
            AppealDecision::Approve => Self::ApproveAppeal,
            AppealDecision::Reject => Self::RejectAppeal,
        }
    }
}

/// Moderation service.
#[derive(Clone)]
pub struct ModerationService {
    user_repo: UserRepository,
}

impl ModerationService {
    /// Create a new moderation service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Suspend an account on behalf of an administrator.
    pub async fn suspend(
        &self,
        actor: &user::Model,
        target_id: i64,
        reason: Option<&str>,
    ) -> AppResult<()> {
        if actor.id == target_id {
            return Err(AppError::Forbidden(
                "You cannot suspend your own account".to_string(),
            ));
        }

        let target = self.user_repo.get_by_id(target_id).await?;
        if target.handle == SYSTEM_HANDLE {
            return Err(AppError::Forbidden(
                "The system account cannot be suspended".to_string(),
            ));
        }

        ModerationState::of(&target).apply(ModerationEvent::Suspend)?;

        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_SUSPENSION_REASON);

        if !self
            .user_repo
            .suspend(target_id, reason, &actor.handle)
            .await?
        {
            return Err(self.explain_conflict(target_id, ModerationEvent::Suspend).await);
        }

        info!(
            target_id,
            actor = %actor.handle,
            decision = "suspend",
            reason,
            "Account suspended"
        );
        Ok(())
    }

    /// Lift a suspension regardless of appeal state.
    pub async fn unsuspend(&self, actor: &user::Model, target_id: i64) -> AppResult<()> {
        if !self.user_repo.lift_suspension(target_id).await? {
            return Err(AppError::UserNotFound(target_id.to_string()));
        }

        info!(
            target_id,
            actor = %actor.handle,
            decision = "unsuspend",
            "Suspension lifted"
        );
        Ok(())
    }

    /// File an appeal. The caller is not logged in, so the password is
    /// checked here.
    pub async fn file_appeal(&self, handle: &str, password: &str, text: &str) -> AppResult<()> {
        let account = match self.user_repo.find_by_handle(handle).await? {
            Some(account) if verify_password(password, &account.password_hash)? => account,
            _ => return Err(AppError::Unauthorized),
        };

        ModerationState::of(&account).apply(ModerationEvent::FileAppeal)?;

        let text = text.trim();
        let len = text.chars().count();
        if len < APPEAL_MIN_CHARS {
            return Err(AppError::Validation(format!(
                "Appeal must be at least {APPEAL_MIN_CHARS} characters"
            )));
        }
        if len > APPEAL_MAX_CHARS {
            return Err(AppError::Validation(format!(
                "Appeal must be at most {APPEAL_MAX_CHARS} characters"
            )));
        }

        if !self.user_repo.file_appeal(account.id, text).await? {
            return Err(self
                .explain_conflict(account.id, ModerationEvent::FileAppeal)
                .await);
        }

        info!(
            target_id = account.id,
            actor = %account.handle,
            decision = "appeal",
            "Appeal filed"
        );
        Ok(())
    }

    /// Approve or reject a pending appeal.
    pub async fn resolve_appeal(
        &self,
        actor: &user::Model,
        target_id: i64,
        action: &str,
    ) -> AppResult<AppealDecision> {
        let decision: AppealDecision = action.parse()?;
        let event = ModerationEvent::from(decision);

        let target = self.user_repo.get_by_id(target_id).await?;
        ModerationState::of(&target).apply(event)?;

        let applied = match decision {
            AppealDecision::Approve => self.user_repo.approve_appeal(target_id).await?,
            AppealDecision::Reject => self.user_repo.reject_appeal(target_id).await?,
        };
        if !applied {
            return Err(self.explain_conflict(target_id, event).await);
        }

        info!(
            target_id,
            actor = %actor.handle,
            decision = %decision,
            "Appeal resolved"
        );
        Ok(decision)
    }

    /// Grant or revoke the admin role.
    pub async fn set_role(
        &self,
        actor: &user::Model,
        target_id: i64,
        is_admin: bool,
    ) -> AppResult<()> {
        let target = self.user_repo.get_by_id(target_id).await?;
        if target.handle == SYSTEM_HANDLE && !is_admin {
            return Err(AppError::Forbidden(
                "The system account cannot lose its admin role".to_string(),
            ));
        }

        if !self.user_repo.set_admin(target_id, is_admin).await? {
            return Err(AppError::UserNotFound(target_id.to_string()));
        }

        let decision = if is_admin { "grant_admin" } else { "revoke_admin" };
        info!(target_id, actor = %actor.handle, decision, "Role changed");
        Ok(())
    }

    /// Accounts with an appeal awaiting review.
    pub async fn pending_appeals(&self) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_pending_appeals().await
    }

    /// Re-read the row after a conditional update matched nothing and
    /// report why.
    async fn explain_conflict(&self, target_id: i64, event: ModerationEvent) -> AppError {
        match self.user_repo.find_by_id(target_id).await {
            Ok(Some(current)) => match ModerationState::of(&current).apply(event) {
                Err(e) => e,
                Ok(_) => conflict("Account state changed concurrently, try again"),
            },
            Ok(None) => AppError::UserNotFound(target_id.to_string()),
            Err(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::services::auth::hash_password;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn account(id: i64, handle: &str) -> user::Model {
        user::Model {
            id,
            handle: handle.to_string(),
            name: handle.to_uppercase(),
            password_hash: String::new(),
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

    fn suspended(id: i64, handle: &str, appeal: Option<AppealStatus>) -> user::Model {
        let mut u = account(id, handle);
        u.is_suspended = true;
        u.suspension_reason = Some("spam".to_string());
        u.suspended_by = Some("admin".to_string());
        u.appeal_status = appeal;
        u
    }

    fn admin() -> user::Model {
        let mut u = account(1, "admin");
        u.is_admin = true;
        u
    }

    fn rows(n: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: n,
        }
    }

    fn service(db: MockDatabase) -> ModerationService {
        ModerationService::new(UserRepository::new(Arc::new(db.into_connection())))
    }

    // === Pure transition table ===

    #[test]
    fn test_state_of_account() {
        assert_eq!(ModerationState::of(&account(1, "a")), ModerationState::Active);
        assert_eq!(
            ModerationState::of(&suspended(1, "a", None)),
            ModerationState::SuspendedNoAppeal
        );
        assert_eq!(
            ModerationState::of(&suspended(1, "a", Some(AppealStatus::Pending))),
            ModerationState::SuspendedAppealPending
        );
        assert_eq!(
            ModerationState::of(&suspended(1, "a", Some(AppealStatus::Rejected))),
            ModerationState::SuspendedAppealRejected
        );
    }

    #[test]
    fn test_happy_path_transitions() {
        use ModerationEvent as E;
        use ModerationState as S;

        assert_eq!(S::Active.apply(E::Suspend).unwrap(), S::SuspendedNoAppeal);
        assert_eq!(
            S::SuspendedNoAppeal.apply(E::FileAppeal).unwrap(),
            S::SuspendedAppealPending
        );
        assert_eq!(S::SuspendedAppealPending.apply(E::ApproveAppeal).unwrap(), S::Active);
        assert_eq!(
            S::SuspendedAppealPending.apply(E::RejectAppeal).unwrap(),
            S::SuspendedAppealRejected
        );
        assert_eq!(S::SuspendedAppealRejected.apply(E::Unsuspend).unwrap(), S::Active);
        assert_eq!(S::SuspendedNoAppeal.apply(E::Unsuspend).unwrap(), S::Active);
    }

    #[test]
    fn test_rejected_appeal_is_terminal() {
        let result = ModerationState::SuspendedAppealRejected.apply(ModerationEvent::FileAppeal);
        assert!(matches!(result, Err(AppError::StateConflict(_))));
    }

    #[test]
    fn test_second_appeal_conflicts() {
        let result = ModerationState::SuspendedAppealPending.apply(ModerationEvent::FileAppeal);
        assert!(matches!(result, Err(AppError::StateConflict(_))));
    }

    #[test]
    fn test_resolve_requires_pending() {
        for state in [
            ModerationState::Active,
            ModerationState::SuspendedNoAppeal,
            ModerationState::SuspendedAppealRejected,
        ] {
            assert!(state.apply(ModerationEvent::ApproveAppeal).is_err());
            assert!(state.apply(ModerationEvent::RejectAppeal).is_err());
        }
    }

    #[test]
    fn test_suspended_states_report_suspended() {
        assert!(!ModerationState::Active.is_suspended());
        assert!(ModerationState::SuspendedNoAppeal.is_suspended());
        assert!(ModerationState::SuspendedAppealPending.is_suspended());
        assert!(ModerationState::SuspendedAppealRejected.is_suspended());
    }

    #[test]
    fn test_parse_decision() {
        assert_eq!("approve".parse::<AppealDecision>().unwrap(), AppealDecision::Approve);
        assert_eq!("reject".parse::<AppealDecision>().unwrap(), AppealDecision::Reject);
        assert!(matches!(
            "maybe".parse::<AppealDecision>(),
            Err(AppError::Validation(_))
        ));
    }

    // === Service ===

    #[tokio::test]
    async fn test_suspend_self_is_forbidden() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = svc.suspend(&admin(), 1, Some("nope")).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_suspend_system_account_is_forbidden() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account(2, SYSTEM_HANDLE)]]),
        );

        let result = svc.suspend(&admin(), 2, None).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_suspend_unknown_target() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );

        let result = svc.suspend(&admin(), 9, None).await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_suspend_active_account() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account(2, "bob")]])
                .append_exec_results([rows(1)]),
        );

        svc.suspend(&admin(), 2, Some("spam")).await.unwrap();
    }

    #[tokio::test]
    async fn test_suspend_already_suspended_conflicts() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[suspended(2, "bob", None)]]),
        );

        let result = svc.suspend(&admin(), 2, Some("spam")).await;
        assert!(matches!(result, Err(AppError::StateConflict(_))));
    }

    #[tokio::test]
    async fn test_suspend_lost_race_is_reported_from_fresh_state() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account(2, "bob")]])
                .append_exec_results([rows(0)])
                .append_query_results([[suspended(2, "bob", None)]]),
        );

        let result = svc.suspend(&admin(), 2, None).await;
        match result {
            Err(AppError::StateConflict(msg)) => assert!(msg.contains("already suspended")),
            other => panic!("Expected StateConflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unsuspend_unknown_target() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([rows(0)]),
        );

        let result = svc.unsuspend(&admin(), 77).await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_file_appeal_wrong_password() {
        let mut target = suspended(2, "bob", None);
        target.password_hash = hash_password("correct-horse").unwrap();

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[target]]),
        );

        let result = svc.file_appeal("bob", "wrong", "please let me back in").await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_file_appeal_too_short() {
        let mut target = suspended(2, "bob", None);
        target.password_hash = hash_password("correct-horse").unwrap();

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[target]]),
        );

        let result = svc.file_appeal("bob", "correct-horse", "   sorry    ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_file_appeal_after_rejection_conflicts() {
        let mut target = suspended(2, "bob", Some(AppealStatus::Rejected));
        target.password_hash = hash_password("correct-horse").unwrap();

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[target]]),
        );

        let result = svc
            .file_appeal("bob", "correct-horse", "I really did not spam")
            .await;
        assert!(matches!(result, Err(AppError::StateConflict(_))));
    }

    #[tokio::test]
    async fn test_file_appeal_success() {
        let mut target = suspended(2, "bob", None);
        target.password_hash = hash_password("correct-horse").unwrap();

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[target]])
                .append_exec_results([rows(1)]),
        );

        svc.file_appeal("bob", "correct-horse", "I didn't spam, honest")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_resolve_unknown_action_is_validation_error() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = svc.resolve_appeal(&admin(), 2, "escalate").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_resolve_without_pending_appeal_conflicts() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[suspended(2, "bob", None)]]),
        );

        let result = svc.resolve_appeal(&admin(), 2, "approve").await;
        assert!(matches!(result, Err(AppError::StateConflict(_))));
    }

    #[tokio::test]
    async fn test_reject_pending_appeal() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[suspended(2, "bob", Some(AppealStatus::Pending))]])
                .append_exec_results([rows(1)]),
        );

        let decision = svc.resolve_appeal(&admin(), 2, "reject").await.unwrap();
        assert_eq!(decision, AppealDecision::Reject);
    }

    #[tokio::test]
    async fn test_revoke_system_admin_is_forbidden() {
        let mut system = account(3, SYSTEM_HANDLE);
        system.is_admin = true;

        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[system]]),
        );

        let result = svc.set_role(&admin(), 3, false).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_grant_admin() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[account(4, "dave")]])
                .append_exec_results([rows(1)]),
        );

        svc.set_role(&admin(), 4, true).await.unwrap();
    }
}
