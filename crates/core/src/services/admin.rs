//! Admin dashboard read models.

use chrono::{DateTime, FixedOffset, NaiveTime, Utc};
use tsocial_common::AppResult;
use tsocial_db::{
    entities::user,
    repositories::{PostRepository, UserRepository},
};

/// Platform totals for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformStats {
    pub total_users: u64,
    pub total_posts: u64,
    pub posts_today: u64,
}

/// Start of the current UTC day.
fn utc_midnight(now: DateTime<Utc>) -> DateTime<FixedOffset> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc().into()
}

/// Admin read-only service.
#[derive(Clone)]
pub struct AdminService {
    user_repo: UserRepository,
    post_repo: PostRepository,
}

impl AdminService {
    /// Create a new admin service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, post_repo: PostRepository) -> Self {
        Self {
            user_repo,
            post_repo,
        }
    }

    /// User and post totals, plus posts since UTC midnight.
    pub async fn stats(&self) -> AppResult<PlatformStats> {
        let total_users = self.user_repo.count().await?;
        let total_posts = self.post_repo.count().await?;
        let posts_today = self
            .post_repo
            .count_since(utc_midnight(Utc::now()))
            .await?;

        Ok(PlatformStats {
            total_users,
            total_posts,
            posts_today,
        })
    }

    /// Every account, newest first.
    pub async fn users(&self) -> AppResult<Vec<user::Model>> {
        self.user_repo.find_all().await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn count_row(n: i64) -> Vec<BTreeMap<String, Value>> {
        vec![BTreeMap::from([(
            "num_items".to_string(),
            Value::BigInt(Some(n)),
        )])]
    }

    #[test]
    fn test_utc_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 17, 45, 12).unwrap();
        let midnight = utc_midnight(now);
        assert_eq!(midnight.to_rfc3339(), "2026-03-14T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_stats() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([count_row(3)])
                .append_query_results([count_row(12)])
                .append_query_results([count_row(4)])
                .into_connection(),
        );
        let svc = AdminService::new(UserRepository::new(Arc::clone(&db)), PostRepository::new(db));

        let stats = svc.stats().await.unwrap();
        assert_eq!(
            stats,
            PlatformStats {
                total_users: 3,
                total_posts: 12,
                posts_today: 4,
            }
        );
    }
}
