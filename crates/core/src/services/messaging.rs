//! Messaging service for direct messages.

use chrono::Utc;
use sea_orm::Set;
use serde::Deserialize;
use tsocial_common::{AppError, AppResult};
use tsocial_db::{
    entities::{message, user},
    repositories::{MessageRepository, UserRepository},
};

/// Maximum message length in characters.
pub const MESSAGE_MAX_CHARS: usize = 2000;

/// Input for sending a direct message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageInput {
    pub receiver_handle: String,
    #[serde(default)]
    pub content: String,
}

/// Messaging service.
#[derive(Clone)]
pub struct MessagingService {
    message_repo: MessageRepository,
    user_repo: UserRepository,
}

impl MessagingService {
    /// Create a new messaging service.
    #[must_use]
    pub const fn new(message_repo: MessageRepository, user_repo: UserRepository) -> Self {
        Self {
            message_repo,
            user_repo,
        }
    }

    /// Everyone the user has exchanged messages with.
    pub async fn conversations(&self, user_id: i64) -> AppResult<Vec<user::Model>> {
        let partner_ids = self.message_repo.find_partner_ids(user_id).await?;
        self.user_repo.find_by_ids(&partner_ids).await
    }

    /// Full history with `handle`, oldest first.
    pub async fn history(&self, user_id: i64, handle: &str) -> AppResult<Vec<message::Model>> {
        let partner = self.user_repo.get_by_handle(handle).await?;
        self.message_repo.find_conversation(user_id, partner.id).await
    }

    /// Send a message to another user.
    pub async fn send(
        &self,
        sender: &user::Model,
        input: SendMessageInput,
    ) -> AppResult<message::Model> {
        let content = input.content.trim();
        if content.is_empty() {
            return Err(AppError::BadRequest("Message cannot be empty".to_string()));
        }
        if content.chars().count() > MESSAGE_MAX_CHARS {
            return Err(AppError::Validation(format!(
                "Message must be at most {MESSAGE_MAX_CHARS} characters"
            )));
        }

        let receiver = self.user_repo.get_by_handle(&input.receiver_handle).await?;

        if receiver.id == sender.id {
            return Err(AppError::BadRequest(
                "Cannot send message to yourself".to_string(),
            ));
        }

        let model = message::ActiveModel {
            sender_id: Set(sender.id),
            receiver_id: Set(receiver.id),
            content: Set(content.to_string()),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        self.message_repo.create(model).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn test_user(id: i64, handle: &str) -> user::Model {
        user::Model {
            id,
            handle: handle.to_string(),
            name: handle.to_string(),
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

    fn service(db: MockDatabase) -> MessagingService {
        let db = Arc::new(db.into_connection());
        MessagingService::new(
            MessageRepository::new(Arc::clone(&db)),
            UserRepository::new(db),
        )
    }

    fn input(receiver: &str, content: &str) -> SendMessageInput {
        SendMessageInput {
            receiver_handle: receiver.to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_send_empty_message() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let result = svc.send(&test_user(1, "alice"), input("bob", "   ")).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_send_too_long() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let result = svc
            .send(&test_user(1, "alice"), input("bob", &"x".repeat(2001)))
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_send_unknown_receiver() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );
        let result = svc.send(&test_user(1, "alice"), input("ghost", "hi")).await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_send_to_self() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user(1, "alice")]]),
        );
        let result = svc.send(&test_user(1, "alice"), input("alice", "hi")).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_send_message() {
        let sent = message::Model {
            id: 10,
            sender_id: 1,
            receiver_id: 2,
            content: "hello bob".to_string(),
            created_at: Utc::now().into(),
        };
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user(2, "bob")]])
                .append_query_results([[sent]]),
        );

        let message = svc
            .send(&test_user(1, "alice"), input("bob", " hello bob "))
            .await
            .unwrap();
        assert_eq!(message.receiver_id, 2);
        assert_eq!(message.content, "hello bob");
    }

    #[tokio::test]
    async fn test_history_unknown_partner() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()]),
        );
        assert!(matches!(
            svc.history(1, "ghost").await,
            Err(AppError::UserNotFound(_))
        ));
    }
}
