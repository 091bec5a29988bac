//! Direct message repository.

use crate::entities::message::{self, ActiveModel, Column, Entity as Message};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseBackend,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Statement,
};
use std::sync::Arc;
use tsocial_common::{AppError, AppResult};

/// Repository for direct messages.
#[derive(Clone)]
pub struct MessageRepository {
    db: Arc<DatabaseConnection>,
}

impl MessageRepository {
    /// Create a new message repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new message.
    pub async fn create(&self, model: ActiveModel) -> AppResult<message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Full history between two users, oldest first.
    pub async fn find_conversation(
        &self,
        user_id: i64,
        partner_id: i64,
    ) -> AppResult<Vec<message::Model>> {
        Message::find()
            .filter(
                Condition::any()
                    .add(
                        Condition::all()
                            .add(Column::SenderId.eq(user_id))
                            .add(Column::ReceiverId.eq(partner_id)),
                    )
                    .add(
                        Condition::all()
                            .add(Column::SenderId.eq(partner_id))
                            .add(Column::ReceiverId.eq(user_id)),
                    ),
            )
            .order_by_asc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// IDs of everyone the user has exchanged messages with.
    pub async fn find_partner_ids(&self, user_id: i64) -> AppResult<Vec<i64>> {
        let sql = r"
            SELECT DISTINCT partner_id FROM (
                SELECT receiver_id AS partner_id FROM messages
                WHERE sender_id = $1
                UNION
                SELECT sender_id AS partner_id FROM messages
                WHERE receiver_id = $1
            ) AS partners
            WHERE partner_id <> $1
            ORDER BY partner_id
        ";

        let rows = self
            .db
            .query_all(Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                sql,
                [user_id.into()],
            ))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut partners = Vec::with_capacity(rows.len());
        for row in rows {
            if let Ok(partner_id) = row.try_get::<i64>("", "partner_id") {
                partners.push(partner_id);
            }
        }

        Ok(partners)
    }
}
