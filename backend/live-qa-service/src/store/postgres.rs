use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::QaStore;
use crate::error::AppResult;
use crate::models::{Answer, Message, Room};
use crate::websocket::lifecycle::RoomDirectory;

/// `QaStore` backed by PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomDirectory for PgStore {
    async fn room_exists(&self, room_id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM rooms WHERE id = $1)")
            .bind(room_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl QaStore for PgStore {
    async fn insert_room(&self, theme: &str) -> AppResult<Uuid> {
        let id: Uuid = sqlx::query_scalar("INSERT INTO rooms (theme) VALUES ($1) RETURNING id")
            .bind(theme)
            .fetch_one(&self.pool)
            .await?;
        Ok(id)
    }

    async fn list_rooms(&self) -> AppResult<Vec<Room>> {
        let rooms = sqlx::query_as::<_, Room>("SELECT id, theme FROM rooms ORDER BY created_at")
            .fetch_all(&self.pool)
            .await?;
        Ok(rooms)
    }

    async fn insert_message(&self, room_id: Uuid, message: &str) -> AppResult<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO messages (room_id, message) VALUES ($1, $2) RETURNING id",
        )
        .bind(room_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn list_room_messages(&self, room_id: Uuid) -> AppResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, room_id, message, reaction_count, answered
            FROM messages
            WHERE room_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(room_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn get_message(&self, message_id: Uuid) -> AppResult<Option<Message>> {
        let message = sqlx::query_as::<_, Message>(
            "SELECT id, room_id, message, reaction_count, answered FROM messages WHERE id = $1",
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(message)
    }

    async fn react_to_message(&self, message_id: Uuid) -> AppResult<Option<i64>> {
        let count: Option<i64> = sqlx::query_scalar(
            "UPDATE messages SET reaction_count = reaction_count + 1 WHERE id = $1 RETURNING reaction_count",
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(count)
    }

    async fn remove_message_reaction(&self, message_id: Uuid) -> AppResult<Option<i64>> {
        let count: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE messages
            SET reaction_count = GREATEST(reaction_count - 1, 0)
            WHERE id = $1
            RETURNING reaction_count
            "#,
        )
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(count)
    }

    async fn answer_message(&self, message_id: Uuid, answer: &str) -> AppResult<Uuid> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE messages SET answered = TRUE WHERE id = $1")
            .bind(message_id)
            .execute(&mut *tx)
            .await?;

        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO answers (message_id, answer) VALUES ($1, $2) RETURNING id",
        )
        .bind(message_id)
        .bind(answer)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn list_answers(&self, message_id: Uuid) -> AppResult<Vec<Answer>> {
        let answers = sqlx::query_as::<_, Answer>(
            r#"
            SELECT id, message_id, answer, reaction_count
            FROM answers
            WHERE message_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(message_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }

    async fn get_answer(&self, answer_id: Uuid) -> AppResult<Option<Answer>> {
        let answer = sqlx::query_as::<_, Answer>(
            "SELECT id, message_id, answer, reaction_count FROM answers WHERE id = $1",
        )
        .bind(answer_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(answer)
    }

    async fn react_to_answer(&self, message_id: Uuid, answer_id: Uuid) -> AppResult<Option<i64>> {
        let count: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE answers
            SET reaction_count = reaction_count + 1
            WHERE id = $1 AND message_id = $2
            RETURNING reaction_count
            "#,
        )
        .bind(answer_id)
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(count)
    }

    async fn remove_answer_reaction(
        &self,
        message_id: Uuid,
        answer_id: Uuid,
    ) -> AppResult<Option<i64>> {
        let count: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE answers
            SET reaction_count = GREATEST(reaction_count - 1, 0)
            WHERE id = $1 AND message_id = $2
            RETURNING reaction_count
            "#,
        )
        .bind(answer_id)
        .bind(message_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(count)
    }
}
