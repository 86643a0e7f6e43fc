//! Persistence for rooms, questions and answers.

mod postgres;

pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Answer, Message, Room};
use crate::websocket::lifecycle::RoomDirectory;

/// Everything the HTTP layer needs from the database.
///
/// Reaction updates return `None` when the target row does not exist.
#[async_trait]
pub trait QaStore: RoomDirectory {
    async fn insert_room(&self, theme: &str) -> AppResult<Uuid>;
    async fn list_rooms(&self) -> AppResult<Vec<Room>>;

    async fn insert_message(&self, room_id: Uuid, message: &str) -> AppResult<Uuid>;
    async fn list_room_messages(&self, room_id: Uuid) -> AppResult<Vec<Message>>;
    async fn get_message(&self, message_id: Uuid) -> AppResult<Option<Message>>;
    async fn react_to_message(&self, message_id: Uuid) -> AppResult<Option<i64>>;
    /// Never takes the count below zero.
    async fn remove_message_reaction(&self, message_id: Uuid) -> AppResult<Option<i64>>;

    /// Mark the message answered and store the answer in one transaction.
    async fn answer_message(&self, message_id: Uuid, answer: &str) -> AppResult<Uuid>;
    async fn list_answers(&self, message_id: Uuid) -> AppResult<Vec<Answer>>;
    async fn get_answer(&self, answer_id: Uuid) -> AppResult<Option<Answer>>;
    async fn react_to_answer(&self, message_id: Uuid, answer_id: Uuid) -> AppResult<Option<i64>>;
    async fn remove_answer_reaction(
        &self,
        message_id: Uuid,
        answer_id: Uuid,
    ) -> AppResult<Option<i64>>;
}
