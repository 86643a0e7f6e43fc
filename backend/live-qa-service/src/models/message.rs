use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A question posted to a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    #[serde(rename = "ID")]
    pub id: Uuid,
    #[serde(rename = "RoomID")]
    pub room_id: Uuid,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "ReactionCount")]
    pub reaction_count: i64,
    #[serde(rename = "Answered")]
    pub answered: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMessageRequest {
    pub message: String,
}
