use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Answer {
    #[serde(rename = "ID")]
    pub id: Uuid,
    #[serde(rename = "MessageId")]
    pub message_id: Uuid,
    #[serde(rename = "Answer")]
    pub answer: String,
    #[serde(rename = "ReactionCount")]
    pub reaction_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAnswerRequest {
    pub answer: String,
}
