//! Events pushed to live viewers of a room.
//!
//! Wire shape of every frame:
//! ```json
//! {"kind": "message_created", "value": {"id": "...", "message": "..."}}
//! ```
//! The room never appears in the frame; a viewer is only ever subscribed to one room.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QaEvent {
    /// New question posted to the room
    MessageCreated { id: String, message: String },

    MessageReactionIncreased { id: String, count: i64 },

    MessageReactionDecreased { id: String, count: i64 },

    /// Question marked answered; `id` is the question, not the answer
    MessageAnswered { id: String, answer: String },

    /// `id` is the answer whose reaction count changed
    MessageAnswerReactionIncreased { id: String, count: i64 },

    MessageAnswerReactionDecreased { id: String, count: i64 },
}

impl QaEvent {
    /// Wire name of the event kind (e.g. "message_created")
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MessageCreated { .. } => "message_created",
            Self::MessageReactionIncreased { .. } => "message_reaction_increased",
            Self::MessageReactionDecreased { .. } => "message_reaction_decreased",
            Self::MessageAnswered { .. } => "message_answered",
            Self::MessageAnswerReactionIncreased { .. } => "message_answer_reaction_increased",
            Self::MessageAnswerReactionDecreased { .. } => "message_answer_reaction_decreased",
        }
    }

    /// Serialize into the frame sent to every viewer.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
