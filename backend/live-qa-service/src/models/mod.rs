//! Rows read from the store and the request/response bodies around them.
//!
//! Entity field names are serialized in the casing the existing web client reads
//! (`ID`, `RoomID`, `ReactionCount`, ...).

pub mod answer;
pub mod message;
pub mod room;

pub use answer::{Answer, CreateAnswerRequest};
pub use message::{CreateMessageRequest, Message};
pub use room::{CreateRoomRequest, Room, RoomsResponse};

use serde::Serialize;
use uuid::Uuid;

/// Body returned by every create endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CreatedResponse {
    pub id: Uuid,
}

/// Body returned by every reaction endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ReactionCountResponse {
    pub count: i64,
}
