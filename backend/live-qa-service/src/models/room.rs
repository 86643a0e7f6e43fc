use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Room {
    #[serde(rename = "ID")]
    pub id: Uuid,
    #[serde(rename = "Theme")]
    pub theme: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRoomRequest {
    pub theme: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomsResponse {
    pub rooms: Vec<Room>,
}
