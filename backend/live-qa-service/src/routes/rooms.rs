use actix_web::{get, post, web, HttpResponse};

use super::validate_text;
use crate::error::AppError;
use crate::models::{CreateRoomRequest, CreatedResponse, RoomsResponse};
use crate::state::AppState;

/// POST /api/rooms
#[post("/api/rooms")]
pub async fn create_room(
    state: web::Data<AppState>,
    body: web::Json<CreateRoomRequest>,
) -> Result<HttpResponse, AppError> {
    validate_text("theme", &body.theme)?;
    let id = state.store.insert_room(&body.theme).await?;

    tracing::info!(room_id = %id, "room created");
    Ok(HttpResponse::Ok().json(CreatedResponse { id }))
}

/// GET /api/rooms
#[get("/api/rooms")]
pub async fn list_rooms(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let rooms = state.store.list_rooms().await?;
    Ok(HttpResponse::Ok().json(RoomsResponse { rooms }))
}
