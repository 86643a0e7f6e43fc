use actix_web::{delete, get, patch, post, web, HttpResponse};

use super::{ensure_room, message_in_room, parse_id, validate_text};
use crate::error::AppError;
use crate::models::{CreateMessageRequest, CreatedResponse, ReactionCountResponse};
use crate::state::AppState;
use crate::websocket::events::QaEvent;

/// GET /api/rooms/{room_id}/messages
#[get("/api/rooms/{room_id}/messages")]
pub async fn list_messages(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let room_id = parse_id(&path, "room")?;
    ensure_room(&state, room_id).await?;

    let messages = state.store.list_room_messages(room_id).await?;
    Ok(HttpResponse::Ok().json(messages))
}

/// POST /api/rooms/{room_id}/messages
#[post("/api/rooms/{room_id}/messages")]
pub async fn create_message(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<CreateMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let room_id = parse_id(&path, "room")?;
    ensure_room(&state, room_id).await?;
    validate_text("message", &body.message)?;

    let body = body.into_inner();
    let id = state.store.insert_message(room_id, &body.message).await?;
    let response = HttpResponse::Ok().json(CreatedResponse { id });

    state.dispatcher.dispatch(
        room_id,
        QaEvent::MessageCreated {
            id: id.to_string(),
            message: body.message,
        },
    );
    Ok(response)
}

/// GET /api/rooms/{room_id}/messages/{message_id}
#[get("/api/rooms/{room_id}/messages/{message_id}")]
pub async fn get_message(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (room_id, message_id) = path.into_inner();
    let message = message_in_room(&state, &room_id, &message_id).await?;
    Ok(HttpResponse::Ok().json(message))
}

/// PATCH /api/rooms/{room_id}/messages/{message_id}/react
#[patch("/api/rooms/{room_id}/messages/{message_id}/react")]
pub async fn react_to_message(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (room_id, message_id) = path.into_inner();
    let message = message_in_room(&state, &room_id, &message_id).await?;

    let count = state
        .store
        .react_to_message(message.id)
        .await?
        .ok_or(AppError::MessageNotFound)?;
    let response = HttpResponse::Ok().json(ReactionCountResponse { count });

    state.dispatcher.dispatch(
        message.room_id,
        QaEvent::MessageReactionIncreased {
            id: message.id.to_string(),
            count,
        },
    );
    Ok(response)
}

/// DELETE /api/rooms/{room_id}/messages/{message_id}/react
#[delete("/api/rooms/{room_id}/messages/{message_id}/react")]
pub async fn remove_message_reaction(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (room_id, message_id) = path.into_inner();
    let message = message_in_room(&state, &room_id, &message_id).await?;

    let count = state
        .store
        .remove_message_reaction(message.id)
        .await?
        .ok_or(AppError::MessageNotFound)?;
    let response = HttpResponse::Ok().json(ReactionCountResponse { count });

    state.dispatcher.dispatch(
        message.room_id,
        QaEvent::MessageReactionDecreased {
            id: message.id.to_string(),
            count,
        },
    );
    Ok(response)
}
