use actix_web::{delete, get, patch, post, web, HttpResponse};
use uuid::Uuid;

use super::{message_in_room, parse_id, validate_text};
use crate::error::AppError;
use crate::models::{CreateAnswerRequest, CreatedResponse, ReactionCountResponse};
use crate::state::AppState;
use crate::websocket::events::QaEvent;

/// GET /api/rooms/{room_id}/messages/{message_id}/answer
#[get("/api/rooms/{room_id}/messages/{message_id}/answer")]
pub async fn list_answers(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, AppError> {
    let (room_id, message_id) = path.into_inner();
    let message = message_in_room(&state, &room_id, &message_id).await?;

    let answers = state.store.list_answers(message.id).await?;
    Ok(HttpResponse::Ok().json(answers))
}

/// POST /api/rooms/{room_id}/messages/{message_id}/answer
#[post("/api/rooms/{room_id}/messages/{message_id}/answer")]
pub async fn answer_message(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    body: web::Json<CreateAnswerRequest>,
) -> Result<HttpResponse, AppError> {
    let (room_id, message_id) = path.into_inner();
    let message = message_in_room(&state, &room_id, &message_id).await?;
    validate_text("answer", &body.answer)?;

    let body = body.into_inner();
    let id = state.store.answer_message(message.id, &body.answer).await?;
    let response = HttpResponse::Ok().json(CreatedResponse { id });

    // viewers key answers by the question they belong to
    state.dispatcher.dispatch(
        message.room_id,
        QaEvent::MessageAnswered {
            id: message.id.to_string(),
            answer: body.answer,
        },
    );
    Ok(response)
}

/// PATCH /api/rooms/{room_id}/messages/{message_id}/answer/{answer_id}/react
#[patch("/api/rooms/{room_id}/messages/{message_id}/answer/{answer_id}/react")]
pub async fn react_to_answer(
    state: web::Data<AppState>,
    path: web::Path<(String, String, String)>,
) -> Result<HttpResponse, AppError> {
    let (room_id, message_id, answer_id) = path.into_inner();
    let (room_id, message_id, answer_id) =
        answer_target(&state, &room_id, &message_id, &answer_id).await?;

    let count = state
        .store
        .react_to_answer(message_id, answer_id)
        .await?
        .ok_or(AppError::AnswerNotFound)?;
    let response = HttpResponse::Ok().json(ReactionCountResponse { count });

    state.dispatcher.dispatch(
        room_id,
        QaEvent::MessageAnswerReactionIncreased {
            id: answer_id.to_string(),
            count,
        },
    );
    Ok(response)
}

/// DELETE /api/rooms/{room_id}/messages/{message_id}/answer/{answer_id}/react
#[delete("/api/rooms/{room_id}/messages/{message_id}/answer/{answer_id}/react")]
pub async fn remove_answer_reaction(
    state: web::Data<AppState>,
    path: web::Path<(String, String, String)>,
) -> Result<HttpResponse, AppError> {
    let (room_id, message_id, answer_id) = path.into_inner();
    let (room_id, message_id, answer_id) =
        answer_target(&state, &room_id, &message_id, &answer_id).await?;

    let count = state
        .store
        .remove_answer_reaction(message_id, answer_id)
        .await?
        .ok_or(AppError::AnswerNotFound)?;
    let response = HttpResponse::Ok().json(ReactionCountResponse { count });

    state.dispatcher.dispatch(
        room_id,
        QaEvent::MessageAnswerReactionDecreased {
            id: answer_id.to_string(),
            count,
        },
    );
    Ok(response)
}

/// Validate the full room/message/answer chain.
async fn answer_target(
    state: &AppState,
    raw_room_id: &str,
    raw_message_id: &str,
    raw_answer_id: &str,
) -> Result<(Uuid, Uuid, Uuid), AppError> {
    let answer_id = parse_id(raw_answer_id, "answer")?;
    let message = message_in_room(state, raw_room_id, raw_message_id).await?;

    match state.store.get_answer(answer_id).await? {
        Some(answer) if answer.message_id == message.id => {
            Ok((message.room_id, message.id, answer.id))
        }
        _ => Err(AppError::AnswerNotFound),
    }
}
