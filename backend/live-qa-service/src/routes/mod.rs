pub mod answers;
pub mod messages;
pub mod rooms;
pub mod wsroute;

use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::Message;
use crate::state::AppState;

/// Column limit shared by themes, questions and answers
const MAX_TEXT_LEN: usize = 255;

/// Register every route. Expects `web::Data<AppState>` on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(err.to_string()).into()
    }))
    .service(wsroute::subscribe)
    .service(rooms::create_room)
    .service(rooms::list_rooms)
    .service(messages::list_messages)
    .service(messages::create_message)
    .service(messages::get_message)
    .service(messages::react_to_message)
    .service(messages::remove_message_reaction)
    .service(answers::list_answers)
    .service(answers::answer_message)
    .service(answers::react_to_answer)
    .service(answers::remove_answer_reaction)
    .route("/health", web::get().to(health))
    .route("/metrics", web::get().to(metrics::serve_metrics));
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().body("ok")
}

pub(crate) fn parse_id(raw: &str, kind: &'static str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidId(kind))
}

pub(crate) fn validate_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} must not be empty")));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::BadRequest(format!(
            "{field} must be at most {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

pub(crate) async fn ensure_room(state: &AppState, room_id: Uuid) -> AppResult<()> {
    if state.store.room_exists(room_id).await? {
        Ok(())
    } else {
        Err(AppError::RoomNotFound)
    }
}

/// Resolve room and message ids, requiring the message to live in that room.
pub(crate) async fn message_in_room(
    state: &AppState,
    raw_room_id: &str,
    raw_message_id: &str,
) -> AppResult<Message> {
    let room_id = parse_id(raw_room_id, "room")?;
    let message_id = parse_id(raw_message_id, "message")?;
    ensure_room(state, room_id).await?;

    match state.store.get_message(message_id).await? {
        Some(message) if message.room_id == room_id => Ok(message),
        _ => Err(AppError::MessageNotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_names_the_entity() {
        let err = parse_id("not-a-uuid", "message").unwrap_err();
        assert_eq!(err.to_string(), "Invalid message id");
        assert!(parse_id(&Uuid::new_v4().to_string(), "room").is_ok());
    }

    #[test]
    fn text_must_be_present_and_fit_the_column() {
        assert!(validate_text("theme", "Rust").is_ok());
        assert!(validate_text("theme", "   ").is_err());
        assert!(validate_text("theme", &"x".repeat(MAX_TEXT_LEN)).is_ok());
        assert!(validate_text("theme", &"x".repeat(MAX_TEXT_LEN + 1)).is_err());
    }
}
