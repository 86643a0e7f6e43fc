use actix_web::{get, web, HttpRequest, HttpResponse};

use super::parse_id;
use crate::error::AppError;
use crate::state::AppState;
use crate::websocket::lifecycle::{admit, run_viewer};
use crate::websocket::transport::ChannelTransport;

/// GET /subscribe/{room_id}
///
/// Upgrades to a WebSocket that receives every event of the room. Unknown rooms
/// are rejected with 400 and never reach the registry.
#[get("/subscribe/{room_id}")]
pub async fn subscribe(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let room_id = parse_id(&path, "room")?;

    let (response, session, msg_stream) =
        actix_ws::handle(&req, body).map_err(|e| AppError::HandshakeFailure(e.to_string()))?;

    let (transport, outbound) = ChannelTransport::new(state.live_view.outbound_buffer);
    let subscription = admit(
        state.store.as_ref(),
        &state.registry,
        room_id,
        transport,
        &state.shutdown,
    )
    .await?;

    tracing::info!(
        %room_id,
        subscriber_id = %subscription.id(),
        client = ?req.peer_addr(),
        "viewer connected"
    );

    // MessageStream is !Send
    actix_web::rt::spawn(run_viewer(
        subscription,
        session,
        msg_stream,
        outbound,
        state.live_view,
    ));

    Ok(response)
}
