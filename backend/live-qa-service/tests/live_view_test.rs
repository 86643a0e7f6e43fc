mod common;

use std::time::Duration;

use actix_web::http::StatusCode;
use awc::error::WsClientError;
use awc::{ws, Client};
use common::{eventually, start_server, test_settings, test_state, test_state_with, MemoryStore};
use live_qa_service::config::LiveViewSettings;
use futures_util::{SinkExt, Stream, StreamExt};
use serde_json::{json, Value};
use uuid::Uuid;

/// Next text frame, skipping control frames.
async fn next_text<S, E>(connection: &mut S) -> Option<Value>
where
    S: Stream<Item = Result<ws::Frame, E>> + Unpin,
{
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(2), connection.next())
            .await
            .ok()??
            .ok()?;
        match frame {
            ws::Frame::Text(bytes) => return serde_json::from_slice(&bytes).ok(),
            ws::Frame::Ping(_) | ws::Frame::Pong(_) => continue,
            _ => return None,
        }
    }
}

async fn post_json(addr: std::net::SocketAddr, path: &str, body: Value) -> Value {
    let mut resp = Client::new()
        .post(format!("http://{addr}{path}"))
        .send_json(&body)
        .await
        .expect("send request");
    assert!(resp.status().is_success(), "POST {path} -> {}", resp.status());
    resp.json().await.expect("json body")
}

#[actix_rt::test]
async fn viewers_receive_events_for_their_room_only() {
    let store = MemoryStore::new();
    let room = store.seed_room("Live");
    let other = store.seed_room("Quiet");
    let state = test_state(store);
    let (addr, handle) = start_server(state.clone()).await.expect("start server");

    let (_resp, mut a) = Client::new()
        .ws(format!("http://{addr}/subscribe/{room}"))
        .connect()
        .await
        .expect("connect viewer a");
    let (_resp, mut b) = Client::new()
        .ws(format!("http://{addr}/subscribe/{room}"))
        .connect()
        .await
        .expect("connect viewer b");
    let (_resp, mut c) = Client::new()
        .ws(format!("http://{addr}/subscribe/{other}"))
        .connect()
        .await
        .expect("connect viewer c");
    assert_eq!(state.registry.subscriber_count(room), 2);

    let created = post_json(
        addr,
        &format!("/api/rooms/{room}/messages"),
        json!({"message": "hi"}),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let expected = json!({"kind": "message_created", "value": {"id": id, "message": "hi"}});
    assert_eq!(next_text(&mut a).await, Some(expected.clone()));
    assert_eq!(next_text(&mut b).await, Some(expected));

    let quiet = tokio::time::timeout(Duration::from_millis(200), c.next()).await;
    assert!(quiet.is_err(), "viewer of another room received a frame");

    state.shutdown.cancel();
    handle.stop(true).await;
}

#[actix_rt::test]
async fn unknown_room_is_rejected_with_400() {
    let state = test_state(MemoryStore::new());
    let (addr, handle) = start_server(state.clone()).await.expect("start server");

    let result = Client::new()
        .ws(format!("http://{addr}/subscribe/{}", Uuid::new_v4()))
        .connect()
        .await;
    assert!(matches!(
        result,
        Err(WsClientError::InvalidResponseStatus(status)) if status == StatusCode::BAD_REQUEST
    ));

    let result = Client::new()
        .ws(format!("http://{addr}/subscribe/not-a-room"))
        .connect()
        .await;
    assert!(matches!(
        result,
        Err(WsClientError::InvalidResponseStatus(status)) if status == StatusCode::BAD_REQUEST
    ));

    assert_eq!(state.registry.room_count(), 0);
    handle.stop(true).await;
}

#[actix_rt::test]
async fn closing_the_socket_unsubscribes_the_viewer() {
    let store = MemoryStore::new();
    let room = store.seed_room("Bye");
    let state = test_state(store);
    let (addr, handle) = start_server(state.clone()).await.expect("start server");

    let (_resp, mut viewer) = Client::new()
        .ws(format!("http://{addr}/subscribe/{room}"))
        .connect()
        .await
        .expect("connect viewer");
    assert_eq!(state.registry.subscriber_count(room), 1);

    viewer
        .send(ws::Message::Close(None))
        .await
        .expect("send close");

    let registry = state.registry.clone();
    assert!(eventually(|| registry.subscriber_count(room) == 0).await);
    // bucket stays behind
    assert_eq!(state.registry.room_count(), 1);

    handle.stop(true).await;
}

#[actix_rt::test]
async fn silent_viewer_is_dropped_after_client_timeout() {
    let store = MemoryStore::new();
    let room = store.seed_room("Quiet viewer");
    let settings = LiveViewSettings {
        heartbeat_interval: Duration::from_millis(50),
        client_timeout: Duration::from_millis(150),
        ..test_settings()
    };
    let state = test_state_with(store, settings);
    let (addr, handle) = start_server(state.clone()).await.expect("start server");

    // never polled, so pings go unanswered
    let (_resp, _viewer) = Client::new()
        .ws(format!("http://{addr}/subscribe/{room}"))
        .connect()
        .await
        .expect("connect viewer");
    assert_eq!(state.registry.subscriber_count(room), 1);

    let registry = state.registry.clone();
    assert!(eventually(|| registry.subscriber_count(room) == 0).await);
    assert_eq!(state.registry.room_count(), 1);

    state.shutdown.cancel();
    handle.stop(true).await;
}

#[actix_rt::test]
async fn shutdown_closes_live_viewers() {
    let store = MemoryStore::new();
    let room = store.seed_room("Closing time");
    let state = test_state(store);
    let (addr, handle) = start_server(state.clone()).await.expect("start server");

    let (_resp, mut viewer) = Client::new()
        .ws(format!("http://{addr}/subscribe/{room}"))
        .connect()
        .await
        .expect("connect viewer");

    state.shutdown.cancel();

    let registry = state.registry.clone();
    assert!(eventually(|| registry.subscriber_count(room) == 0).await);

    let frame = tokio::time::timeout(Duration::from_secs(2), viewer.next())
        .await
        .expect("no close frame");
    assert!(matches!(frame, Some(Ok(ws::Frame::Close(_))) | None));

    handle.stop(true).await;
}

#[actix_rt::test]
async fn answer_events_reach_viewers() {
    let store = MemoryStore::new();
    let room = store.seed_room("Answers");
    let message = store.seed_message(room, "Is Rc Send?");
    let state = test_state(store);
    let (addr, handle) = start_server(state.clone()).await.expect("start server");

    let (_resp, mut viewer) = Client::new()
        .ws(format!("http://{addr}/subscribe/{room}"))
        .connect()
        .await
        .expect("connect viewer");

    post_json(
        addr,
        &format!("/api/rooms/{room}/messages/{message}/answer"),
        json!({"answer": "No"}),
    )
    .await;

    assert_eq!(
        next_text(&mut viewer).await,
        Some(json!({"kind": "message_answered", "value": {"id": message.to_string(), "answer": "No"}}))
    );

    state.shutdown.cancel();
    handle.stop(true).await;
}
