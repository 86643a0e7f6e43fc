#![allow(dead_code)]

use std::net::{SocketAddr, TcpListener};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use actix_web::{dev::ServerHandle, web, App, HttpServer};
use async_trait::async_trait;
use live_qa_service::config::LiveViewSettings;
use live_qa_service::error::{AppError, AppResult};
use live_qa_service::models::{Answer, Message, Room};
use live_qa_service::routes;
use live_qa_service::state::AppState;
use live_qa_service::store::QaStore;
use live_qa_service::websocket::lifecycle::RoomDirectory;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    rooms: Vec<Room>,
    messages: Vec<Message>,
    answers: Vec<Answer>,
}

/// In-memory `QaStore` with a switch that makes every call fail.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    broken: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn break_connection(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> AppResult<()> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(AppError::Database("connection refused".into()));
        }
        Ok(())
    }

    pub fn seed_room(&self, theme: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.tables.lock().rooms.push(Room {
            id,
            theme: theme.to_string(),
        });
        id
    }

    pub fn seed_message(&self, room_id: Uuid, text: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.tables.lock().messages.push(Message {
            id,
            room_id,
            message: text.to_string(),
            reaction_count: 0,
            answered: false,
        });
        id
    }
}

fn adjust(count: &mut i64, delta: i64) -> i64 {
    *count = (*count + delta).max(0);
    *count
}

#[async_trait]
impl RoomDirectory for MemoryStore {
    async fn room_exists(&self, room_id: Uuid) -> AppResult<bool> {
        self.check()?;
        Ok(self.tables.lock().rooms.iter().any(|r| r.id == room_id))
    }
}

#[async_trait]
impl QaStore for MemoryStore {
    async fn insert_room(&self, theme: &str) -> AppResult<Uuid> {
        self.check()?;
        Ok(self.seed_room(theme))
    }

    async fn list_rooms(&self) -> AppResult<Vec<Room>> {
        self.check()?;
        Ok(self.tables.lock().rooms.clone())
    }

    async fn insert_message(&self, room_id: Uuid, message: &str) -> AppResult<Uuid> {
        self.check()?;
        Ok(self.seed_message(room_id, message))
    }

    async fn list_room_messages(&self, room_id: Uuid) -> AppResult<Vec<Message>> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .messages
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn get_message(&self, message_id: Uuid) -> AppResult<Option<Message>> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .messages
            .iter()
            .find(|m| m.id == message_id)
            .cloned())
    }

    async fn react_to_message(&self, message_id: Uuid) -> AppResult<Option<i64>> {
        self.check()?;
        let mut tables = self.tables.lock();
        Ok(tables
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .map(|m| adjust(&mut m.reaction_count, 1)))
    }

    async fn remove_message_reaction(&self, message_id: Uuid) -> AppResult<Option<i64>> {
        self.check()?;
        let mut tables = self.tables.lock();
        Ok(tables
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .map(|m| adjust(&mut m.reaction_count, -1)))
    }

    async fn answer_message(&self, message_id: Uuid, answer: &str) -> AppResult<Uuid> {
        self.check()?;
        let mut tables = self.tables.lock();
        let message = tables
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| AppError::Database("foreign key violation".into()))?;
        message.answered = true;

        let id = Uuid::new_v4();
        tables.answers.push(Answer {
            id,
            message_id,
            answer: answer.to_string(),
            reaction_count: 0,
        });
        Ok(id)
    }

    async fn list_answers(&self, message_id: Uuid) -> AppResult<Vec<Answer>> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .answers
            .iter()
            .filter(|a| a.message_id == message_id)
            .cloned()
            .collect())
    }

    async fn get_answer(&self, answer_id: Uuid) -> AppResult<Option<Answer>> {
        self.check()?;
        Ok(self
            .tables
            .lock()
            .answers
            .iter()
            .find(|a| a.id == answer_id)
            .cloned())
    }

    async fn react_to_answer(&self, message_id: Uuid, answer_id: Uuid) -> AppResult<Option<i64>> {
        self.check()?;
        let mut tables = self.tables.lock();
        Ok(tables
            .answers
            .iter_mut()
            .find(|a| a.id == answer_id && a.message_id == message_id)
            .map(|a| adjust(&mut a.reaction_count, 1)))
    }

    async fn remove_answer_reaction(
        &self,
        message_id: Uuid,
        answer_id: Uuid,
    ) -> AppResult<Option<i64>> {
        self.check()?;
        let mut tables = self.tables.lock();
        Ok(tables
            .answers
            .iter_mut()
            .find(|a| a.id == answer_id && a.message_id == message_id)
            .map(|a| adjust(&mut a.reaction_count, -1)))
    }
}

pub fn test_settings() -> LiveViewSettings {
    LiveViewSettings {
        outbound_buffer: 16,
        ..LiveViewSettings::default()
    }
}

pub fn test_state(store: Arc<MemoryStore>) -> AppState {
    test_state_with(store, test_settings())
}

pub fn test_state_with(store: Arc<MemoryStore>, settings: LiveViewSettings) -> AppState {
    let (state, _broadcaster) = AppState::new(store, settings, CancellationToken::new());
    state
}

/// Bind the full route table on an ephemeral port.
pub async fn start_server(state: AppState) -> std::io::Result<(SocketAddr, ServerHandle)> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .workers(1)
    .listen(listener)?
    .run();

    let handle = server.handle();
    actix_rt::spawn(server);
    Ok((addr, handle))
}

/// Poll `check` until it holds or a second has passed.
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
