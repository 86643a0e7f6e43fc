use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::LiveViewSettings;
use crate::store::QaStore;
use crate::websocket::dispatcher::EventDispatcher;
use crate::websocket::ConnectionRegistry;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn QaStore>,
    pub registry: ConnectionRegistry,
    pub dispatcher: EventDispatcher,
    /// Parent of every viewer's cancellation token; fired on shutdown
    pub shutdown: CancellationToken,
    pub live_view: LiveViewSettings,
}

impl AppState {
    /// Build the shared state and start the event broadcaster.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(
        store: Arc<dyn QaStore>,
        live_view: LiveViewSettings,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let registry = ConnectionRegistry::new();
        let (dispatcher, broadcaster) = EventDispatcher::spawn(registry.clone(), shutdown.clone());

        let state = Self {
            store,
            registry,
            dispatcher,
            shutdown,
            live_view,
        };
        (state, broadcaster)
    }
}
