use actix_web::{web, App, HttpServer};
use anyhow::Context;
use live_qa_service::{
    config::Config, db, error::AppError, logging, middleware, routes, state::AppState,
    store::PgStore,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::from_env().context("failed to load configuration")?;
    logging::init_tracing();

    let pool = db::init_pool(&cfg)
        .await
        .context("failed to initialise database")?;
    let store = Arc::new(PgStore::new(pool));

    let shutdown = CancellationToken::new();
    let (state, broadcaster) = AppState::new(store, cfg.live_view(), shutdown.clone());

    // Viewers hold their sockets open, so they must be told to leave before
    // the server can drain.
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown signal received, closing live viewers");
            signal_token.cancel();
        }
    });

    let bind_addr = cfg.bind_addr();
    tracing::info!(%bind_addr, "starting live-qa-service");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logging)
            .wrap(middleware::RequestId)
            .wrap(middleware::cors())
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .bind(&bind_addr)
    .map_err(|e| AppError::StartServer(format!("{bind_addr}: {e}")))?
    .run()
    .await
    .context("http server failed")?;

    shutdown.cancel();
    if tokio::time::timeout(Duration::from_secs(5), broadcaster)
        .await
        .is_err()
    {
        tracing::warn!("event broadcaster did not stop in time");
    }

    tracing::info!("live-qa-service stopped");
    Ok(())
}
