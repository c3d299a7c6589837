mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use wearvote_api::AppStateInner;
use wearvote_db::Store;
use wearvote_gateway::{Counterpart, Dispatcher, MessageRelay, ScriptedCounterpart, connection};
use wearvote_sim::Simulation;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wearvote=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::load();

    // Init store
    let store = Arc::new(Store::open(&config.db_path)?);
    tokio::fs::create_dir_all(&config.uploads_dir).await?;

    // Real-time side
    let dispatcher = Dispatcher::new();
    let counterpart: Option<Arc<dyn Counterpart>> = if config.auto_reply {
        Some(Arc::new(ScriptedCounterpart::new(config.primary_user)))
    } else {
        None
    };
    let relay = MessageRelay::new(store.clone(), dispatcher, counterpart);

    // Background jobs
    let sim = Simulation::new(store.clone(), relay.clone(), config.primary_user);
    let jobs = wearvote_sim::spawn_jobs(sim, config.schedule.clone());

    // Routes
    let api_routes = wearvote_api::router(Arc::new(AppStateInner {
        store,
        uploads_dir: config.uploads_dir.clone(),
    }));

    let ws_route = Router::new()
        .route("/gateway", get(ws_upgrade))
        .with_state(relay);

    let app = Router::new()
        .merge(api_routes)
        .merge(ws_route)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("WearVote server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for job in jobs {
        job.abort();
    }
    Ok(())
}

async fn ws_upgrade(State(relay): State<MessageRelay>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection::handle_connection(socket, relay))
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => tokio::select! {
                _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
            },
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
