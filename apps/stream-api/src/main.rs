use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stream_api::auth::identity::MemoryIdentityProvider;
use stream_api::config::Config;
use stream_api::db::store::MemoryTipStore;
use stream_api::gateway::fanout::RoomHub;
use stream_api::payments::ClientSignedPayments;
use stream_api::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file (silently skip if missing, env vars may be set externally)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let port = config.port;

    tracing::info!(
        large_tip = config.notifications.large_tip_threshold,
        mega_tip = config.notifications.mega_tip_threshold,
        room_capacity = config.room_channel_capacity,
        "stream-api configured"
    );

    // In-memory collaborators until the relational store and wallet signer are wired in.
    let state = AppState {
        tips: Arc::new(MemoryTipStore::new()),
        identity: Arc::new(MemoryIdentityProvider::new()),
        payments: Arc::new(ClientSignedPayments),
        rooms: Arc::new(RoomHub::new(config.room_channel_capacity)),
        config: Arc::new(config),
    };

    tracing::warn!(
        "no identities configured; POST /api/v1/tips answers 401 until an identity provider is wired in"
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(stream_api::routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "stream-api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
