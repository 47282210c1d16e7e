//! mess-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, picks the storage
//! backend, wires the payment boundary, runs the one-time bootstrap, and
//! starts the HTTP server. All route handlers live in `routes.rs`; shared
//! state types live in `state.rs`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use mess_daemon::{bootstrap, routes, state};
use mess_gateway::GatewayConfig;
use mess_store::{EntityStore, MemoryStore, PgStore, ENV_DB_URL};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local if present (dev convenience). Silent if the file does
    // not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let store = pick_store().await?;

    let gateway_cfg = match GatewayConfig::from_env() {
        Ok(cfg) => Some(cfg),
        Err(err) => {
            warn!("payment gateway not configured ({err}); orders and verification will refuse");
            None
        }
    };

    // Explicit, idempotent, once per process. Not a per-request side effect.
    bootstrap::ensure_bootstrap_accounts(store.as_ref())
        .await
        .context("bootstrap accounts failed")?;

    let shared = Arc::new(state::AppState::with_gateway(store, gateway_cfg));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr = bind_addr_from_env().unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8890)));
    info!("mess-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

/// Postgres when MESS_DATABASE_URL is set, otherwise the in-memory store
/// (single-process dev only; nothing survives a restart).
async fn pick_store() -> anyhow::Result<Arc<dyn EntityStore>> {
    if std::env::var(ENV_DB_URL).is_ok() {
        let store = PgStore::connect_from_env().await?;
        store.migrate().await?;
        info!("using Postgres entity store");
        Ok(Arc::new(store))
    } else {
        warn!("{ENV_DB_URL} not set; using in-memory entity store");
        Ok(Arc::new(MemoryStore::new()))
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var("MESS_DAEMON_ADDR").ok()?.parse().ok()
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(tower_http::cors::Any)
}
