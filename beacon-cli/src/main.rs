use std::net::SocketAddr;

use anyhow::Result;
use axum::{Router, routing::get};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use beacon_server::{SignalingService, ws_handler};

/// WebRTC signaling gateway: relays room-scoped peer-discovery traffic
/// between browser clients over a single WebSocket endpoint.
#[derive(Parser)]
#[command(name = "beacon", version)]
struct Args {
    /// Address to bind on.
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let service = SignalingService::spawn();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(ws_handler))
        .layer(cors)
        .with_state(service);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    info!("Signaling gateway listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
