//! signstamp API server
//!
//! A small service for stamping raster signatures into PDFs. Provides
//! REST endpoints for:
//!
//! - PDF upload (20 MB default limit, token-keyed in-memory storage)
//! - Placement suggestion (widget / keyword / fallback tiers)
//! - Signature stamping and signed-document download
//!
//! Documents live in memory behind opaque tokens and expire after a
//! fixed TTL; nothing is persisted to disk.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;
mod storage;

use api::{
    handle_download, handle_get_pdf, handle_health, handle_sign, handle_suggest, handle_upload,
};
use storage::TokenStore;

/// Command-line arguments for the signstamp server
#[derive(Parser, Debug)]
#[command(name = "signstamp-api")]
#[command(about = "signstamp server for PDF signature placement and stamping")]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Seconds an uploaded document stays available
    #[arg(long, default_value = "3600")]
    ttl_secs: u64,

    /// Upload size limit in megabytes
    #[arg(long, default_value = "20")]
    max_upload_mb: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
pub struct AppState {
    /// Token-keyed PDF storage
    pub store: TokenStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting signstamp server on {}:{}", args.host, args.port);

    // Create shared state
    let state = Arc::new(AppState {
        store: TokenStore::new(Duration::from_secs(args.ttl_secs)),
    });

    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = Router::new()
        // Health check
        .route("/health", get(handle_health))
        // Document lifecycle
        .route(
            "/upload",
            post(handle_upload).layer(DefaultBodyLimit::max(args.max_upload_mb * 1024 * 1024)),
        )
        .route("/pdf/:token", get(handle_get_pdf))
        .route("/suggest", post(handle_suggest))
        .route("/sign", post(handle_sign))
        .route("/download/:token", get(handle_download))
        // Apply middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!("Document TTL: {}s", args.ttl_secs);
    info!("Upload limit: {} MB", args.max_upload_mb);

    axum::serve(listener, app).await?;

    Ok(())
}
