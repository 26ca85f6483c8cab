//! # Comedy Transcription Service - Entry Point
//!
//! HTTP server that accepts audio uploads and answers with transcripts.
//!
//! ## Application Architecture:
//! - **config**: Layered configuration (config.toml + APP_ environment variables)
//! - **state**: Shared application state and request metrics
//! - **contract**: Wire types shared with the upload client
//! - **handlers**: The upload endpoint and the route table
//! - **transcriber**: The engine seam; audio is forwarded to a remote endpoint
//! - **middleware**: Per-request logging and counters
//! - **health**: Service banner and health endpoints
//! - **error**: `{"detail": ...}` error responses

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use comedy_transcription::config::AppConfig;
use comedy_transcription::state::AppState;
use comedy_transcription::transcriber::RemoteTranscriber;
use comedy_transcription::{handlers, middleware};

/// Global shutdown flag, set by the signal handler task and polled by main.
static SHUTDOWN_SIGNAL: AtomicBool = AtomicBool::new(false);

/// Start the server:
/// 1. Load and validate configuration
/// 2. Build the shared state around the remote transcription engine
/// 3. Serve routes until a shutdown signal arrives
#[actix_web::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    init_tracing()?;

    let config = AppConfig::load()?;
    config.validate()?;

    info!("Starting comedy-transcription v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded: {}:{}",
        config.server.host, config.server.port
    );
    info!("Transcription engine: {}", config.engine.endpoint);

    let transcriber = Arc::new(RemoteTranscriber::new(config.engine.endpoint.clone()));
    let app_state = AppState::new(config.clone(), transcriber);
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);

    setup_signal_handlers();

    info!("Starting HTTP server on {}", bind_addr);

    let server = HttpServer::new(move || {
        // The page may be served from any origin; the API itself only ever
        // answers GET and POST.
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::RequestTracker)
            .configure(handlers::routes)
    })
    .bind(&bind_addr)?
    .run();

    let server_handle = server.handle();
    let server_task = tokio::spawn(server);

    tokio::select! {
        result = server_task => {
            match result {
                Ok(server_result) => {
                    if let Err(e) = server_result {
                        error!("Server error: {}", e);
                    }
                }
                Err(e) => {
                    error!("Server task error: {}", e);
                }
            }
        }
        _ = wait_for_shutdown() => {
            info!("Shutdown signal received, stopping server...");
            server_handle.stop(true).await;
        }
    }

    info!("Server stopped gracefully");
    Ok(())
}

/// Console logging via tracing. `RUST_LOG` overrides the default filter.
fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comedy_transcription=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

/// Flip the shutdown flag on SIGTERM or SIGINT so in-flight uploads can
/// finish before the server stops.
fn setup_signal_handlers() {
    tokio::spawn(async {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
            .expect("Failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }

        SHUTDOWN_SIGNAL.store(true, Ordering::SeqCst);
    });
}

async fn wait_for_shutdown() {
    while !SHUTDOWN_SIGNAL.load(Ordering::SeqCst) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
