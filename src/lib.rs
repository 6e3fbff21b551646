pub mod api;
pub mod config;
pub mod error;
pub mod generator;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod shutdown;
pub mod validation;

pub use api::AppState;
pub use config::{CliArgs, ServerConfig};
pub use error::{ApiError, EncodingFailure, GenerationError, RenderFailure, ValidationError};
pub use generator::{ImageRenderer, QrCodeGenerator, QrMatrix, QrSymbolEncoder};
pub use logging::{LoggingConfig, init_logging};
pub use model::{Correction, EncodedImage, GenerationRequest, ImageFormat, QrCodeParams};
pub use shutdown::ShutdownCoordinator;

use anyhow::Result;
use axum::{Router, routing::get};
use std::future::IntoFuture;
use tokio::net::TcpListener;

/// Builds the service router: QR generation, liveness and metrics.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(api::HEALTH_PATH, get(health::liveness_handler))
        .route(api::QRCODE_PATH, get(api::qrcode_handler))
        .route(api::METRICS_PATH, get(api::metrics_handler))
        .with_state(state)
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    let router = build_router(AppState::default());

    let listener = TcpListener::bind(config.http_bind_address).await?;
    let actual_addr = listener.local_addr()?;
    tracing::info!(bind = %actual_addr, "listening");

    let coordinator = ShutdownCoordinator::new(config.shutdown_timeout());
    let signal_coordinator = coordinator.clone();
    tokio::spawn(async move { signal_coordinator.wait_for_signal().await });

    serve_until_shutdown(listener, router, coordinator).await
}

/// Serves `router` until the coordinator fires, then drains in-flight
/// requests for at most the coordinator's drain timeout.
pub async fn serve_until_shutdown(
    listener: TcpListener,
    router: Router,
    coordinator: ShutdownCoordinator,
) -> Result<()> {
    let token = coordinator.token();
    let server_future = axum::serve(listener, router)
        .with_graceful_shutdown(async move { token.cancelled().await })
        .into_future();

    tokio::pin!(server_future);

    tokio::select! {
        result = &mut server_future => {
            tracing::info!("server stopped");
            result.map_err(anyhow::Error::from)
        }
        _ = coordinator.drain_deadline() => {
            tracing::warn!(
                timeout_secs = coordinator.drain_timeout().as_secs(),
                "in-flight requests did not drain before the shutdown timeout"
            );
            Ok(())
        }
    }
}
