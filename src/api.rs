//! HTTP handlers for the QR code endpoints.

use crate::error::{ApiError, GenerationError, error_chain};
use crate::generator::QrCodeGenerator;
use crate::logging::qrcode_request_span;
use crate::metrics::{METRICS, RequestMetrics};
use crate::model::{EncodedImage, QrCodeParams};
use crate::validation::validate_request;
use axum::{
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error};

pub const HEALTH_PATH: &str = "/api/health";
pub const QRCODE_PATH: &str = "/api/qrcode";
pub const METRICS_PATH: &str = "/metrics";

const QRCODE_ENDPOINT: &str = "qrcode";

/// Shared router state. Cloned per request; everything inside is immutable.
#[derive(Debug, Clone)]
pub struct AppState {
    generator: Arc<QrCodeGenerator>,
    started_at: Instant,
}

impl AppState {
    pub fn new(generator: QrCodeGenerator) -> Self {
        Self {
            generator: Arc::new(generator),
            started_at: Instant::now(),
        }
    }

    pub fn generator(&self) -> &QrCodeGenerator {
        &self.generator
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(QrCodeGenerator::default())
    }
}

impl IntoResponse for EncodedImage {
    fn into_response(self) -> Response {
        ([(header::CONTENT_TYPE, self.mime_type())], self.bytes).into_response()
    }
}

/// Axum handler for `GET /api/qrcode`
///
/// Parameters are validated before any encoding work starts. Encoding and
/// rendering run on the blocking pool since both are CPU bound.
pub async fn qrcode_handler(
    State(state): State<AppState>,
    query: Result<Query<QrCodeParams>, QueryRejection>,
) -> Result<EncodedImage, ApiError> {
    let metrics = RequestMetrics::new(QRCODE_ENDPOINT);

    let Query(params) = match query {
        Ok(query) => query,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "unreadable qrcode query");
            metrics.invalid("query");
            return Err(rejection.into());
        }
    };

    let request = match validate_request(&params) {
        Ok(request) => request,
        Err(err) => {
            debug!(field = err.field(), error = %err, "rejected qrcode request");
            metrics.invalid(err.field());
            return Err(err.into());
        }
    };

    let span = qrcode_request_span(&request);
    let worker_span = span.clone();
    let generator = state.generator.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        let _entered = worker_span.entered();
        generator.generate(&request)
    })
    .await
    .map_err(GenerationError::from)
    .and_then(|result| result);

    match outcome {
        Ok(image) => {
            metrics.success(image.format, image.bytes.len());
            Ok(image)
        }
        Err(err) => {
            error!(
                parent: &span,
                kind = err.kind(),
                error = %error_chain(&err),
                "An error occurred while generating the QR code"
            );
            metrics.error(err.kind());
            Err(err.into())
        }
    }
}

/// Prometheus metrics endpoint handler
pub async fn metrics_handler() -> Result<(StatusCode, String), ApiError> {
    let metrics_text = METRICS.encode()?;
    Ok((StatusCode::OK, metrics_text))
}
