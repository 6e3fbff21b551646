//! Error taxonomy for the QR code service
//!
//! - [`ValidationError`]: client fault, reported verbatim with HTTP 400
//! - [`EncodingFailure`] / [`RenderFailure`]: server faults, logged in full and
//!   reported to the caller only as a generic HTTP 500
//! - [`ApiError`]: what a handler returns; maps each fault onto the wire contract

use crate::model::{Correction, ImageFormat};
pub use crate::validation::ValidationError;
use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::error::Error as StdError;
use thiserror::Error;

/// Body of every 500 response. Failure detail stays in the server log.
pub const GENERATION_FAILED_MESSAGE: &str = "An error occurred while generating the QR code";

/// The symbol encoder could not produce a matrix for the request.
#[derive(Debug, Error)]
pub enum EncodingFailure {
    #[error("contents cannot be encoded at correction level {level}")]
    Symbol {
        level: Correction,
        #[source]
        source: qrcode::types::QrError,
    },

    #[error(
        "symbol of {modules} modules plus a {quiet_zone}-module quiet zone does not fit in {width}x{height} pixels"
    )]
    DoesNotFit {
        modules: u32,
        quiet_zone: u32,
        width: u32,
        height: u32,
    },
}

/// The raster codec could not serialize the matrix.
#[derive(Debug, Error)]
pub enum RenderFailure {
    #[error("failed to write {format} image")]
    Codec {
        format: ImageFormat,
        #[source]
        source: image::ImageError,
    },

    #[error("matrix of {width}x{height} cells cannot be rasterized")]
    EmptyMatrix { width: u32, height: u32 },
}

/// Any server-side failure of the generation pipeline
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("QR symbol encoding failed")]
    Encoding(#[from] EncodingFailure),

    #[error("QR image rendering failed")]
    Render(#[from] RenderFailure),

    #[error("generation task did not complete")]
    Worker(#[from] tokio::task::JoinError),
}

impl GenerationError {
    /// Short label used for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::Encoding(EncodingFailure::Symbol { .. }) => "encoding",
            GenerationError::Encoding(EncodingFailure::DoesNotFit { .. }) => "does_not_fit",
            GenerationError::Render(_) => "render",
            GenerationError::Worker(_) => "worker",
        }
    }
}

/// Error returned by HTTP handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Query string that could not be bound at all, e.g. a repeated parameter
    #[error(transparent)]
    Query(#[from] QueryRejection),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("failed to encode metrics")]
    Metrics(#[from] std::fmt::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(err) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: err.to_string(),
                }),
            )
                .into_response(),
            ApiError::Query(rejection) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: rejection.body_text(),
                }),
            )
                .into_response(),
            ApiError::Generation(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, GENERATION_FAILED_MESSAGE).into_response()
            }
            ApiError::Metrics(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

/// Renders an error and all of its sources as `outer: inner: root`.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}
