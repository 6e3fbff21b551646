//! Request parameter validation.
//!
//! The checks run in a fixed order (contents, size, correction, type) and the
//! first one that fails decides the single error reported to the caller.
//! Defaults for optional parameters are applied before any check runs.

use crate::model::{Correction, GenerationRequest, ImageFormat, QrCodeParams};
use thiserror::Error;

pub const MIN_SIZE: i64 = 150;
pub const MAX_SIZE: i64 = 350;
pub const DEFAULT_SIZE: u32 = 250;
pub const DEFAULT_TYPE: &str = "png";
pub const DEFAULT_CORRECTION: char = 'L';

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Client-side faults. The display text is sent verbatim to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Contents cannot be null or blank")]
    Contents,

    #[error("Image size must be between 150 and 350 pixels")]
    Size,

    #[error("Permitted error correction levels are L, M, Q, H")]
    Correction,

    #[error("Only png, jpeg and gif image types are supported")]
    Type,
}

impl ValidationError {
    /// Name of the query parameter that failed
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Contents => "contents",
            ValidationError::Size => "size",
            ValidationError::Correction => "correction",
            ValidationError::Type => "type",
        }
    }
}

/// Contents must be present and contain something other than whitespace.
pub fn validate_contents(contents: Option<&str>) -> bool {
    contents.is_some_and(|value| !value.trim().is_empty())
}

pub fn validate_size(size: i64) -> bool {
    (MIN_SIZE..=MAX_SIZE).contains(&size)
}

pub fn validate_correction(correction: char) -> bool {
    Correction::from_char(correction).is_some()
}

pub fn validate_type(image_type: &str) -> bool {
    ImageFormat::from_name(image_type).is_some()
}

/// Applies defaults, validates every parameter and builds the request.
///
/// # Examples
///
/// ```
/// use qrcode_api::model::{Correction, ImageFormat, QrCodeParams};
/// use qrcode_api::validation::{ValidationError, validate_request};
///
/// let params = QrCodeParams {
///     contents: Some("hello".to_string()),
///     ..QrCodeParams::default()
/// };
/// let request = validate_request(&params).unwrap();
/// assert_eq!(request.size, 250);
/// assert_eq!(request.format, ImageFormat::Png);
/// assert_eq!(request.correction, Correction::L);
///
/// let blank = QrCodeParams {
///     contents: Some("  ".to_string()),
///     size: Some("1000".to_string()),
///     ..QrCodeParams::default()
/// };
/// assert_eq!(validate_request(&blank), Err(ValidationError::Contents));
/// ```
pub fn validate_request(params: &QrCodeParams) -> ValidationResult<GenerationRequest> {
    let contents = params.contents.as_deref();
    if !validate_contents(contents) {
        return Err(ValidationError::Contents);
    }

    let size = match supplied(params.size.as_deref()) {
        None => DEFAULT_SIZE,
        Some(raw) => parse_size(raw)?,
    };

    let correction = match supplied(params.correction.as_deref()) {
        None => DEFAULT_CORRECTION,
        Some(raw) => single_char(raw).ok_or(ValidationError::Correction)?,
    };
    if !validate_correction(correction) {
        return Err(ValidationError::Correction);
    }
    let correction = Correction::from_char(correction).ok_or(ValidationError::Correction)?;

    let image_type = supplied(params.image_type.as_deref()).unwrap_or(DEFAULT_TYPE);
    if !validate_type(image_type) {
        return Err(ValidationError::Type);
    }
    let format = ImageFormat::from_name(image_type).ok_or(ValidationError::Type)?;

    Ok(GenerationRequest {
        contents: contents.unwrap_or_default().to_string(),
        size,
        format,
        correction,
    })
}

/// An empty query value counts as an omitted one for defaulted parameters.
fn supplied(value: Option<&str>) -> Option<&str> {
    value.filter(|raw| !raw.is_empty())
}

fn parse_size(raw: &str) -> ValidationResult<u32> {
    let size: i64 = raw.trim().parse().map_err(|_| ValidationError::Size)?;
    if !validate_size(size) {
        return Err(ValidationError::Size);
    }
    u32::try_from(size).map_err(|_| ValidationError::Size)
}

fn single_char(raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(level), None) => Some(level),
        _ => None,
    }
}
