use serde::Deserialize;
use std::fmt;

/// Raster formats the service can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
}

impl ImageFormat {
    pub const ALL: [ImageFormat; 3] = [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif];

    /// Parses a format name, ignoring ASCII case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(name))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Gif => "gif",
        }
    }

    /// Value of the `Content-Type` header for this format
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Gif => "image/gif",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// QR error correction level, from lowest (L, ~7%) to highest (H, ~30%) recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Correction {
    L,
    M,
    Q,
    H,
}

impl Correction {
    /// Parses a level character, ignoring ASCII case.
    pub fn from_char(level: char) -> Option<Self> {
        match level.to_ascii_uppercase() {
            'L' => Some(Correction::L),
            'M' => Some(Correction::M),
            'Q' => Some(Correction::Q),
            'H' => Some(Correction::H),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Correction::L => 'L',
            Correction::M => 'M',
            Correction::Q => 'Q',
            Correction::H => 'H',
        }
    }
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Raw query parameters of `GET /api/qrcode`.
///
/// Every field is kept as text so that defaulting and parsing happen in one
/// place, see [`crate::validation::validate_request`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QrCodeParams {
    pub contents: Option<String>,
    pub size: Option<String>,
    #[serde(rename = "type")]
    pub image_type: Option<String>,
    pub correction: Option<String>,
}

/// A request whose parameters all passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub contents: String,
    /// Width and height of the output image in pixels
    pub size: u32,
    pub format: ImageFormat,
    pub correction: Correction,
}

/// Serialized image ready to be sent back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }
}
