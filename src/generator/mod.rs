//! QR code generation pipeline
//!
//! A validated [`GenerationRequest`] goes through two capabilities in turn:
//! a [`SymbolEncoder`] that lays out the QR symbol on a pixel grid and a
//! [`RasterRenderer`] that serializes that grid in the requested format.
//! Both are traits so alternative backends can be plugged into
//! [`QrCodeGenerator`].

pub mod encoder;
pub mod renderer;

pub use encoder::{QUIET_ZONE_MODULES, QrSymbolEncoder, SymbolEncoder};
pub use renderer::{ImageRenderer, RasterRenderer};

use crate::error::GenerationError;
use crate::model::{EncodedImage, GenerationRequest};
use std::fmt;
use std::sync::Arc;

/// Pixel-space grid of cells, `true` meaning a dark cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrMatrix {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl QrMatrix {
    /// Creates an all-light matrix.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Cells outside the grid read as light.
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.index(x, y).is_some_and(|index| self.cells[index])
    }

    /// Marks a cell dark; out-of-range coordinates are ignored.
    pub fn set(&mut self, x: u32, y: u32) {
        if let Some(index) = self.index(x, y) {
            self.cells[index] = true;
        }
    }

    pub fn fill_region(&mut self, left: u32, top: u32, width: u32, height: u32) {
        for y in top..top.saturating_add(height) {
            for x in left..left.saturating_add(width) {
                self.set(x, y);
            }
        }
    }

    pub fn dark_count(&self) -> usize {
        self.cells.iter().filter(|dark| **dark).count()
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }
}

/// Dispatches validated requests to the encode and render capabilities.
///
/// Holds no mutable state, so one instance is shared by every request.
#[derive(Clone)]
pub struct QrCodeGenerator {
    encoder: Arc<dyn SymbolEncoder>,
    renderer: Arc<dyn RasterRenderer>,
}

impl QrCodeGenerator {
    pub fn new(encoder: Arc<dyn SymbolEncoder>, renderer: Arc<dyn RasterRenderer>) -> Self {
        Self { encoder, renderer }
    }

    /// Encodes then renders the request. A single attempt is made; neither
    /// failure kind is transient.
    pub fn generate(&self, request: &GenerationRequest) -> Result<EncodedImage, GenerationError> {
        let matrix = self.encoder.encode(
            &request.contents,
            request.size,
            request.size,
            request.correction,
        )?;
        tracing::debug!(
            size = request.size,
            correction = %request.correction,
            dark_cells = matrix.dark_count(),
            "encoded QR symbol"
        );

        let bytes = self.renderer.render(&matrix, request.format)?;
        tracing::debug!(
            format = %request.format,
            bytes = bytes.len(),
            "rendered QR image"
        );

        Ok(EncodedImage {
            bytes,
            format: request.format,
        })
    }
}

impl Default for QrCodeGenerator {
    fn default() -> Self {
        Self::new(Arc::new(QrSymbolEncoder::default()), Arc::new(ImageRenderer))
    }
}

impl fmt::Debug for QrCodeGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QrCodeGenerator").finish_non_exhaustive()
    }
}
