use super::QrMatrix;
use crate::error::RenderFailure;
use crate::model::ImageFormat;
use image::{Rgb, RgbImage};
use std::io::Cursor;

const DARK: Rgb<u8> = Rgb([0, 0, 0]);
const LIGHT: Rgb<u8> = Rgb([255, 255, 255]);

/// Serializes a QR matrix into raster image bytes.
pub trait RasterRenderer: Send + Sync {
    fn render(&self, matrix: &QrMatrix, format: ImageFormat) -> Result<Vec<u8>, RenderFailure>;
}

/// Renderer backed by the `image` crate codecs. One pixel per matrix cell,
/// dark cells black and everything else white.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageRenderer;

impl RasterRenderer for ImageRenderer {
    fn render(&self, matrix: &QrMatrix, format: ImageFormat) -> Result<Vec<u8>, RenderFailure> {
        let (width, height) = (matrix.width(), matrix.height());
        if width == 0 || height == 0 {
            return Err(RenderFailure::EmptyMatrix { width, height });
        }

        let raster = RgbImage::from_fn(width, height, |x, y| {
            if matrix.get(x, y) { DARK } else { LIGHT }
        });

        let mut buffer = Cursor::new(Vec::new());
        raster
            .write_to(&mut buffer, codec_format(format))
            .map_err(|source| RenderFailure::Codec { format, source })?;
        Ok(buffer.into_inner())
    }
}

fn codec_format(format: ImageFormat) -> image::ImageFormat {
    match format {
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Gif => image::ImageFormat::Gif,
    }
}
