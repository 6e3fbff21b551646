use super::QrMatrix;
use crate::error::EncodingFailure;
use crate::model::Correction;
use qrcode::{Color, EcLevel, QrCode};

/// Light modules kept around the symbol on every side
pub const QUIET_ZONE_MODULES: u32 = 4;

/// Turns text into a QR matrix laid out on a `width` x `height` pixel grid.
pub trait SymbolEncoder: Send + Sync {
    fn encode(
        &self,
        contents: &str,
        width: u32,
        height: u32,
        correction: Correction,
    ) -> Result<QrMatrix, EncodingFailure>;
}

/// Encoder backed by the `qrcode` crate.
///
/// The smallest symbol version that holds the contents is chosen. The symbol
/// and its quiet zone are scaled by the largest whole factor that fits the
/// target and centred; any leftover margin stays light.
#[derive(Debug, Clone, Copy)]
pub struct QrSymbolEncoder {
    quiet_zone: u32,
}

impl QrSymbolEncoder {
    pub fn with_quiet_zone(quiet_zone: u32) -> Self {
        Self { quiet_zone }
    }
}

impl Default for QrSymbolEncoder {
    fn default() -> Self {
        Self::with_quiet_zone(QUIET_ZONE_MODULES)
    }
}

impl SymbolEncoder for QrSymbolEncoder {
    fn encode(
        &self,
        contents: &str,
        width: u32,
        height: u32,
        correction: Correction,
    ) -> Result<QrMatrix, EncodingFailure> {
        let code = QrCode::with_error_correction_level(contents.as_bytes(), ec_level(correction))
            .map_err(|source| EncodingFailure::Symbol {
                level: correction,
                source,
            })?;

        let modules = code.width() as u32;
        let padded = modules + 2 * self.quiet_zone;
        if padded > width || padded > height {
            return Err(EncodingFailure::DoesNotFit {
                modules,
                quiet_zone: self.quiet_zone,
                width,
                height,
            });
        }

        let scale = (width / padded).min(height / padded);
        let left = (width - modules * scale) / 2;
        let top = (height - modules * scale) / 2;

        let mut matrix = QrMatrix::new(width, height);
        for (index, color) in code.to_colors().into_iter().enumerate() {
            if color != Color::Dark {
                continue;
            }
            let x = index as u32 % modules;
            let y = index as u32 / modules;
            matrix.fill_region(left + x * scale, top + y * scale, scale, scale);
        }

        tracing::trace!(modules, scale, left, top, "laid out QR symbol");
        Ok(matrix)
    }
}

fn ec_level(correction: Correction) -> EcLevel {
    match correction {
        Correction::L => EcLevel::L,
        Correction::M => EcLevel::M,
        Correction::Q => EcLevel::Q,
        Correction::H => EcLevel::H,
    }
}
