//! QR code adapter for the Harvest Ledger.
//!
//! [`QrCodec`] implements [`IdentifierCodec`] over 8-bit grayscale images:
//! a batch identifier is rendered as a QR symbol and read back with a
//! finder-pattern detector. [`save_png`] and [`load_png`] move images to and
//! from disk.

use std::io;
use std::path::Path;

use hvl_ledger::{CodecError, IdentifierCodec};
use hvl_types::BatchId;
use image::{GrayImage, ImageError, ImageFormat, Luma};
use qrcode::{Color, QrCode};
use tracing::debug;

const DARK: Luma<u8> = Luma([0]);
const LIGHT: Luma<u8> = Luma([255]);

/// Renders and reads batch identifiers as QR codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QrCodec {
    module_px: u32,
    quiet_zone: u32,
}

impl QrCodec {
    pub const DEFAULT_MODULE_PX: u32 = 8;
    pub const DEFAULT_QUIET_ZONE: u32 = 4;

    pub fn new() -> Self {
        Self {
            module_px: Self::DEFAULT_MODULE_PX,
            quiet_zone: Self::DEFAULT_QUIET_ZONE,
        }
    }

    /// Pixels per QR module. Values below 1 are raised to 1.
    pub fn with_module_px(mut self, px: u32) -> Self {
        self.module_px = px.max(1);
        self
    }

    /// Light border width, in modules.
    pub fn with_quiet_zone(mut self, modules: u32) -> Self {
        self.quiet_zone = modules;
        self
    }

    fn render(&self, code: &QrCode) -> Result<GrayImage, CodecError> {
        let width = u32::try_from(code.width())
            .map_err(|_| CodecError::Encoding("symbol too wide".into()))?;
        let side = (width + 2 * self.quiet_zone) * self.module_px;
        let mut img = GrayImage::from_pixel(side, side, LIGHT);

        for (index, color) in code.to_colors().into_iter().enumerate() {
            if color != Color::Dark {
                continue;
            }
            let index = index as u32;
            let x0 = (index % width + self.quiet_zone) * self.module_px;
            let y0 = (index / width + self.quiet_zone) * self.module_px;
            for y in y0..y0 + self.module_px {
                for x in x0..x0 + self.module_px {
                    img.put_pixel(x, y, DARK);
                }
            }
        }
        Ok(img)
    }
}

impl Default for QrCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentifierCodec for QrCodec {
    type Image = GrayImage;

    fn encode(&self, id: &BatchId) -> Result<GrayImage, CodecError> {
        let code = QrCode::new(id.as_str().as_bytes())
            .map_err(|e| CodecError::Encoding(e.to_string()))?;
        let img = self.render(&code)?;
        debug!(batch_id = %id, side = img.width(), "rendered QR code");
        Ok(img)
    }

    fn decode(&self, image: &GrayImage) -> Result<BatchId, CodecError> {
        let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
            image.width() as usize,
            image.height() as usize,
            |x, y| image.get_pixel(x as u32, y as u32).0[0],
        );

        // First grid that decodes wins; unreadable grids are skipped.
        let payload = prepared
            .detect_grids()
            .into_iter()
            .find_map(|grid| grid.decode().ok().map(|(_, text)| text))
            .ok_or(CodecError::NoCodeFound)?;

        BatchId::new(&payload).map_err(|_| CodecError::InvalidPayload(payload))
    }
}

/// Write `image` to `path` as PNG.
pub fn save_png(image: &GrayImage, path: &Path) -> Result<(), CodecError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    image
        .save_with_format(path, ImageFormat::Png)
        .map_err(image_error)?;
    debug!(path = %path.display(), "saved QR image");
    Ok(())
}

/// Read a PNG from `path` as grayscale.
pub fn load_png(path: &Path) -> Result<GrayImage, CodecError> {
    let bytes = std::fs::read(path)?;
    let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png).map_err(image_error)?;
    Ok(img.to_luma8())
}

fn image_error(err: ImageError) -> CodecError {
    match err {
        ImageError::IoError(e) => CodecError::Io(e),
        other => CodecError::Io(io::Error::new(io::ErrorKind::InvalidData, other)),
    }
}
