//! Decoding to and encoding from packed RGBA buffers.

use std::path::Path;

use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageFormat, RgbaImage};
use tracing::debug;

use crate::error::{FilterError, FilterResult};

/// Smallest side accepted by [`load_image`] unless the caller asks otherwise.
pub const DEFAULT_MIN_SIDE: u32 = 50;

/// Decodes the image at `path` into RGBA8, rejecting images whose smaller side is below `min_side`.
pub fn load_image(path: &Path, min_side: u32) -> FilterResult<RgbaImage> {
    let decoded = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let (width, height) = (decoded.width(), decoded.height());
    if width.min(height) < min_side {
        return Err(FilterError::InputTooSmall { width, height, min: min_side });
    }
    debug!(?path, width, height, color = ?decoded.color(), "decoded input");
    return Ok(decoded.to_rgba8());
}

/// Encodes `pixels` to `path`, choosing the format from the extension.
///
/// Formats without an alpha channel (JPEG) get the colour channels only.
pub fn save_image(path: &Path, pixels: Vec<u8>, width: u32, height: u32) -> FilterResult<()> {
    let actual = pixels.len();
    let image = RgbaImage::from_raw(width, height, pixels).ok_or(
        FilterError::BufferSizeMismatch {
            expected: width as usize * height as usize * 4,
            actual,
        },
    )?;
    let format = ImageFormat::from_path(path)?;
    match format {
        ImageFormat::Jpeg => {
            DynamicImage::ImageRgba8(image).to_rgb8().save_with_format(path, format)?
        }
        _ => image.save_with_format(path, format)?,
    }
    debug!(?path, ?format, "saved output");
    return Ok(());
}
