use std::{io::Cursor, path::Path};

use anyhow::Context;

use crate::foundation::error::{BadgeError, BadgeResult};

/// JPEG quality used for thumbnails.
pub const JPEG_QUALITY: u8 = 95;

/// Decode encoded template bytes (any format `image` understands) into RGB8.
///
/// Alpha is dropped; zone detection and compositing work on opaque pixels.
pub fn decode_template(bytes: &[u8]) -> BadgeResult<image::RgbImage> {
    let dyn_img = image::load_from_memory(bytes).map_err(|e| BadgeError::decode(e.to_string()))?;
    let rgb = dyn_img.to_rgb8();
    if rgb.width() == 0 || rgb.height() == 0 {
        return Err(BadgeError::decode("image has zero size"));
    }
    Ok(rgb)
}

/// Read and decode a template file.
pub fn load_template(path: &Path) -> BadgeResult<image::RgbImage> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read template '{}'", path.display()))?;
    decode_template(&bytes).map_err(|e| match e {
        BadgeError::Decode(msg) => BadgeError::decode(format!("'{}': {msg}", path.display())),
        other => other,
    })
}

/// Output encodings supported for rendered thumbnails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// JPEG at [`JPEG_QUALITY`].
    Jpeg,
    /// Lossless PNG.
    Png,
}

impl OutputFormat {
    /// Format implied by a file extension; unknown or missing extensions default to JPEG.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => OutputFormat::Png,
            _ => OutputFormat::Jpeg,
        }
    }
}

/// Encode an RGB8 image in memory.
pub fn encode_image(img: &image::RgbImage, format: OutputFormat) -> BadgeResult<Vec<u8>> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                Cursor::new(&mut buf),
                JPEG_QUALITY,
            );
            img.write_with_encoder(encoder)
                .map_err(|e| BadgeError::render(format!("encode jpeg: {e}")))?;
        }
        OutputFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
                .map_err(|e| BadgeError::render(format!("encode png: {e}")))?;
        }
    }
    Ok(buf)
}

/// Encode by extension and write to `path`, creating the parent directory.
pub fn save_image(img: &image::RgbImage, path: &Path) -> BadgeResult<()> {
    let bytes = encode_image(img, OutputFormat::from_path(path))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write image '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
