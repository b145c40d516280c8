// SPDX-License-Identifier: MPL-2.0
//! Image loading and decoding (JPEG, PNG).

use crate::error::{Error, Result};
use iced::widget::image;
use image_rs::GenericImageView;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// File extensions accepted by the file input channel.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// A decoded image ready for both display and inference.
///
/// The RGBA bytes back the Iced handle and are kept in an `Arc` so the
/// classifier can rebuild a `DynamicImage` without re-decoding the file.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub handle: image::Handle,
    pub width: u32,
    pub height: u32,
    rgba_bytes: Arc<Vec<u8>>,
}

impl ImageData {
    /// Creates a new `ImageData` from RGBA pixels.
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        let rgba_bytes = Arc::new(pixels);
        let handle = image::Handle::from_rgba(width, height, rgba_bytes.to_vec());
        Self {
            handle,
            width,
            height,
            rgba_bytes,
        }
    }

    /// Returns a reference to the RGBA bytes.
    #[must_use]
    pub fn rgba_bytes(&self) -> &[u8] {
        &self.rgba_bytes
    }

    /// Rebuilds a `DynamicImage` for the inference pipeline.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the stored byte count does not match the
    /// dimensions (should not happen for images built by this module).
    pub fn to_dynamic(&self) -> Result<image_rs::DynamicImage> {
        let rgba =
            image_rs::RgbaImage::from_raw(self.width, self.height, self.rgba_bytes.to_vec())
                .ok_or_else(|| Error::Decode("RGBA buffer does not match dimensions".into()))?;
        Ok(image_rs::DynamicImage::ImageRgba8(rgba))
    }
}

/// Checks whether a path has one of the supported image extensions.
#[must_use]
pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| ext.eq_ignore_ascii_case(s))
        })
}

/// Loads and decodes an image from the given path.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and [`Error::Decode`]
/// if the bytes are not a valid image.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<ImageData> {
    let img_bytes = fs::read(path.as_ref()).map_err(|e| Error::Io(e.to_string()))?;
    decode_image(&img_bytes)
}

/// Decodes an image from in-memory bytes.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the bytes are malformed or the format is
/// unsupported.
pub fn decode_image(bytes: &[u8]) -> Result<ImageData> {
    let img = image_rs::load_from_memory(bytes).map_err(|e| Error::Decode(e.to_string()))?;
    let (width, height) = img.dimensions();

    let rgba_img = img.to_rgba8();
    let pixels = rgba_img.into_vec();

    Ok(ImageData::from_rgba(width, height, pixels))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::{Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn load_png_image_returns_expected_dimensions() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let image_path = temp_dir.path().join("sample.png");

        let image = RgbaImage::from_pixel(4, 2, Rgba([255, 0, 0, 255]));
        image
            .save(&image_path)
            .expect("failed to write temporary png");

        let data = load_image(&image_path).expect("png should load successfully");
        assert_eq!(data.width, 4);
        assert_eq!(data.height, 2);
    }

    #[test]
    fn load_missing_image_returns_io_error() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let missing_path = temp_dir.path().join("does_not_exist.png");

        match load_image(&missing_path) {
            Err(Error::Io(_)) => {}
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn decode_invalid_bytes_returns_decode_error() {
        match decode_image(b"not a png") {
            Err(Error::Decode(message)) => assert!(!message.is_empty()),
            other => panic!("expected Decode error for invalid bytes, got {other:?}"),
        }
    }

    #[test]
    fn to_dynamic_round_trips_dimensions() {
        let data = ImageData::from_rgba(3, 2, vec![7u8; 3 * 2 * 4]);
        let dynamic = data.to_dynamic().expect("should rebuild image");
        assert_eq!(dynamic.width(), 3);
        assert_eq!(dynamic.height(), 2);
    }

    #[test]
    fn supported_extensions_are_case_insensitive() {
        assert!(is_supported_extension(Path::new("photo.JPG")));
        assert!(is_supported_extension(Path::new("photo.jpeg")));
        assert!(is_supported_extension(Path::new("photo.png")));
        assert!(!is_supported_extension(Path::new("clip.mp4")));
        assert!(!is_supported_extension(Path::new("noext")));
    }
}
