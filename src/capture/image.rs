//! Source image intake

use std::path::Path;

use image::{ImageFormat, RgbaImage};
use thiserror::Error;

use crate::domain::Dimensions;

/// MIME types offered by the file picker
pub const ACCEPTED_MIME_TYPES: [&str; 3] = ["image/png", "image/jpg", "image/jpeg"];

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("failed to read image: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("image has no pixels")]
    Empty,
    #[error("intake task failed: {0}")]
    Task(String),
}

pub fn is_accepted_mime(mime: &str) -> bool {
    ACCEPTED_MIME_TYPES.iter().any(|accepted| *accepted == mime)
}

/// MIME type implied by a path's extension, as a file picker would see it
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" => Some("image/jpg"),
        "jpeg" => Some("image/jpeg"),
        _ => ImageFormat::from_extension(&ext).map(|f| f.to_mime_type()),
    }
}

/// A decoded image with its natural and displayed sizes
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub rgba: RgbaImage,
    displayed: Dimensions,
}

impl SourceImage {
    /// Decode an image from raw file bytes. The format is sniffed from the content.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IntakeError> {
        let format = image::guess_format(bytes).ok();
        let decoded = match format {
            Some(format) => image::load_from_memory_with_format(bytes, format)?,
            None => image::load_from_memory(bytes)?,
        };
        let rgba = decoded.into_rgba8();
        if rgba.width() == 0 || rgba.height() == 0 {
            return Err(IntakeError::Empty);
        }
        log::debug!(
            "SourceImage decoded: {}x{} pixels ({:?})",
            rgba.width(),
            rgba.height(),
            format
        );
        let displayed = Dimensions::new(rgba.width(), rgba.height());
        Ok(Self { rgba, displayed })
    }

    /// Size the image is rendered at on screen
    pub fn set_displayed_size(&mut self, displayed: Dimensions) {
        self.displayed = Dimensions::new(displayed.width.max(1), displayed.height.max(1));
    }

    pub fn natural(&self) -> Dimensions {
        Dimensions::new(self.rgba.width(), self.rgba.height())
    }

    pub fn displayed(&self) -> Dimensions {
        self.displayed
    }
}
