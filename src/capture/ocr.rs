//! OCR (Optical Character Recognition) module using rusty-tesseract

use std::collections::HashMap;

use image::DynamicImage;

use crate::capture::analyzer::AnalyzerError;
use crate::config::OcrConfig;

/// Text recognition seam
pub trait TextRecognizer: Send + Sync {
    /// Recognize the text in `image`. The result is returned exactly as the engine produced it.
    fn recognize(&self, image: &DynamicImage, config: &OcrConfig) -> Result<String, AnalyzerError>;
}

/// Build tesseract arguments from the OCR settings
pub fn tesseract_args(config: &OcrConfig) -> rusty_tesseract::Args {
    rusty_tesseract::Args {
        lang: config.lang.clone(),
        config_variables: HashMap::new(),
        dpi: config.dpi,
        psm: config.psm,
        oem: config.oem,
    }
}

/// Upscale factor for small crops; tesseract wants text at least 10-12 pixels tall
pub fn upscale_factor(width: u32, height: u32) -> u32 {
    let min_dimension = width.min(height);
    if min_dimension < 100 {
        4
    } else if min_dimension < 200 {
        2
    } else {
        1
    }
}

/// Recognizer backed by the system tesseract binary
#[derive(Clone, Copy, Debug, Default)]
pub struct TesseractRecognizer;

impl TextRecognizer for TesseractRecognizer {
    fn recognize(&self, image: &DynamicImage, config: &OcrConfig) -> Result<String, AnalyzerError> {
        log::info!(
            "Running OCR with rusty-tesseract on {}x{} image...",
            image.width(),
            image.height()
        );

        let factor = if config.upscale_small {
            upscale_factor(image.width(), image.height())
        } else {
            1
        };
        let upscaled;
        let input = if factor > 1 {
            log::info!("Upscaling small image {}x", factor);
            upscaled = image.resize(
                image.width() * factor,
                image.height() * factor,
                image::imageops::FilterType::Lanczos3,
            );
            &upscaled
        } else {
            image
        };

        let tess_img = rusty_tesseract::Image::from_dynamic_image(input).map_err(|e| {
            AnalyzerError::Engine {
                engine: "tesseract",
                message: format!("failed to create tesseract image: {}", e),
            }
        })?;

        rusty_tesseract::image_to_string(&tess_img, &tesseract_args(config)).map_err(|e| {
            AnalyzerError::Engine {
                engine: "tesseract",
                message: e.to_string(),
            }
        })
    }
}
