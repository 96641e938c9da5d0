//! Barcode decoding: rxing for Code 128 labels, rqrr for QR codes

use image::{DynamicImage, GrayImage};
use rxing::BarcodeFormat;

use crate::capture::analyzer::AnalyzerError;
use crate::config::{BarcodeConfig, Symbology};

/// Barcode analyzer seam
pub trait BarcodeDecoder: Send + Sync {
    /// Decode the first barcode found in `image`, `Ok(None)` if there is none
    fn decode(
        &self,
        image: &DynamicImage,
        config: &BarcodeConfig,
    ) -> Result<Option<String>, AnalyzerError>;
}

fn engine_name(symbology: Symbology) -> &'static str {
    match symbology {
        Symbology::Code128 => "rxing",
        Symbology::QrCode => "rqrr",
    }
}

/// Detect codes of `symbology` in a grayscale image at a specific resolution
/// max_dim: maximum dimension to downsample to (0 = no downsampling)
pub fn detect_codes_at_resolution(
    gray: &GrayImage,
    max_dim: u32,
    symbology: Symbology,
) -> Vec<String> {
    let (orig_w, orig_h) = (gray.width(), gray.height());
    let downsample_factor = if max_dim > 0 && (orig_w > max_dim || orig_h > max_dim) {
        orig_w.max(orig_h) as f32 / max_dim as f32
    } else {
        1.0
    };

    let prepared_input = if downsample_factor > 1.0 {
        let new_w = ((orig_w as f32 / downsample_factor) as u32).max(1);
        let new_h = ((orig_h as f32 / downsample_factor) as u32).max(1);
        image::imageops::resize(gray, new_w, new_h, image::imageops::FilterType::Nearest)
    } else {
        gray.clone()
    };

    match symbology {
        Symbology::Code128 => detect_linear(prepared_input, BarcodeFormat::CODE_128),
        Symbology::QrCode => detect_qr(prepared_input),
    }
}

fn detect_linear(gray: GrayImage, format: BarcodeFormat) -> Vec<String> {
    let (width, height) = gray.dimensions();
    match rxing::helpers::detect_in_luma(gray.into_raw(), width, height, Some(format)) {
        Ok(result) => vec![result.getText().to_string()],
        Err(err) => {
            log::debug!("No linear code in {}x{}: {:?}", width, height, err);
            Vec::new()
        }
    }
}

fn detect_qr(gray: GrayImage) -> Vec<String> {
    let mut prepared = rqrr::PreparedImage::prepare(gray);
    prepared
        .detect_grids()
        .into_iter()
        .filter_map(|grid| match grid.decode() {
            Ok((_, content)) => Some(content),
            Err(err) => {
                log::debug!("Grid located but not decodable: {}", err);
                None
            }
        })
        .collect()
}

/// Detection passes for a locator configuration, coarse first
pub fn detection_passes(config: &BarcodeConfig) -> Vec<u32> {
    if config.locate {
        vec![config.locator.patch_size.max_dimension(), 0]
    } else {
        vec![0]
    }
}

/// Decoder for the configured symbology
#[derive(Clone, Copy, Debug, Default)]
pub struct LabelDecoder;

impl BarcodeDecoder for LabelDecoder {
    fn decode(
        &self,
        image: &DynamicImage,
        config: &BarcodeConfig,
    ) -> Result<Option<String>, AnalyzerError> {
        let mut gray = image.to_luma8();
        if config.locator.half_sample && gray.width() > 1 && gray.height() > 1 {
            gray = image::imageops::resize(
                &gray,
                gray.width() / 2,
                gray.height() / 2,
                image::imageops::FilterType::Triangle,
            );
        }

        let symbology = config.symbology;
        let passes = detection_passes(config);
        let workers = config.workers.max(1);
        log::debug!(
            "Decoding {} in {}x{} with passes {:?} ({} workers)",
            symbology.name(),
            gray.width(),
            gray.height(),
            passes,
            workers
        );

        // Passes in a chunk run side by side; the earliest pass with a hit wins
        for chunk in passes.chunks(workers) {
            let found = std::thread::scope(|scope| {
                let handles: Vec<_> = chunk
                    .iter()
                    .map(|&max_dim| {
                        let gray = &gray;
                        scope.spawn(move || detect_codes_at_resolution(gray, max_dim, symbology))
                    })
                    .collect();
                handles
                    .into_iter()
                    .map(|handle| handle.join())
                    .collect::<Vec<_>>()
            });
            for pass in found {
                let codes = pass.map_err(|_| AnalyzerError::Engine {
                    engine: engine_name(symbology),
                    message: "detection pass panicked".to_string(),
                })?;
                if let Some(code) = codes.into_iter().next() {
                    log::info!("{} found: {}", symbology.name(), code);
                    return Ok(Some(code));
                }
            }
        }
        Ok(None)
    }
}
