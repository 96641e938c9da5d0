//! Crop pipeline: region on the displayed image to a standalone JPEG

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use thiserror::Error;

use crate::capture::image::SourceImage;
use crate::config::OutputResolution;
use crate::domain::{CropRegion, Dimensions, SampleRect, sample_rect, scale_factors};

/// Longest side a crop surface may have
pub const MAX_CANVAS_SIDE: u32 = 32_767;
/// Largest pixel count a crop surface may have
pub const MAX_CANVAS_AREA: u64 = 16_384 * 16_384;

#[derive(Debug, Error)]
pub enum CropError {
    #[error("canvas is empty")]
    EmptyCanvas,
    #[error("failed to encode crop: {0}")]
    Encode(#[from] image::ImageError),
}

/// Where to sample the source and how large to draw it
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropPlan {
    pub sample: SampleRect,
    pub output: Dimensions,
}

/// A rendered and encoded crop
#[derive(Clone, Debug)]
pub struct CroppedImage {
    pub size: Dimensions,
    pub jpeg: Vec<u8>,
}

/// Work out the sample rectangle and output size. `None` for an empty region.
pub fn plan_crop(
    source: &SourceImage,
    region: &CropRegion,
    resolution: OutputResolution,
) -> Option<CropPlan> {
    let displayed = source.displayed();
    let region = region.to_px(displayed);
    if region.is_empty() {
        return None;
    }
    let natural = source.natural();
    let sample = sample_rect(&region, natural, displayed);
    let output = match resolution {
        // Canvas sizes truncate to whole pixels
        OutputResolution::Display => Dimensions::new(region.width as u32, region.height as u32),
        OutputResolution::Natural => {
            let (scale_x, scale_y) = scale_factors(natural, displayed);
            Dimensions::new(
                (region.width * scale_x).round() as u32,
                (region.height * scale_y).round() as u32,
            )
        }
    };
    Some(CropPlan { sample, output })
}

fn within_canvas_limits(output: Dimensions) -> bool {
    output.width <= MAX_CANVAS_SIDE
        && output.height <= MAX_CANVAS_SIDE
        && u64::from(output.width) * u64::from(output.height) <= MAX_CANVAS_AREA
}

/// Draw the sampled part of the source into a surface of `plan.output` size.
///
/// A sample reaching past the image is clipped. The clipped part keeps its
/// place and scale on the surface and the rest stays transparent.
pub fn render_crop(source: &SourceImage, plan: &CropPlan) -> Result<RgbaImage, CropError> {
    let Some((out_w, out_h)) = plan.output.non_zero() else {
        return Err(CropError::EmptyCanvas);
    };
    if !within_canvas_limits(plan.output) {
        return Err(CropError::EmptyCanvas);
    }
    let (out_w, out_h) = (out_w.get(), out_h.get());
    let mut surface = RgbaImage::new(out_w, out_h);
    let Some((x, y, w, h)) = plan.sample.to_pixels(source.natural()) else {
        return Ok(surface);
    };

    // Destination of the clipped sample, in surface pixels
    let scale_x = out_w as f32 / plan.sample.width;
    let scale_y = out_h as f32 / plan.sample.height;
    let to_dest =
        |v: f32, scale: f32, limit: u32| (v * scale).round().clamp(0.0, limit as f32) as u32;
    let left = to_dest(x as f32 - plan.sample.x, scale_x, out_w);
    let top = to_dest(y as f32 - plan.sample.y, scale_y, out_h);
    let right = to_dest((x + w) as f32 - plan.sample.x, scale_x, out_w);
    let bottom = to_dest((y + h) as f32 - plan.sample.y, scale_y, out_h);
    if left >= right || top >= bottom {
        return Ok(surface);
    }
    let (dest_w, dest_h) = (right - left, bottom - top);

    let sampled = imageops::crop_imm(&source.rgba, x, y, w, h).to_image();
    let drawn = if (w, h) == (dest_w, dest_h) {
        sampled
    } else {
        imageops::resize(&sampled, dest_w, dest_h, FilterType::Triangle)
    };
    imageops::replace(&mut surface, &drawn, i64::from(left), i64::from(top));
    Ok(surface)
}

/// Encode as baseline JPEG. Alpha is dropped.
pub fn encode_jpeg(img: &RgbaImage, quality: u8) -> Result<Vec<u8>, CropError> {
    let rgb = DynamicImage::ImageRgba8(img.clone()).into_rgb8();
    let mut jpeg = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100));
    encoder.encode_image(&rgb)?;
    Ok(jpeg)
}

/// Full extraction. `Ok(None)` when the region is empty and nothing should happen.
pub fn extract(
    source: &SourceImage,
    region: &CropRegion,
    resolution: OutputResolution,
    quality: u8,
) -> Result<Option<CroppedImage>, CropError> {
    let Some(plan) = plan_crop(source, region, resolution) else {
        return Ok(None);
    };
    let surface = render_crop(source, &plan)?;
    let jpeg = encode_jpeg(&surface, quality)?;
    log::info!(
        "Cropped {:.0}x{:.0}@({:.0},{:.0}) to {}x{} JPEG ({} bytes)",
        plan.sample.width,
        plan.sample.height,
        plan.sample.x,
        plan.sample.y,
        plan.output.width,
        plan.output.height,
        jpeg.len()
    );
    Ok(Some(CroppedImage {
        size: plan.output,
        jpeg,
    }))
}
