//! Geometric types for crop regions and image coordinates

use std::num::NonZeroU32;

/// Pixel dimensions of an image or surface
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Convert to non-zero dimensions, `None` if either side is zero
    pub fn non_zero(self) -> Option<(NonZeroU32, NonZeroU32)> {
        Some((NonZeroU32::new(self.width)?, NonZeroU32::new(self.height)?))
    }

    /// Largest size with the same aspect ratio that fits inside `bounds`, never upscaled
    pub fn fit_within(self, bounds: Dimensions) -> Dimensions {
        if self.width == 0 || self.height == 0 {
            return self;
        }
        let scale_x = bounds.width as f32 / self.width as f32;
        let scale_y = bounds.height as f32 / self.height as f32;
        let scale = scale_x.min(scale_y).min(1.0);
        Dimensions {
            width: ((self.width as f32 * scale).round() as u32).max(1),
            height: ((self.height as f32 * scale).round() as u32).max(1),
        }
    }
}

/// Unit a crop region is expressed in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CropUnit {
    /// Displayed pixels
    #[default]
    Px,
    /// Percent of the displayed size
    Percent,
}

/// Rectangle selected by the user, in displayed-image coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropRegion {
    pub unit: CropUnit,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for CropRegion {
    /// Half of the image, anchored at the top-left corner
    fn default() -> Self {
        Self::percent(0.0, 0.0, 50.0, 50.0)
    }
}

impl CropRegion {
    pub fn px(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            unit: CropUnit::Px,
            x,
            y,
            width,
            height,
        }
    }

    pub fn percent(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            unit: CropUnit::Percent,
            x,
            y,
            width,
            height,
        }
    }

    /// Whether the region has no usable area. NaN or infinite values count as empty.
    pub fn is_empty(&self) -> bool {
        let finite = [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite());
        !(finite && self.width > 0.0 && self.height > 0.0)
    }

    /// Express the region in displayed pixels
    pub fn to_px(&self, displayed: Dimensions) -> CropRegion {
        match self.unit {
            CropUnit::Px => *self,
            CropUnit::Percent => {
                let dw = displayed.width as f32 / 100.0;
                let dh = displayed.height as f32 / 100.0;
                CropRegion::px(self.x * dw, self.y * dh, self.width * dw, self.height * dh)
            }
        }
    }
}

/// Source rectangle sampled from the natural-resolution image
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SampleRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SampleRect {
    /// Snap to whole pixels inside `bounds`. `None` if nothing is left.
    pub fn to_pixels(&self, bounds: Dimensions) -> Option<(u32, u32, u32, u32)> {
        let left = self.x.max(0.0).floor().min(bounds.width as f32) as u32;
        let top = self.y.max(0.0).floor().min(bounds.height as f32) as u32;
        let right = (self.x + self.width).ceil().clamp(0.0, bounds.width as f32) as u32;
        let bottom = (self.y + self.height).ceil().clamp(0.0, bounds.height as f32) as u32;
        if left < right && top < bottom {
            Some((left, top, right - left, bottom - top))
        } else {
            None
        }
    }
}

/// Ratio between natural and displayed size on each axis
pub fn scale_factors(natural: Dimensions, displayed: Dimensions) -> (f32, f32) {
    let scale_x = natural.width as f32 / displayed.width.max(1) as f32;
    let scale_y = natural.height as f32 / displayed.height.max(1) as f32;
    (scale_x, scale_y)
}

/// Map a pixel region on the displayed image to the natural-resolution sample rectangle
pub fn sample_rect(region: &CropRegion, natural: Dimensions, displayed: Dimensions) -> SampleRect {
    let region = region.to_px(displayed);
    let (scale_x, scale_y) = scale_factors(natural, displayed);
    SampleRect {
        x: region.x * scale_x,
        y: region.y * scale_y,
        width: region.width * scale_x,
        height: region.height * scale_y,
    }
}
