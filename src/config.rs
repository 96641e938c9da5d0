//! Configuration persistence for cropscan settings

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Barcode symbology the decoder profile is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    /// 1D Code 128 labels
    #[default]
    Code128,
    QrCode,
}

impl Symbology {
    pub fn name(self) -> &'static str {
        match self {
            Symbology::Code128 => "Code 128",
            Symbology::QrCode => "QR Code",
        }
    }
}

/// Locator patch size; controls the resolution of the coarse locating pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatchSize {
    XSmall,
    Small,
    #[default]
    Medium,
    Large,
    XLarge,
}

impl PatchSize {
    /// Longest edge the image is downsampled to for the coarse pass.
    /// Smaller patches look for smaller codes, so they keep more pixels.
    pub fn max_dimension(self) -> u32 {
        match self {
            PatchSize::XSmall => 2000,
            PatchSize::Small => 1500,
            PatchSize::Medium => 1000,
            PatchSize::Large => 640,
            PatchSize::XLarge => 400,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub patch_size: PatchSize,
    /// Halve the image before locating
    pub half_sample: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarcodeConfig {
    pub symbology: Symbology,
    /// Upper bound on detection passes run in parallel. There are at most two
    /// passes (coarse and full resolution), so any value above 2 acts like 2.
    pub workers: usize,
    /// Run the coarse locating pass before the full-resolution one
    pub locate: bool,
    pub locator: LocatorConfig,
}

impl Default for BarcodeConfig {
    fn default() -> Self {
        Self {
            symbology: Symbology::Code128,
            workers: 8,
            locate: true,
            locator: LocatorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Tesseract language code
    pub lang: String,
    pub dpi: Option<i32>,
    /// Page segmentation mode
    pub psm: Option<i32>,
    /// OCR engine mode
    pub oem: Option<i32>,
    /// Upscale small crops before recognition
    pub upscale_small: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            lang: "eng".to_string(),
            dpi: None,
            psm: None,
            oem: None,
            upscale_small: false,
        }
    }
}

/// Pixel size of the cropped output buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputResolution {
    /// Region size in displayed units; high-resolution sources are downsampled
    #[default]
    Display,
    /// Region size in natural image pixels
    Natural,
}

/// Whether failures are also reported through the notifier. Covers a barcode
/// that was not found and a crop that could not be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPolicy {
    /// Only update the barcode field and the last error
    #[default]
    Silent,
    /// Update them and alert the user
    Alert,
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropScanConfig {
    pub barcode: BarcodeConfig,
    pub ocr: OcrConfig,
    pub output_resolution: OutputResolution,
    /// JPEG quality of the cropped buffer (1-100)
    pub jpeg_quality: u8,
    #[serde(alias = "not_found_policy")]
    pub alert_policy: AlertPolicy,
}

impl Default for CropScanConfig {
    fn default() -> Self {
        Self {
            barcode: BarcodeConfig::default(),
            ocr: OcrConfig::default(),
            output_resolution: OutputResolution::Display,
            jpeg_quality: 92,
            alert_policy: AlertPolicy::Silent,
        }
    }
}

impl CropScanConfig {
    /// Directory name under the user config dir
    pub const ID: &'static str = "cropscan";

    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from the default location, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from `path`, or return defaults if unavailable
    pub fn load_from(path: &Path) -> Self {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(err) => {
                log::warn!("Could not read config {}: {}", path.display(), err);
                return Self::default();
            }
        };
        match serde_json::from_str::<Self>(&contents) {
            Ok(config) => config.sanitized(),
            Err(err) => {
                log::warn!("Error loading config, using defaults: {}", err);
                Self::default()
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            log::error!("Could not determine config directory for saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serializing config")?;
        std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn sanitized(mut self) -> Self {
        self.jpeg_quality = self.jpeg_quality.clamp(1, 100);
        self.barcode.workers = self.barcode.workers.max(1);
        self
    }
}
