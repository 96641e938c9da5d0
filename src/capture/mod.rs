//! Image intake, cropping and analysis
//!
//! This module consolidates:
//! - Source image intake (image.rs)
//! - Crop pipeline (crop.rs)
//! - Shared analyzer plumbing (analyzer.rs)
//! - Barcode decoding (barcode.rs)
//! - OCR text recognition (ocr.rs)

pub mod analyzer;
pub mod barcode;
pub mod crop;
pub mod image;
pub mod ocr;
