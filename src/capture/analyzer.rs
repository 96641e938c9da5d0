//! Plumbing shared by the barcode and text analyzers

use image::DynamicImage;
use thiserror::Error;

use crate::buffer::{BlobStore, BlobUrl};

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("buffer {0} is no longer available")]
    MissingBuffer(BlobUrl),
    #[error("failed to decode buffer: {0}")]
    Decode(#[from] image::ImageError),
    #[error("{engine} failed: {message}")]
    Engine {
        engine: &'static str,
        message: String,
    },
    #[error("analyzer task failed: {0}")]
    Task(String),
}

/// Resolve a blob handle and decode the image behind it
pub fn load_buffer(store: &BlobStore, url: &BlobUrl) -> Result<DynamicImage, AnalyzerError> {
    let bytes = store
        .fetch(url)
        .ok_or_else(|| AnalyzerError::MissingBuffer(url.clone()))?;
    Ok(image::load_from_memory(&bytes)?)
}
