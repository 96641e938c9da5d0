//! Message types for the cropper session

use std::path::PathBuf;

use crate::capture::analyzer::AnalyzerError;
use crate::capture::image::{IntakeError, SourceImage};
use crate::domain::{CropRegion, Dimensions};

/// Everything that can happen to a session.
///
/// Completions of background work carry the generation they were started in.
#[derive(Debug)]
pub enum Msg {
    /// A file was picked
    FileSelected(PathBuf),
    /// The picked file finished reading and decoding
    ImageLoaded {
        generation: u64,
        outcome: Result<Box<SourceImage>, IntakeError>,
    },
    /// The view laid the image out at this size
    ImageDisplayed(Dimensions),
    /// The region changed during a drag
    CropChanged(CropRegion),
    /// The drag gesture finished
    CropComplete(CropRegion),
    BarcodeDecoded {
        generation: u64,
        outcome: Result<Option<String>, AnalyzerError>,
    },
    TextRecognized {
        generation: u64,
        outcome: Result<String, AnalyzerError>,
    },
}
