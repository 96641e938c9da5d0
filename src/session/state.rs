use crate::buffer::{BlobStore, BufferSlot, CroppedBuffer};
use crate::capture::image::SourceImage;
use crate::domain::CropRegion;

/// Shown in the barcode field when the analyzer finds nothing
pub const BARCODE_NOT_FOUND: &str = "No barcode detected";

/// The two read-only result fields
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalysisResult {
    pub barcode_text: String,
    pub recognized_text: String,
}

impl AnalysisResult {
    pub fn clear(&mut self) {
        self.barcode_text.clear();
        self.recognized_text.clear();
    }
}

/// Loading indicator backed by a count of outstanding analyzer calls
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BusyFlag {
    pending: usize,
}

impl BusyFlag {
    /// Start a run of `calls` analyzer calls, replacing any earlier run
    pub fn start(&mut self, calls: usize) {
        self.pending = calls;
    }

    /// One call of the current run finished
    pub fn finish_one(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.pending = 0;
    }

    pub fn is_busy(&self) -> bool {
        self.pending > 0
    }

    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.pending
    }
}

/// Everything the cropper knows about the current session
#[derive(Debug)]
pub struct CropperState {
    pub source: Option<SourceImage>,
    pub crop: CropRegion,
    pub buffer: BufferSlot,
    pub result: AnalysisResult,
    pub busy: BusyFlag,
    /// Bumped on every new image and every crop confirmation
    pub generation: u64,
    /// Bumped on every file selection
    pub intake: u64,
    pub last_error: Option<String>,
}

impl CropperState {
    pub fn new(store: BlobStore) -> Self {
        Self {
            source: None,
            crop: CropRegion::default(),
            buffer: BufferSlot::new(store),
            result: AnalysisResult::default(),
            busy: BusyFlag::default(),
            generation: 0,
            intake: 0,
            last_error: None,
        }
    }

    /// Install a new source image and drop everything derived from the old one
    pub fn reset_for_image(&mut self, source: SourceImage) {
        self.source = Some(source);
        self.crop = CropRegion::default();
        self.buffer.clear();
        self.result.clear();
        self.busy.reset();
        self.last_error = None;
        self.generation += 1;
    }

    /// Start a new analysis run of `calls` analyzer calls and return its generation
    pub fn begin_run(&mut self, calls: usize) -> u64 {
        self.generation += 1;
        self.busy.start(calls);
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    pub fn cropped(&self) -> Option<&CroppedBuffer> {
        self.buffer.current()
    }
}
