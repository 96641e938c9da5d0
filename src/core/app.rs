//! The cropper application: session state plus the update loop driving it

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::buffer::{BlobStore, BlobUrl};
use crate::capture::analyzer::{AnalyzerError, load_buffer};
use crate::capture::crop;
use crate::capture::image::{IntakeError, SourceImage};
use crate::capture::ocr::{TesseractRecognizer, TextRecognizer};
use crate::capture::barcode::{BarcodeDecoder, LabelDecoder};
use crate::config::{AlertPolicy, CropScanConfig};
use crate::domain::{CropRegion, Dimensions};
use crate::session::messages::Msg;
use crate::session::state::{BARCODE_NOT_FOUND, CropperState};

/// Alert text when no barcode was found
pub const NOT_FOUND_ALERT: &str = "No barcode detected, please try again later!";

/// Surfaces alerts to the user
pub trait Notifier: Send + Sync {
    fn alert(&self, message: &str);
}

/// Notifier that writes alerts to the log
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn alert(&self, message: &str) {
        log::warn!("{}", message);
    }
}

/// The two external analyzers
#[derive(Clone)]
pub struct Analyzers {
    pub barcode: Arc<dyn BarcodeDecoder>,
    pub text: Arc<dyn TextRecognizer>,
}

impl Default for Analyzers {
    fn default() -> Self {
        Self {
            barcode: Arc::new(LabelDecoder),
            text: Arc::new(TesseractRecognizer),
        }
    }
}

/// What the user sees
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct View {
    pub barcode_text: String,
    pub recognized_text: String,
    /// Loading indicator
    pub busy: bool,
    pub cropped_url: Option<BlobUrl>,
    pub cropped_size: Option<Dimensions>,
    pub last_error: Option<String>,
}

pub struct App {
    config: CropScanConfig,
    store: BlobStore,
    state: CropperState,
    analyzers: Analyzers,
    notifier: Arc<dyn Notifier>,
    tx: mpsc::UnboundedSender<Msg>,
    rx: mpsc::UnboundedReceiver<Msg>,
    /// Background tasks whose completion message has not been handled yet
    in_flight: usize,
}

impl App {
    pub fn new(config: CropScanConfig, analyzers: Analyzers, notifier: Arc<dyn Notifier>) -> Self {
        let store = BlobStore::new();
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            config,
            state: CropperState::new(store.clone()),
            store,
            analyzers,
            notifier,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &CropperState {
        &self.state
    }

    pub fn store(&self) -> &BlobStore {
        &self.store
    }

    pub fn has_pending_work(&self) -> bool {
        self.in_flight > 0
    }

    pub fn view(&self) -> View {
        let cropped = self.state.cropped();
        View {
            barcode_text: self.state.result.barcode_text.clone(),
            recognized_text: self.state.result.recognized_text.clone(),
            busy: self.state.busy.is_busy(),
            cropped_url: cropped.map(|b| b.url.clone()),
            cropped_size: cropped.map(|b| b.size),
            last_error: self.state.last_error.clone(),
        }
    }

    /// Handle messages until no background task is outstanding
    pub async fn run_until_idle(&mut self) {
        while self.has_pending_work() {
            match self.rx.recv().await {
                Some(msg) => self.update(msg),
                None => break,
            }
        }
    }

    pub fn update(&mut self, msg: Msg) {
        match msg {
            Msg::FileSelected(path) => self.select_file(path),
            Msg::ImageLoaded {
                generation,
                outcome,
            } => {
                self.task_done();
                self.image_loaded(generation, outcome);
            }
            Msg::ImageDisplayed(displayed) => match self.state.source.as_mut() {
                Some(source) => {
                    log::debug!("Image displayed at {}x{}", displayed.width, displayed.height);
                    source.set_displayed_size(displayed);
                }
                None => log::debug!("Ignoring display size without an image"),
            },
            Msg::CropChanged(region) => self.state.crop = region,
            Msg::CropComplete(region) => {
                self.state.crop = region;
                self.make_crop(region);
            }
            Msg::BarcodeDecoded {
                generation,
                outcome,
            } => {
                self.task_done();
                self.barcode_decoded(generation, outcome);
            }
            Msg::TextRecognized {
                generation,
                outcome,
            } => {
                self.task_done();
                self.text_recognized(generation, outcome);
            }
        }
    }

    fn spawn<F>(&mut self, task: F)
    where
        F: Future<Output = Msg> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let msg = task.await;
            if tx.send(msg).is_err() {
                log::debug!("App gone before task completed");
            }
        });
    }

    fn task_done(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    fn select_file(&mut self, path: PathBuf) {
        self.state.intake += 1;
        let intake = self.state.intake;
        log::info!("Loading {}", path.display());
        self.spawn(async move {
            let outcome = match tokio::fs::read(&path).await {
                Ok(bytes) => tokio::task::spawn_blocking(move || {
                    SourceImage::from_bytes(&bytes).map(Box::new)
                })
                .await
                .unwrap_or_else(|err| Err(IntakeError::Task(err.to_string()))),
                Err(err) => Err(IntakeError::Read(err)),
            };
            Msg::ImageLoaded {
                generation: intake,
                outcome,
            }
        });
    }

    fn image_loaded(&mut self, intake: u64, outcome: Result<Box<SourceImage>, IntakeError>) {
        if intake != self.state.intake {
            log::debug!("Dropping image from superseded selection {}", intake);
            return;
        }
        match outcome {
            Ok(source) => {
                let natural = source.natural();
                log::info!("Image loaded: {}x{}", natural.width, natural.height);
                self.state.reset_for_image(*source);
            }
            Err(err) => {
                log::error!("Failed to load image: {}", err);
                self.state.last_error = Some(err.to_string());
            }
        }
    }

    fn make_crop(&mut self, region: CropRegion) {
        let Some(source) = self.state.source.as_ref() else {
            log::debug!("Crop completed without an image");
            return;
        };
        let cropped = match crop::extract(
            source,
            &region,
            self.config.output_resolution,
            self.config.jpeg_quality,
        ) {
            Ok(Some(cropped)) => cropped,
            Ok(None) => {
                log::debug!("Ignoring empty crop region {:?}", region);
                return;
            }
            Err(err) => {
                log::error!("Crop failed: {}", err);
                self.state.last_error = Some(err.to_string());
                if self.config.alert_policy == AlertPolicy::Alert {
                    self.notifier.alert(&format!("Could not crop the image: {}", err));
                }
                return;
            }
        };

        let buffer = self.state.buffer.replace(cropped.jpeg, cropped.size);
        let generation = self.state.begin_run(2);
        self.spawn_barcode(generation, buffer.url.clone());
        self.spawn_text(generation, buffer.url);
    }

    fn spawn_barcode(&mut self, generation: u64, url: BlobUrl) {
        let store = self.store.clone();
        let decoder = Arc::clone(&self.analyzers.barcode);
        let config = self.config.barcode.clone();
        self.spawn(async move {
            let outcome = tokio::task::spawn_blocking(move || {
                let image = load_buffer(&store, &url)?;
                decoder.decode(&image, &config)
            })
            .await
            .unwrap_or_else(|err| Err(AnalyzerError::Task(err.to_string())));
            Msg::BarcodeDecoded {
                generation,
                outcome,
            }
        });
    }

    fn spawn_text(&mut self, generation: u64, url: BlobUrl) {
        let store = self.store.clone();
        let recognizer = Arc::clone(&self.analyzers.text);
        let config = self.config.ocr.clone();
        self.spawn(async move {
            let outcome = tokio::task::spawn_blocking(move || {
                let image = load_buffer(&store, &url)?;
                recognizer.recognize(&image, &config)
            })
            .await
            .unwrap_or_else(|err| Err(AnalyzerError::Task(err.to_string())));
            Msg::TextRecognized {
                generation,
                outcome,
            }
        });
    }

    fn barcode_decoded(&mut self, generation: u64, outcome: Result<Option<String>, AnalyzerError>) {
        if !self.state.is_current(generation) {
            log::debug!("Dropping barcode result from superseded run {}", generation);
            return;
        }
        self.state.busy.finish_one();
        match outcome {
            Ok(Some(code)) => {
                log::info!("Barcode decoded: {}", code);
                self.state.result.barcode_text = code;
            }
            Ok(None) => self.barcode_not_found(),
            Err(err) => {
                log::error!("Barcode analyzer failed: {}", err);
                self.state.last_error = Some(err.to_string());
                self.barcode_not_found();
            }
        }
    }

    fn barcode_not_found(&mut self) {
        self.state.result.barcode_text = BARCODE_NOT_FOUND.to_string();
        if self.config.alert_policy == AlertPolicy::Alert {
            self.notifier.alert(NOT_FOUND_ALERT);
        }
    }

    fn text_recognized(&mut self, generation: u64, outcome: Result<String, AnalyzerError>) {
        if !self.state.is_current(generation) {
            log::debug!("Dropping OCR result from superseded run {}", generation);
            return;
        }
        self.state.busy.finish_one();
        match outcome {
            Ok(text) => {
                log::info!("Recognized {} characters", text.chars().count());
                self.state.result.recognized_text = text;
            }
            Err(err) => {
                log::error!("Text recognition failed: {}", err);
                self.state.last_error = Some(err.to_string());
                self.state.result.recognized_text.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OutputResolution;
    use image::DynamicImage;
    use parking_lot::Mutex;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeBarcode {
        calls: AtomicUsize,
        seen: Mutex<Vec<(u32, u32)>>,
        answer: Mutex<Option<String>>,
        fail: bool,
    }

    impl BarcodeDecoder for FakeBarcode {
        fn decode(
            &self,
            image: &DynamicImage,
            _config: &crate::config::BarcodeConfig,
        ) -> Result<Option<String>, AnalyzerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().push((image.width(), image.height()));
            if self.fail {
                return Err(AnalyzerError::Engine {
                    engine: "fake",
                    message: "broken".to_string(),
                });
            }
            Ok(self.answer.lock().clone())
        }
    }

    #[derive(Default)]
    struct FakeText {
        calls: AtomicUsize,
        answer: String,
        fail: bool,
    }

    impl TextRecognizer for FakeText {
        fn recognize(
            &self,
            _image: &DynamicImage,
            _config: &crate::config::OcrConfig,
        ) -> Result<String, AnalyzerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AnalyzerError::Engine {
                    engine: "fake",
                    message: "no tessdata".to_string(),
                });
            }
            Ok(self.answer.clone())
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        alerts: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn alert(&self, message: &str) {
            self.alerts.lock().push(message.to_string());
        }
    }

    struct Harness {
        app: App,
        barcode: Arc<FakeBarcode>,
        text: Arc<FakeText>,
        notifier: Arc<RecordingNotifier>,
        dir: tempfile::TempDir,
    }

    fn harness(config: CropScanConfig, barcode: FakeBarcode, text: FakeText) -> Harness {
        let barcode = Arc::new(barcode);
        let text = Arc::new(text);
        let notifier = Arc::new(RecordingNotifier::default());
        let analyzers = Analyzers {
            barcode: barcode.clone(),
            text: text.clone(),
        };
        Harness {
            app: App::new(config, analyzers, notifier.clone()),
            barcode,
            text,
            notifier,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn write_jpeg(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbImage::from_pixel(width, height, image::Rgb([200, 200, 200]))
            .save(&path)
            .unwrap();
        path
    }

    impl Harness {
        async fn load(&mut self, name: &str, width: u32, height: u32) {
            let path = write_jpeg(self.dir.path(), name, width, height);
            self.app.update(Msg::FileSelected(path));
            self.app.run_until_idle().await;
            assert!(self.app.state().source.is_some());
        }

        async fn crop(&mut self, region: CropRegion) -> View {
            self.app.update(Msg::CropChanged(region));
            self.app.update(Msg::CropComplete(region));
            self.app.run_until_idle().await;
            self.app.view()
        }
    }

    #[tokio::test]
    async fn test_full_image_crop_runs_both_analyzers_once() {
        let barcode = FakeBarcode::default();
        *barcode.answer.lock() = Some("4006381333931".to_string());
        let text = FakeText {
            answer: "Hello".to_string(),
            ..Default::default()
        };
        let mut h = harness(CropScanConfig::default(), barcode, text);
        h.load("photo.jpeg", 400, 300).await;

        let view = h.crop(CropRegion::px(0.0, 0.0, 400.0, 300.0)).await;

        assert_eq!(view.cropped_size, Some(Dimensions::new(400, 300)));
        assert!(view.cropped_url.is_some());
        assert_eq!(h.app.store().live_count(), 1);
        assert_eq!(h.barcode.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.text.calls.load(Ordering::SeqCst), 1);
        assert_eq!(*h.barcode.seen.lock(), vec![(400, 300)]);
        assert_eq!(view.barcode_text, "4006381333931");
        assert_eq!(view.recognized_text, "Hello");
        assert!(!view.busy);
        assert!(view.last_error.is_none());
    }

    #[tokio::test]
    async fn test_zero_width_crop_does_nothing() {
        let mut h = harness(
            CropScanConfig::default(),
            FakeBarcode::default(),
            FakeText::default(),
        );
        h.load("photo.jpeg", 400, 300).await;

        h.app.update(Msg::CropComplete(CropRegion::px(10.0, 10.0, 0.0, 50.0)));

        assert!(!h.app.has_pending_work());
        let view = h.app.view();
        assert!(!view.busy);
        assert!(view.cropped_url.is_none());
        assert_eq!(h.app.store().live_count(), 0);
        assert_eq!(h.barcode.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.text.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_crop_without_image_does_nothing() {
        let mut h = harness(
            CropScanConfig::default(),
            FakeBarcode::default(),
            FakeText::default(),
        );
        h.app.update(Msg::CropComplete(CropRegion::px(0.0, 0.0, 10.0, 10.0)));
        assert!(!h.app.has_pending_work());
        assert_eq!(h.app.store().live_count(), 0);
    }

    #[tokio::test]
    async fn test_second_crop_revokes_first_handle() {
        let mut h = harness(
            CropScanConfig::default(),
            FakeBarcode::default(),
            FakeText::default(),
        );
        h.load("photo.jpeg", 400, 300).await;

        h.app.update(Msg::CropComplete(CropRegion::px(0.0, 0.0, 100.0, 100.0)));
        let first = h.app.view().cropped_url.unwrap();
        h.app.update(Msg::CropComplete(CropRegion::px(50.0, 50.0, 100.0, 80.0)));
        let second = h.app.view().cropped_url.unwrap();

        assert_ne!(first, second);
        assert!(!h.app.store().is_live(&first));
        assert!(h.app.store().is_live(&second));
        assert_eq!(h.app.store().live_count(), 1);

        h.app.run_until_idle().await;
        let view = h.app.view();
        assert!(!view.busy);
        assert_eq!(view.cropped_size, Some(Dimensions::new(100, 80)));
        assert_eq!(h.app.store().live_count(), 1);
    }

    #[tokio::test]
    async fn test_busy_until_both_analyzers_finish() {
        let mut h = harness(
            CropScanConfig::default(),
            FakeBarcode::default(),
            FakeText::default(),
        );
        h.load("photo.jpeg", 400, 300).await;

        h.app.update(Msg::CropComplete(CropRegion::px(0.0, 0.0, 40.0, 40.0)));
        assert!(h.app.view().busy);
        assert_eq!(h.app.state().busy.pending(), 2);

        h.app.run_until_idle().await;
        assert!(!h.app.view().busy);
    }

    #[tokio::test]
    async fn test_not_found_replaces_previous_code() {
        let barcode = FakeBarcode::default();
        *barcode.answer.lock() = Some("ABC-123".to_string());
        let mut h = harness(CropScanConfig::default(), barcode, FakeText::default());
        h.load("photo.jpeg", 400, 300).await;

        let view = h.crop(CropRegion::px(0.0, 0.0, 100.0, 100.0)).await;
        assert_eq!(view.barcode_text, "ABC-123");

        *h.barcode.answer.lock() = None;
        let view = h.crop(CropRegion::px(10.0, 10.0, 100.0, 100.0)).await;
        assert_eq!(view.barcode_text, BARCODE_NOT_FOUND);
        assert!(h.notifier.alerts.lock().is_empty());
    }

    #[tokio::test]
    async fn test_alert_policy_notifies_on_not_found() {
        let config = CropScanConfig {
            alert_policy: AlertPolicy::Alert,
            ..Default::default()
        };
        let mut h = harness(config, FakeBarcode::default(), FakeText::default());
        h.load("photo.jpeg", 400, 300).await;

        let view = h.crop(CropRegion::px(0.0, 0.0, 100.0, 100.0)).await;
        assert_eq!(view.barcode_text, BARCODE_NOT_FOUND);
        assert_eq!(*h.notifier.alerts.lock(), vec![NOT_FOUND_ALERT.to_string()]);
    }

    #[tokio::test]
    async fn test_barcode_error_reads_as_not_found() {
        let barcode = FakeBarcode {
            fail: true,
            ..Default::default()
        };
        let mut h = harness(CropScanConfig::default(), barcode, FakeText::default());
        h.load("photo.jpeg", 400, 300).await;

        let view = h.crop(CropRegion::px(0.0, 0.0, 100.0, 100.0)).await;
        assert_eq!(view.barcode_text, BARCODE_NOT_FOUND);
        assert!(view.last_error.unwrap().contains("broken"));
        assert!(!view.busy);
    }

    #[tokio::test]
    async fn test_recognized_text_is_verbatim() {
        let text = FakeText {
            answer: "  Lot 42\nBest before 2026-10-16 \n\n".to_string(),
            ..Default::default()
        };
        let mut h = harness(CropScanConfig::default(), FakeBarcode::default(), text);
        h.load("photo.jpeg", 400, 300).await;

        let view = h.crop(CropRegion::px(0.0, 0.0, 100.0, 100.0)).await;
        assert_eq!(view.recognized_text, "  Lot 42\nBest before 2026-10-16 \n\n");
    }

    #[tokio::test]
    async fn test_ocr_failure_clears_busy() {
        let text = FakeText {
            fail: true,
            ..Default::default()
        };
        let mut h = harness(CropScanConfig::default(), FakeBarcode::default(), text);
        h.load("photo.jpeg", 400, 300).await;

        let view = h.crop(CropRegion::px(0.0, 0.0, 100.0, 100.0)).await;
        assert!(!view.busy);
        assert_eq!(view.recognized_text, "");
        assert!(view.last_error.unwrap().contains("no tessdata"));
    }

    #[tokio::test]
    async fn test_new_image_resets_session() {
        let barcode = FakeBarcode::default();
        *barcode.answer.lock() = Some("first".to_string());
        let text = FakeText {
            answer: "words".to_string(),
            ..Default::default()
        };
        let mut h = harness(CropScanConfig::default(), barcode, text);
        h.load("first.jpeg", 400, 300).await;
        h.crop(CropRegion::px(0.0, 0.0, 100.0, 100.0)).await;
        assert_eq!(h.app.store().live_count(), 1);

        h.load("second.png", 200, 100).await;

        let view = h.app.view();
        assert_eq!(view.barcode_text, "");
        assert_eq!(view.recognized_text, "");
        assert!(view.cropped_url.is_none());
        assert_eq!(h.app.store().live_count(), 0);
        assert_eq!(h.app.state().crop, CropRegion::default());
    }

    #[tokio::test]
    async fn test_results_of_superseded_image_are_dropped() {
        let barcode = FakeBarcode::default();
        *barcode.answer.lock() = Some("stale".to_string());
        let mut h = harness(CropScanConfig::default(), barcode, FakeText::default());
        h.load("first.jpeg", 400, 300).await;

        h.app.update(Msg::CropComplete(CropRegion::px(0.0, 0.0, 100.0, 100.0)));
        let path = write_jpeg(h.dir.path(), "second.jpeg", 64, 64);
        h.app.update(Msg::FileSelected(path));
        h.app.run_until_idle().await;

        let view = h.app.view();
        assert_eq!(view.barcode_text, "");
        assert!(!view.busy);
        assert_eq!(
            h.app.state().source.as_ref().map(|s| s.natural()),
            Some(Dimensions::new(64, 64))
        );
    }

    #[tokio::test]
    async fn test_missing_file_keeps_previous_image() {
        let mut h = harness(
            CropScanConfig::default(),
            FakeBarcode::default(),
            FakeText::default(),
        );
        h.load("photo.jpeg", 400, 300).await;

        h.app
            .update(Msg::FileSelected(h.dir.path().join("missing.jpeg")));
        h.app.run_until_idle().await;

        assert!(h.app.view().last_error.is_some());
        assert_eq!(
            h.app.state().source.as_ref().map(|s| s.natural()),
            Some(Dimensions::new(400, 300))
        );
    }

    #[tokio::test]
    async fn test_downscaled_display_crops_at_display_size() {
        let mut h = harness(
            CropScanConfig::default(),
            FakeBarcode::default(),
            FakeText::default(),
        );
        h.load("photo.jpeg", 400, 300).await;
        h.app.update(Msg::ImageDisplayed(Dimensions::new(200, 150)));

        let view = h.crop(CropRegion::px(0.0, 0.0, 200.0, 150.0)).await;
        assert_eq!(view.cropped_size, Some(Dimensions::new(200, 150)));
        assert_eq!(*h.barcode.seen.lock(), vec![(200, 150)]);
    }

    #[tokio::test]
    async fn test_natural_resolution_output() {
        let config = CropScanConfig {
            output_resolution: OutputResolution::Natural,
            ..Default::default()
        };
        let mut h = harness(config, FakeBarcode::default(), FakeText::default());
        h.load("photo.jpeg", 400, 300).await;
        h.app.update(Msg::ImageDisplayed(Dimensions::new(200, 150)));

        let view = h.crop(CropRegion::px(0.0, 0.0, 200.0, 150.0)).await;
        assert_eq!(view.cropped_size, Some(Dimensions::new(400, 300)));
        assert_eq!(*h.barcode.seen.lock(), vec![(400, 300)]);
    }

    #[tokio::test]
    async fn test_oversized_crop_fails_without_crashing() {
        let config = CropScanConfig {
            alert_policy: AlertPolicy::Alert,
            ..Default::default()
        };
        let mut h = harness(config, FakeBarcode::default(), FakeText::default());
        h.load("photo.jpeg", 40, 30).await;

        let view = h.crop(CropRegion::px(0.0, 0.0, 1e9, 1e9)).await;
        assert!(view.cropped_url.is_none());
        assert_eq!(view.last_error.as_deref(), Some("canvas is empty"));
        assert!(!view.busy);
        assert_eq!(h.barcode.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.text.calls.load(Ordering::SeqCst), 0);
        let alerts = h.notifier.alerts.lock();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].starts_with("Could not crop the image"));
    }

    #[tokio::test]
    async fn test_infinite_crop_does_nothing() {
        let mut h = harness(
            CropScanConfig::default(),
            FakeBarcode::default(),
            FakeText::default(),
        );
        h.load("photo.jpeg", 40, 30).await;

        let view = h.crop(CropRegion::px(0.0, 0.0, f32::INFINITY, 10.0)).await;
        assert!(view.cropped_url.is_none());
        assert!(view.last_error.is_none());
        assert_eq!(h.app.store().live_count(), 0);
        assert_eq!(h.barcode.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_silent_policy_crop_failure_only_records_error() {
        let mut h = harness(
            CropScanConfig::default(),
            FakeBarcode::default(),
            FakeText::default(),
        );
        h.load("photo.jpeg", 40, 30).await;

        let view = h.crop(CropRegion::px(1.0, 1.0, 0.5, 10.0)).await;
        assert_eq!(view.last_error.as_deref(), Some("canvas is empty"));
        assert!(h.notifier.alerts.lock().is_empty());
    }
}
