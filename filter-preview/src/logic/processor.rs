//! Background processing
//!
//! Filter runs and loads execute on tokio's blocking pool. The pipeline
//! publishes through [`UiBridge`], which only forwards events over a channel;
//! the UI loop receives them and is the single place that touches the real
//! preview and error sinks.

use image_filter::{
    ConfigSource, ErrorKind, ErrorSink, FilterConfig, FilterPipeline, Preview, PreviewSink,
};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tokio::{sync::mpsc, task::JoinHandle};

#[derive(Debug)]
pub enum UiEvent {
    Preview(Preview),
    Error(ErrorKind, String),
}

/// Marshals pipeline output onto the UI loop. Sending never blocks.
#[derive(Debug, Clone)]
pub struct UiBridge {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl UiBridge {
    pub fn new(tx: mpsc::UnboundedSender<UiEvent>) -> Self {
        Self { tx }
    }

    fn send(&self, event: UiEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("ui loop is gone, event dropped");
        }
    }
}

impl PreviewSink for UiBridge {
    fn show(&self, preview: Preview) {
        self.send(UiEvent::Preview(preview));
    }
}

impl ErrorSink for UiBridge {
    fn report(&self, kind: ErrorKind, message: &str) {
        self.send(UiEvent::Error(kind, message.to_string()));
    }
}

/// Current control values, edited by the UI and snapshotted per run.
#[derive(Debug, Clone, Default)]
pub struct SharedConfig(Arc<Mutex<FilterConfig>>);

impl SharedConfig {
    pub fn new(config: FilterConfig) -> Self {
        Self(Arc::new(Mutex::new(config)))
    }

    pub fn update(&self, f: impl FnOnce(&mut FilterConfig)) -> FilterConfig {
        let mut config = self.0.lock().unwrap();
        f(&mut config);
        config.clone()
    }
}

impl ConfigSource for SharedConfig {
    fn snapshot(&self) -> FilterConfig {
        self.0.lock().unwrap().clone()
    }
}

#[derive(Clone)]
pub struct Processor {
    pipeline: Arc<FilterPipeline>,
    bridge: Arc<UiBridge>,
    config: SharedConfig,
}

impl Processor {
    pub fn new(bridge: Arc<UiBridge>, config: SharedConfig) -> Self {
        Self {
            pipeline: Arc::new(FilterPipeline::new(bridge.clone(), bridge.clone())),
            bridge,
            config,
        }
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &FilterPipeline {
        &self.pipeline
    }

    /// Decode `path` off the UI thread. Returns whether an image is loaded.
    pub async fn load(&self, path: PathBuf) -> bool {
        let pipeline = self.pipeline.clone();
        let task = tokio::task::spawn_blocking(move || pipeline.load_source(path));

        match task.await {
            Ok(result) => result.is_ok(),
            Err(e) => {
                self.worker_failed(ErrorKind::DecodeError, e);
                false
            }
        }
    }

    /// Snapshot the controls now and run the filter on the blocking pool.
    /// Returns whether a new preview was produced.
    pub async fn apply(&self) -> bool {
        self.apply_with(self.config.snapshot()).await
    }

    async fn apply_with(&self, config: FilterConfig) -> bool {
        let pipeline = self.pipeline.clone();
        let task = tokio::task::spawn_blocking(move || pipeline.apply_filters(config));

        match task.await {
            Ok(Ok(output)) => output.is_some(),
            Ok(Err(_)) => false,
            Err(e) => {
                self.worker_failed(ErrorKind::ProcessingError, e);
                false
            }
        }
    }

    /// Fire-and-forget [`apply`](Self::apply) used by control change events.
    /// The controls are captured before the task is spawned.
    pub fn trigger_apply(&self) -> JoinHandle<bool> {
        let config = self.config.snapshot();
        let processor = self.clone();
        tokio::spawn(async move { processor.apply_with(config).await })
    }

    /// Fire-and-forget load followed by a run with the current controls.
    pub fn trigger_load(&self, path: PathBuf) -> JoinHandle<bool> {
        let processor = self.clone();
        tokio::spawn(async move { processor.load(path).await && processor.apply().await })
    }

    // a panic inside a primitive surfaces here; the busy flag is already
    // reset by the pipeline's guard during unwinding
    fn worker_failed(&self, kind: ErrorKind, e: tokio::task::JoinError) {
        let message = format!("worker failed: {e}");
        log::warn!("{message}");
        self.bridge.report(kind, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use image_filter::FilterMode;

    fn write_fixture(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("fixture.png");
        RgbImage::from_fn(6, 4, |x, y| Rgb([(x * 40) as u8, (y * 60) as u8, 128]))
            .save(&path)
            .unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_and_apply_reach_ui_loop() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = SharedConfig::new(FilterConfig::new().with_mode(FilterMode::Grayscale));
        let processor = Processor::new(Arc::new(UiBridge::new(tx)), config);

        assert!(processor.load(path).await);
        assert!(processor.apply().await);

        match rx.recv().await {
            Some(UiEvent::Preview(preview)) => assert!(preview.original.is_none()),
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.recv().await {
            Some(UiEvent::Preview(preview)) => {
                assert!(preview.original.is_some());
                assert_eq!((preview.width, preview.height), (6, 4));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_decode_error_reaches_ui_loop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png").unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let processor = Processor::new(Arc::new(UiBridge::new(tx)), SharedConfig::default());

        assert!(!processor.load(path).await);
        assert!(!processor.pipeline().has_source());

        match rx.recv().await {
            Some(UiEvent::Error(kind, _)) => assert_eq!(kind, ErrorKind::DecodeError),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_config_snapshot_taken_at_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let config = SharedConfig::new(
            FilterConfig::new()
                .with_mode(FilterMode::Grayscale)
                .with_grayscale_intensity(1.0),
        );
        let processor = Processor::new(Arc::new(UiBridge::new(tx)), config.clone());
        assert!(processor.load(path).await);
        _ = rx.recv().await;

        // the spawned run has not started yet on this single-threaded runtime
        let handle = processor.trigger_apply();
        let changed = config.update(|c| c.mode = FilterMode::None);
        assert_eq!(changed.mode, FilterMode::None);

        assert!(handle.await.unwrap());
        match rx.recv().await {
            Some(UiEvent::Preview(preview)) => {
                let processed = image::load_from_memory(&preview.processed)
                    .unwrap()
                    .to_rgb8();
                assert!(processed.pixels().all(|p| p[0] == p[1] && p[1] == p[2]));
            }
            other => panic!("unexpected event: {other:?}"),
        }

        assert_eq!(processor.config().snapshot().mode, FilterMode::None);
        assert!(!processor.pipeline().is_processing());
    }
}
