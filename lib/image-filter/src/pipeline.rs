use crate::{
    ErrorKind, Filter, FilterConfig, FilterMode, ImageFilterError, Preview, Result,
    image_slot::ImageSlot,
};
use image::{ImageReader, RgbImage};
use std::{
    io::Cursor,
    path::Path,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

/// Display collaborator. Called once per successful load or filter run.
pub trait PreviewSink: Send + Sync {
    fn show(&self, preview: Preview);
}

/// Error-reporting collaborator. Called once per failed operation.
pub trait ErrorSink: Send + Sync {
    fn report(&self, kind: ErrorKind, message: &str);
}

/// Hands out the current control values when a run starts.
pub trait ConfigSource: Send + Sync {
    fn snapshot(&self) -> FilterConfig;
}

#[derive(Debug, Default)]
struct Images {
    source: Option<ImageSlot>,
    working: Option<ImageSlot>,

    // bumped on every load/release so a run started against an older
    // source does not overwrite the new one
    generation: u64,
}

impl Images {
    fn release(&mut self) {
        self.working = None;
        self.source = None;
        self.generation = self.generation.wrapping_add(1);
    }
}

/// Set while a filter run executes; cleared on drop whatever the exit path.
struct ProcessingGuard<'a>(&'a AtomicBool);

impl<'a> ProcessingGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct FilterPipeline {
    images: Mutex<Images>,
    processing: AtomicBool,
    live: Arc<AtomicUsize>,
    preview_sink: Arc<dyn PreviewSink>,
    error_sink: Arc<dyn ErrorSink>,
}

impl FilterPipeline {
    pub fn new(preview_sink: Arc<dyn PreviewSink>, error_sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            images: Mutex::new(Images::default()),
            processing: AtomicBool::new(false),
            live: Arc::new(AtomicUsize::new(0)),
            preview_sink,
            error_sink,
        }
    }

    /// Release the current images and decode `path` as the new source.
    /// On failure nothing stays loaded.
    pub fn load_source(&self, path: impl AsRef<Path>) -> Result<RgbImage> {
        let path = path.as_ref();
        log::info!("load image: {}", path.display());

        self.reload(|| {
            let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
            Ok(image.to_rgb8())
        })
    }

    /// Same as [`load_source`](Self::load_source) for an encoded buffer.
    pub fn load_source_bytes(&self, bytes: &[u8]) -> Result<RgbImage> {
        log::info!("load image from {} bytes", bytes.len());

        self.reload(|| {
            let image = ImageReader::new(Cursor::new(bytes))
                .with_guessed_format()?
                .decode()?;
            Ok(image.to_rgb8())
        })
    }

    fn reload(&self, decode: impl FnOnce() -> Result<RgbImage>) -> Result<RgbImage> {
        // the old images go first so a failed decode leaves nothing loaded
        self.release();

        let loaded = decode().and_then(|image| {
            if image.width() == 0 || image.height() == 0 {
                return Err(ImageFilterError::Decode("image has no pixels".to_string()));
            }

            let preview = Preview::from_working(&image)?;
            Ok((image, preview))
        });

        match loaded {
            Ok((image, preview)) => {
                {
                    let mut images = self.lock_images();
                    images.release();

                    let source = ImageSlot::new(image.clone(), &self.live);
                    images.working = Some(source.duplicate());
                    images.source = Some(source);
                }

                log::debug!("loaded {}x{} image", image.width(), image.height());
                self.preview_sink.show(preview);
                Ok(image)
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    /// Run the filter selected by `config` against a fresh clone of the source.
    ///
    /// Returns `Ok(None)` without touching any state when a run is already in
    /// flight (the request is dropped, not queued) or when no image is loaded.
    pub fn apply_filters(&self, config: FilterConfig) -> Result<Option<RgbImage>> {
        let config = config.clamped();
        self.run(&config, config.mode)
    }

    fn run(&self, filter: &dyn Filter, mode: FilterMode) -> Result<Option<RgbImage>> {
        let Some(guard) = ProcessingGuard::try_acquire(&self.processing) else {
            log::debug!("filter run in progress, dropped {mode:?}");
            return Ok(None);
        };

        match self.process(filter, mode) {
            Ok(Some((image, preview))) => {
                drop(guard);
                self.preview_sink.show(preview);
                Ok(Some(image))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                drop(guard);
                self.report(&e);
                Err(e)
            }
        }
    }

    /// Snapshot `config_source` once, then run [`apply_filters`](Self::apply_filters).
    pub fn apply_from(&self, config_source: &dyn ConfigSource) -> Result<Option<RgbImage>> {
        self.apply_filters(config_source.snapshot())
    }

    fn process(
        &self,
        filter: &dyn Filter,
        mode: FilterMode,
    ) -> Result<Option<(RgbImage, Preview)>> {
        let (source, generation) = {
            let images = self.lock_images();
            match &images.source {
                Some(source) => (source.image().clone(), images.generation),
                None => {
                    log::debug!("no image loaded, skip {mode:?}");
                    return Ok(None);
                }
            }
        };

        let mut working = source.clone();
        filter.apply(&source, &mut working)?;
        let preview = Preview::from_pair(&source, &working)?;

        let mut images = self.lock_images();
        if images.generation != generation {
            log::debug!("source replaced during {mode:?} run, result discarded");
            return Ok(None);
        }

        images.working = Some(ImageSlot::new(working.clone(), &self.live));
        Ok(Some((working, preview)))
    }

    /// Drop the source and working images.
    pub fn release(&self) {
        self.lock_images().release();
    }

    pub fn is_processing(&self) -> bool {
        self.processing.load(Ordering::Acquire)
    }

    pub fn has_source(&self) -> bool {
        self.lock_images().source.is_some()
    }

    pub fn source(&self) -> Option<RgbImage> {
        self.lock_images().source.as_ref().map(|s| s.image().clone())
    }

    pub fn working(&self) -> Option<RgbImage> {
        self.lock_images().working.as_ref().map(|s| s.image().clone())
    }

    /// Number of images currently held by the pipeline.
    pub fn live_images(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn report(&self, e: &ImageFilterError) {
        log::warn!("{e}");
        self.error_sink.report(e.kind(), &e.to_string());
    }

    fn lock_images(&self) -> MutexGuard<'_, Images> {
        self.images.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
