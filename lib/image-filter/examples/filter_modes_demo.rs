use anyhow::Result;
use image_filter::{
    ColorRange, ErrorKind, ErrorSink, FilterConfig, FilterMode, FilterPipeline, Preview,
    PreviewSink,
};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

struct SaveToDir {
    dir: PathBuf,
    index: AtomicUsize,
}

impl PreviewSink for SaveToDir {
    fn show(&self, preview: Preview) {
        let index = self.index.fetch_add(1, Ordering::Relaxed);
        let path = self.dir.join(format!("preview_{index:02}.png"));

        match fs::write(&path, &preview.processed) {
            Ok(_) => log::info!("✓ Generated {}", path.display()),
            Err(e) => log::warn!("save {} failed: {e}", path.display()),
        }
    }
}

struct LogErrors;

impl ErrorSink for LogErrors {
    fn report(&self, kind: ErrorKind, message: &str) {
        log::warn!("{kind}: {message}");
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let output_dir = Path::new("tmp");
    fs::create_dir_all(output_dir)?;

    let pipeline = FilterPipeline::new(
        Arc::new(SaveToDir {
            dir: output_dir.to_path_buf(),
            index: AtomicUsize::new(0),
        }),
        Arc::new(LogErrors),
    );

    pipeline.load_source("data/test.png")?;

    let configs = [
        FilterConfig::new()
            .with_mode(FilterMode::Grayscale)
            .with_grayscale_intensity(0.6),
        FilterConfig::new()
            .with_mode(FilterMode::GaussianBlur)
            .with_blur_intensity(8),
        FilterConfig::new()
            .with_mode(FilterMode::EdgeDetection)
            .with_edge_threshold(40),
        FilterConfig::new()
            .with_mode(FilterMode::ColorDetection)
            .with_color(ColorRange::Red),
    ];

    for config in configs {
        pipeline.apply_filters(config)?;
    }

    log::info!("All filters applied, images saved to: {}", output_dir.display());
    Ok(())
}
