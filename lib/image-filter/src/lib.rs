pub mod blur;
pub mod colour_range;
pub mod config;
pub mod edge;
pub mod image_slot;
pub mod monochrome;
pub mod pipeline;
pub mod preview;

pub use config::{ColorRange, FilterConfig, FilterMode};
pub use pipeline::{ConfigSource, ErrorSink, FilterPipeline, PreviewSink};
pub use preview::Preview;

use image::RgbImage;
use std::fmt;

pub type Result<T> = std::result::Result<T, ImageFilterError>;

#[derive(thiserror::Error, Debug)]
pub enum ImageFilterError {
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Processing error: {0}")]
    Processing(String),
}

impl ImageFilterError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImageFilterError::Decode(_) => ErrorKind::DecodeError,
            ImageFilterError::Processing(_) => ErrorKind::ProcessingError,
        }
    }
}

impl From<image::ImageError> for ImageFilterError {
    fn from(e: image::ImageError) -> Self {
        ImageFilterError::Decode(e.to_string())
    }
}

impl From<std::io::Error> for ImageFilterError {
    fn from(e: std::io::Error) -> Self {
        ImageFilterError::Decode(e.to_string())
    }
}

/// Category handed to the error-reporting collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DecodeError,
    ProcessingError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::DecodeError => write!(f, "DecodeError"),
            ErrorKind::ProcessingError => write!(f, "ProcessingError"),
        }
    }
}

/// A filter reads the untouched source and writes into the working copy,
/// which always starts out as a fresh clone of the source.
pub trait Filter {
    fn apply(&self, source: &RgbImage, working: &mut RgbImage) -> Result<()>;
}

impl Filter for FilterConfig {
    fn apply(&self, source: &RgbImage, working: &mut RgbImage) -> Result<()> {
        match self.mode {
            FilterMode::None => ensure_same_size(source, working),

            FilterMode::Grayscale => monochrome::GrayscaleBlendConfig::new()
                .with_intensity(self.grayscale_intensity)
                .apply(source, working),

            FilterMode::GaussianBlur => blur::GaussianBlurConfig::new()
                .with_intensity(self.blur_intensity)
                .apply(source, working),

            FilterMode::EdgeDetection => edge::EdgeDetectionConfig::new()
                .with_threshold(self.edge_threshold)
                .apply(source, working),

            FilterMode::ColorDetection => colour_range::ColorDetectionConfig::new()
                .with_color(self.color)
                .apply(source, working),
        }
    }
}

pub(crate) fn ensure_same_size(source: &RgbImage, working: &RgbImage) -> Result<()> {
    if source.width() == 0 || source.height() == 0 {
        return Err(ImageFilterError::Processing("source image is empty".to_string()));
    }

    if source.dimensions() != working.dimensions() {
        return Err(ImageFilterError::Processing(format!(
            "working image is {:?}, expected {:?}",
            working.dimensions(),
            source.dimensions()
        )));
    }

    Ok(())
}
