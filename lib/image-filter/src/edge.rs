use crate::{
    Filter, Result, ensure_same_size,
    monochrome::{gray_to_rgb, to_gray},
};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbImage;
use imageproc::edges::canny;

// imageproc keeps magnitudes equal to a bound; a pixel has to exceed it here.
const STRICT_MARGIN: f32 = 1e-3;

/// Canny edge detection with hysteresis bounds `threshold` and `2 * threshold`.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct EdgeDetectionConfig {
    #[derivative(Default(value = "50"))]
    threshold: u32,
}

impl EdgeDetectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(low, high)` hysteresis bounds.
    pub fn bounds(&self) -> (u32, u32) {
        (self.threshold, self.threshold.saturating_mul(2))
    }
}

impl Filter for EdgeDetectionConfig {
    fn apply(&self, source: &RgbImage, working: &mut RgbImage) -> Result<()> {
        ensure_same_size(source, working)?;

        let (low, high) = self.bounds();
        let edges = canny(
            &to_gray(working),
            low as f32 + STRICT_MARGIN,
            high as f32 + STRICT_MARGIN,
        );

        *working = gray_to_rgb(&edges);
        Ok(())
    }
}
