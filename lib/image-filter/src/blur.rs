use crate::{Filter, Result, ensure_same_size};
use derivative::Derivative;
use derive_setters::Setters;
use image::{Rgb, RgbImage};
use imageproc::{definitions::Image, filter::separable_filter_equal, map::map_pixels};

// Fixed kernels for ksize 1, 3, 5 and 7.
const SMALL_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[0.03125, 0.109375, 0.21875, 0.28125, 0.21875, 0.109375, 0.03125],
];

/// Gaussian blur driven by a slider intensity in `[0, 50]`.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GaussianBlurConfig {
    #[derivative(Default(value = "5"))]
    intensity: u32,
}

impl GaussianBlurConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always odd: `2 * intensity + 1`.
    pub fn kernel_size(&self) -> u32 {
        2 * self.intensity + 1
    }

    pub fn sigma(&self) -> f32 {
        sigma_for_kernel(self.kernel_size())
    }

    pub fn kernel(&self) -> Vec<f32> {
        gaussian_kernel(self.kernel_size())
    }
}

pub fn sigma_for_kernel(ksize: u32) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Normalized 1-D Gaussian weights for an odd `ksize`.
pub fn gaussian_kernel(ksize: u32) -> Vec<f32> {
    let index = (ksize / 2) as usize;
    if ksize % 2 == 1 && index < SMALL_KERNELS.len() {
        return SMALL_KERNELS[index].to_vec();
    }

    let sigma = sigma_for_kernel(ksize);
    let center = (ksize / 2) as f32;
    let scale = -0.5 / (sigma * sigma);

    let mut kernel: Vec<f32> = (0..ksize)
        .map(|i| {
            let x = i as f32 - center;
            (scale * x * x).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|v| *v /= sum);
    kernel
}

impl Filter for GaussianBlurConfig {
    fn apply(&self, source: &RgbImage, working: &mut RgbImage) -> Result<()> {
        ensure_same_size(source, working)?;

        if self.kernel_size() == 1 {
            return Ok(());
        }

        let kernel = self.kernel();
        log::debug!(
            "gaussian blur: ksize={}, sigma={:.3}",
            self.kernel_size(),
            self.sigma()
        );

        // convolve in f32 so the result can be rounded instead of truncated
        let input: Image<Rgb<f32>> = map_pixels(&*working, |Rgb([r, g, b])| {
            Rgb([r as f32, g as f32, b as f32])
        });
        let blurred = separable_filter_equal(&input, &kernel);

        *working = map_pixels(&blurred, |Rgb(channels)| {
            Rgb(channels.map(|v| v.round().clamp(0.0, 255.0) as u8))
        });

        Ok(())
    }
}
