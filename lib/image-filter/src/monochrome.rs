use crate::{Filter, Result, ensure_same_size};
use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::map::{map_enumerated_pixels, map_pixels};

// BT.601 luma weights in 14-bit fixed point: 0.299, 0.587, 0.114
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;

/// Rounded BT.601 luma of a single pixel.
#[inline]
pub fn luma(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    let sum = r as u32 * LUMA_R + g as u32 * LUMA_G + b as u32 * LUMA_B;
    ((sum + (1 << (LUMA_SHIFT - 1))) >> LUMA_SHIFT) as u8
}

pub fn to_gray(image: &RgbImage) -> GrayImage {
    map_pixels(image, |pixel| Luma([luma(&pixel)]))
}

pub fn gray_to_rgb(image: &GrayImage) -> RgbImage {
    map_pixels(image, |Luma([v])| Rgb([v, v, v]))
}

/// Blend between the source colors and their luma.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GrayscaleBlendConfig {
    #[derivative(Default(value = "1.0"))]
    intensity: f32, // [0, 1]
}

impl GrayscaleBlendConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Filter for GrayscaleBlendConfig {
    fn apply(&self, source: &RgbImage, working: &mut RgbImage) -> Result<()> {
        ensure_same_size(source, working)?;

        let gray = gray_to_rgb(&to_gray(source));
        let weight = self.intensity.clamp(0.0, 1.0);
        let keep = 1.0 - weight;

        *working = map_enumerated_pixels(source, |x, y, src| {
            let gray = gray.get_pixel(x, y);
            let mut out = [0u8; 3];
            for i in 0..3 {
                let val = src[i] as f32 * keep + gray[i] as f32 * weight;
                out[i] = val.round().clamp(0.0, 255.0) as u8;
            }
            Rgb(out)
        });

        Ok(())
    }
}
