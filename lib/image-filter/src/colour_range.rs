use crate::{Filter, Result, config::ColorRange, ensure_same_size};
use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::map::{map_enumerated_pixels, map_pixels};

/// 8-bit HSV where hue is halved to fit a byte: H in `[0, 180]`, S and V in `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hsv {
    pub h: u8,
    pub s: u8,
    pub v: u8,
}

impl Hsv {
    pub const fn new(h: u8, s: u8, v: u8) -> Self {
        Self { h, s, v }
    }
}

/// Inclusive lower and upper HSV bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvBounds {
    pub lower: Hsv,
    pub upper: Hsv,
}

impl HsvBounds {
    pub const fn new(lower: Hsv, upper: Hsv) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: Hsv) -> bool {
        (self.lower.h..=self.upper.h).contains(&hsv.h)
            && (self.lower.s..=self.upper.s).contains(&hsv.s)
            && (self.lower.v..=self.upper.v).contains(&hsv.v)
    }
}

const RED_LOW: HsvBounds = HsvBounds::new(Hsv::new(0, 100, 100), Hsv::new(10, 255, 255));
const RED_HIGH: HsvBounds = HsvBounds::new(Hsv::new(170, 100, 100), Hsv::new(180, 255, 255));
const GREEN: HsvBounds = HsvBounds::new(Hsv::new(40, 40, 40), Hsv::new(80, 255, 255));
const BLUE: HsvBounds = HsvBounds::new(Hsv::new(100, 150, 0), Hsv::new(140, 255, 255));

impl ColorRange {
    /// Red straddles the hue wrap-around, so it needs two bands.
    pub fn hsv_bounds(&self) -> &'static [HsvBounds] {
        match self {
            ColorRange::Red => &[RED_LOW, RED_HIGH],
            ColorRange::Green => &[GREEN],
            ColorRange::Blue => &[BLUE],
        }
    }
}

pub fn rgb_to_hsv(pixel: &Rgb<u8>) -> Hsv {
    let [r, g, b] = pixel.0.map(|c| c as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let mut hue = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };

    if hue < 0.0 {
        hue += 360.0;
    }

    Hsv {
        h: (hue / 2.0).round().min(180.0) as u8,
        s: s.round() as u8,
        v: max as u8,
    }
}

/// Per-pixel HSV conversion; the channels of the result hold H, S and V.
pub fn hsv_image(image: &RgbImage) -> RgbImage {
    map_pixels(image, |pixel| {
        let hsv = rgb_to_hsv(&pixel);
        Rgb([hsv.h, hsv.s, hsv.v])
    })
}

/// 255 where any of `bounds` contains the pixel, 0 elsewhere.
pub fn range_mask(hsv: &RgbImage, bounds: &[HsvBounds]) -> GrayImage {
    map_pixels(hsv, |Rgb([h, s, v])| {
        let hsv = Hsv::new(h, s, v);
        if bounds.iter().any(|b| b.contains(hsv)) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Keep only source pixels whose hue falls in the selected color band.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ColorDetectionConfig {
    color: Option<ColorRange>,
}

impl ColorDetectionConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Filter for ColorDetectionConfig {
    fn apply(&self, source: &RgbImage, working: &mut RgbImage) -> Result<()> {
        ensure_same_size(source, working)?;

        let Some(color) = self.color else {
            return Ok(());
        };

        let mask = range_mask(&hsv_image(source), color.hsv_bounds());
        *working = map_enumerated_pixels(source, |x, y, pixel| {
            if mask.get_pixel(x, y)[0] > 0 {
                pixel
            } else {
                Rgb([0, 0, 0])
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palette() -> RgbImage {
        let colors = [
            Rgb([255, 0, 0]),
            Rgb([0, 255, 0]),
            Rgb([0, 0, 255]),
            Rgb([255, 255, 255]),
            Rgb([200, 30, 60]),
            Rgb([255, 200, 0]),
            Rgb([20, 20, 20]),
            Rgb([30, 90, 200]),
        ];
        RgbImage::from_fn(4, 2, |x, y| colors[(y * 4 + x) as usize])
    }

    #[test]
    fn test_rgb_to_hsv_primaries() {
        assert_eq!(rgb_to_hsv(&Rgb([255, 0, 0])), Hsv::new(0, 255, 255));
        assert_eq!(rgb_to_hsv(&Rgb([0, 255, 0])), Hsv::new(60, 255, 255));
        assert_eq!(rgb_to_hsv(&Rgb([0, 0, 255])), Hsv::new(120, 255, 255));
        assert_eq!(rgb_to_hsv(&Rgb([255, 255, 255])), Hsv::new(0, 0, 255));
        assert_eq!(rgb_to_hsv(&Rgb([0, 0, 0])), Hsv::new(0, 0, 0));
        // magenta-red sits just below the wrap point
        assert_eq!(rgb_to_hsv(&Rgb([255, 0, 30])).h, 176);
    }

    #[test]
    fn test_red_covers_both_hue_ends() {
        let bounds = ColorRange::Red.hsv_bounds();
        assert_eq!(bounds.len(), 2);

        for h in 0..=180u8 {
            let inside = bounds.iter().any(|b| b.contains(Hsv::new(h, 255, 255)));
            let expected = h <= 10 || h >= 170;
            assert_eq!(inside, expected, "hue {h}");
        }
    }

    #[test]
    fn test_green_and_blue_are_single_range() {
        assert_eq!(ColorRange::Green.hsv_bounds().len(), 1);
        assert_eq!(ColorRange::Blue.hsv_bounds().len(), 1);
        assert!(ColorRange::Green.hsv_bounds()[0].contains(Hsv::new(60, 255, 255)));
        assert!(ColorRange::Blue.hsv_bounds()[0].contains(Hsv::new(120, 255, 255)));
    }

    #[test]
    fn test_output_is_source_or_zero() -> Result<()> {
        let source = palette();

        for color in ColorRange::all() {
            let mut working = source.clone();
            ColorDetectionConfig::new()
                .with_color(Some(*color))
                .apply(&source, &mut working)?;

            let mut kept = 0;
            for (src, out) in source.pixels().zip(working.pixels()) {
                assert!(out == src || out.0 == [0, 0, 0], "{color}: {src:?} -> {out:?}");
                if out == src {
                    kept += 1;
                }
            }
            assert!(kept > 0, "{color} kept nothing");
        }

        Ok(())
    }

    #[test]
    fn test_red_selection() -> Result<()> {
        let source = palette();
        let mut working = source.clone();
        ColorDetectionConfig::new()
            .with_color(Some(ColorRange::Red))
            .apply(&source, &mut working)?;

        assert_eq!(working.get_pixel(0, 0), &Rgb([255, 0, 0]));
        assert_eq!(working.get_pixel(0, 1), &Rgb([200, 30, 60]));
        assert_eq!(working.get_pixel(1, 0), &Rgb([0, 0, 0]));
        assert_eq!(working.get_pixel(3, 0), &Rgb([0, 0, 0]));
        Ok(())
    }

    #[test]
    fn test_no_color_is_noop() -> Result<()> {
        let source = palette();
        let mut working = source.clone();
        ColorDetectionConfig::new().apply(&source, &mut working)?;

        assert_eq!(working, source);
        Ok(())
    }
}
