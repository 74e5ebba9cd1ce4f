use derivative::Derivative;
use derive_setters::Setters;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

pub const MAX_BLUR_INTENSITY: u32 = 50;
pub const MAX_EDGE_THRESHOLD: u32 = 255;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    TryFromPrimitive,
    IntoPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    #[default]
    None = 0,
    Grayscale,
    GaussianBlur,
    EdgeDetection,
    ColorDetection,
}

impl FilterMode {
    pub fn name(&self) -> &'static str {
        match self {
            FilterMode::None => "none",
            FilterMode::Grayscale => "grayscale",
            FilterMode::GaussianBlur => "blur",
            FilterMode::EdgeDetection => "edge",
            FilterMode::ColorDetection => "color",
        }
    }

    pub fn all() -> &'static [FilterMode] {
        &[
            FilterMode::None,
            FilterMode::Grayscale,
            FilterMode::GaussianBlur,
            FilterMode::EdgeDetection,
            FilterMode::ColorDetection,
        ]
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(FilterMode::None),
            "grayscale" | "gray" => Ok(FilterMode::Grayscale),
            "blur" | "gaussianblur" | "gaussian" => Ok(FilterMode::GaussianBlur),
            "edge" | "edges" | "edgedetection" => Ok(FilterMode::EdgeDetection),
            "color" | "colour" | "colordetection" => Ok(FilterMode::ColorDetection),
            other => Err(format!(
                "unknown filter mode `{other}`, expected one of: none, grayscale, blur, edge, color"
            )),
        }
    }
}

/// Named hue bands the color detection filter can isolate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
#[serde(rename_all = "lowercase")]
pub enum ColorRange {
    Red = 0,
    Green,
    Blue,
}

impl ColorRange {
    pub fn name(&self) -> &'static str {
        match self {
            ColorRange::Red => "red",
            ColorRange::Green => "green",
            ColorRange::Blue => "blue",
        }
    }

    pub fn all() -> &'static [ColorRange] {
        &[ColorRange::Red, ColorRange::Green, ColorRange::Blue]
    }

    /// Parses a color selection where `none` (or an empty string) means
    /// nothing is selected.
    pub fn parse_selection(s: &str) -> Result<Option<ColorRange>, String> {
        match s.trim().to_lowercase().as_str() {
            "" | "none" => Ok(None),
            other => other.parse().map(Some),
        }
    }
}

impl fmt::Display for ColorRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ColorRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "red" => Ok(ColorRange::Red),
            "green" => Ok(ColorRange::Green),
            "blue" => Ok(ColorRange::Blue),
            other => Err(format!(
                "unknown color `{other}`, expected one of: red, green, blue, none"
            )),
        }
    }
}

/// Snapshot of the controls for a single filter run.
#[derive(Debug, Clone, PartialEq, Derivative, Setters, Serialize, Deserialize)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[serde(default)]
pub struct FilterConfig {
    pub mode: FilterMode,

    #[derivative(Default(value = "0.5"))]
    pub grayscale_intensity: f32, // [0, 1]

    #[derivative(Default(value = "5"))]
    pub blur_intensity: u32, // [0, 50]

    #[derivative(Default(value = "50"))]
    pub edge_threshold: u32, // [0, 255]

    #[setters(strip_option)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorRange>,
}

impl FilterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_color(mut self) -> Self {
        self.color = None;
        self
    }

    /// Copy with every value forced into its domain. NaN intensity becomes 0.
    pub fn clamped(&self) -> Self {
        let grayscale_intensity = if self.grayscale_intensity.is_nan() {
            0.0
        } else {
            self.grayscale_intensity.clamp(0.0, 1.0)
        };

        Self {
            mode: self.mode,
            grayscale_intensity,
            blur_intensity: self.blur_intensity.min(MAX_BLUR_INTENSITY),
            edge_threshold: self.edge_threshold.min(MAX_EDGE_THRESHOLD),
            color: self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_mode_parse() {
        assert_eq!("Grayscale".parse::<FilterMode>(), Ok(FilterMode::Grayscale));
        assert_eq!("blur".parse::<FilterMode>(), Ok(FilterMode::GaussianBlur));
        assert_eq!(" edge ".parse::<FilterMode>(), Ok(FilterMode::EdgeDetection));
        assert!("sepia".parse::<FilterMode>().is_err());

        for mode in FilterMode::all() {
            assert_eq!(mode.name().parse::<FilterMode>(), Ok(*mode));
        }
    }

    #[test]
    fn test_filter_mode_primitive() {
        let raw: u8 = FilterMode::ColorDetection.into();
        assert_eq!(raw, 4);
        assert_eq!(FilterMode::try_from(2u8), Ok(FilterMode::GaussianBlur));
        assert!(FilterMode::try_from(9u8).is_err());
    }

    #[test]
    fn test_color_selection() {
        assert_eq!(ColorRange::parse_selection("none"), Ok(None));
        assert_eq!(ColorRange::parse_selection(""), Ok(None));
        assert_eq!(ColorRange::parse_selection("RED"), Ok(Some(ColorRange::Red)));
        assert!(ColorRange::parse_selection("purple").is_err());
    }

    #[test]
    fn test_clamped() {
        let config = FilterConfig::new()
            .with_grayscale_intensity(1.7)
            .with_blur_intensity(99)
            .with_edge_threshold(1000)
            .clamped();

        assert_eq!(config.grayscale_intensity, 1.0);
        assert_eq!(config.blur_intensity, MAX_BLUR_INTENSITY);
        assert_eq!(config.edge_threshold, MAX_EDGE_THRESHOLD);

        let config = FilterConfig::new()
            .with_grayscale_intensity(f32::NAN)
            .clamped();
        assert_eq!(config.grayscale_intensity, 0.0);

        let config = FilterConfig::new().with_grayscale_intensity(-0.3).clamped();
        assert_eq!(config.grayscale_intensity, 0.0);
    }

    #[test]
    fn test_setters() {
        let config = FilterConfig::new()
            .with_mode(FilterMode::ColorDetection)
            .with_color(ColorRange::Green);
        assert_eq!(config.color, Some(ColorRange::Green));
        assert_eq!(config.without_color().color, None);
    }
}
