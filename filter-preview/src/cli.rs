use clap::Parser;
use image_filter::FilterMode;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    /// Image file, or a directory of png/jpg/jpeg/bmp/gif files
    pub path: PathBuf,

    /// Filter to apply: none, grayscale, blur, edge, color
    #[arg(short, long)]
    pub mode: Option<FilterMode>,

    /// Grayscale blend intensity in [0, 1]
    #[arg(long)]
    pub intensity: Option<f32>,

    /// Blur intensity in [0, 50]
    #[arg(long)]
    pub blur: Option<u32>,

    /// Edge detection low threshold, the high one is twice this value
    #[arg(long)]
    pub threshold: Option<u32>,

    /// Color to isolate: red, green, blue, none
    #[arg(long)]
    pub color: Option<String>,

    /// Directory the preview images are written to
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Read filter commands from stdin and re-render on every change
    #[arg(short, long)]
    pub interactive: bool,

    /// Use this config file instead of the per-user one
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Persist the effective settings back to the config file
    #[arg(long)]
    pub save_config: bool,
}
