//! File source
//!
//! Turns the path given on the command line into the list of images to load.
//! A directory is listed without recursion and filtered by extension.

use anyhow::{Context, Result, bail};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "gif"];

pub fn is_image_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                IMAGE_EXTENSIONS
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
}

/// A single file is passed through as is (the decoder reports bad content),
/// a directory yields its image files sorted by name.
pub fn collect(path: &Path) -> Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    if !path.is_dir() {
        bail!("{} is neither a file nor a directory", path.display());
    }

    let mut files = fs::read_dir(path)
        .with_context(|| format!("read directory {} failed", path.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| is_image_file(p))
        .collect::<Vec<_>>();

    files.sort();
    log::info!("found {} image(s) in {}", files.len(), path.display());
    Ok(files)
}

/// Cursor over the collected files for `next` in interactive mode.
#[derive(Debug, Default)]
pub struct FileCursor {
    files: Vec<PathBuf>,
    index: usize,
}

impl FileCursor {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files, index: 0 }
    }

    pub fn current(&self) -> Option<&PathBuf> {
        self.files.get(self.index)
    }

    /// Moves to the next file, wrapping around at the end.
    pub fn advance(&mut self) -> Option<&PathBuf> {
        if self.files.is_empty() {
            return None;
        }

        self.index = (self.index + 1) % self.files.len();
        self.current()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }
}
