use crate::config;
use anyhow::{Context, Result};
use image_filter::{Preview, PreviewSink};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
};

/// Stands in for the preview widget: `latest.png` always holds the most
/// recent result, numbered copies are kept when history is enabled.
#[derive(Debug)]
pub struct DirPreviewSink {
    dir: PathBuf,
    save_original: bool,
    keep_history: bool,
    shown: AtomicUsize,
}

impl DirPreviewSink {
    pub fn new(setting: &config::Preview) -> Result<Self> {
        fs::create_dir_all(&setting.output_dir).with_context(|| {
            format!(
                "create output directory {} failed",
                setting.output_dir.display()
            )
        })?;

        Ok(Self {
            dir: setting.output_dir.clone(),
            save_original: setting.save_original,
            keep_history: setting.keep_history,
            shown: AtomicUsize::new(0),
        })
    }

    pub fn shown(&self) -> usize {
        self.shown.load(Ordering::Relaxed)
    }

    fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(name);
        fs::write(&path, bytes).with_context(|| format!("write {} failed", path.display()))?;
        Ok(path)
    }

    fn save(&self, index: usize, preview: &Preview) -> Result<PathBuf> {
        let latest = self.write("latest.png", &preview.processed)?;

        if self.keep_history {
            self.write(&format!("{index:04}-processed.png"), &preview.processed)?;

            if let (true, Some(original)) = (self.save_original, &preview.original) {
                self.write(&format!("{index:04}-original.png"), original)?;
            }
        }

        Ok(latest)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PreviewSink for DirPreviewSink {
    fn show(&self, preview: Preview) {
        let index = self.shown.fetch_add(1, Ordering::Relaxed) + 1;

        match self.save(index, &preview) {
            Ok(path) => log::info!(
                "preview #{index} {}x{} -> {}",
                preview.width,
                preview.height,
                path.display()
            ),
            Err(e) => log::warn!("show preview #{index} failed: {e:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview(original: bool) -> Preview {
        Preview {
            original: original.then(|| vec![1, 2, 3]),
            processed: vec![4, 5, 6],
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_history_files() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let setting = config::Preview {
            output_dir: dir.path().join("out"),
            save_original: true,
            keep_history: true,
        };

        let sink = DirPreviewSink::new(&setting)?;
        sink.show(preview(false));
        sink.show(preview(true));

        assert_eq!(sink.shown(), 2);
        assert_eq!(fs::read(sink.dir().join("latest.png"))?, vec![4, 5, 6]);
        assert!(sink.dir().join("0001-processed.png").exists());
        assert!(!sink.dir().join("0001-original.png").exists());
        assert_eq!(fs::read(sink.dir().join("0002-original.png"))?, vec![1, 2, 3]);
        Ok(())
    }

    #[test]
    fn test_latest_only() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let setting = config::Preview {
            output_dir: dir.path().to_path_buf(),
            save_original: true,
            keep_history: false,
        };

        let sink = DirPreviewSink::new(&setting)?;
        sink.show(preview(true));

        assert!(dir.path().join("latest.png").exists());
        assert!(!dir.path().join("0001-processed.png").exists());
        Ok(())
    }
}
