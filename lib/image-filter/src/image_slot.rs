use image::RgbImage;
use std::{
    ops::{Deref, DerefMut},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
};

/// An image owned by the pipeline. Every live slot is counted in the
/// tracker it was created from, and released from it on drop.
#[derive(Debug)]
pub struct ImageSlot {
    image: RgbImage,
    live: Arc<AtomicUsize>,
}

impl ImageSlot {
    pub fn new(image: RgbImage, live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self {
            image,
            live: live.clone(),
        }
    }

    /// Clone into a new slot tracked by the same counter.
    pub fn duplicate(&self) -> Self {
        Self::new(self.image.clone(), &self.live)
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }
}

impl Deref for ImageSlot {
    type Target = RgbImage;

    fn deref(&self) -> &Self::Target {
        &self.image
    }
}

impl DerefMut for ImageSlot {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.image
    }
}

impl Drop for ImageSlot {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_count() {
        let live = Arc::new(AtomicUsize::new(0));

        let first = ImageSlot::new(RgbImage::new(2, 2), &live);
        assert_eq!(live.load(Ordering::SeqCst), 1);

        let second = first.duplicate();
        assert_eq!(live.load(Ordering::SeqCst), 2);
        assert_eq!(second.dimensions(), (2, 2));

        drop(first);
        assert_eq!(live.load(Ordering::SeqCst), 1);

        drop(second);
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }
}
