use crate::{ImageFilterError, Result};
use image::{ExtendedColorType, ImageEncoder, RgbImage, codecs::png::PngEncoder};

/// What the display side receives after a load or a filter run.
#[derive(Debug, Clone)]
pub struct Preview {
    /// The untouched source; only present after a filter run.
    pub original: Option<Vec<u8>>,
    pub processed: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Preview {
    pub fn from_working(working: &RgbImage) -> Result<Self> {
        Ok(Self {
            original: None,
            processed: encode_png(working)?,
            width: working.width(),
            height: working.height(),
        })
    }

    pub fn from_pair(source: &RgbImage, working: &RgbImage) -> Result<Self> {
        Ok(Self {
            original: Some(encode_png(source)?),
            ..Self::from_working(working)?
        })
    }
}

pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    PngEncoder::new(&mut buf)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImageFilterError::Processing(format!("encode png failed: {e}")))?;

    Ok(buf)
}
