use crate::foundation::error::{SiloError, SiloResult};
use crate::render::backend::FrameRGBA;
use crate::render::shading;

/// Turns a rendered frame into encoded image bytes.
pub trait ImageEncoder: Send + Sync {
    /// Encode one frame.
    fn encode(&self, frame: &FrameRGBA) -> SiloResult<Vec<u8>>;
}

/// PNG encoder that flattens frames over the canvas background.
///
/// With a target size the frame is resampled (Lanczos3) before encoding, which turns a
/// supersampled render back into nominal resolution.
#[derive(Clone, Debug, Default)]
pub struct PngFrameEncoder {
    resize_to: Option<(u32, u32)>,
}

impl PngFrameEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resample every frame to `width x height` before encoding.
    pub fn with_resize(mut self, width: u32, height: u32) -> Self {
        self.resize_to = Some((width.max(1), height.max(1)));
        self
    }

    pub fn resize_to(&self) -> Option<(u32, u32)> {
        self.resize_to
    }
}

impl ImageEncoder for PngFrameEncoder {
    fn encode(&self, frame: &FrameRGBA) -> SiloResult<Vec<u8>> {
        let bg = shading::BACKGROUND;
        let rgba = frame.to_opaque_rgba8([bg.r, bg.g, bg.b, 255])?;
        let img = image::RgbaImage::from_raw(frame.width, frame.height, rgba)
            .ok_or_else(|| SiloError::encode("frame buffer does not match its dimensions"))?;

        let img = match self.resize_to {
            Some((w, h)) if (w, h) != (frame.width, frame.height) => {
                image::imageops::resize(&img, w, h, image::imageops::FilterType::Lanczos3)
            }
            _ => img,
        };

        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)
            .map_err(|e| SiloError::encode(format!("png encode failed: {e}")))?;
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
