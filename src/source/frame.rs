use std::{path::Path, sync::Arc};

use anyhow::Context as _;

use crate::foundation::{
    core::Rgb,
    error::{FieldError, FieldResult},
};

/// Immutable snapshot of one decoded video frame: straight RGBA8, row 0 at the top.
///
/// Cloning is cheap; the pixel buffer is shared.
#[derive(Clone, Debug)]
pub struct Frame {
    width: u32,
    height: u32,
    rgba: Arc<[u8]>,
}

impl Frame {
    pub fn new(width: u32, height: u32, rgba: impl Into<Arc<[u8]>>) -> FieldResult<Self> {
        if width == 0 || height == 0 {
            return Err(FieldError::frame("frame width/height must be > 0"));
        }
        let rgba = rgba.into();
        let expected_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| FieldError::frame("frame buffer size overflow"))?;
        if rgba.len() != expected_len {
            return Err(FieldError::frame(format!(
                "frame buffer has {} bytes, expected {expected_len} for {width}x{height} RGBA",
                rgba.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    /// A frame filled with one RGBA value.
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> FieldResult<Self> {
        let px = (width as usize).saturating_mul(height as usize);
        Self::new(width, height, rgba.repeat(px))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.rgba
    }

    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    pub fn same_size(&self, other: &Frame) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Raw RGBA8 at `(x, y)`; coordinates outside the frame clamp to the nearest edge.
    pub fn rgba8_at(&self, x: i64, y: i64) -> [u8; 4] {
        let x = x.clamp(0, i64::from(self.width) - 1) as usize;
        let y = y.clamp(0, i64::from(self.height) - 1) as usize;
        let idx = (y * self.width as usize + x) * 4;
        [
            self.rgba[idx],
            self.rgba[idx + 1],
            self.rgba[idx + 2],
            self.rgba[idx + 3],
        ]
    }

    /// Normalized RGB at `(x, y)` with the same clamping as [`Frame::rgba8_at`].
    pub fn rgb_at(&self, x: i64, y: i64) -> Rgb {
        let [r, g, b, _] = self.rgba8_at(x, y);
        Rgb::from_rgb8(r, g, b)
    }
}

/// Decode an encoded still (PNG, JPEG, ...) into a [`Frame`].
pub fn decode_frame(bytes: &[u8]) -> FieldResult<Frame> {
    let dyn_img = image::load_from_memory(bytes).context("decode frame from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Frame::new(width, height, rgba.into_raw())
}

/// Read and decode an image file into a [`Frame`].
pub fn load_frame(path: &Path) -> FieldResult<Frame> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read frame '{}'", path.display()))?;
    decode_frame(&bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/source/frame.rs"]
mod tests;
