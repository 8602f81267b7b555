use crate::foundation::{
    core::Vec2,
    error::{FieldError, FieldResult},
};

/// Orthographic view volume for a viewport, frustum size 2.
///
/// The short axis always spans `[-1, 1]`; the long axis grows with the aspect
/// ratio so the particle grid is never stretched.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthoBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl OrthoBounds {
    pub fn for_aspect(aspect: f64) -> FieldResult<Self> {
        if !aspect.is_finite() || aspect <= 0.0 {
            return Err(FieldError::config(format!(
                "viewport aspect must be finite and > 0, got {aspect}"
            )));
        }
        let a = aspect as f32;
        Ok(if aspect > 1.0 {
            Self {
                left: -a,
                right: a,
                top: 1.0,
                bottom: -1.0,
            }
        } else {
            Self {
                left: -1.0,
                right: 1.0,
                top: 1.0 / a,
                bottom: -1.0 / a,
            }
        })
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }

    /// Map a world-space point to pixel coordinates (origin top-left, y down).
    pub fn to_pixels(&self, p: Vec2, px_width: u32, px_height: u32) -> Vec2 {
        Vec2::new(
            (p.x - self.left) / self.width() * px_width as f32,
            (self.top - p.y) / self.height() * px_height as f32,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/viewport.rs"]
mod tests;
