use crate::foundation::{
    core::Vec2,
    error::{FieldError, FieldResult},
};

/// Smallest accepted grid density. Base positions divide by `count - 1` per axis.
pub const MIN_GRID_SIZE: u32 = 2;

/// Largest particle count a layout may produce.
pub const MAX_PARTICLES: usize = 250_000;

/// Which aspect ratio drives the grid shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectMode {
    /// Fill the output viewport.
    #[default]
    Viewport,
    /// Follow the camera frame shape so samples are not distorted.
    Source,
}

/// Resolved particle grid for one density/aspect combination.
///
/// Particles are indexed row-major: `index = row * grid_width + col`, row 0 at
/// the visual top.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct GridSpec {
    pub particle_count: usize,
    pub grid_width: u32,
    pub grid_height: u32,
    /// Distance between neighbouring columns in normalized device coordinates.
    pub cell_spacing_x: f32,
    /// Distance between neighbouring rows in normalized device coordinates.
    pub cell_spacing_y: f32,
}

impl GridSpec {
    /// Lay out a grid for `grid_size` along the short axis of `aspect`.
    ///
    /// For `aspect > 1` the width is `ceil(grid_size * aspect)`, otherwise the
    /// height is `ceil(grid_size / aspect)`. The particle count is the product
    /// and may differ from `grid_size^2`.
    pub fn compute(grid_size: u32, aspect: f64) -> FieldResult<Self> {
        if grid_size < MIN_GRID_SIZE {
            return Err(FieldError::config(format!(
                "grid size must be >= {MIN_GRID_SIZE}, got {grid_size}"
            )));
        }
        if !aspect.is_finite() || aspect <= 0.0 {
            return Err(FieldError::config(format!(
                "aspect ratio must be finite and > 0, got {aspect}"
            )));
        }

        let (grid_width, grid_height) = if aspect > 1.0 {
            (ceil_to_u32(f64::from(grid_size) * aspect)?, grid_size)
        } else {
            (grid_size, ceil_to_u32(f64::from(grid_size) / aspect)?)
        };

        let particle_count = (grid_width as usize)
            .checked_mul(grid_height as usize)
            .ok_or_else(|| FieldError::config("grid particle count overflow"))?;
        if particle_count > MAX_PARTICLES {
            return Err(FieldError::config(format!(
                "grid of {grid_width}x{grid_height} exceeds {MAX_PARTICLES} particles"
            )));
        }

        Ok(Self {
            particle_count,
            grid_width,
            grid_height,
            cell_spacing_x: 2.0 / (grid_width - 1) as f32,
            cell_spacing_y: 2.0 / (grid_height - 1) as f32,
        })
    }

    pub fn index(&self, col: u32, row: u32) -> usize {
        row as usize * self.grid_width as usize + col as usize
    }

    /// Inverse of [`GridSpec::index`]: `(col, row)`.
    pub fn cell(&self, index: usize) -> (u32, u32) {
        let w = self.grid_width as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    /// Base position of a cell in normalized device coordinates (`x` right, `y` up).
    pub fn base_position(&self, col: u32, row: u32) -> Vec2 {
        Vec2::new(
            col as f32 * self.cell_spacing_x - 1.0,
            1.0 - row as f32 * self.cell_spacing_y,
        )
    }

    /// Pixel sampled by a cell in a `frame_width x frame_height` frame.
    ///
    /// The vertical term is `1 - v` where `v` is the distance of the row's top
    /// edge from the bottom of the grid, which puts row 0 on image row 0.
    /// Results clamp into the frame.
    pub fn sample_coord(&self, col: u32, row: u32, frame_width: u32, frame_height: u32) -> (i64, i64) {
        let u = f64::from(col) / f64::from(self.grid_width);
        let v = f64::from(self.grid_height - row.min(self.grid_height)) / f64::from(self.grid_height);
        let x = (u * f64::from(frame_width)).floor() as i64;
        let y = ((1.0 - v) * f64::from(frame_height)).floor() as i64;
        (
            x.clamp(0, i64::from(frame_width) - 1),
            y.clamp(0, i64::from(frame_height) - 1),
        )
    }
}

/// Map an NDC position onto frame pixels, the continuous counterpart of
/// [`GridSpec::sample_coord`]. Results clamp into the frame.
pub fn ndc_to_pixel(p: Vec2, frame_width: u32, frame_height: u32) -> (i64, i64) {
    let u = f64::from((p.x + 1.0) * 0.5);
    let v = f64::from((1.0 - p.y) * 0.5);
    let x = (u * f64::from(frame_width)).floor() as i64;
    let y = (v * f64::from(frame_height)).floor() as i64;
    (
        x.clamp(0, i64::from(frame_width) - 1),
        y.clamp(0, i64::from(frame_height) - 1),
    )
}

fn ceil_to_u32(v: f64) -> FieldResult<u32> {
    // Absorb float noise such as 40 * 1.8 = 72.00000000000001.
    let c = (v - 1e-9).ceil();
    if !(0.0..=f64::from(u32::MAX)).contains(&c) {
        return Err(FieldError::config("grid dimension out of range"));
    }
    Ok(c as u32)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/grid.rs"]
mod tests;
