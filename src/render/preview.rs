use crate::{
    field::particles::ParticleField,
    foundation::{
        core::{Mat4, Vec2, Vec3},
        error::{FieldError, FieldResult},
    },
    layout::viewport::OrthoBounds,
};

/// Corners of the unit particle quad in model space.
const QUAD: [Vec3; 4] = [
    Vec3::new(-0.5, -0.5, 0.0),
    Vec3::new(0.5, -0.5, 0.0),
    Vec3::new(0.5, 0.5, 0.0),
    Vec3::new(-0.5, 0.5, 0.0),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PreviewSettings {
    pub width: u32,
    pub height: u32,
    /// Straight RGBA background.
    pub clear_rgba: [u8; 4],
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            clear_rgba: [0, 0, 0, 255],
        }
    }
}

/// Rasterized field, premultiplied RGBA8, row 0 at the top.
#[derive(Clone, Debug)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl PreviewImage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Draw every particle as a flat quad through the orthographic camera of a
/// `width x height` viewport.
///
/// Rotations about X and Y foreshorten the quad; depth is dropped.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(width = settings.width, height = settings.height, particles = field.len())
)]
pub fn render_preview(field: &ParticleField, settings: &PreviewSettings) -> FieldResult<PreviewImage> {
    let width_u16: u16 = settings
        .width
        .try_into()
        .map_err(|_| FieldError::config("preview width exceeds u16"))?;
    let height_u16: u16 = settings
        .height
        .try_into()
        .map_err(|_| FieldError::config("preview height exceeds u16"))?;
    if width_u16 == 0 || height_u16 == 0 {
        return Err(FieldError::config("preview width/height must be > 0"));
    }

    let bounds = OrthoBounds::for_aspect(f64::from(settings.width) / f64::from(settings.height))?;

    let mut ctx = vello_cpu::RenderContext::new(width_u16, height_u16);
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);

    let [r, g, b, a] = settings.clear_rgba;
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(settings.width),
        f64::from(settings.height),
    ));

    let colors = field.attributes().colors;
    for (index, color) in colors.iter().enumerate() {
        let Some(m) = field.instance_matrix(index) else {
            continue;
        };
        let [r, g, b, a] = color.to_rgba8(255);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        ctx.fill_path(&quad_path(&m, &bounds, settings.width, settings.height));
    }

    let mut pixmap = vello_cpu::Pixmap::new(width_u16, height_u16);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);

    Ok(PreviewImage {
        width: settings.width,
        height: settings.height,
        data: pixmap.data_as_u8_slice().to_vec(),
    })
}

fn quad_path(m: &Mat4, bounds: &OrthoBounds, width: u32, height: u32) -> vello_cpu::kurbo::BezPath {
    let mut path = vello_cpu::kurbo::BezPath::new();
    for (i, corner) in QUAD.iter().enumerate() {
        let world = m.transform_point3(*corner);
        let p = to_point(bounds.to_pixels(Vec2::new(world.x, world.y), width, height));
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path.close_path();
    path
}

fn to_point(p: Vec2) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(f64::from(p.x), f64::from(p.y))
}

#[cfg(test)]
#[path = "../../tests/unit/render/preview.rs"]
mod tests;
