use std::f32::consts::PI;

use crate::{
    flow::estimator::FlowField,
    foundation::core::{EulerXyz, Rgb, Vec2, wrap_ndc},
    layout::grid::{GridSpec, ndc_to_pixel},
    mapping::config::{MapperConfig, MappingPolicy},
    source::frame::Frame,
};

/// Largest distance between two unit RGB colors.
const SQRT_3: f32 = 1.732_050_8;

/// New attributes for one particle, produced once per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleAttrs {
    pub color: Rgb,
    pub size: f32,
    pub rotation: EulerXyz,
    /// Absolute position after this tick; `None` keeps the current position.
    pub position: Option<Vec2>,
}

/// Read-only inputs shared by every particle of a tick.
#[derive(Clone, Copy, Debug)]
pub struct MapContext<'a> {
    pub frame: &'a Frame,
    pub grid: &'a GridSpec,
    pub config: &'a MapperConfig,
    /// Present only for the drift policy.
    pub flow: Option<&'a FlowField>,
}

/// HSL lightness: `(max + min) / 2` of the normalized channels.
pub fn brightness(c: Rgb) -> f32 {
    (c.max_channel() + c.min_channel()) / 2.0
}

/// Brightness rescaled from `[min_brightness, max_brightness]` to `[0, 1]`, clamped.
///
/// Assumes a validated config (`min_brightness < max_brightness`).
pub fn normalized_brightness(b: f32, cfg: &MapperConfig) -> f32 {
    ((b - cfg.min_brightness) / (cfg.max_brightness - cfg.min_brightness)).clamp(0.0, 1.0)
}

/// Rotation for the rotation policy. Darker pixels rotate more.
pub fn brightness_rotation(nb: f32, cfg: &MapperConfig) -> EulerXyz {
    let factor = 1.0 - nb;
    let f = cfg.rotation_factors;
    EulerXyz::new(factor * PI * f.x, factor * PI * f.y, factor * PI * f.z)
}

/// Push each channel toward 1 by `intensity`.
pub fn neon(c: Rgb, intensity: f32) -> Rgb {
    let lift = |v: f32| v + (1.0 - v) * intensity;
    Rgb::new(lift(c.r), lift(c.g), lift(c.b))
}

/// `1 - distance / sqrt(3)`, clamped to `[0, 1]`.
pub fn color_similarity(sample: Rgb, reference: Rgb) -> f32 {
    (1.0 - sample.distance(reference) / SQRT_3).clamp(0.0, 1.0)
}

/// Map one pixel sample under a static-grid policy.
///
/// For [`MappingPolicy::Drift`] this only passes the color through; movement
/// is handled by [`map_drift`].
pub fn map_sample(sample: Rgb, cfg: &MapperConfig) -> ParticleAttrs {
    match cfg.policy {
        MappingPolicy::RotationFromBrightness => {
            let nb = normalized_brightness(brightness(sample), cfg);
            let color = if cfg.white_color_fixed {
                Rgb::WHITE
            } else if cfg.neon_enabled {
                neon(sample, cfg.neon_intensity)
            } else {
                sample
            };
            ParticleAttrs {
                color,
                size: cfg.particle_size,
                rotation: brightness_rotation(nb, cfg),
                position: None,
            }
        }
        MappingPolicy::SizeFromBrightness => {
            let nb = normalized_brightness(brightness(sample), cfg);
            ParticleAttrs {
                color: sample,
                size: cfg.size_range.lerp(nb),
                rotation: EulerXyz::ZERO,
                position: None,
            }
        }
        MappingPolicy::SizeFromColorSimilarity => {
            let s = color_similarity(sample, cfg.reference_color);
            ParticleAttrs {
                color: sample,
                size: cfg.particle_size * (1.0 + s * s * cfg.size_multiplier),
                rotation: EulerXyz::ZERO,
                position: None,
            }
        }
        MappingPolicy::Drift => ParticleAttrs {
            color: sample,
            size: cfg.particle_size,
            rotation: EulerXyz::ZERO,
            position: None,
        },
    }
}

/// Advance an NDC position by `flow * flow_step_scale`, wrapping per axis.
pub fn drift_position(position: Vec2, flow: Vec2, cfg: &MapperConfig) -> Vec2 {
    let moved = position + flow * cfg.flow_step_scale;
    Vec2::new(wrap_ndc(moved.x), wrap_ndc(moved.y))
}

/// Move a particle along the flow field, then resample its color at the new position.
pub fn map_drift(position: Vec2, flow: Vec2, frame: &Frame, cfg: &MapperConfig) -> ParticleAttrs {
    let moved = drift_position(position, flow, cfg);
    let (x, y) = ndc_to_pixel(moved, frame.width(), frame.height());
    ParticleAttrs {
        position: Some(moved),
        ..map_sample(frame.rgb_at(x, y), cfg)
    }
}

/// Attributes for particle `index` whose current position is `position`.
pub fn map_particle(ctx: &MapContext<'_>, index: usize, position: Vec2) -> ParticleAttrs {
    if ctx.config.policy.is_drift() {
        let (x, y) = ndc_to_pixel(position, ctx.frame.width(), ctx.frame.height());
        let flow = ctx.flow.map_or(Vec2::ZERO, |f| f.nearest(x, y));
        return map_drift(position, flow, ctx.frame, ctx.config);
    }

    let (col, row) = ctx.grid.cell(index);
    let (x, y) = ctx
        .grid
        .sample_coord(col, row, ctx.frame.width(), ctx.frame.height());
    map_sample(ctx.frame.rgb_at(x, y), ctx.config)
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/mapper.rs"]
mod tests;
