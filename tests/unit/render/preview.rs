use super::*;
use crate::{layout::grid::GridSpec, mapping::config::MapperConfig};

fn big_particles(grid_size: u32, aspect: f64) -> ParticleField {
    let cfg = MapperConfig {
        particle_size: 0.5,
        ..MapperConfig::default()
    };
    ParticleField::build(GridSpec::compute(grid_size, aspect).unwrap(), &cfg)
}

fn settings(width: u32, height: u32) -> PreviewSettings {
    PreviewSettings {
        width,
        height,
        clear_rgba: [0, 0, 0, 255],
    }
}

#[test]
fn particles_land_on_their_grid_cells() {
    let img = render_preview(&big_particles(3, 1.0), &settings(64, 64)).unwrap();
    assert_eq!(img.data.len(), 64 * 64 * 4);

    // Center particle spans pixels 24..40, corner particle 0..8.
    assert_eq!(img.pixel(32, 32), Some([255, 255, 255, 255]));
    assert_eq!(img.pixel(2, 2), Some([255, 255, 255, 255]));
    assert_eq!(img.pixel(16, 16), Some([0, 0, 0, 255]));
    assert_eq!(img.pixel(64, 0), None);
}

#[test]
fn wide_viewport_keeps_the_grid_square() {
    // x in [-2, 2]: NDC -1 sits at pixel 32.
    let img = render_preview(&big_particles(3, 1.0), &settings(128, 64)).unwrap();
    assert_eq!(img.pixel(64, 32), Some([255, 255, 255, 255]));
    assert_eq!(img.pixel(4, 32), Some([0, 0, 0, 255]));
}

#[test]
fn background_uses_clear_color() {
    let mut s = settings(16, 16);
    s.clear_rgba = [18, 20, 28, 255];
    let field = ParticleField::build(GridSpec::compute(2, 1.0).unwrap(), &MapperConfig::default());
    let img = render_preview(&field, &s).unwrap();
    assert_eq!(img.pixel(8, 8), Some([18, 20, 28, 255]));
}

#[test]
fn rejects_unusable_sizes() {
    let field = big_particles(2, 1.0);
    assert!(render_preview(&field, &settings(0, 10)).is_err());
    assert!(render_preview(&field, &settings(70_000, 10)).is_err());
}
