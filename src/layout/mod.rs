/// Particle grid shape, base positions and pixel sampling.
pub mod grid;
/// Orthographic viewport bounds.
pub mod viewport;
