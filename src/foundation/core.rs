pub use glam::{Mat4, Quat, Vec2, Vec3};

/// Straight (non-premultiplied) RGB color with channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
        }
    }

    pub fn to_rgba8(self, a: u8) -> [u8; 4] {
        fn q(c: f32) -> u8 {
            (c.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        [q(self.r), q(self.g), q(self.b), a]
    }

    pub fn max_channel(self) -> f32 {
        self.r.max(self.g).max(self.b)
    }

    pub fn min_channel(self) -> f32 {
        self.r.min(self.g).min(self.b)
    }

    /// Channel-wise `1 - c`.
    pub fn complement(self) -> Self {
        Self::new(1.0 - self.r, 1.0 - self.g, 1.0 - self.b)
    }

    pub fn distance(self, other: Self) -> f32 {
        let dr = self.r - other.r;
        let dg = self.g - other.g;
        let db = self.b - other.b;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    pub fn channels(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn is_unit(self) -> bool {
        self.channels()
            .iter()
            .all(|c| c.is_finite() && (0.0..=1.0).contains(c))
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Euler angles in radians, applied in X, then Y, then Z order.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EulerXyz {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl EulerXyz {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_euler(glam::EulerRot::XYZ, self.x, self.y, self.z)
    }
}

/// Wrap a normalized-device coordinate into `[-1, 1]`, re-entering on the opposite edge.
pub fn wrap_ndc(v: f32) -> f32 {
    if (-1.0..=1.0).contains(&v) {
        return v;
    }
    if !v.is_finite() {
        return 0.0;
    }
    (v + 1.0).rem_euclid(2.0) - 1.0
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
