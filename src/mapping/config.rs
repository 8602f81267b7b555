use crate::foundation::{
    core::{Rgb, Vec3},
    error::{FieldError, FieldResult},
};

/// How a sampled pixel drives its particle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingPolicy {
    /// Darker pixels rotate their particle further.
    #[default]
    RotationFromBrightness,
    /// Brighter pixels grow their particle within `size_range`.
    SizeFromBrightness,
    /// Pixels close to `reference_color` grow their particle.
    SizeFromColorSimilarity,
    /// Particles move along a coarse motion estimate between frames.
    Drift,
}

impl MappingPolicy {
    pub const ALL: [Self; 4] = [
        Self::RotationFromBrightness,
        Self::SizeFromBrightness,
        Self::SizeFromColorSimilarity,
        Self::Drift,
    ];

    pub fn is_drift(self) -> bool {
        matches!(self, Self::Drift)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::RotationFromBrightness => "rotation_from_brightness",
            Self::SizeFromBrightness => "size_from_brightness",
            Self::SizeFromColorSimilarity => "size_from_color_similarity",
            Self::Drift => "drift",
        }
    }

    pub fn parse(s: &str) -> FieldResult<Self> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        match key.as_str() {
            "rotation" | "rotation_from_brightness" => Ok(Self::RotationFromBrightness),
            "size" | "size_from_brightness" => Ok(Self::SizeFromBrightness),
            "similarity" | "color" | "size_from_color_similarity" => {
                Ok(Self::SizeFromColorSimilarity)
            }
            "drift" | "flow" => Ok(Self::Drift),
            _ => Err(FieldError::config(format!("unknown mapping policy '{s}'"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
}

impl SizeRange {
    /// `min + t * (max - min)`, written so `t = 0` and `t = 1` hit the bounds exactly.
    pub fn lerp(self, t: f32) -> f32 {
        self.min * (1.0 - t) + self.max * t
    }
}

/// Per-tick mapping parameters. The session copies this value at tick start.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub min_brightness: f32,
    pub max_brightness: f32,
    /// Base particle size, used wherever a policy does not modulate size.
    pub particle_size: f32,
    pub size_range: SizeRange,
    /// Per-axis rotation weights in `[0, 1]`.
    pub rotation_factors: Vec3,
    pub neon_enabled: bool,
    pub neon_intensity: f32,
    pub white_color_fixed: bool,
    pub reference_color: Rgb,
    /// Size gain at perfect color similarity.
    pub size_multiplier: f32,
    /// Pixel stride of the coarse motion grid.
    pub flow_stride: u32,
    pub flow_step_scale: f32,
    pub policy: MappingPolicy,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            min_brightness: 0.2,
            max_brightness: 0.5,
            particle_size: 0.025,
            size_range: SizeRange {
                min: 0.01,
                max: 0.05,
            },
            rotation_factors: Vec3::new(0.5, 0.5, 0.0),
            neon_enabled: true,
            neon_intensity: 0.01,
            white_color_fixed: true,
            reference_color: Rgb::WHITE,
            size_multiplier: 3.0,
            flow_stride: 10,
            flow_step_scale: 0.1,
            policy: MappingPolicy::RotationFromBrightness,
        }
    }
}

impl MapperConfig {
    pub fn with_policy(mut self, policy: MappingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn validate(&self) -> FieldResult<()> {
        finite("min_brightness", self.min_brightness)?;
        finite("max_brightness", self.max_brightness)?;
        unit("min_brightness", self.min_brightness)?;
        unit("max_brightness", self.max_brightness)?;
        if self.min_brightness >= self.max_brightness {
            return Err(FieldError::config(format!(
                "min_brightness ({}) must be < max_brightness ({})",
                self.min_brightness, self.max_brightness
            )));
        }

        finite("particle_size", self.particle_size)?;
        if self.particle_size <= 0.0 {
            return Err(FieldError::config("particle_size must be > 0"));
        }

        finite("size_range.min", self.size_range.min)?;
        finite("size_range.max", self.size_range.max)?;
        if self.size_range.min < 0.0 {
            return Err(FieldError::config("size_range.min must be >= 0"));
        }
        if self.size_range.min > self.size_range.max {
            return Err(FieldError::config(format!(
                "size_range.min ({}) must be <= size_range.max ({})",
                self.size_range.min, self.size_range.max
            )));
        }

        unit("rotation_factors.x", self.rotation_factors.x)?;
        unit("rotation_factors.y", self.rotation_factors.y)?;
        unit("rotation_factors.z", self.rotation_factors.z)?;
        unit("neon_intensity", self.neon_intensity)?;

        if !self.reference_color.is_unit() {
            return Err(FieldError::config(
                "reference_color channels must be within [0, 1]",
            ));
        }

        finite("size_multiplier", self.size_multiplier)?;
        if self.size_multiplier < 0.0 {
            return Err(FieldError::config("size_multiplier must be >= 0"));
        }

        if self.flow_stride == 0 {
            return Err(FieldError::config("flow_stride must be >= 1"));
        }
        finite("flow_step_scale", self.flow_step_scale)?;

        Ok(())
    }

    /// Parse a (possibly partial) JSON document; missing fields take defaults.
    pub fn from_json_str(s: &str) -> FieldResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| FieldError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn to_json_string(&self) -> FieldResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| FieldError::serde(e.to_string()))
    }
}

fn finite(name: &str, v: f32) -> FieldResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(FieldError::config(format!("{name} must be finite")))
    }
}

fn unit(name: &str, v: f32) -> FieldResult<()> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(FieldError::config(format!(
            "{name} must be within [0, 1], got {v}"
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mapping/config.rs"]
mod tests;
