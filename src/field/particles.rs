use crate::{
    foundation::{
        core::{EulerXyz, Mat4, Rgb, Vec2, Vec3},
        error::FieldResult,
    },
    layout::grid::GridSpec,
    mapping::{config::MapperConfig, mapper::ParticleAttrs},
};

/// Which attribute buffers changed during a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct DirtyFlags {
    pub positions: bool,
    pub colors: bool,
    pub sizes: bool,
    pub rotations: bool,
}

impl DirtyFlags {
    /// Every buffer, as after a rebuild.
    pub const ALL: Self = Self {
        positions: true,
        colors: true,
        sizes: true,
        rotations: true,
    };

    pub fn any(self) -> bool {
        self.positions || self.colors || self.sizes || self.rotations
    }
}

/// Read view over the attribute buffers, indexed like the grid.
#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct FieldAttributes<'a> {
    pub positions: &'a [Vec2],
    pub colors: &'a [Rgb],
    pub sizes: &'a [f32],
    pub rotations: &'a [EulerXyz],
}

impl FieldAttributes<'_> {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Parallel per-particle buffers for one grid layout.
///
/// A layout change means a fresh [`ParticleField::build`]; buffers are never resized in place.
#[derive(Clone, Debug)]
pub struct ParticleField {
    grid: GridSpec,
    positions: Vec<Vec2>,
    colors: Vec<Rgb>,
    sizes: Vec<f32>,
    rotations: Vec<EulerXyz>,
    pending: DirtyFlags,
}

impl ParticleField {
    /// Every particle at its grid position, white, base size, unrotated.
    pub fn build(grid: GridSpec, config: &MapperConfig) -> Self {
        let n = grid.particle_count;
        let positions = (0..n)
            .map(|i| {
                let (col, row) = grid.cell(i);
                grid.base_position(col, row)
            })
            .collect();
        Self {
            grid,
            positions,
            colors: vec![Rgb::WHITE; n],
            sizes: vec![config.particle_size; n],
            rotations: vec![EulerXyz::ZERO; n],
            pending: DirtyFlags::ALL,
        }
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, index: usize) -> Option<Vec2> {
        self.positions.get(index).copied()
    }

    /// Overwrite one particle. Position is only touched when `attrs.position` is set.
    pub fn update(&mut self, index: usize, attrs: &ParticleAttrs) -> FieldResult<()> {
        if index >= self.len() {
            return Err(anyhow::anyhow!(
                "particle index {index} out of range for field of {}",
                self.len()
            )
            .into());
        }

        if self.colors[index] != attrs.color {
            self.colors[index] = attrs.color;
            self.pending.colors = true;
        }
        if self.sizes[index] != attrs.size {
            self.sizes[index] = attrs.size;
            self.pending.sizes = true;
        }
        if self.rotations[index] != attrs.rotation {
            self.rotations[index] = attrs.rotation;
            self.pending.rotations = true;
        }
        if let Some(p) = attrs.position
            && self.positions[index] != p
        {
            self.positions[index] = p;
            self.pending.positions = true;
        }
        Ok(())
    }

    /// Report the buffers changed since the last call and clear the marks.
    pub fn finish_tick(&mut self) -> DirtyFlags {
        std::mem::take(&mut self.pending)
    }

    pub fn attributes(&self) -> FieldAttributes<'_> {
        FieldAttributes {
            positions: &self.positions,
            colors: &self.colors,
            sizes: &self.sizes,
            rotations: &self.rotations,
        }
    }

    /// Translation, XYZ rotation and `(size, size, 1)` scale composed into one instance matrix.
    pub fn instance_matrix(&self, index: usize) -> Option<Mat4> {
        let p = *self.positions.get(index)?;
        let s = self.sizes[index];
        Some(Mat4::from_scale_rotation_translation(
            Vec3::new(s, s, 1.0),
            self.rotations[index].to_quat(),
            Vec3::new(p.x, p.y, 0.0),
        ))
    }

    pub fn instance_matrices(&self) -> Vec<Mat4> {
        (0..self.len())
            .filter_map(|i| self.instance_matrix(i))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/field/particles.rs"]
mod tests;
