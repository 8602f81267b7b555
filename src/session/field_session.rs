use crate::{
    field::particles::{DirtyFlags, FieldAttributes, ParticleField},
    flow::estimator::FlowEstimator,
    foundation::error::FieldResult,
    layout::grid::{AspectMode, GridSpec},
    mapping::{
        config::MapperConfig,
        mapper::{MapContext, map_particle},
    },
    source::feed::{FrameSource, ViewportInfo},
};

/// Result of one [`FieldSession::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No frame was ready; the field keeps its previous attributes.
    Skipped,
    /// All particles were mapped; the flags name the buffers to re-upload.
    Applied(DirtyFlags),
}

/// Drives the particle field from a frame source, one tick per rendered frame.
///
/// Configuration and density changes happen between ticks (`&mut self`), so a
/// tick always sees one consistent config and one set of buffers.
#[derive(Debug)]
pub struct FieldSession {
    config: MapperConfig,
    grid_size: u32,
    aspect_mode: AspectMode,
    aspect: f64,
    field: ParticleField,
    flow: Option<FlowEstimator>,
    generation: u64,
    /// Last aspect ratio the layout refused, so a stuck viewport warns once.
    rejected_aspect: Option<f64>,
}

impl FieldSession {
    /// Validate the inputs and build the first grid for `initial_aspect`.
    pub fn new(
        config: MapperConfig,
        grid_size: u32,
        aspect_mode: AspectMode,
        initial_aspect: f64,
    ) -> FieldResult<Self> {
        config.validate()?;
        let grid = GridSpec::compute(grid_size, initial_aspect)?;
        let field = ParticleField::build(grid, &config);
        let flow = config
            .policy
            .is_drift()
            .then(|| FlowEstimator::new(config.flow_stride));
        Ok(Self {
            config,
            grid_size,
            aspect_mode,
            aspect: initial_aspect,
            field,
            flow,
            generation: 0,
            rejected_aspect: None,
        })
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridSpec {
        self.field.grid()
    }

    pub fn grid_size(&self) -> u32 {
        self.grid_size
    }

    pub fn aspect_mode(&self) -> AspectMode {
        self.aspect_mode
    }

    pub fn field(&self) -> &ParticleField {
        &self.field
    }

    /// Number of buffer rebuilds since construction.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_tracking_motion(&self) -> bool {
        self.flow.is_some()
    }

    /// Replace the mapper config. On error the previous config stays active.
    ///
    /// Entering the drift policy starts motion tracking; leaving it drops the
    /// history and rebuilds so particles return to their grid positions.
    pub fn set_config(&mut self, config: MapperConfig) -> FieldResult<()> {
        config.validate()?;
        let was_drift = self.config.policy.is_drift();
        let is_drift = config.policy.is_drift();
        self.config = config;

        match (was_drift, is_drift) {
            (false, true) => self.flow = Some(FlowEstimator::new(config.flow_stride)),
            (true, false) => {
                self.flow = None;
                let grid = *self.field.grid();
                self.rebuild(grid);
            }
            (true, true) => {
                if let Some(flow) = self.flow.as_mut() {
                    flow.set_stride(config.flow_stride);
                }
            }
            (false, false) => {}
        }
        Ok(())
    }

    /// Change the grid density. Returns whether the buffers were rebuilt.
    pub fn set_grid_density(&mut self, grid_size: u32) -> FieldResult<bool> {
        let grid = GridSpec::compute(grid_size, self.aspect)?;
        self.grid_size = grid_size;
        Ok(self.relayout(grid))
    }

    /// Change which aspect ratio drives the grid; applied on the next tick.
    pub fn set_aspect_mode(&mut self, mode: AspectMode) {
        self.aspect_mode = mode;
    }

    /// Re-lay out for a new aspect ratio. Returns whether the buffers were rebuilt.
    pub fn set_aspect(&mut self, aspect: f64) -> FieldResult<bool> {
        let grid = GridSpec::compute(self.grid_size, aspect)?;
        self.aspect = aspect;
        self.rejected_aspect = None;
        Ok(self.relayout(grid))
    }

    /// Run one frame-to-attributes pass.
    ///
    /// Skips when `source` has no frame ready. A layout change from the
    /// viewport is applied before any particle is mapped.
    #[tracing::instrument(level = "trace", skip_all, fields(policy = self.config.policy.name()))]
    pub fn tick(
        &mut self,
        source: &mut dyn FrameSource,
        viewport: &dyn ViewportInfo,
    ) -> FieldResult<TickOutcome> {
        let config = self.config;

        let Some(frame) = source.next_frame() else {
            tracing::trace!("no frame ready, tick skipped");
            return Ok(TickOutcome::Skipped);
        };

        let aspect = match self.aspect_mode {
            AspectMode::Viewport => viewport.viewport_aspect_ratio(),
            AspectMode::Source => viewport.source_aspect_ratio(),
        };
        if aspect != self.aspect
            && self.rejected_aspect.map(f64::to_bits) != Some(aspect.to_bits())
            && let Err(err) = self.set_aspect(aspect)
        {
            tracing::warn!(aspect, error = %err, "ignoring invalid aspect ratio");
            self.rejected_aspect = Some(aspect);
        }

        let flow = self.flow.as_mut().map(|est| est.observe(&frame));
        let grid = *self.field.grid();
        let ctx = MapContext {
            frame: &frame,
            grid: &grid,
            config: &config,
            flow: flow.as_ref(),
        };

        for index in 0..self.field.len() {
            let position = self.field.position(index).unwrap_or_default();
            let attrs = map_particle(&ctx, index, position);
            self.field.update(index, &attrs)?;
        }

        Ok(TickOutcome::Applied(self.field.finish_tick()))
    }

    /// Read view for the renderer, valid until the next tick or rebuild.
    pub fn current_attributes(&self) -> FieldAttributes<'_> {
        self.field.attributes()
    }

    fn relayout(&mut self, grid: GridSpec) -> bool {
        if grid == *self.field.grid() {
            return false;
        }
        self.rebuild(grid);
        true
    }

    #[tracing::instrument(level = "debug", skip_all, fields(generation = self.generation + 1))]
    fn rebuild(&mut self, grid: GridSpec) {
        tracing::debug!(
            old_width = self.field.grid().grid_width,
            old_height = self.field.grid().grid_height,
            width = grid.grid_width,
            height = grid.grid_height,
            particles = grid.particle_count,
            "rebuilding particle field"
        );
        self.field = ParticleField::build(grid, &self.config);
        self.generation += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/field_session.rs"]
mod tests;
