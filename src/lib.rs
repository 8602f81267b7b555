#![forbid(unsafe_code)]
//! Video-reactive particle field.
//!
//! Every tick a grid of particles samples the latest camera frame and maps the
//! sampled color to per-particle color, size, rotation and (for the drift
//! policy) position. [`FieldSession`] owns the buffers and the configuration;
//! a renderer reads them back through [`FieldSession::current_attributes`].

pub mod field;
pub mod flow;
pub mod foundation;
pub mod layout;
pub mod mapping;
#[cfg(feature = "preview")]
pub mod render;
pub mod session;
pub mod source;

pub use field::particles::{DirtyFlags, FieldAttributes, ParticleField};
pub use flow::estimator::{FlowEstimator, FlowField, FrameHistory};
pub use foundation::{
    core::{EulerXyz, Mat4, Quat, Rgb, Vec2, Vec3, wrap_ndc},
    error::{FieldError, FieldResult},
};
pub use layout::{
    grid::{AspectMode, GridSpec, MAX_PARTICLES, MIN_GRID_SIZE, ndc_to_pixel},
    viewport::OrthoBounds,
};
pub use mapping::{
    config::{MapperConfig, MappingPolicy, SizeRange},
    mapper::{
        MapContext, ParticleAttrs, brightness, brightness_rotation, color_similarity,
        drift_position, map_drift, map_particle, map_sample, neon, normalized_brightness,
    },
};
#[cfg(feature = "preview")]
pub use render::preview::{PreviewImage, PreviewSettings, render_preview};
pub use session::field_session::{FieldSession, TickOutcome};
pub use source::{
    feed::{FixedViewport, FrameQueue, FrameSource, ImageSequence, ViewportInfo},
    frame::{Frame, decode_frame, load_frame},
};
