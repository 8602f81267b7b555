/// Per-particle attribute buffers and dirty tracking.
pub mod particles;
