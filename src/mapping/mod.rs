/// Mapper configuration and policy selection.
pub mod config;
/// Per-particle attribute kernel.
pub mod mapper;
