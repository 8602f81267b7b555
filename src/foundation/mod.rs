/// Shared value types (colors, rotations, NDC helpers).
pub mod core;
/// Error taxonomy.
pub mod error;
