/// Tick driver: config snapshots, layout barriers, the per-frame mapping pass.
pub mod field_session;
