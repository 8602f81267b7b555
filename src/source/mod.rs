/// Frame collaborators: camera mailbox, image sequences, viewport ratios.
pub mod feed;
/// Decoded frame snapshots.
pub mod frame;
