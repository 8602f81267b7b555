/// CPU preview rasterizer for headless runs.
pub mod preview;
