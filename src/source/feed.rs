use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::error::{FieldError, FieldResult},
    source::frame::{Frame, load_frame},
};

/// Non-blocking supplier of camera frames.
///
/// `None` means no new frame is ready; the session then skips the tick and the
/// field keeps its previous attributes.
pub trait FrameSource {
    fn next_frame(&mut self) -> Option<Frame>;
}

/// Aspect ratios supplied by the windowing and video collaborators.
pub trait ViewportInfo {
    fn viewport_aspect_ratio(&self) -> f64;
    fn source_aspect_ratio(&self) -> f64;
}

/// Fixed aspect ratios, for headless runs and tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedViewport {
    pub viewport: f64,
    pub source: f64,
}

impl FixedViewport {
    pub fn new(viewport: f64, source: f64) -> Self {
        Self { viewport, source }
    }

    pub fn square() -> Self {
        Self::new(1.0, 1.0)
    }
}

impl ViewportInfo for FixedViewport {
    fn viewport_aspect_ratio(&self) -> f64 {
        self.viewport
    }

    fn source_aspect_ratio(&self) -> f64 {
        self.source
    }
}

/// Single-slot mailbox fed by a camera callback.
///
/// Pushing while a frame is still pending replaces it: the consumer only ever
/// sees the latest frame.
#[derive(Debug, Default)]
pub struct FrameQueue {
    pending: Option<Frame>,
    dropped: u64,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        if self.pending.replace(frame).is_some() {
            self.dropped += 1;
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Frames replaced before anyone consumed them.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl FrameSource for FrameQueue {
    fn next_frame(&mut self) -> Option<Frame> {
        self.pending.take()
    }
}

/// Ordered list of still images played back as consecutive camera frames.
#[derive(Clone, Debug)]
pub struct ImageSequence {
    paths: Vec<PathBuf>,
    cursor: usize,
}

impl ImageSequence {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths, cursor: 0 }
    }

    /// Collect the image files of `dir` (png, jpg, jpeg, bmp) sorted by file name.
    pub fn from_dir(dir: &Path) -> FieldResult<Self> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("read frame directory '{}'", dir.display()))?;
        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .with_context(|| format!("list frame directory '{}'", dir.display()))?
                .path();
            if path.is_file() && is_frame_image(&path) {
                paths.push(path);
            }
        }
        if paths.is_empty() {
            return Err(FieldError::frame(format!(
                "no image frames found in '{}'",
                dir.display()
            )));
        }
        paths.sort();
        Ok(Self::new(paths))
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.paths.len()
    }
}

impl FrameSource for ImageSequence {
    fn next_frame(&mut self) -> Option<Frame> {
        let path = self.paths.get(self.cursor)?;
        self.cursor += 1;
        match load_frame(path) {
            Ok(frame) => Some(frame),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping undecodable frame");
                None
            }
        }
    }
}

fn is_frame_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| matches!(e.as_str(), "png" | "jpg" | "jpeg" | "bmp"))
}

#[cfg(test)]
#[path = "../../tests/unit/source/feed.rs"]
mod tests;
