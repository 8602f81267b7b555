use crate::{foundation::core::Vec2, source::frame::Frame};

/// Two-slot ring of the most recent frames.
#[derive(Clone, Debug, Default)]
pub struct FrameHistory {
    slots: [Option<Frame>; 2],
    newest: usize,
}

impl FrameHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `frame` as the newest entry, evicting the older slot.
    pub fn push(&mut self, frame: Frame) {
        self.newest ^= 1;
        self.slots[self.newest] = Some(frame);
    }

    pub fn current(&self) -> Option<&Frame> {
        self.slots[self.newest].as_ref()
    }

    pub fn previous(&self) -> Option<&Frame> {
        self.slots[self.newest ^ 1].as_ref()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Coarse per-cell motion estimate between two frames, valid for one tick.
///
/// Cell `(cx, cy)` holds the displacement measured at pixel
/// `(cx * stride, cy * stride)`.
#[derive(Clone, Debug, PartialEq)]
pub struct FlowField {
    stride: u32,
    cols: u32,
    rows: u32,
    vectors: Vec<Vec2>,
}

impl FlowField {
    /// A field with no cells; every lookup yields zero motion.
    pub fn still(stride: u32) -> Self {
        Self {
            stride: stride.max(1),
            cols: 0,
            rows: 0,
            vectors: Vec::new(),
        }
    }

    /// Red-channel change drives `x`, negated green-channel change drives `y`.
    ///
    /// This is a cheap color-difference proxy, not an optical-flow solver.
    /// Both frames must have the same size.
    pub fn between(prev: &Frame, curr: &Frame, stride: u32) -> Self {
        let stride = stride.max(1);
        let cols = curr.width().div_ceil(stride);
        let rows = curr.height().div_ceil(stride);
        let mut vectors = Vec::with_capacity(cols as usize * rows as usize);
        for cy in 0..rows {
            for cx in 0..cols {
                let x = i64::from(cx * stride);
                let y = i64::from(cy * stride);
                let [pr, pg, _, _] = prev.rgba8_at(x, y);
                let [cr, cg, _, _] = curr.rgba8_at(x, y);
                vectors.push(Vec2::new(
                    (f32::from(cr) - f32::from(pr)) / 255.0,
                    -(f32::from(cg) - f32::from(pg)) / 255.0,
                ));
            }
        }
        Self {
            stride,
            cols,
            rows,
            vectors,
        }
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn dims(&self) -> (u32, u32) {
        (self.cols, self.rows)
    }

    pub fn is_still(&self) -> bool {
        self.vectors.iter().all(|v| *v == Vec2::ZERO)
    }

    /// Displacement of the cell nearest to pixel `(x, y)`. No interpolation.
    pub fn nearest(&self, x: i64, y: i64) -> Vec2 {
        if self.vectors.is_empty() {
            return Vec2::ZERO;
        }
        let s = f64::from(self.stride);
        let cx = ((x as f64 / s).round() as i64).clamp(0, i64::from(self.cols) - 1) as usize;
        let cy = ((y as f64 / s).round() as i64).clamp(0, i64::from(self.rows) - 1) as usize;
        self.vectors[cy * self.cols as usize + cx]
    }
}

/// Owns the frame history for the drift policy and turns each new frame into a [`FlowField`].
#[derive(Clone, Debug)]
pub struct FlowEstimator {
    history: FrameHistory,
    stride: u32,
}

impl FlowEstimator {
    pub fn new(stride: u32) -> Self {
        Self {
            history: FrameHistory::new(),
            stride: stride.max(1),
        }
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn set_stride(&mut self, stride: u32) {
        self.stride = stride.max(1);
    }

    pub fn history(&self) -> &FrameHistory {
        &self.history
    }

    /// Record `frame` and estimate motion against the frame before it.
    ///
    /// The first frame, or a frame whose size differs from its predecessor,
    /// yields a still field.
    pub fn observe(&mut self, frame: &Frame) -> FlowField {
        self.history.push(frame.clone());
        match (self.history.previous(), self.history.current()) {
            (Some(prev), Some(curr)) if prev.same_size(curr) => {
                FlowField::between(prev, curr, self.stride)
            }
            (Some(prev), Some(curr)) => {
                tracing::warn!(
                    prev_width = prev.width(),
                    prev_height = prev.height(),
                    width = curr.width(),
                    height = curr.height(),
                    "frame size changed, resetting motion history"
                );
                FlowField::still(self.stride)
            }
            _ => FlowField::still(self.stride),
        }
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/flow/estimator.rs"]
mod tests;
