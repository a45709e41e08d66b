//! Bounded per-thread stack of frames

use core_types::{VmError, VmResult};

use crate::frame::Frame;

/// Per-thread call stack.
///
/// Capacity is fixed when the owning thread is constructed.
#[derive(Debug)]
pub struct FrameStack {
    frames: Vec<Frame>,
    max_depth: usize,
}

impl FrameStack {
    /// Create an empty stack holding at most `max_depth` frames
    pub fn new(max_depth: usize) -> Self {
        Self {
            frames: Vec::new(),
            max_depth,
        }
    }

    /// Push a frame, failing once the depth limit is reached
    pub fn push(&mut self, frame: Frame) -> VmResult<()> {
        if self.frames.len() >= self.max_depth {
            return Err(VmError::StackOverflow {
                limit: self.max_depth,
            });
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Pop the top frame
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    /// Top frame
    pub fn current(&self) -> Option<&Frame> {
        self.frames.last()
    }

    /// Mutable top frame
    pub fn current_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    /// Number of active frames
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frame is active
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Depth limit
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Frames from bottom (outermost call) to top
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}
