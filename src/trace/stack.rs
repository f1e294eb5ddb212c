// src/trace/stack.rs
//! Call-stack snapshot attached to event records

/// Maximum number of frames captured per event.
pub const MAX_STACK_DEPTH: usize = 100;

/// Fixed-capacity sequence of frame addresses, populated by an external
/// stack-walker before the owning record is serialized.
#[derive(Debug, Clone, Copy)]
pub struct StackSnapshot {
    frames: [u64; MAX_STACK_DEPTH],
    depth: usize,
}

impl StackSnapshot {
    pub fn new() -> Self {
        Self {
            frames: [0; MAX_STACK_DEPTH],
            depth: 0,
        }
    }

    /// Append a frame address; returns `false` once the snapshot is full.
    pub fn push_frame(&mut self, address: u64) -> bool {
        if self.depth == MAX_STACK_DEPTH {
            return false;
        }
        self.frames[self.depth] = address;
        self.depth += 1;
        true
    }

    /// Captured frames, innermost first.
    pub fn frames(&self) -> &[u64] {
        &self.frames[..self.depth]
    }

    pub fn len(&self) -> usize {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.depth == 0
    }

    pub fn is_full(&self) -> bool {
        self.depth == MAX_STACK_DEPTH
    }

    pub fn reset(&mut self) {
        self.depth = 0;
    }

    /// Replace this snapshot's contents with another's.
    pub fn copy_from(&mut self, other: &StackSnapshot) {
        *self = *other;
    }
}

impl Default for StackSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
