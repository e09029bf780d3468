//! Derivation traces for subtype judgements.
//!
//! A trace is an ordered stack of frames recording which entities are being
//! compared at each level of the recursion. Failures snapshot the trace at
//! the moment they are created, so the explanation survives after the stack
//! unwinds.

use crate::interface::{Method, MethodType};
use lattice_core::Type;
use serde::{Deserialize, Serialize};

/// One judgement frame: the pair of entities under comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Frame {
    Types { sub: Type, sup: Type },
    Methods { sub: Method, sup: Method },
    MethodTypes { sub: MethodType, sup: MethodType },
}

/// An ordered stack of judgement frames.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    frames: Vec<Frame>,
}

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current depth. Callers record this before descending and use it as a
    /// marker to trim failure traces back to their own frames.
    pub fn size(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Runs `f` with `frame` pushed; the frame is popped on every exit path.
    pub fn scoped<T>(&mut self, frame: Frame, f: impl FnOnce(&mut Trace) -> T) -> T {
        self.frames.push(frame);
        let result = f(self);
        self.frames.pop();
        result
    }

    /// Drops the first `depth` frames, keeping only entries recorded after
    /// that marker.
    pub fn drop_prefix(&mut self, depth: usize) {
        if depth > 0 && depth <= self.frames.len() {
            self.frames.drain(..depth);
        }
    }

    /// This trace appended to `outer`'s frames. Used when a cached failure is
    /// served under a new caller's context.
    pub fn merged_onto(&self, outer: &Trace) -> Trace {
        let mut frames = outer.frames.clone();
        frames.extend(self.frames.iter().cloned());
        Trace { frames }
    }
}
