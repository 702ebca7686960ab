//! A short history of pointer samples used to estimate velocity when a drag ends.

use std::{collections::VecDeque, time::Duration};

use bevy_math::prelude::*;

/// Number of samples kept by [`MouseLog::default`].
pub const MOUSE_LOG_CAPACITY: usize = 16;

/// A pointer position and the time it was observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Position in logical pixels.
    pub position: Vec2,
    /// Time of the observation.
    pub time: Duration,
}

/// Bounded history of pointer samples, newest first. The oldest sample is evicted when full.
#[derive(Debug, Clone)]
pub struct MouseLog {
    samples: VecDeque<PointerSample>,
    capacity: usize,
}

impl Default for MouseLog {
    fn default() -> Self {
        Self::with_capacity(MOUSE_LOG_CAPACITY)
    }
}

impl MouseLog {
    /// Create an empty log holding at most `capacity` samples. A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Record a sample.
    pub fn push(&mut self, position: Vec2, time: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_back();
        }
        self.samples.push_front(PointerSample { position, time });
    }

    /// Forget every sample.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// The `age`-th most recent sample; `0` is the newest.
    pub fn get(&self, age: usize) -> Option<&PointerSample> {
        self.samples.get(age)
    }

    /// The newest sample.
    pub fn newest(&self) -> Option<&PointerSample> {
        self.samples.front()
    }

    /// Number of samples held.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` if no samples are held.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &PointerSample> {
        self.samples.iter()
    }
}
