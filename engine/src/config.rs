use std::num::NonZeroUsize;
use std::thread;

use crate::error::{Error, Result};

/// Slot count of each per-worker key table.
pub const DEFAULT_CAPACITY: usize = 10_000 * 5;

/// Longest distance the partitioner walks looking for a newline.
pub const DEFAULT_BOUNDARY_WINDOW: usize = 4096;

/// Hardware threads available to this process, at least 1.
pub fn available_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// What a key table does when the home slot of a new key is taken by
/// another key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Collision {
    /// Walk forward (wrapping) to the next free slot.
    #[default]
    Probe,
    /// One slot per key: a mismatch on the home slot is `KeyCollision`.
    Reject,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub workers: usize,
    pub capacity: usize,
    pub collision: Collision,
    pub boundary_window: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: available_workers(),
            capacity: DEFAULT_CAPACITY,
            collision: Collision::default(),
            boundary_window: DEFAULT_BOUNDARY_WINDOW,
        }
    }
}

impl Config {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_collision(mut self, collision: Collision) -> Self {
        self.collision = collision;
        self
    }

    pub fn with_boundary_window(mut self, window: usize) -> Self {
        self.boundary_window = window;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig("workers must be at least 1".into()));
        }
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be at least 1".into()));
        }
        if self.boundary_window == 0 {
            return Err(Error::InvalidConfig(
                "boundary window must be at least 1 byte".into(),
            ));
        }
        Ok(())
    }
}
