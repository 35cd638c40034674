use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub const DEFAULT_WIDTH: usize = 15;
pub const DEFAULT_HEIGHT: usize = 15;

/// Pause between two traversal steps, long enough for a redraw.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeConfig {
    pub width: usize,
    pub height: usize,
    /// Fixed seed for reproducible mazes, system entropy otherwise.
    pub seed: Option<u64>,
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            seed: None,
        }
    }
}

impl MazeConfig {
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalConfig {
    pub step_delay: Duration,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            step_delay: DEFAULT_STEP_DELAY,
        }
    }
}
