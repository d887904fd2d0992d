use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::options::SkipListOptions;

/// Picks the height of each newly inserted node.
///
/// Heights follow a geometric distribution: every node gets level 1, and
/// each further level is reached with probability `p` given the previous
/// one, capped at `max_level`.
///
/// ```text
/// p = 0.5:   P(h=1) = 1/2   P(h=2) = 1/4   P(h=3) = 1/8   ...
/// ```
///
/// Expected forward pointers per node = 1 / (1 - p), so space stays O(n).
#[derive(Debug, Clone)]
pub struct LevelGenerator {
    max_level: usize,
    p: f64,
    rng: StdRng,
}

impl LevelGenerator {
    /// Create a generator, rejecting the same configurations as
    /// `SkipListOptions::validate`.
    pub fn new(max_level: usize, p: f64, seed: Option<u64>) -> Result<Self> {
        SkipListOptions {
            max_level,
            promotion_probability: p,
            seed,
        }
        .validate()?;
        Ok(Self::from_valid(max_level, p, seed))
    }

    /// Build from parameters that already passed `SkipListOptions::validate`.
    pub(crate) fn from_valid(max_level: usize, p: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        LevelGenerator { max_level, p, rng }
    }

    /// Draw a height in `[1, max_level]`.
    pub fn next_height(&mut self) -> usize {
        let mut height = 1;
        while height < self.max_level && self.rng.gen_bool(self.p) {
            height += 1;
        }
        height
    }

    /// Upper bound on any drawn height.
    pub fn max_level(&self) -> usize {
        self.max_level
    }

    /// Probability of climbing one more level.
    pub fn promotion_probability(&self) -> f64 {
        self.p
    }
}
