use crate::error::{Error, Result};

/// Default maximum height. Enough for ~65k entries at p = 0.5 before the
/// top level stops thinning out; memtables are flushed well before that
/// matters for search cost.
pub const DEFAULT_MAX_LEVEL: usize = 16;

/// Default promotion probability: each extra level is half as likely.
pub const DEFAULT_PROMOTION_PROBABILITY: f64 = 0.5;

/// Hard cap on `max_level`. The head sentinel allocates this many forward
/// slots up front.
pub const MAX_LEVEL_LIMIT: usize = 64;

/// Skip list configuration.
///
/// ```
/// use memtable_skiplist::{SkipList, SkipListOptions};
///
/// let opts = SkipListOptions::default()
///     .with_max_level(12)
///     .with_promotion_probability(0.25)
///     .with_seed(7);
/// let sl: SkipList<u64> = SkipList::with_options(opts).unwrap();
/// assert_eq!(sl.max_level(), 12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SkipListOptions {
    /// Upper bound on any node's height.
    pub max_level: usize,
    /// Probability that a node reaches level h+1 given it reached level h.
    pub promotion_probability: f64,
    /// Fixed RNG seed for reproducible level draws. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SkipListOptions {
    fn default() -> Self {
        SkipListOptions {
            max_level: DEFAULT_MAX_LEVEL,
            promotion_probability: DEFAULT_PROMOTION_PROBABILITY,
            seed: None,
        }
    }
}

impl SkipListOptions {
    /// Set the maximum node height.
    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    /// Set the level promotion probability.
    pub fn with_promotion_probability(mut self, p: f64) -> Self {
        self.promotion_probability = p;
        self
    }

    /// Seed the level RNG for reproducible shapes.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject configurations the skip list cannot run with.
    /// Values are never clamped into range.
    pub fn validate(&self) -> Result<()> {
        if self.max_level < 1 || self.max_level > MAX_LEVEL_LIMIT {
            return Err(Error::InvalidMaxLevel {
                max_level: self.max_level,
                limit: MAX_LEVEL_LIMIT,
            });
        }

        let p = self.promotion_probability;
        // NaN fails both comparisons, so it is rejected here too
        if !(p > 0.0 && p < 1.0) {
            return Err(Error::InvalidPromotionProbability(p));
        }

        Ok(())
    }
}
