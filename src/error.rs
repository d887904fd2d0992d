use std::fmt;

/// Unified error type for the skip list.
///
/// Lookups and mutations never fail: a missing key is reported as `None`.
/// The only failures are rejected configurations at construction time.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// `max_level` outside `1..=limit`.
    InvalidMaxLevel { max_level: usize, limit: usize },
    /// Promotion probability not strictly inside (0, 1).
    InvalidPromotionProbability(f64),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidMaxLevel { max_level, limit } => {
                write!(f, "Invalid max level {max_level}: must be in 1..={limit}")
            }
            Error::InvalidPromotionProbability(p) => {
                write!(f, "Invalid promotion probability {p}: must be in (0, 1)")
            }
        }
    }
}

impl std::error::Error for Error {}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
