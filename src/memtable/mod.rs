pub mod level;
pub mod skiplist;

#[cfg(test)]
mod proptests;

pub use level::LevelGenerator;
pub use skiplist::{Iter, LevelIter, SkipList};
