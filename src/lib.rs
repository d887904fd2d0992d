//! # Memtable Skip List
//!
//! The in-memory ordered index of an LSM-tree storage engine.
//! Keys are raw byte strings, values are opaque to the index.
//!
//! ## Core idea
//! Instead of rebalancing a tree on every write, give each node a random
//! height. Higher levels skip over more nodes, so a search drops from the
//! sparse top level down to the dense bottom level in O(log n) expected
//! steps. Inserting or deleting only splices links at the levels the node
//! occupies.

pub mod error;
pub mod memtable;
pub mod options;
pub mod types;

// Public re-exports for the top-level API
pub use error::{Error, Result};
pub use memtable::level::LevelGenerator;
pub use memtable::skiplist::{Iter, LevelIter, SkipList};
pub use options::SkipListOptions;
pub use types::{Key, compare_keys};
