use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

use log::{debug, trace};

use crate::error::Result;
use crate::memtable::level::LevelGenerator;
use crate::options::{MAX_LEVEL_LIMIT, SkipListOptions};
use crate::types::{Key, compare_keys};

/// Arena slot of the head sentinel.
const HEAD: usize = 0;

/// A single node in the skip list.
///
/// Each node has `height` forward links. Level 0 contains all nodes
/// (a regular linked list). Higher levels skip over nodes, enabling
/// O(log n) average-case search.
///
/// ```text
/// Level 3:  HEAD ──────────────────────────────► 50 ──────────► NIL
/// Level 2:  HEAD ──────────► 20 ────────────────► 50 ──────────► NIL
/// Level 1:  HEAD ──► 10 ──► 20 ────► 35 ────────► 50 ──► 60 ──► NIL
/// Level 0:  HEAD ──► 10 ──► 20 ──► 25 ──► 35 ──► 50 ──► 60 ──► 70 ► NIL
/// ```
///
/// Links are indices into `SkipList::nodes`. The head sentinel and vacant
/// (freed) slots hold `value: None`; every linked node holds `Some`.
struct SkipNode<V> {
    key: Key,
    value: Option<V>,
    forward: Vec<Option<usize>>,
}

impl<V> SkipNode<V> {
    fn vacant() -> Self {
        SkipNode {
            key: Vec::new(),
            value: None,
            forward: Vec::new(),
        }
    }

    fn height(&self) -> usize {
        self.forward.len()
    }
}

/// A probabilistic sorted map from byte keys to opaque values.
///
/// Why skip list over red-black tree?
///   - No rotations: a mutation only splices links at the node's own levels
///   - Level 0 is a sorted linked list, so in-order iteration is trivial
///   - This is what LevelDB uses for its memtable
///
/// Average case: O(log n) put, get and remove, O(n) iteration.
/// Worst case: O(n), astronomically unlikely with random level assignment.
///
/// Not synchronized. Writers must be serialized by the caller and readers
/// excluded while a write is in progress (e.g. wrap it in a `RwLock`).
pub struct SkipList<V> {
    /// Slot 0 is the head sentinel with `max_level` forward links.
    nodes: Vec<SkipNode<V>>,
    /// Vacant slots left behind by `remove`, reused by `put`.
    free: Vec<usize>,
    /// Number of levels currently in use, always in `1..=max_level`.
    height: usize,
    len: usize,
    size_bytes: usize,
    levels: LevelGenerator,
}

impl<V> SkipList<V> {
    /// Create an empty skip list with the default configuration.
    pub fn new() -> Self {
        Self::from_valid_options(&SkipListOptions::default())
    }

    /// Create an empty skip list, rejecting an invalid configuration.
    pub fn with_options(opts: SkipListOptions) -> Result<Self> {
        opts.validate()?;
        Ok(Self::from_valid_options(&opts))
    }

    /// Create an empty skip list with the given maximum level and
    /// promotion probability.
    pub fn with_config(max_level: usize, promotion_probability: f64) -> Result<Self> {
        Self::with_options(
            SkipListOptions::default()
                .with_max_level(max_level)
                .with_promotion_probability(promotion_probability),
        )
    }

    fn from_valid_options(opts: &SkipListOptions) -> Self {
        debug_assert!(opts.max_level <= MAX_LEVEL_LIMIT);
        debug!(
            "skiplist created: max_level={} p={} seed={:?}",
            opts.max_level, opts.promotion_probability, opts.seed
        );

        let head = SkipNode {
            key: Vec::new(),
            value: None,
            forward: vec![None; opts.max_level],
        };

        SkipList {
            nodes: vec![head],
            free: Vec::new(),
            height: 1,
            len: 0,
            size_bytes: 0,
            levels: LevelGenerator::from_valid(
                opts.max_level,
                opts.promotion_probability,
                opts.seed,
            ),
        }
    }

    /// Look up a key. Returns the value if found.
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        let (candidate, _) = self.find(key);
        let id = self.matching(candidate, key)?;
        self.nodes[id].value.as_ref()
    }

    /// Look up a key for in-place modification of its value.
    pub fn get_mut(&mut self, key: &[u8]) -> Option<&mut V> {
        let (candidate, _) = self.find(key);
        let id = self.matching(candidate, key)?;
        self.nodes[id].value.as_mut()
    }

    /// Whether the key is present.
    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Insert a key-value pair. Overwrites if the key already exists.
    ///
    /// Returns the previous value, or `None` if the key was absent.
    /// Overwriting keeps the node, its height and its links untouched.
    ///
    /// Algorithm:
    ///   1. Find the insertion point at each level (track predecessors)
    ///   2. Generate a random height for the new node (coin flip per level)
    ///   3. Create node with that height
    ///   4. Splice into the list at each level up to the node's height
    pub fn put(&mut self, key: Key, value: V) -> Option<V> {
        let (candidate, mut update) = self.find(&key);
        if let Some(id) = self.matching(candidate, &key) {
            return self.nodes[id].value.replace(value);
        }

        let height = self.levels.next_height();
        if height > self.height {
            // Nothing is linked above the old height yet, so the head is
            // the predecessor on every newly activated level.
            for pred in &mut update[self.height..height] {
                *pred = HEAD;
            }
            debug!("skiplist height grew {} -> {}", self.height, height);
            self.height = height;
        }

        self.size_bytes += Self::entry_size(key.len(), height);
        trace!(
            "link key={:?} height={}",
            String::from_utf8_lossy(&key),
            height
        );

        let id = self.alloc(key, value, height);
        for (level, &pred) in update.iter().enumerate().take(height) {
            self.nodes[id].forward[level] = self.nodes[pred].forward[level];
            self.nodes[pred].forward[level] = Some(id);
        }
        self.len += 1;

        None
    }

    /// Remove a key. Returns its value, or `None` if the key was absent
    /// (in which case nothing changes).
    ///
    /// The node's key and value are released immediately; its arena slot
    /// is recycled by a later `put`. If the node was the last one on the
    /// top level(s), `height` shrinks right away.
    pub fn remove(&mut self, key: &[u8]) -> Option<V> {
        let (candidate, update) = self.find(key);
        let id = self.matching(candidate, key)?;

        let node_height = self.nodes[id].height();
        for (level, &pred) in update.iter().enumerate().take(node_height) {
            self.nodes[pred].forward[level] = self.nodes[id].forward[level];
        }

        let node = mem::replace(&mut self.nodes[id], SkipNode::vacant());
        self.free.push(id);
        self.len -= 1;
        self.size_bytes -= Self::entry_size(node.key.len(), node_height);
        trace!(
            "unlink key={:?} height={}",
            String::from_utf8_lossy(&node.key),
            node_height
        );

        self.shrink_height();
        node.value
    }

    /// Number of entries in the skip list.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the skip list is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels currently in use (1 when empty).
    pub fn height(&self) -> usize {
        self.height
    }

    /// Configured upper bound on `height()`.
    pub fn max_level(&self) -> usize {
        self.levels.max_level()
    }

    /// Configured probability of a node climbing one more level.
    pub fn promotion_probability(&self) -> f64 {
        self.levels.promotion_probability()
    }

    /// Approximate memory held by live entries, in bytes.
    ///
    /// Counts key bytes, the inline size of each value and the node's
    /// forward links. Heap memory owned by a value is not visible to the
    /// skip list and is not counted.
    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Drop every entry. Configuration and RNG state are kept.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[HEAD].forward.fill(None);
        self.free.clear();
        self.height = 1;
        self.len = 0;
        self.size_bytes = 0;
        debug!("skiplist cleared");
    }

    /// Iterate over all entries in sorted order.
    /// Traverses level 0 (the bottom level contains all entries).
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            list: self,
            next: self.nodes[HEAD].forward[0],
            remaining: self.len,
        }
    }

    /// Iterate over the keys linked at one level, in sorted order.
    /// Levels at or above `height()` are empty.
    pub fn iter_level(&self, level: usize) -> LevelIter<'_, V> {
        let next = if level < self.height {
            self.nodes[HEAD].forward[level]
        } else {
            None
        };
        LevelIter {
            list: self,
            level,
            next,
        }
    }

    /// Smallest entry.
    pub fn first_key_value(&self) -> Option<(&[u8], &V)> {
        self.entry(self.nodes[HEAD].forward[0]?)
    }

    /// Largest entry. Runs right along each level, top down.
    pub fn last_key_value(&self) -> Option<(&[u8], &V)> {
        let mut current = HEAD;
        for level in (0..self.height).rev() {
            while let Some(next) = self.nodes[current].forward[level] {
                current = next;
            }
        }
        if current == HEAD {
            return None;
        }
        self.entry(current)
    }

    /// Shared traversal behind get, put and remove.
    ///
    /// Starts at the head on the top occupied level, moves forward while
    /// the next key is strictly less than `key`, then drops a level.
    /// Returns the level-0 successor of the final position (the only node
    /// that can equal `key`) and the last node visited on each level.
    /// Entries of `update` at or above `height` are left pointing at the head.
    fn find(&self, key: &[u8]) -> (Option<usize>, [usize; MAX_LEVEL_LIMIT]) {
        let mut update = [HEAD; MAX_LEVEL_LIMIT];
        let mut current = HEAD;

        for level in (0..self.height).rev() {
            while let Some(next) = self.nodes[current].forward[level] {
                if compare_keys(&self.nodes[next].key, key) == Ordering::Less {
                    current = next;
                } else {
                    break;
                }
            }
            update[level] = current;
        }

        (self.nodes[current].forward[0], update)
    }

    fn matching(&self, candidate: Option<usize>, key: &[u8]) -> Option<usize> {
        candidate.filter(|&id| compare_keys(&self.nodes[id].key, key) == Ordering::Equal)
    }

    fn entry(&self, id: usize) -> Option<(&[u8], &V)> {
        let node = &self.nodes[id];
        node.value.as_ref().map(|v| (node.key.as_slice(), v))
    }

    fn alloc(&mut self, key: Key, value: V, height: usize) -> usize {
        let node = SkipNode {
            key,
            value: Some(value),
            forward: vec![None; height],
        };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Eager shrink: drop empty top levels so searches start lower.
    fn shrink_height(&mut self) {
        let old = self.height;
        while self.height > 1 && self.nodes[HEAD].forward[self.height - 1].is_none() {
            self.height -= 1;
        }
        if self.height != old {
            debug!("skiplist height shrank {} -> {}", old, self.height);
        }
    }

    fn entry_size(key_len: usize, height: usize) -> usize {
        key_len + mem::size_of::<V>() + height * mem::size_of::<Option<usize>>()
    }

    /// Walk every level and panic on any broken structural invariant.
    #[cfg(test)]
    pub(crate) fn validate(&self) {
        let max_level = self.max_level();
        assert_eq!(self.nodes[HEAD].height(), max_level, "head must span max_level");
        assert!(self.nodes[HEAD].value.is_none(), "head holds no value");
        assert!(
            (1..=max_level).contains(&self.height),
            "height {} outside 1..={}",
            self.height,
            max_level
        );
        for level in self.height..max_level {
            assert!(
                self.nodes[HEAD].forward[level].is_none(),
                "level {level} above height must be empty"
            );
        }

        // Level 0: every live node, strictly increasing keys
        let mut bottom = Vec::with_capacity(self.len);
        let mut next = self.nodes[HEAD].forward[0];
        while let Some(id) = next {
            let node = &self.nodes[id];
            assert!(node.value.is_some(), "linked node must hold a value");
            assert!(node.height() >= 1 && node.height() <= self.height);
            if let Some(&prev) = bottom.last() {
                let prev: &SkipNode<V> = &self.nodes[prev];
                assert_eq!(
                    compare_keys(&prev.key, &node.key),
                    Ordering::Less,
                    "level 0 keys must be strictly increasing"
                );
            }
            bottom.push(id);
            next = node.forward[0];
        }
        assert_eq!(bottom.len(), self.len, "level 0 must hold every entry");

        // Level L links exactly the nodes taller than L, in level-0 order
        for level in 1..self.height {
            let expected: Vec<usize> = bottom
                .iter()
                .copied()
                .filter(|&id| self.nodes[id].height() > level)
                .collect();
            let mut actual = Vec::new();
            let mut next = self.nodes[HEAD].forward[level];
            while let Some(id) = next {
                actual.push(id);
                next = self.nodes[id].forward[level];
            }
            assert_eq!(actual, expected, "level {level} is not the expected subsequence");
        }

        let tallest = bottom.iter().map(|&id| self.nodes[id].height()).max().unwrap_or(1);
        assert_eq!(self.height, tallest, "height must equal the tallest node");

        let size: usize = bottom
            .iter()
            .map(|&id| Self::entry_size(self.nodes[id].key.len(), self.nodes[id].height()))
            .sum();
        assert_eq!(self.size_bytes, size, "size_bytes out of sync");
        assert_eq!(self.nodes.len(), 1 + self.len + self.free.len(), "arena slot leak");
    }
}

impl<V> Default for SkipList<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Extend<(Key, V)> for SkipList<V> {
    fn extend<I: IntoIterator<Item = (Key, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<V> FromIterator<(Key, V)> for SkipList<V> {
    fn from_iter<I: IntoIterator<Item = (Key, V)>>(iter: I) -> Self {
        let mut sl = SkipList::new();
        sl.extend(iter);
        sl
    }
}

impl<'a, V> IntoIterator for &'a SkipList<V> {
    type Item = (&'a [u8], &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders every occupied level from the top down, one line per level:
///
/// ```text
/// L1: 2-"b" 4-"d"
/// L0: 1-"a" 2-"b" 3-"c" 4-"d" 5-"e"
/// ```
impl<V: fmt::Debug> fmt::Debug for SkipList<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in (0..self.height).rev() {
            write!(f, "L{level}:")?;
            let mut next = self.nodes[HEAD].forward[level];
            while let Some(id) = next {
                let node = &self.nodes[id];
                write!(f, " {}-", String::from_utf8_lossy(&node.key))?;
                match &node.value {
                    Some(v) => write!(f, "{v:?}")?,
                    None => f.write_str("?")?,
                }
                next = node.forward[level];
            }
            if level > 0 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Iterator over skip list entries in sorted order.
///
/// Simply follows level 0 forward links. Level 0 is a sorted linked list
/// containing every entry.
pub struct Iter<'a, V> {
    list: &'a SkipList<V>,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a [u8], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let list = self.list;
        self.next = list.nodes[id].forward[0];
        self.remaining = self.remaining.saturating_sub(1);
        list.entry(id)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// Keys linked at a single level, in sorted order.
pub struct LevelIter<'a, V> {
    list: &'a SkipList<V>,
    level: usize,
    next: Option<usize>,
}

impl<'a, V> Iterator for LevelIter<'a, V> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let list = self.list;
        let node = &list.nodes[id];
        self.next = node.forward[self.level];
        Some(node.key.as_slice())
    }
}

impl<V> FusedIterator for LevelIter<'_, V> {}
