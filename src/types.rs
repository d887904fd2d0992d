use std::cmp::Ordering;

/// Raw key bytes.
pub type Key = Vec<u8>;

/// Total order over keys: lexicographic, byte by byte.
///
/// A key that is a strict prefix of another sorts first, so
/// `"ab" < "abc" < "b"`. Every skip list traversal decides between
/// "advance" and "descend" with this function.
pub fn compare_keys(a: &[u8], b: &[u8]) -> Ordering {
    a.cmp(b)
}
