//! Cheap line similarity check used before character-level diffing.
//!
//! Two lines are similar when enough of the shorter line's characters also
//! occur somewhere in the longer line. Order is ignored: the count is a
//! multiset intersection, so the check runs in linear time.

use std::collections::HashMap;

/// Default share of the shorter line that must be shared, in percent.
pub const DEFAULT_THRESHOLD_PERCENT: u8 = 40;

/// Decides whether a replace-pair is worth a character diff.
///
/// The threshold is exclusive: a pair sharing exactly the threshold share is
/// not similar. The comparison uses integer arithmetic so the boundary is
/// exact for every line length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimilarityGate {
    threshold_percent: u8,
}

impl Default for SimilarityGate {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_PERCENT)
    }
}

impl SimilarityGate {
    /// Create a gate; thresholds above 100 are clamped to 100.
    pub fn new(threshold_percent: u8) -> Self {
        Self {
            threshold_percent: threshold_percent.min(100),
        }
    }

    pub fn threshold_percent(&self) -> u8 {
        self.threshold_percent
    }

    /// Returns `true` if the two lines are similar enough for a char diff.
    ///
    /// Empty lines are never similar.
    pub fn is_similar(&self, a: &str, b: &str) -> bool {
        let a_len = a.chars().count();
        let b_len = b.chars().count();
        if a_len == 0 || b_len == 0 {
            return false;
        }
        let (shorter, shorter_len, longer) = if a_len <= b_len {
            (a, a_len, b)
        } else {
            (b, b_len, a)
        };
        let shared = shared_chars(shorter, longer);
        shared * 100 > shorter_len * usize::from(self.threshold_percent)
    }
}

/// Similarity check with the default 40% threshold.
pub fn is_similar(a: &str, b: &str) -> bool {
    SimilarityGate::default().is_similar(a, b)
}

/// Size of the multiset intersection of the characters of `a` and `b`.
pub fn shared_chars(a: &str, b: &str) -> usize {
    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_insert(0) += 1;
    }
    let mut shared = 0;
    for c in a.chars() {
        if let Some(count) = available.get_mut(&c) {
            if *count > 0 {
                *count -= 1;
                shared += 1;
            }
        }
    }
    shared
}
