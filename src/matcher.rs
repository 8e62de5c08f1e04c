//! Gestalt (Ratcliff/Obershelp) similarity between normalized strings.

use std::collections::HashMap;

use rapidfuzz::distance::indel;

/// Second strings at least this long drop overly frequent characters as
/// match anchors.
const POPULAR_MIN_LEN: usize = 200;

/// Guards the Indel pre-filter against float rounding near the threshold.
const BOUND_EPSILON: f64 = 1e-9;

/// `2 * M / T`, where `M` counts characters in the recursively found longest
/// common blocks and `T` is the combined length. Two empty strings score 1.0.
#[must_use]
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a = a.chars().collect::<Vec<_>>();
    let b = b.chars().collect::<Vec<_>>();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = BlockMatcher::new(&a, &b).matched_len();
    ratio(matched, total)
}

/// Cheap upper bound of [`similarity_ratio`]: matching blocks form a common
/// subsequence, so `2 * LCS / T` is never smaller.
#[must_use]
pub fn ratio_upper_bound(a: &str, b: &str) -> f64 {
    indel::normalized_similarity(a.chars(), b.chars())
}

/// Whether the similarity of `a` and `b` is strictly above `threshold`.
#[must_use]
pub fn exceeds(a: &str, b: &str, threshold: f64) -> bool {
    similarity_above(a, b, threshold).is_some()
}

/// The similarity of `a` and `b` when it is strictly above `floor`.
///
/// Skips the block matching when the Indel bound already rules it out.
#[must_use]
pub fn similarity_above(a: &str, b: &str, floor: f64) -> Option<f64> {
    if a.is_empty() && b.is_empty() {
        return (1.0 > floor).then_some(1.0);
    }
    if ratio_upper_bound(a, b) + BOUND_EPSILON <= floor {
        return None;
    }

    let similarity = similarity_ratio(a, b);
    (similarity > floor).then_some(similarity)
}

#[allow(clippy::cast_precision_loss)]
fn ratio(matched: usize, total: usize) -> f64 {
    2.0 * matched as f64 / total as f64
}

struct BlockMatcher<'a> {
    a: &'a [char],
    b: &'a [char],
    b_positions: HashMap<char, Vec<usize>>,
}

impl<'a> BlockMatcher<'a> {
    fn new(a: &'a [char], b: &'a [char]) -> Self {
        let mut b_positions: HashMap<char, Vec<usize>> = HashMap::new();
        for (index, ch) in b.iter().enumerate() {
            b_positions.entry(*ch).or_default().push(index);
        }

        if b.len() >= POPULAR_MIN_LEN {
            let limit = b.len() / 100 + 1;
            b_positions.retain(|_, positions| positions.len() <= limit);
        }

        Self { a, b, b_positions }
    }

    fn matched_len(&self) -> usize {
        let mut matched = 0;
        let mut pending = vec![(0, self.a.len(), 0, self.b.len())];

        while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
            let (i, j, size) = self.longest_match(a_lo, a_hi, b_lo, b_hi);
            if size == 0 {
                continue;
            }

            matched += size;
            if a_lo < i && b_lo < j {
                pending.push((a_lo, i, b_lo, j));
            }
            if i + size < a_hi && j + size < b_hi {
                pending.push((i + size, a_hi, j + size, b_hi));
            }
        }

        matched
    }

    /// Longest block within the window, earliest in `a` then earliest in `b`
    /// on ties, extended over characters excluded as anchors.
    fn longest_match(
        &self,
        a_lo: usize,
        a_hi: usize,
        b_lo: usize,
        b_hi: usize,
    ) -> (usize, usize, usize) {
        let (mut best_i, mut best_j, mut best_size) = (a_lo, b_lo, 0);
        let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

        for i in a_lo..a_hi {
            let mut next_runs = HashMap::new();
            let positions = self
                .b_positions
                .get(&self.a[i])
                .map_or(&[][..], Vec::as_slice);

            for &j in positions {
                if j < b_lo {
                    continue;
                }
                if j >= b_hi {
                    break;
                }

                let previous = j
                    .checked_sub(1)
                    .and_then(|prev| run_ending_at.get(&prev))
                    .copied()
                    .unwrap_or(0);
                let size = previous + 1;
                next_runs.insert(j, size);
                if size > best_size {
                    best_i = i + 1 - size;
                    best_j = j + 1 - size;
                    best_size = size;
                }
            }

            run_ending_at = next_runs;
        }

        while best_i > a_lo && best_j > b_lo && self.a[best_i - 1] == self.b[best_j - 1] {
            best_i -= 1;
            best_j -= 1;
            best_size += 1;
        }
        while best_i + best_size < a_hi
            && best_j + best_size < b_hi
            && self.a[best_i + best_size] == self.b[best_j + best_size]
        {
            best_size += 1;
        }

        (best_i, best_j, best_size)
    }
}

#[cfg(test)]
mod tests {
    use super::{exceeds, ratio_upper_bound, similarity_above, similarity_ratio};

    fn approx(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn identical_and_empty_strings_score_one() {
        assert!(approx(similarity_ratio("alice", "alice"), 1.0));
        assert!(approx(similarity_ratio("", ""), 1.0));
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert!(approx(similarity_ratio("abc", "xyz"), 0.0));
        assert!(approx(similarity_ratio("abc", ""), 0.0));
    }

    #[test]
    fn counts_recursive_blocks() {
        // "ab" and "cd" around a mismatched middle: 4 matched of 10.
        assert!(approx(similarity_ratio("abxcd", "abycd"), 0.8));
        assert!(approx(similarity_ratio("apple", "apples"), 10.0 / 11.0));
    }

    #[test]
    fn block_matching_is_order_sensitive() {
        // Longest block "bcd" is taken first, leaving no room for "a".
        assert!(approx(similarity_ratio("abcd", "bcda"), 0.75));
        // Indel sees the same common subsequence here.
        assert!(approx(ratio_upper_bound("abcd", "bcda"), 0.75));
    }

    #[test]
    fn upper_bound_dominates_block_ratio() {
        let pairs = [("tide", "diet"), ("kitten", "sitting"), ("qabxcd", "abycdf")];
        for (a, b) in pairs {
            assert!(ratio_upper_bound(a, b) + 1e-9 >= similarity_ratio(a, b), "{a} vs {b}");
        }
    }

    #[test]
    fn threshold_is_strict() {
        assert!(!exceeds("abxcd", "abycd", 0.8));
        assert!(exceeds("apple", "apples", 0.8));
        assert_eq!(similarity_above("abc", "xyz", 0.0), None);
        assert!(similarity_above("", "", 0.8).is_some());
    }

    #[test]
    fn long_strings_ignore_popular_anchors() {
        let a = format!("{}b", "a".repeat(250));
        let b = format!("b{}", "a".repeat(250));
        // 'a' is too frequent in `b` to anchor a block, so only "b" matches.
        assert!(approx(similarity_ratio(&a, &b), 2.0 / 502.0));
        // Identical strings still extend from the window start.
        assert!(approx(similarity_ratio(&b, &b), 1.0));
    }
}
