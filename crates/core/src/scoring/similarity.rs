use std::collections::HashMap;

use super::normalize::comparison_key;

/// Ratcliff/Obershelp similarity between two strings.
///
/// Returns `2 * M / T` where `M` is the total length of matching
/// blocks found by recursively chaining longest common substrings and
/// `T` is the combined length of both inputs. Ranges over [0.0, 1.0]:
/// 1.0 for identical strings, 0.0 for no common characters.
///
/// Two empty strings are identical, so `ratio("", "") == 1.0`. Callers
/// in the transcription/review pipeline never reach that case: they
/// force a 0.0 score when either side is empty before comparing.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let mut matches = 0usize;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(&a, &b, alo, ahi, blo, bhi);
        if k > 0 {
            matches += k;
            queue.push((alo, i, blo, j));
            queue.push((i + k, ahi, j + k, bhi));
        }
    }

    2.0 * matches as f64 / total as f64
}

/// Similarity between a transcription and its target phrase, with both
/// sides normalized identically (lower-case, trimmed) first.
pub fn score_against_target(transcribed: &str, target: &str) -> f64 {
    ratio(&comparison_key(transcribed), &comparison_key(target))
}

/// Longest matching block of `a[alo..ahi]` within `b[blo..bhi]`.
///
/// Returns `(i, j, k)` such that `a[i..i+k] == b[j..j+k]`, with `k`
/// maximal and ties broken by the earliest start in `a`, then in `b`.
/// `k == 0` means no common character in the window.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut besti, mut bestj, mut bestk) = (alo, blo, 0usize);
    // j2len[j] = length of the run of matches ending at (i-1, j)
    let mut j2len: HashMap<usize, usize> = HashMap::new();

    for (i, ca) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        for (j, cb) in b.iter().enumerate().take(bhi).skip(blo) {
            if ca == cb {
                let k = j
                    .checked_sub(1)
                    .and_then(|p| j2len.get(&p))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next.insert(j, k);
                if k > bestk {
                    besti = i + 1 - k;
                    bestj = j + 1 - k;
                    bestk = k;
                }
            }
        }
        j2len = next;
    }

    (besti, bestj, bestk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_identical_strings_score_one() {
        assert_relative_eq!(ratio("hello world", "hello world"), 1.0);
    }

    #[test]
    fn test_disjoint_strings_score_zero() {
        assert_relative_eq!(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_known_partial_ratio() {
        // Matching blocks: "abcd" (4 chars); 2*4 / (6+6).
        assert_relative_eq!(ratio("abcdef", "abcdxy"), 8.0 / 12.0);
    }

    #[test]
    fn test_symmetric() {
        let forward = ratio("open the door", "open a door");
        let backward = ratio("open a door", "open the door");
        assert_relative_eq!(forward, backward);
    }

    #[test]
    fn test_empty_vs_empty_is_full_match() {
        assert_relative_eq!(ratio("", ""), 1.0);
    }

    #[test]
    fn test_empty_vs_nonempty_is_zero() {
        assert_relative_eq!(ratio("", "hello"), 0.0);
    }

    #[test]
    fn test_chained_blocks_counted() {
        // "ab" and "cd" both match but are split by unrelated middles.
        let r = ratio("abxcd", "abycd");
        assert_relative_eq!(r, 8.0 / 10.0);
    }

    #[rstest]
    #[case("hello world", "HELLO WORLD")]
    #[case("  hello world", "hello world  ")]
    #[case("Open The Door", " open the door ")]
    fn test_score_against_target_normalizes_both_sides(
        #[case] transcribed: &str,
        #[case] target: &str,
    ) {
        assert_relative_eq!(score_against_target(transcribed, target), 1.0);
    }

    #[test]
    fn test_score_matches_pre_normalized_ratio() {
        let a = "  Close the Window ";
        let b = "close a window";
        assert_relative_eq!(
            score_against_target(a, b),
            ratio(&a.trim().to_lowercase(), &b.trim().to_lowercase())
        );
    }

    #[test]
    fn test_ratio_is_bounded() {
        let r = ratio("the quick brown fox", "a lazy dog");
        assert!((0.0..=1.0).contains(&r));
    }
}
