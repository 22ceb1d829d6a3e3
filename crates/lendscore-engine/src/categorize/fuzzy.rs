use std::sync::Arc;

/// Similarity scorer behind the fuzzy stage of the pattern matcher.
pub trait FuzzyBackend: Send + Sync {
    /// Best similarity (0-100) between the shorter input and any equally long window of the
    /// longer one.
    fn partial_ratio(&self, needle: &str, haystack: &str) -> f64;
}

/// Returns the compiled-in backend, or `None` when the `fuzzy` feature is disabled.
pub fn default_backend() -> Option<Arc<dyn FuzzyBackend>> {
    #[cfg(feature = "fuzzy")]
    {
        Some(Arc::new(IndelBackend))
    }
    #[cfg(not(feature = "fuzzy"))]
    {
        None
    }
}

/// Indel partial ratio: `2 * LCS / (len_a + len_b) * 100`, best over sliding windows.
#[cfg(feature = "fuzzy")]
#[derive(Debug, Clone, Copy, Default)]
pub struct IndelBackend;

#[cfg(feature = "fuzzy")]
impl FuzzyBackend for IndelBackend {
    fn partial_ratio(&self, needle: &str, haystack: &str) -> f64 {
        let needle = needle.chars().collect::<Vec<char>>();
        let haystack = haystack.chars().collect::<Vec<char>>();
        let (shorter, longer) = if needle.len() <= haystack.len() {
            (needle, haystack)
        } else {
            (haystack, needle)
        };
        if shorter.is_empty() {
            return 0.0;
        }

        let width = shorter.len();
        let mut best = 0usize;
        for start in 0..=(longer.len() - width) {
            let window = &longer[start..start + width];
            let common = lcs_len(&shorter, window);
            if common > best {
                best = common;
                if best == width {
                    break;
                }
            }
        }

        // Windows share the shorter length, so the Indel ratio reduces to LCS / width.
        best as f64 / width as f64 * 100.0
    }
}

#[cfg(feature = "fuzzy")]
fn lcs_len(left: &[char], right: &[char]) -> usize {
    let mut previous = vec![0usize; right.len() + 1];
    let mut current = vec![0usize; right.len() + 1];
    for left_char in left {
        for (column, right_char) in right.iter().enumerate() {
            current[column + 1] = if left_char == right_char {
                previous[column] + 1
            } else {
                previous[column + 1].max(current[column])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[right.len()]
}

#[cfg(all(test, feature = "fuzzy"))]
mod tests {
    use super::{FuzzyBackend, IndelBackend, lcs_len};

    #[test]
    fn exact_substring_scores_full_marks() {
        let ratio = IndelBackend.partial_ratio("DELIVEROO", "PAYOUT DELIVEROO UK");
        assert!((ratio - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn single_typo_stays_above_default_threshold() {
        let ratio = IndelBackend.partial_ratio("DELIVEROO", "DELIVROO PAYOUT");
        assert!(ratio >= 80.0, "ratio was {ratio}");
    }

    #[test]
    fn unrelated_text_scores_low() {
        let ratio = IndelBackend.partial_ratio("LITTLEWOODS", "TESCO STORES 2231");
        assert!(ratio < 50.0, "ratio was {ratio}");
    }

    #[test]
    fn argument_order_does_not_matter() {
        let forward = IndelBackend.partial_ratio("GAS", "BRITISH GAS");
        let reverse = IndelBackend.partial_ratio("BRITISH GAS", "GAS");
        assert!((forward - reverse).abs() < f64::EPSILON);
        assert!(IndelBackend.partial_ratio("", "ANYTHING").abs() < f64::EPSILON);
    }

    #[test]
    fn lcs_counts_ordered_overlap() {
        let left = "ABCBDAB".chars().collect::<Vec<char>>();
        let right = "BDCABA".chars().collect::<Vec<char>>();
        assert_eq!(lcs_len(&left, &right), 4);
    }
}
