//! Fuzzy name matching
//!
//! Ratcliff/Obershelp "gestalt" similarity: find the longest common block,
//! recurse on both sides of it, and score `2 * matched / total_len`.

/// Minimum similarity for a stored name to count as a fuzzy hit
pub const FUZZY_CUTOFF: f64 = 0.75;

/// Similarity ratio in [0, 1]; identical strings score 1.0
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Best candidate scoring at least `cutoff` against `query`.
///
/// Ties go to the lexicographically greater candidate.
#[must_use]
pub fn best_match<'a, S: AsRef<str>>(query: &str, candidates: &'a [S], cutoff: f64) -> Option<&'a str> {
    candidates
        .iter()
        .map(|candidate| (ratio(candidate.as_ref(), query), candidate.as_ref()))
        .filter(|(score, _)| *score >= cutoff)
        .max_by(|(score_a, name_a), (score_b, name_b)| {
            score_a.total_cmp(score_b).then_with(|| name_a.cmp(name_b))
        })
        .map(|(_, name)| name)
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let (start_a, start_b, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_characters(&a[..start_a], &b[..start_b])
        + matching_characters(&a[start_a + len..], &b[start_b + len..])
}

/// (start in a, start in b, length) of the earliest longest common block
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut previous = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        let mut current = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let run = previous[j] + 1;
                current[j + 1] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            }
        }
        previous = current;
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_bounds() {
        assert_eq!(ratio("Springfield", "Springfield"), 1.0);
        assert_eq!(ratio("abc", "xyz"), 0.0);
        assert_eq!(ratio("", ""), 1.0);
    }

    #[test]
    fn test_ratio_known_values() {
        // "Springf" + "ld" + "i" = 10 matched of 22
        let score = ratio("Springfield", "Springfeild");
        assert!((score - 20.0 / 22.0).abs() < 1e-9);

        // "abcd" / "bcde": block "bcd" -> 6/8
        assert!((ratio("abcd", "bcde") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_best_match_selects_misspelling() {
        let names = ["Springfield", "Springdale"];
        assert_eq!(best_match("Springfeild", &names, FUZZY_CUTOFF), Some("Springfield"));
    }

    #[test]
    fn test_best_match_below_cutoff() {
        let names = ["Springfield", "Springdale"];
        assert_eq!(best_match("Shelbyville", &names, FUZZY_CUTOFF), None);

        let empty: [&str; 0] = [];
        assert_eq!(best_match("Springfield", &empty, FUZZY_CUTOFF), None);
    }

    #[test]
    fn test_best_match_tie_prefers_greater_name() {
        let names = vec!["Abcx".to_string(), "Abcy".to_string()];
        assert_eq!(best_match("Abcz", &names, 0.5), Some("Abcy"));
    }
}
