//! "Did you mean" suggestions via weighted Damerau-Levenshtein distance
//! (`spec.md` §6; `original_source/source/utils/find_closest_word.cpp`).
//!
//! Costs: swap (adjacent transposition) = 0, substitution = 2, insertion =
//! 1, deletion = 3. A candidate is rejected once its distance exceeds 7.

const SWAP_COST: usize = 0;
const SUBSTITUTION_COST: usize = 2;
const INSERTION_COST: usize = 1;
const DELETION_COST: usize = 3;
const MAX_DISTANCE: usize = 7;

/// Weighted Damerau-Levenshtein distance between `a` and `b`, computed with
/// a three-row space-optimized DP (current row, previous row, and the row
/// before that, needed to recognize adjacent transpositions).
fn distance(a: &[char], b: &[char]) -> usize {
    let (n, m) = (a.len(), b.len());

    let mut before_previous: Vec<usize> = vec![0; m + 1];
    let mut previous: Vec<usize> = (0..=m).map(|j| j * INSERTION_COST).collect();
    let mut current: Vec<usize> = vec![0; m + 1];

    for i in 1..=n {
        current[0] = i * DELETION_COST;

        for j in 1..=m {
            let cost_if_substituted =
                previous[j - 1] + if a[i - 1] == b[j - 1] { 0 } else { SUBSTITUTION_COST };
            let cost_if_deleted = previous[j] + DELETION_COST;
            let cost_if_inserted = current[j - 1] + INSERTION_COST;

            let mut best = cost_if_substituted.min(cost_if_deleted).min(cost_if_inserted);

            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(before_previous[j - 2] + SWAP_COST);
            }

            current[j] = best;
        }

        before_previous = std::mem::replace(&mut previous, std::mem::take(&mut current));
        current = vec![0; m + 1];
    }

    previous[m]
}

/// Returns the candidate closest to `target` by [`distance`], or `None` if
/// every candidate exceeds the threshold of 7 (or there are no candidates).
pub fn closest(target: &str, candidates: impl IntoIterator<Item = String>) -> Option<String> {
    let target_chars: Vec<char> = target.chars().collect();

    candidates
        .into_iter()
        .map(|candidate| {
            let candidate_chars: Vec<char> = candidate.chars().collect();
            let d = distance(&target_chars, &candidate_chars);
            (candidate, d)
        })
        .filter(|(_, d)| *d <= MAX_DISTANCE)
        .min_by_key(|(_, d)| *d)
        .map(|(candidate, _)| candidate)
}
