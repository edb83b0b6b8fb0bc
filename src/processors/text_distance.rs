//! Text distance primitives used by outlier screening and line alignment.

use itertools::Itertools;
use strsim::{levenshtein, normalized_levenshtein};

/// Normalized edit distance between two strings, in [0.0, 1.0].
///
/// Levenshtein distance divided by the longer string's character count. Two
/// empty strings have distance 0.0; an empty string against a non-empty one
/// has distance 1.0.
pub fn normalized_distance(a: &str, b: &str) -> f32 {
    (1.0 - normalized_levenshtein(a, b) as f32).clamp(0.0, 1.0)
}

/// Similarity counterpart of [`normalized_distance`], in [0.0, 1.0].
pub fn text_similarity(a: &str, b: &str) -> f32 {
    (normalized_levenshtein(a, b) as f32).clamp(0.0, 1.0)
}

/// Plain character-level edit distance.
pub fn edit_distance(a: &str, b: &str) -> usize {
    levenshtein(a, b)
}

/// Symmetric pairwise normalized distance matrix over the given texts.
///
/// The diagonal is 0.0.
pub fn distance_matrix(texts: &[&str]) -> Vec<Vec<f32>> {
    let n = texts.len();
    let mut matrix = vec![vec![0.0_f32; n]; n];
    for (i, j) in (0..n).tuple_combinations() {
        let distance = normalized_distance(texts[i], texts[j]);
        matrix[i][j] = distance;
        matrix[j][i] = distance;
    }
    matrix
}

/// Mean distance from each row of a pairwise matrix to every other row.
///
/// With a single row there is nothing to compare against, so the mean is
/// 0.0.
pub fn mean_distances(matrix: &[Vec<f32>]) -> Vec<f32> {
    let n = matrix.len();
    if n <= 1 {
        return vec![0.0; n];
    }
    matrix
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let total: f32 = row
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, distance)| *distance)
                .sum();
            total / (n - 1) as f32
        })
        .collect()
}
