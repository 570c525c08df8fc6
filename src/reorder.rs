//! Greedy nearest-neighbor playlist reordering.
//!
//! The first input track anchors the sequence; every following slot takes
//! the remaining track with the best transition score from the last placed
//! one. Greedy is the documented approximation — transition scores are not
//! a metric, so a global TSP-style optimum is not attempted.

use rayon::prelude::*;

use crate::model::Track;
use crate::scoring::transition_score;

/// Above this many tracks, precompute the full pairwise score matrix once
/// instead of re-scoring inside the selection loop. Same results, O(N²)
/// memory traded for not re-evaluating pairs.
pub const MATRIX_THRESHOLD: usize = 50;

/// Reorder tracks for smooth DJ flow.
///
/// Returns fresh copies annotated with `new_position` (1..N) and
/// `transition_score` (None on the anchor). Zero or one track comes back
/// unchanged. Output is a permutation of the input with the first element
/// fixed. Reordering is not idempotent: feeding the output back in keeps
/// the same anchor but greedy choices can still differ from a different
/// pool order.
pub fn reorder(tracks: &[Track]) -> Vec<Track> {
    reorder_with_progress(tracks, |_, _| {})
}

/// [`reorder`] with an observational progress callback, called as
/// `(placed, total)` after each placement. No cancellation.
pub fn reorder_with_progress(
    tracks: &[Track],
    mut on_placed: impl FnMut(usize, usize),
) -> Vec<Track> {
    let n = tracks.len();
    if n < 2 {
        return tracks.to_vec();
    }

    let matrix = if n > MATRIX_THRESHOLD {
        Some(score_matrix(tracks))
    } else {
        None
    };
    let score_at = |i: usize, j: usize| match &matrix {
        Some(m) => m[i][j],
        None => transition_score(&tracks[i], &tracks[j]),
    };

    // Indices into `tracks`; the pool keeps input order so ties resolve to
    // the first-encountered candidate (strict > below), which keeps output
    // reproducible.
    let mut ordered: Vec<(usize, Option<f64>)> = vec![(0, None)];
    let mut remaining: Vec<usize> = (1..n).collect();
    on_placed(1, n);

    while !remaining.is_empty() {
        let current = ordered.last().unwrap().0;
        let mut best_score = -1.0;
        let mut best_pos = 0;

        for (pos, &candidate) in remaining.iter().enumerate() {
            let score = score_at(current, candidate);
            if score > best_score {
                best_score = score;
                best_pos = pos;
            }
        }

        let winner = remaining.remove(best_pos);
        ordered.push((winner, Some(best_score)));
        on_placed(ordered.len(), n);
    }

    ordered
        .into_iter()
        .enumerate()
        .map(|(i, (idx, score))| {
            let mut t = tracks[idx].clone();
            t.new_position = Some(i + 1);
            t.transition_score = score;
            t
        })
        .collect()
}

/// Full pairwise score matrix, rows computed in parallel.
fn score_matrix(tracks: &[Track]) -> Vec<Vec<f64>> {
    let n = tracks.len();
    log::debug!("Precomputing {n}x{n} transition score matrix");
    (0..n)
        .into_par_iter()
        .map(|i| {
            (0..n)
                .map(|j| transition_score(&tracks[i], &tracks[j]))
                .collect()
        })
        .collect()
}
