//! Weak-transition detection and bridge-track recommendation.
//!
//! Gap detection walks an ordered sequence and flags consecutive pairs whose
//! transition score falls under a threshold. For each flagged gap (up to a
//! cap, earliest first) the catalog is asked for one bridge candidate
//! steered toward the midpoint of the boundary tracks' descriptors.

use crate::catalog::Catalog;
use crate::model::{Recommendation, TargetFeatures, Track};
use crate::scoring::{transition_cost, transition_score};

/// Default threshold for standalone gap detection (higher-is-better scores).
pub const DEFAULT_GAP_THRESHOLD: f64 = 2.0;

/// Threshold used by the recommendation path.
pub const RECOMMENDATION_GAP_THRESHOLD: f64 = 2.5;

/// Default threshold for [`rough_transitions`] (lower-is-better costs).
pub const DEFAULT_ROUGHNESS_THRESHOLD: f64 = 7.0;

/// Cap on bridge recommendations per run.
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Flag consecutive pairs whose transition score falls below `threshold`.
///
/// Reuses the `transition_score` annotation left by the reorderer when
/// present, otherwise scores the pair directly. Returns `(i, i + 1)` index
/// pairs in sequence order. Empty or single-track input flags nothing.
pub fn find_gaps(tracks: &[Track], threshold: f64) -> Vec<(usize, usize)> {
    let mut gaps = Vec::new();
    for i in 0..tracks.len().saturating_sub(1) {
        let score = tracks[i + 1]
            .transition_score
            .unwrap_or_else(|| transition_score(&tracks[i], &tracks[i + 1]));
        if score < threshold {
            gaps.push((i, i + 1));
        }
    }
    gaps
}

/// Flag consecutive pairs whose aggregate transition cost exceeds
/// `threshold` (the inverse convention). Reporting only — the
/// recommendation path runs on [`find_gaps`] scores.
pub fn rough_transitions(tracks: &[Track], threshold: f64) -> Vec<(usize, usize)> {
    let mut rough = Vec::new();
    for i in 0..tracks.len().saturating_sub(1) {
        if transition_cost(&tracks[i], &tracks[i + 1]) > threshold {
            rough.push((i, i + 1));
        }
    }
    rough
}

/// Ask the catalog for bridge tracks to smooth the weakest transitions.
///
/// Gaps are taken in sequence order and capped at `max_count`. A failed
/// catalog lookup skips that gap and moves on; it never aborts the run.
pub fn recommend_bridges(
    tracks: &[Track],
    catalog: &dyn Catalog,
    max_count: usize,
) -> Vec<Recommendation> {
    let mut gap_indices = find_gaps(tracks, RECOMMENDATION_GAP_THRESHOLD);
    gap_indices.truncate(max_count);

    let mut recommendations = Vec::new();

    for (i, _) in gap_indices {
        let current = &tracks[i];
        let next = &tracks[i + 1];
        let target = TargetFeatures::between(current, next);
        let seeds = [current.id.as_str(), next.id.as_str()];

        match catalog.fetch_candidate(&seeds, &target) {
            Ok(Some(candidate)) => {
                let score_from_prev = transition_score(current, &candidate);
                let score_to_next = transition_score(&candidate, next);
                log::info!(
                    "Bridge for gap after \"{}\": \"{}\" ({score_from_prev:.1} in, {score_to_next:.1} out)",
                    current.name,
                    candidate.name
                );
                recommendations.push(Recommendation {
                    track: candidate,
                    position_to_insert: i + 1,
                    score_from_prev,
                    score_to_next,
                });
            }
            Ok(None) => {
                log::debug!("No bridge candidate for gap after \"{}\"", current.name);
            }
            Err(e) => {
                log::warn!("Bridge lookup failed for gap after \"{}\": {e}", current.name);
            }
        }
    }

    recommendations
}

/// Splice accepted recommendations into the reordered sequence.
///
/// Recommendations go in ascending `position_to_insert` order with a
/// running offset, so each lands immediately after its intended boundary
/// track even as earlier insertions shift the list. Positions come back
/// renumbered 1..N.
pub fn merge_recommendations(tracks: &[Track], recommendations: &[Recommendation]) -> Vec<Track> {
    let mut merged: Vec<Track> = tracks.to_vec();

    let mut sorted: Vec<&Recommendation> = recommendations.iter().collect();
    sorted.sort_by_key(|r| r.position_to_insert);

    for (offset, rec) in sorted.into_iter().enumerate() {
        // 1-based "after position p" is a 0-based insert at index p.
        let insert_at = (rec.position_to_insert + offset).min(merged.len());
        merged.insert(insert_at, rec.track.clone());
    }

    for (i, track) in merged.iter_mut().enumerate() {
        track.new_position = Some(i + 1);
    }

    merged
}
