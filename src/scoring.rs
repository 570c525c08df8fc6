//! Pairwise transition scoring.
//!
//! Two conventions live here and must never be mixed in one call path:
//!
//! - [`transition_score`]: higher-is-better, 0-5. Drives reordering and the
//!   recommendation gap threshold.
//! - [`transition_cost`]: lower-is-better aggregate penalty. Used only for
//!   roughness reporting over an already-ordered sequence.

use crate::model::Track;

/// Maximum value of [`transition_score`]: perfect tempo + key + energy + valence.
pub const MAX_SCORE: f64 = 5.0;

/// Score the transition from `a` into `b`. Higher is smoother; range 0-5.
///
/// A term whose inputs are missing on either side (or an unknown key)
/// contributes zero — scoring never fails.
pub fn transition_score(a: &Track, b: &Track) -> f64 {
    let mut score = 0.0;

    // Tempo compatibility (0-2): closer BPMs mix better
    if let (Some(t1), Some(t2)) = (a.tempo, b.tempo) {
        let bpm_diff = (t1 - t2).abs();
        score += if bpm_diff <= 3.0 {
            2.0
        } else if bpm_diff <= 6.0 {
            1.5
        } else if bpm_diff <= 10.0 {
            1.0
        } else if bpm_diff <= 15.0 {
            0.5
        } else {
            0.0
        };
    }

    // Key compatibility (0-2) on the Camelot wheel
    if let (Some(c1), Some(c2)) = (a.camelot, b.camelot) {
        score += if c1 == c2 {
            2.0 // perfect key match
        } else if c1.ring == c2.ring && c1.adjacent_number(c2) {
            1.5 // neighboring hour, same ring
        } else if c1.is_relative(c2) {
            1.5 // relative major/minor
        } else if c1.ring != c2.ring && c1.adjacent_number(c2) {
            1.0 // diagonal
        } else {
            0.0
        };
    }

    // Energy progression (0-0.5): gradual changes are better
    if let (Some(e1), Some(e2)) = (a.energy, b.energy) {
        let diff = (e1 - e2).abs();
        if diff <= 0.2 {
            score += 0.5;
        } else if diff <= 0.3 {
            score += 0.3;
        }
    }

    // Valence (mood) progression (0-0.5)
    if let (Some(v1), Some(v2)) = (a.valence, b.valence) {
        let diff = (v1 - v2).abs();
        if diff <= 0.2 {
            score += 0.5;
        } else if diff <= 0.3 {
            score += 0.3;
        }
    }

    score
}

/// Aggregate transition penalty from `a` into `b`. Lower is smoother.
///
/// The inverse convention: key mismatch 0/1/2 ×3, tempo-ratio 0/1/3/5 ×2,
/// plus |Δenergy|×3 and |Δvalence|×2. Missing descriptors fail closed
/// toward the worst case, so an unanalyzed pair reads as rough rather
/// than smooth.
pub fn transition_cost(a: &Track, b: &Track) -> f64 {
    let key_penalty = match (a.camelot, b.camelot) {
        (Some(c1), Some(c2)) => {
            if c1 == c2 {
                0.0
            } else if c1.is_relative(c2) || (c1.ring == c2.ring && c1.adjacent_number(c2)) {
                1.0
            } else {
                2.0
            }
        }
        _ => 2.0,
    };

    let tempo_penalty = match (a.tempo, b.tempo) {
        (Some(t1), Some(t2)) if t1 > 0.0 && t2 > 0.0 => {
            if (t1 - t2).abs() < 3.0 {
                0.0
            } else {
                let ratio = t1.max(t2) / t1.min(t2);
                if ratio <= 1.06 {
                    1.0
                } else if ratio <= 1.12 {
                    3.0
                } else {
                    5.0
                }
            }
        }
        _ => 5.0,
    };

    let energy_diff = match (a.energy, b.energy) {
        (Some(e1), Some(e2)) => (e1 - e2).abs(),
        _ => 1.0,
    };
    let valence_diff = match (a.valence, b.valence) {
        (Some(v1), Some(v2)) => (v1 - v2).abs(),
        _ => 1.0,
    };

    key_penalty * 3.0 + tempo_penalty * 2.0 + energy_diff * 3.0 + valence_diff * 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::test_fixtures::{bare_track, track};

    #[test]
    fn test_identical_track_scores_maximum() {
        let a = track("a", 1, 120.0, "8A", 0.5, 0.5);
        assert_eq!(transition_score(&a, &a), MAX_SCORE);
    }

    #[test]
    fn test_reference_scenario() {
        // A(120, 8A, 0.5, 0.5), B(122, 8A, 0.55, 0.5), C(180, 3B, 0.9, 0.9)
        let a = track("a", 1, 120.0, "8A", 0.5, 0.5);
        let b = track("b", 2, 122.0, "8A", 0.55, 0.5);
        let c = track("c", 3, 180.0, "3B", 0.9, 0.9);

        // 2 (tempo, diff 2) + 2 (same key) + 0.5 (energy, diff 0.05) + 0.5 (valence)
        assert_eq!(transition_score(&a, &b), 5.0);
        // Everything out of range
        assert_eq!(transition_score(&a, &c), 0.0);
    }

    #[test]
    fn test_tempo_ladder() {
        let base = track("a", 1, 120.0, "8A", 0.5, 0.5);
        let at = |bpm: f64| {
            let mut t = base.clone();
            t.tempo = Some(bpm);
            // isolate the tempo term
            t.camelot = None;
            t.energy = None;
            t.valence = None;
            let mut other = base.clone();
            other.camelot = None;
            other.energy = None;
            other.valence = None;
            transition_score(&other, &t)
        };
        assert_eq!(at(123.0), 2.0);
        assert_eq!(at(126.0), 1.5);
        assert_eq!(at(130.0), 1.0);
        assert_eq!(at(135.0), 0.5);
        assert_eq!(at(136.0), 0.0);
    }

    #[test]
    fn test_key_terms() {
        let isolated = |c1: &str, c2: &str| {
            let mut a = bare_track("a", 1);
            let mut b = bare_track("b", 2);
            a.camelot = Some(c1.parse().unwrap());
            b.camelot = Some(c2.parse().unwrap());
            transition_score(&a, &b)
        };
        assert_eq!(isolated("8A", "8A"), 2.0); // same position
        assert_eq!(isolated("8A", "9A"), 1.5); // neighbor, same ring
        assert_eq!(isolated("12A", "1A"), 1.5); // neighbor across the wrap
        assert_eq!(isolated("8A", "8B"), 1.5); // relative
        assert_eq!(isolated("8A", "9B"), 1.0); // diagonal
        assert_eq!(isolated("8A", "7B"), 1.0); // diagonal, other side
        assert_eq!(isolated("8A", "3B"), 0.0); // unrelated
    }

    #[test]
    fn test_missing_fields_contribute_zero() {
        let full = track("a", 1, 120.0, "8A", 0.5, 0.5);
        let empty = bare_track("b", 2);
        assert_eq!(transition_score(&full, &empty), 0.0);
        assert_eq!(transition_score(&empty, &empty), 0.0);
    }

    #[test]
    fn test_unknown_key_contributes_zero() {
        let mut a = track("a", 1, 120.0, "8A", 0.5, 0.5);
        let mut b = a.clone();
        a.camelot = None;
        b.camelot = None;
        // tempo 2 + energy 0.5 + valence 0.5, no key term
        assert_eq!(transition_score(&a, &b), 3.0);
    }

    #[test]
    fn test_energy_band_edges() {
        let a = track("a", 1, 120.0, "8A", 0.5, 0.5);
        let mut b = a.clone();
        b.energy = Some(0.75); // diff 0.25 -> 0.3 points
        assert!((transition_score(&a, &b) - 4.8).abs() < 1e-9);
        b.energy = Some(0.85); // diff 0.35 -> 0 points
        assert_eq!(transition_score(&a, &b), 4.5);
    }

    #[test]
    fn test_cost_identical_pair_is_zero() {
        let a = track("a", 1, 120.0, "8A", 0.5, 0.5);
        assert_eq!(transition_cost(&a, &a), 0.0);
    }

    #[test]
    fn test_cost_rough_pair() {
        let a = track("a", 1, 120.0, "8A", 0.5, 0.5);
        let c = track("c", 3, 180.0, "3B", 0.9, 0.9);
        // key 2*3 + tempo 5*2 (ratio 1.5) + 0.4*3 + 0.4*2
        let cost = transition_cost(&a, &c);
        assert!((cost - 18.0).abs() < 1e-9);
        assert!(cost > 7.0);
    }

    #[test]
    fn test_cost_tempo_ratio_bands() {
        let at = |bpm: f64| {
            let mut a = bare_track("a", 1);
            let mut b = bare_track("b", 2);
            a.tempo = Some(100.0);
            b.tempo = Some(bpm);
            // key unknown (2*3=6) + energy/valence missing (3+2=5) are constant here
            transition_cost(&a, &b) - 11.0
        };
        assert_eq!(at(101.0), 0.0); // |diff| < 3
        assert_eq!(at(105.0), 2.0); // ratio 1.05 -> 1*2
        assert_eq!(at(110.0), 6.0); // ratio 1.10 -> 3*2
        assert_eq!(at(150.0), 10.0); // ratio 1.50 -> 5*2
    }

    #[test]
    fn test_cost_missing_descriptors_fail_closed() {
        let empty = bare_track("a", 1);
        // 2*3 + 5*2 + 1*3 + 1*2 = 21
        assert_eq!(transition_cost(&empty, &empty), 21.0);
    }
}
