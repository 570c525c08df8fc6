use serde::{Deserialize, Serialize};

use crate::camelot::{self, CamelotPosition};

/// A playlist track with its audio descriptors.
///
/// Every descriptor is optional: the catalog may not have features for a
/// track, and the scorer must be able to tell "missing" apart from
/// "present and zero" (a missing field contributes nothing to a score;
/// an energy of 0.0 still gets compared).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,

    /// 1-based position in the source playlist.
    pub position: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tempo: Option<f64>,
    /// Pitch class 0-11; the catalog uses -1 for "no key detected".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<i64>,
    /// 1 = major, 0 = minor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camelot: Option<CamelotPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub danceability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acousticness: Option<f64>,

    /// 1-based position after reordering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_position: Option<usize>,
    /// Score of the transition from the preceding track in the reordered
    /// sequence. None for the anchor track (not zero).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_score: Option<f64>,
}

impl Track {
    /// Merge catalog audio features into this track and derive the
    /// Camelot position from (key, mode).
    pub fn apply_features(&mut self, f: &AudioFeatures) {
        self.tempo = f.tempo;
        self.key = f.key;
        self.mode = f.mode;
        self.energy = f.energy;
        self.valence = f.valence;
        self.danceability = f.danceability;
        self.acousticness = f.acousticness;
        self.camelot = match (f.key, f.mode) {
            (Some(k), Some(m)) => CamelotPosition::from_key_mode(k, m),
            _ => None,
        };
    }

    /// Human-readable key name ("A Minor"), or None when the key is unknown.
    pub fn key_name(&self) -> Option<String> {
        match (self.key, self.mode) {
            (Some(k), Some(m)) => camelot::key_name(k, m),
            _ => None,
        }
    }

    /// Comma-joined artist names for display.
    pub fn artist_line(&self) -> String {
        self.artists.join(", ")
    }
}

/// Audio descriptors for one track, as returned by the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioFeatures {
    #[serde(default)]
    pub tempo: Option<f64>,
    #[serde(default)]
    pub key: Option<i64>,
    #[serde(default)]
    pub mode: Option<i64>,
    #[serde(default)]
    pub energy: Option<f64>,
    #[serde(default)]
    pub valence: Option<f64>,
    #[serde(default)]
    pub danceability: Option<f64>,
    #[serde(default)]
    pub acousticness: Option<f64>,
}

/// Target descriptor values for a bridge-track lookup: the arithmetic mean
/// of the two boundary tracks, per descriptor, only where both sides have
/// the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetFeatures {
    pub tempo: Option<f64>,
    pub energy: Option<f64>,
    pub valence: Option<f64>,
    pub danceability: Option<f64>,
    pub acousticness: Option<f64>,
}

impl TargetFeatures {
    /// Midpoint of two boundary tracks.
    pub fn between(a: &Track, b: &Track) -> Self {
        let mid = |x: Option<f64>, y: Option<f64>| match (x, y) {
            (Some(x), Some(y)) => Some((x + y) / 2.0),
            _ => None,
        };
        Self {
            tempo: mid(a.tempo, b.tempo),
            energy: mid(a.energy, b.energy),
            valence: mid(a.valence, b.valence),
            danceability: mid(a.danceability, b.danceability),
            acousticness: mid(a.acousticness, b.acousticness),
        }
    }
}

/// A bridge-track suggestion for one weak transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub track: Track,
    /// 1-based position of the track after which this one should be
    /// spliced into the reordered sequence.
    pub position_to_insert: usize,
    pub score_from_prev: f64,
    pub score_to_next: f64,
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;

    /// Build a fully-specified track for scoring/reordering tests.
    pub fn track(id: &str, position: usize, tempo: f64, camelot: &str, energy: f64, valence: f64) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Track {id}"),
            artists: vec!["Test Artist".to_string()],
            uri: None,
            duration_ms: Some(200_000),
            position,
            tempo: Some(tempo),
            key: None,
            mode: None,
            camelot: Some(camelot.parse().unwrap()),
            energy: Some(energy),
            valence: Some(valence),
            danceability: Some(0.5),
            acousticness: Some(0.1),
            new_position: None,
            transition_score: None,
        }
    }

    /// Build a track with no audio descriptors at all.
    pub fn bare_track(id: &str, position: usize) -> Track {
        Track {
            id: id.to_string(),
            name: format!("Track {id}"),
            artists: vec![],
            uri: None,
            duration_ms: None,
            position,
            tempo: None,
            key: None,
            mode: None,
            camelot: None,
            energy: None,
            valence: None,
            danceability: None,
            acousticness: None,
            new_position: None,
            transition_score: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_fixtures::*;
    use super::*;

    #[test]
    fn test_apply_features_derives_camelot() {
        let mut t = bare_track("x", 1);
        let f = AudioFeatures {
            tempo: Some(120.0),
            key: Some(9),
            mode: Some(0),
            energy: Some(0.7),
            valence: Some(0.4),
            danceability: Some(0.8),
            acousticness: Some(0.05),
        };
        t.apply_features(&f);
        assert_eq!(t.camelot.unwrap().to_string(), "8A");
        assert_eq!(t.key_name().as_deref(), Some("A Minor"));
        assert_eq!(t.tempo, Some(120.0));
    }

    #[test]
    fn test_apply_features_invalid_key_is_unknown() {
        let mut t = bare_track("x", 1);
        let f = AudioFeatures {
            key: Some(-1),
            mode: Some(1),
            ..Default::default()
        };
        t.apply_features(&f);
        assert!(t.camelot.is_none());
        assert!(t.key_name().is_none());
    }

    #[test]
    fn test_target_features_midpoint() {
        let a = track("a", 1, 120.0, "8A", 0.4, 0.2);
        let b = track("b", 2, 130.0, "9A", 0.6, 0.8);
        let target = TargetFeatures::between(&a, &b);
        assert_eq!(target.tempo, Some(125.0));
        assert_eq!(target.energy, Some(0.5));
        assert_eq!(target.valence, Some(0.5));
    }

    #[test]
    fn test_target_features_missing_side_drops_field() {
        let a = track("a", 1, 120.0, "8A", 0.4, 0.2);
        let b = bare_track("b", 2);
        let target = TargetFeatures::between(&a, &b);
        assert_eq!(target.tempo, None);
        assert_eq!(target.energy, None);
    }

    #[test]
    fn test_track_json_roundtrip() {
        let t = track("abc123", 3, 128.0, "5B", 0.9, 0.6);
        let json = serde_json::to_string(&t).unwrap();
        assert!(json.contains("\"5B\""));
        let back: Track = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, "abc123");
        assert_eq!(back.camelot, t.camelot);
        assert!(back.transition_score.is_none());
    }
}
