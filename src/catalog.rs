//! Catalog client: the external collaborator that supplies track records,
//! audio descriptors, and bridge-track candidates.
//!
//! The [`Catalog`] trait is the seam the core depends on; [`HttpCatalog`]
//! is the real bearer-token Web API implementation. Authentication flows,
//! retry policy, and playlist write-back are the caller's problem.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::model::{AudioFeatures, TargetFeatures, Track};

/// Upstream feature endpoint caps batches at 100 ids per call.
pub const FEATURES_BATCH_SIZE: usize = 100;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid playlist reference: {0}")]
    InvalidReference(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),
    #[error("Unexpected catalog response: {0}")]
    Response(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

/// A fetched playlist: display name plus its tracks in source order.
#[derive(Debug, Clone)]
pub struct Playlist {
    pub name: String,
    pub tracks: Vec<Track>,
}

/// What the core needs from the music catalog.
pub trait Catalog {
    /// Fetch a playlist's tracks in source order. Unavailable entries are
    /// skipped; surviving tracks keep 1-based source positions.
    fn fetch_tracks(&self, reference: &str) -> Result<Playlist>;

    /// Fetch audio descriptors for the given track ids, batched internally.
    /// Tracks the catalog has no features for are simply absent from the map.
    fn fetch_audio_features(&self, ids: &[String]) -> Result<HashMap<String, AudioFeatures>>;

    /// Fetch at most one candidate track seeded by the boundary ids and
    /// steered toward the target descriptors.
    fn fetch_candidate(&self, seed_ids: &[&str], target: &TargetFeatures) -> Result<Option<Track>>;
}

static PLAYLIST_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"playlist/([a-zA-Z0-9]+)").unwrap());
static PLAYLIST_URI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"playlist:([a-zA-Z0-9]+)").unwrap());

/// Extract the playlist id from a share URL ("…/playlist/<id>?si=…") or a
/// URI ("…playlist:<id>").
pub fn extract_playlist_id(reference: &str) -> Option<&str> {
    PLAYLIST_URL_RE
        .captures(reference)
        .or_else(|| PLAYLIST_URI_RE.captures(reference))
        .map(|c| c.get(1).unwrap().as_str())
}

/// Bearer-token Web API catalog client.
pub struct HttpCatalog {
    base_url: String,
    token: String,
}

// Wire structs — only the fields we read.

#[derive(Debug, Deserialize)]
struct PlaylistInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct PlaylistItemsPage {
    items: Vec<PlaylistItem>,
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    /// Null for tracks unavailable in the caller's market.
    track: Option<ApiTrack>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    id: Option<String>,
    name: String,
    uri: Option<String>,
    duration_ms: Option<u64>,
    #[serde(default)]
    artists: Vec<ApiArtist>,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct FeaturesPage {
    audio_features: Vec<Option<ApiAudioFeatures>>,
}

#[derive(Debug, Deserialize)]
struct ApiAudioFeatures {
    id: String,
    tempo: Option<f64>,
    key: Option<i64>,
    mode: Option<i64>,
    energy: Option<f64>,
    valence: Option<f64>,
    danceability: Option<f64>,
    acousticness: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RecommendationsPage {
    tracks: Vec<ApiTrack>,
}

impl HttpCatalog {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            token: token.into(),
        }
    }

    fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T> {
        log::debug!("GET {url}");
        let parsed = ureq::get(url)
            .header("Authorization", &format!("Bearer {}", self.token))
            .call()?
            .body_mut()
            .read_json()?;
        Ok(parsed)
    }

    fn api_track_to_track(t: ApiTrack, position: usize) -> Option<Track> {
        let id = t.id?;
        Some(Track {
            id,
            name: t.name,
            artists: t.artists.into_iter().map(|a| a.name).collect(),
            uri: t.uri,
            duration_ms: t.duration_ms,
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
        })
    }
}

impl Catalog for HttpCatalog {
    fn fetch_tracks(&self, reference: &str) -> Result<Playlist> {
        let id = extract_playlist_id(reference)
            .ok_or_else(|| CatalogError::InvalidReference(reference.to_string()))?;

        let info: PlaylistInfo = self.get_json(&format!("{}/playlists/{id}", self.base_url))?;

        let mut items = Vec::new();
        let mut url = format!("{}/playlists/{id}/tracks", self.base_url);
        loop {
            let page: PlaylistItemsPage = self.get_json(&url)?;
            items.extend(page.items);
            match page.next {
                Some(next) => url = next,
                None => break,
            }
        }

        let mut tracks = Vec::new();
        for (i, item) in items.into_iter().enumerate() {
            // Null entries are tracks no longer available — skip them but
            // keep the source position numbering.
            let Some(api_track) = item.track else {
                log::debug!("Skipping unavailable track at position {}", i + 1);
                continue;
            };
            if let Some(track) = Self::api_track_to_track(api_track, i + 1) {
                tracks.push(track);
            }
        }

        log::info!("Fetched {} tracks from \"{}\"", tracks.len(), info.name);
        Ok(Playlist {
            name: info.name,
            tracks,
        })
    }

    fn fetch_audio_features(&self, ids: &[String]) -> Result<HashMap<String, AudioFeatures>> {
        let mut features = HashMap::with_capacity(ids.len());

        for batch in ids.chunks(FEATURES_BATCH_SIZE) {
            let url = format!("{}/audio-features?ids={}", self.base_url, batch.join(","));
            let page: FeaturesPage = self.get_json(&url)?;

            for f in page.audio_features.into_iter().flatten() {
                features.insert(
                    f.id,
                    AudioFeatures {
                        tempo: f.tempo,
                        key: f.key,
                        mode: f.mode,
                        energy: f.energy,
                        valence: f.valence,
                        danceability: f.danceability,
                        acousticness: f.acousticness,
                    },
                );
            }
        }

        log::info!("Fetched audio features for {}/{} tracks", features.len(), ids.len());
        Ok(features)
    }

    fn fetch_candidate(&self, seed_ids: &[&str], target: &TargetFeatures) -> Result<Option<Track>> {
        let mut url = format!(
            "{}/recommendations?limit=1&seed_tracks={}",
            self.base_url,
            seed_ids.join(",")
        );
        let mut push_target = |name: &str, value: Option<f64>| {
            if let Some(v) = value {
                url.push_str(&format!("&target_{name}={v}"));
            }
        };
        push_target("tempo", target.tempo);
        push_target("energy", target.energy);
        push_target("valence", target.valence);
        push_target("danceability", target.danceability);
        push_target("acousticness", target.acousticness);

        let page: RecommendationsPage = self.get_json(&url)?;
        let Some(api_track) = page.tracks.into_iter().next() else {
            return Ok(None);
        };

        let mut track = match Self::api_track_to_track(api_track, 0) {
            Some(t) => t,
            None => return Ok(None),
        };

        // Candidates need descriptors too, or they can't be scored against
        // the boundary tracks.
        let fetched = self.fetch_audio_features(std::slice::from_ref(&track.id))?;
        if let Some(f) = fetched.get(&track.id) {
            track.apply_features(f);
        }

        Ok(Some(track))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_playlist_id_url_forms() {
        assert_eq!(
            extract_playlist_id("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M"),
            Some("37i9dQZF1DXcBWIGoYBM5M")
        );
        assert_eq!(
            extract_playlist_id("https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc123"),
            Some("37i9dQZF1DXcBWIGoYBM5M")
        );
        assert_eq!(
            extract_playlist_id("spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"),
            Some("37i9dQZF1DXcBWIGoYBM5M")
        );
        assert_eq!(extract_playlist_id("https://example.com/album/xyz"), None);
        assert_eq!(extract_playlist_id(""), None);
    }

    #[test]
    fn test_playlist_page_deserialize_with_null_track() {
        let json = r#"{
            "items": [
                {"track": {"id": "t1", "name": "One", "uri": "uri:t1", "duration_ms": 1000,
                           "artists": [{"name": "X"}, {"name": "Y"}]}},
                {"track": null}
            ],
            "next": null
        }"#;
        let page: PlaylistItemsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.items[1].track.is_none());
        let t = page.items[0].track.as_ref().unwrap();
        assert_eq!(t.artists.len(), 2);
        assert!(page.next.is_none());
    }

    #[test]
    fn test_features_page_deserialize_with_null_entry() {
        let json = r#"{"audio_features": [
            {"id": "t1", "tempo": 120.5, "key": 9, "mode": 0, "energy": 0.8,
             "valence": 0.3, "danceability": 0.7, "acousticness": 0.01},
            null
        ]}"#;
        let page: FeaturesPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.audio_features.len(), 2);
        assert!(page.audio_features[1].is_none());
        let f = page.audio_features[0].as_ref().unwrap();
        assert_eq!(f.tempo, Some(120.5));
        assert_eq!(f.key, Some(9));
    }

    #[test]
    fn test_api_track_without_id_is_dropped() {
        let api = ApiTrack {
            id: None,
            name: "local file".into(),
            uri: None,
            duration_ms: None,
            artists: vec![],
        };
        assert!(HttpCatalog::api_track_to_track(api, 3).is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let c = HttpCatalog::new("https://api.example.com/v1/", "tok");
        assert_eq!(c.base_url, "https://api.example.com/v1");
    }
}
