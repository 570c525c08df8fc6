//! One-shot playlist analysis: fetch, enrich, reorder, recommend.
//!
//! Each run returns an immutable [`AnalysisReport`] owned by the caller —
//! there is no session state inside the library.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::catalog::Catalog;
use crate::gaps;
use crate::model::{Recommendation, Track};
use crate::reorder;

/// Knobs for one analysis run.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Cap on bridge recommendations.
    pub max_recommendations: usize,
    /// Skip the per-gap catalog lookups entirely.
    pub with_recommendations: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            max_recommendations: gaps::MAX_RECOMMENDATIONS,
            with_recommendations: true,
        }
    }
}

/// Everything one analysis run produced.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub playlist_name: String,
    /// Tracks in source order, enriched with audio descriptors.
    pub original: Vec<Track>,
    /// Reordered tracks with `new_position` and `transition_score`.
    pub optimized: Vec<Track>,
    pub recommendations: Vec<Recommendation>,
}

impl AnalysisReport {
    /// Optimized sequence with accepted recommendations spliced in.
    pub fn merged(&self) -> Vec<Track> {
        gaps::merge_recommendations(&self.optimized, &self.recommendations)
    }
}

/// Fetch a playlist from the catalog, enrich it with audio features,
/// reorder it for smooth transitions, and (optionally) collect bridge
/// recommendations for the gaps that remain.
///
/// `on_placed` is called as `(placed, total)` while the reorderer runs;
/// pass `|_, _| {}` when progress is not interesting.
pub fn analyze_playlist(
    catalog: &dyn Catalog,
    reference: &str,
    options: &AnalyzeOptions,
    on_placed: impl FnMut(usize, usize),
) -> Result<AnalysisReport> {
    let playlist = catalog
        .fetch_tracks(reference)
        .context("Failed to fetch playlist")?;

    if playlist.tracks.is_empty() {
        log::warn!("Playlist \"{}\" has no usable tracks", playlist.name);
        return Ok(AnalysisReport {
            playlist_name: playlist.name,
            original: Vec::new(),
            optimized: Vec::new(),
            recommendations: Vec::new(),
        });
    }

    let mut original = playlist.tracks;
    let ids: Vec<String> = original.iter().map(|t| t.id.clone()).collect();
    let features = catalog
        .fetch_audio_features(&ids)
        .context("Failed to fetch audio features")?;

    for track in &mut original {
        if let Some(f) = features.get(&track.id) {
            track.apply_features(f);
        } else {
            log::debug!("No audio features for \"{}\"", track.name);
        }
    }

    log::info!(
        "Reordering {} tracks from \"{}\"",
        original.len(),
        playlist.name
    );
    let optimized = reorder::reorder_with_progress(&original, on_placed);

    let recommendations = if options.with_recommendations {
        gaps::recommend_bridges(&optimized, catalog, options.max_recommendations)
    } else {
        Vec::new()
    };

    Ok(AnalysisReport {
        playlist_name: playlist.name,
        original,
        optimized,
        recommendations,
    })
}
