use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use segue::analysis::{analyze_playlist, AnalyzeOptions};
use segue::camelot::{key_name, CamelotPosition};
use segue::catalog::HttpCatalog;
use segue::gaps;
use segue::model::{Recommendation, Track};
use segue::reorder;

#[derive(Parser)]
#[command(name = "segue", version, about = "DJ-style playlist transition analyzer")]
struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a playlist from the catalog, reorder it, and suggest bridges
    Analyze {
        /// Playlist share URL or URI
        playlist: String,

        /// Maximum number of bridge recommendations
        #[arg(short = 'n', long)]
        max_recommendations: Option<usize>,

        /// Skip bridge recommendation lookups
        #[arg(long)]
        no_bridges: bool,

        /// Also print the optimized list with bridges spliced in
        #[arg(long)]
        merged: bool,

        /// Write the full report as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Catalog API base URL (overrides config)
        #[arg(long)]
        api_url: Option<String>,

        /// Catalog API bearer token (overrides config and env)
        #[arg(long)]
        token: Option<String>,
    },

    /// Reorder a JSON track dump for smooth transitions (offline)
    Reorder {
        /// JSON file holding an array of tracks with audio descriptors
        input: PathBuf,

        /// Write the reordered tracks as JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Flag weak transitions in an ordered JSON track dump (offline)
    Gaps {
        /// JSON file holding an ordered array of tracks
        input: PathBuf,

        /// Score threshold (default 2.0, or 7.0 with --rough)
        #[arg(short, long)]
        threshold: Option<f64>,

        /// Use the aggregate-cost convention (higher cost = rougher)
        #[arg(long)]
        rough: bool,
    },

    /// Show the Camelot position for a pitch class and mode
    Key {
        /// Pitch class 0-11 (0 = C)
        key: i64,
        /// Mode: 1 = major, 0 = minor
        mode: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = segue::config::AppConfig::load();

    match cli.command {
        Commands::Analyze {
            playlist,
            max_recommendations,
            no_bridges,
            merged,
            output,
            api_url,
            token,
        } => {
            let token = token
                .or_else(|| config.resolve_token())
                .context("No API token. Set SEGUE_API_TOKEN or api_token in config.")?;
            let base_url = api_url.unwrap_or_else(|| config.api_base_url.clone());
            let catalog = HttpCatalog::new(base_url, token);

            let options = AnalyzeOptions {
                max_recommendations: max_recommendations.unwrap_or(config.max_recommendations),
                with_recommendations: !no_bridges,
            };

            let mut pb: Option<ProgressBar> = None;
            let report = analyze_playlist(&catalog, &playlist, &options, |placed, total| {
                let bar = pb.get_or_insert_with(|| make_progress_bar(total));
                bar.set_position(placed as u64);
            })
            .context("Analysis failed")?;
            if let Some(bar) = pb.take() {
                bar.finish_and_clear();
            }

            if report.optimized.is_empty() {
                println!("No usable tracks in this playlist.");
                return Ok(());
            }

            println!(
                "\"{}\" — {} tracks reordered",
                report.playlist_name,
                report.optimized.len()
            );
            println!();
            print_track_table(&report.optimized);

            let gap_pairs = gaps::find_gaps(&report.optimized, config.gap_threshold);
            if !gap_pairs.is_empty() {
                println!();
                println!(
                    "{} weak transition(s) below score {:.1}",
                    gap_pairs.len(),
                    config.gap_threshold
                );
            }

            if !report.recommendations.is_empty() {
                println!();
                println!("Bridge recommendations:");
                println!();
                print_recommendation_table(&report.recommendations);

                if merged {
                    println!();
                    println!("With bridges spliced in:");
                    println!();
                    print_track_table(&report.merged());
                }
            }

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&report)
                    .context("Failed to serialize report")?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!();
                println!("Report written to {}", path.display());
            }
        }

        Commands::Reorder { input, output } => {
            let tracks = load_tracks(&input)?;
            if tracks.len() < 2 {
                println!("Nothing to reorder ({} track(s)).", tracks.len());
                return Ok(());
            }

            let mut pb: Option<ProgressBar> = None;
            let ordered = reorder::reorder_with_progress(&tracks, |placed, total| {
                let bar = pb.get_or_insert_with(|| make_progress_bar(total));
                bar.set_position(placed as u64);
            });
            if let Some(bar) = pb.take() {
                bar.finish_and_clear();
            }

            print_track_table(&ordered);

            if let Some(path) = output {
                let json = serde_json::to_string_pretty(&ordered)
                    .context("Failed to serialize tracks")?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!();
                println!("Reordered tracks written to {}", path.display());
            }
        }

        Commands::Gaps { input, threshold, rough } => {
            let tracks = load_tracks(&input)?;

            let pairs = if rough {
                let threshold = threshold.unwrap_or(gaps::DEFAULT_ROUGHNESS_THRESHOLD);
                gaps::rough_transitions(&tracks, threshold)
            } else {
                let threshold = threshold.unwrap_or(config.gap_threshold);
                gaps::find_gaps(&tracks, threshold)
            };

            if pairs.is_empty() {
                println!("No weak transitions found.");
                return Ok(());
            }

            println!("{} weak transition(s):", pairs.len());
            println!();
            for (i, j) in pairs {
                let score = segue::scoring::transition_score(&tracks[i], &tracks[j]);
                let cost = segue::scoring::transition_cost(&tracks[i], &tracks[j]);
                println!(
                    "  {:>3} -> {:<3} {} -> {} (score {:.1}, cost {:.1})",
                    i + 1,
                    j + 1,
                    truncate(&tracks[i].name, 25),
                    truncate(&tracks[j].name, 25),
                    score,
                    cost,
                );
            }
        }

        Commands::Key { key, mode } => match CamelotPosition::from_key_mode(key, mode) {
            Some(pos) => {
                let name = key_name(key, mode).unwrap_or_else(|| "Unknown".to_string());
                println!("{name} = {pos}");
            }
            None => println!("Unknown key ({key}, {mode})"),
        },
    }

    Ok(())
}

/// Read a JSON array of tracks from disk.
fn load_tracks(path: &Path) -> Result<Vec<Track>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let tracks: Vec<Track> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(tracks)
}

fn make_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} tracks placed")
            .unwrap()
            .progress_chars("=>-"),
    );
    pb
}

/// Char-safe truncation with an ellipsis.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}

/// Print a table of tracks with transition scores.
fn print_track_table(tracks: &[Track]) {
    println!(
        "{:>4} {:<28} {:<20} {:>6} {:>4} {:>4} {:>4} {:>6}",
        "Pos", "Track", "Artist", "BPM", "Key", "Eng", "Val", "Score"
    );
    println!("{}", "-".repeat(84));

    for t in tracks {
        let bpm = t.tempo.map_or("-".to_string(), |v| format!("{v:.0}"));
        let key = t.camelot.map_or("?".to_string(), |c| c.to_string());
        let energy = t.energy.map_or("-".to_string(), |v| format!("{v:.2}"));
        let valence = t.valence.map_or("-".to_string(), |v| format!("{v:.2}"));
        let score = t.transition_score.map_or("-".to_string(), |v| format!("{v:.2}"));

        println!(
            "{:>4} {:<28} {:<20} {:>6} {:>4} {:>4} {:>4} {:>6}",
            t.new_position.unwrap_or(t.position),
            truncate(&t.name, 28),
            truncate(&t.artist_line(), 20),
            bpm,
            key,
            energy,
            valence,
            score,
        );
    }

    println!();
    println!("Score = transition from the previous track (0-5, higher is smoother)");
}

/// Print a table of bridge recommendations.
fn print_recommendation_table(recommendations: &[Recommendation]) {
    println!(
        "{:>5} {:<28} {:<20} {:>6} {:>4} {:>5} {:>5}",
        "After", "Track", "Artist", "BPM", "Key", "In", "Out"
    );
    println!("{}", "-".repeat(80));

    for r in recommendations {
        let t = &r.track;
        let bpm = t.tempo.map_or("-".to_string(), |v| format!("{v:.0}"));
        let key = t.camelot.map_or("?".to_string(), |c| c.to_string());

        println!(
            "{:>5} {:<28} {:<20} {:>6} {:>4} {:>5.1} {:>5.1}",
            r.position_to_insert,
            truncate(&t.name, 28),
            truncate(&t.artist_line(), 20),
            bpm,
            key,
            r.score_from_prev,
            r.score_to_next,
        );
    }

    println!();
    println!("In/Out = transition scores from the preceding and to the following track");
}
