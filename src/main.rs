use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use listening_stats::analytics::{AnalyticsConfig, SessionAnalyzer};
use listening_stats::config::load_config;
use listening_stats::patterns::ListeningPatterns;
use listening_stats::stats::HistoryStats;
use listening_stats::store::EventStore;

#[derive(Parser)]
#[command(name = "listening-stats")]
#[command(about = "Session clustering and listening statistics for streaming history exports")]
#[command(version)]
struct Args {
    /// Directory containing the streaming_*.json export files
    /// (defaults to STREAMING_DATA_DIR from the environment, then ./data)
    #[arg(short = 'd', long = "data-dir")]
    data_dir: Option<PathBuf>,

    /// Path to an analytics configuration JSON file
    #[arg(short = 'c', long = "config")]
    config_file: Option<String>,

    /// Number of entries to show in ranked lists and recent assignments
    #[arg(short = 'l', long = "limit", default_value_t = 10)]
    limit: usize,

    /// Emit the full reports as a single JSON document instead of text
    #[arg(long = "json")]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let analytics_config = match &args.config_file {
        Some(path) => {
            // Validate that the configuration file exists before proceeding
            if !std::path::Path::new(path).exists() {
                eprintln!("Error: Analytics configuration file '{path}' not found.");
                return Err(anyhow::anyhow!("Configuration file '{}' not found", path));
            }
            AnalyticsConfig::load_from_file(path)
                .map_err(|e| anyhow::anyhow!("Failed to load analytics configuration: {}", e))?
        }
        None => AnalyticsConfig::default(),
    };

    let data_dir = args.data_dir.unwrap_or_else(|| load_config().data_dir);
    let store = EventStore::load(&data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to load streaming history: {}", e))?;

    let analyzer = SessionAnalyzer::new(analytics_config.clone());
    let patterns = ListeningPatterns::new(analytics_config);

    if args.json {
        return print_json(&store, &analyzer, &patterns, args.limit);
    }

    print_overview(&store, args.limit);
    print_patterns(&store, &patterns, args.limit);
    print_clusters(&store, &analyzer, args.limit);

    Ok(())
}

fn print_overview(store: &EventStore, limit: usize) {
    let overview = HistoryStats::overview(store);
    println!("=== STREAMING HISTORY OVERVIEW ===");
    println!(
        "Streams: {} | Hours: {:.2} | Tracks: {} | Artists: {} | Albums: {}",
        overview.total_streams,
        overview.total_hours,
        overview.unique_tracks,
        overview.unique_artists,
        overview.unique_albums
    );

    println!("\nTop artists:");
    for (i, entry) in HistoryStats::top_artists(store, limit).iter().enumerate() {
        println!("  {}. {} ({} streams)", i + 1, entry.artist, entry.streams);
    }

    println!("\nTop tracks:");
    for (i, entry) in HistoryStats::top_tracks(store, limit).iter().enumerate() {
        println!(
            "  {}. \"{}\" by {} ({} streams)",
            i + 1,
            entry.track,
            entry.artist,
            entry.streams
        );
    }

    println!("\nPlatforms:");
    for entry in HistoryStats::platforms(store) {
        println!("  {}: {} streams", entry.platform, entry.streams);
    }
}

fn print_patterns(store: &EventStore, patterns: &ListeningPatterns, limit: usize) {
    let stats = patterns.session_statistics(store);
    println!("\n=== LISTENING SESSIONS ===");
    println!(
        "Sessions: {} | Avg duration: {:.1}m | Avg tracks: {:.1} | Longest: {:.1}h | Most tracks: {}",
        stats.total_sessions,
        stats.avg_duration_minutes,
        stats.avg_tracks_per_session,
        stats.longest_session_hours,
        stats.max_tracks_in_session
    );

    println!("\nLongest sessions:");
    for (i, binge) in patterns.binge_sessions(store, limit).iter().enumerate() {
        println!(
            "  {}. {} - {:.0}m, {} tracks ({} unique)",
            i + 1,
            binge.start_time,
            binge.duration_minutes,
            binge.stream_count,
            binge.unique_tracks
        );
    }

    println!("\nListening streaks:");
    let streaks = patterns.listening_streaks(store, limit);
    if streaks.is_empty() {
        println!("  No streaks of 3+ consecutive days found.");
    }
    for streak in &streaks {
        println!(
            "  {} to {}: {} days",
            streak.start_date, streak.end_date, streak.days
        );
    }

    println!("\nTracks on repeat:");
    for run in patterns.repeated_tracks(store, limit) {
        println!(
            "  \"{}\" by {} - {}x back-to-back",
            run.track,
            run.artist.as_deref().unwrap_or("Unknown"),
            run.repeat_count
        );
    }
}

fn print_clusters(store: &EventStore, analyzer: &SessionAnalyzer, limit: usize) {
    let report = analyzer.session_clusters(store);
    println!("\n=== SESSION ARCHETYPES ===");
    match report.silhouette_score {
        Some(score) => println!(
            "{} sessions across {} clusters (silhouette {:.2})",
            report.total_sessions, report.cluster_count, score
        ),
        None => println!(
            "{} sessions - too few for clustering, reporting a single group",
            report.total_sessions
        ),
    }

    for cluster in &report.clusters {
        println!(
            "  Cluster {}: {} sessions | {:.1}m avg | {:.1} tracks | {:.1}% skips | {}:00 | {:.0}% weekend",
            cluster.cluster_id,
            cluster.session_count,
            cluster.avg_duration_minutes,
            cluster.avg_track_count,
            cluster.avg_skip_ratio_percent,
            cluster.dominant_hour,
            cluster.weekend_percent
        );
    }

    println!("\nRecent sessions:");
    for assignment in analyzer.session_assignments(store, limit) {
        println!(
            "  {} - cluster {} ({} tracks, {:.0}m)",
            assignment.start_time,
            assignment.cluster_label,
            assignment.track_count,
            assignment.duration_minutes
        );
    }
}

fn print_json(
    store: &EventStore,
    analyzer: &SessionAnalyzer,
    patterns: &ListeningPatterns,
    limit: usize,
) -> Result<()> {
    let document = serde_json::json!({
        "overview": HistoryStats::overview(store),
        "topArtists": HistoryStats::top_artists(store, limit),
        "topTracks": HistoryStats::top_tracks(store, limit),
        "monthly": HistoryStats::monthly(store),
        "platforms": HistoryStats::platforms(store),
        "sessionStatistics": patterns.session_statistics(store),
        "bingeSessions": patterns.binge_sessions(store, limit),
        "sessionDurations": patterns.session_durations(store),
        "weekendWeekday": patterns.weekend_weekday(store),
        "heatmap": patterns.heatmap(store),
        "listeningStreaks": patterns.listening_streaks(store, limit),
        "repeatedTracks": patterns.repeated_tracks(store, limit),
        "monthlyDiversity": patterns.monthly_diversity(store),
        "sessionClusters": analyzer.session_clusters(store),
        "sessionCentroids": analyzer.session_centroids(store),
        "sessionAssignments": analyzer.session_assignments(store, limit),
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
